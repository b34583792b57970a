use std::collections::HashMap;

use nalgebra_sparse::CsrMatrix;
use ndarray::{Array2, ArrayView2};
use single_utilities::traits::FloatOps;

use crate::error::{AnnotationError, Result};

/// Backing storage of an [`ExpressionMatrix`].
///
/// Sparse input stays sparse; a cell is only densified while it is being ranked.
#[derive(Debug, Clone)]
pub enum ExpressionValues {
    Dense(Array2<f64>),
    Sparse(CsrMatrix<f64>),
}

impl ExpressionValues {
    pub fn dim(&self) -> (usize, usize) {
        match self {
            ExpressionValues::Dense(values) => values.dim(),
            ExpressionValues::Sparse(matrix) => (matrix.nrows(), matrix.ncols()),
        }
    }
}

/// Labelled expression values with cells as rows and genes as columns.
#[derive(Debug, Clone)]
pub struct ExpressionMatrix {
    values: ExpressionValues,
    cells: Vec<String>,
    genes: Vec<String>,
    gene_index: HashMap<String, usize>,
}

impl ExpressionMatrix {
    /// Create an expression matrix from dense `f64` values.
    ///
    /// # Arguments
    ///
    /// * `values` - Matrix of shape (cells × genes), all entries finite
    /// * `cells` - One label per row
    /// * `genes` - One label per column, using the same naming scheme as the marker table
    pub fn new(values: Array2<f64>, cells: Vec<String>, genes: Vec<String>) -> Result<Self> {
        check_finite(values.iter())?;
        Self::from_storage(ExpressionValues::Dense(values), cells, genes)
    }

    /// Create an expression matrix from a dense view of any float type.
    pub fn from_dense<T>(values: ArrayView2<T>, cells: Vec<String>, genes: Vec<String>) -> Result<Self>
    where
        T: FloatOps,
    {
        let converted = values
            .iter()
            .map(|&v| convert(v))
            .collect::<Result<Vec<f64>>>()?;
        let dense = Array2::from_shape_vec(values.dim(), converted)
            .map_err(|e| AnnotationError::shape(e.to_string()))?;
        Self::new(dense, cells, genes)
    }

    /// Create an expression matrix from a sparse (cells × genes) CSR matrix.
    ///
    /// The sparsity pattern is kept as is; implicit entries read as zeros.
    pub fn from_csr<T>(matrix: &CsrMatrix<T>, cells: Vec<String>, genes: Vec<String>) -> Result<Self>
    where
        T: FloatOps,
    {
        let values = matrix
            .values()
            .iter()
            .map(|&v| convert(v))
            .collect::<Result<Vec<f64>>>()?;
        check_finite(values.iter())?;

        let csr = CsrMatrix::try_from_csr_data(
            matrix.nrows(),
            matrix.ncols(),
            matrix.row_offsets().to_vec(),
            matrix.col_indices().to_vec(),
            values,
        )
        .map_err(|e| AnnotationError::shape(format!("invalid CSR data: {}", e)))?;
        Self::from_storage(ExpressionValues::Sparse(csr), cells, genes)
    }

    fn from_storage(values: ExpressionValues, cells: Vec<String>, genes: Vec<String>) -> Result<Self> {
        let (n_cells, n_genes) = values.dim();
        if cells.len() != n_cells {
            return Err(AnnotationError::shape(format!(
                "{} cell labels for a matrix with {} rows",
                cells.len(),
                n_cells
            )));
        }
        if genes.len() != n_genes {
            return Err(AnnotationError::shape(format!(
                "{} gene labels for a matrix with {} columns",
                genes.len(),
                n_genes
            )));
        }

        let mut gene_index = HashMap::with_capacity(n_genes);
        for (idx, gene) in genes.iter().enumerate() {
            if gene_index.insert(gene.clone(), idx).is_some() {
                return Err(AnnotationError::invalid(format!(
                    "duplicate gene label `{}`",
                    gene
                )));
            }
        }

        Ok(ExpressionMatrix {
            values,
            cells,
            genes,
            gene_index,
        })
    }

    pub fn values(&self) -> &ExpressionValues {
        &self.values
    }

    pub fn is_sparse(&self) -> bool {
        matches!(self.values, ExpressionValues::Sparse(_))
    }

    /// Dense copy of one cell's expression across all genes.
    pub fn row(&self, cell: usize) -> Vec<f64> {
        match &self.values {
            ExpressionValues::Dense(values) => values.row(cell).to_vec(),
            ExpressionValues::Sparse(matrix) => {
                let mut dense = vec![0.0; matrix.ncols()];
                let row = matrix.row(cell);
                for (&col, &value) in row.col_indices().iter().zip(row.values()) {
                    dense[col] = value;
                }
                dense
            }
        }
    }

    pub fn cells(&self) -> &[String] {
        &self.cells
    }

    pub fn genes(&self) -> &[String] {
        &self.genes
    }

    pub fn n_cells(&self) -> usize {
        self.cells.len()
    }

    pub fn n_genes(&self) -> usize {
        self.genes.len()
    }

    /// Column index of a gene label, if the matrix contains it.
    pub fn gene_position(&self, gene: &str) -> Option<usize> {
        self.gene_index.get(gene).copied()
    }

    pub fn contains_gene(&self, gene: &str) -> bool {
        self.gene_index.contains_key(gene)
    }
}

fn convert<T>(value: T) -> Result<f64>
where
    T: FloatOps,
{
    value
        .to_f64()
        .ok_or_else(|| AnnotationError::invalid("expression value not representable as f64"))
}

fn check_finite<'a>(values: impl Iterator<Item = &'a f64>) -> Result<()> {
    for &v in values {
        if !v.is_finite() {
            return Err(AnnotationError::invalid(format!(
                "expression values must be finite, found {}",
                v
            )));
        }
    }
    Ok(())
}
