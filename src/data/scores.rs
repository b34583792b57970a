use ndarray::{Array2, ArrayView1, Axis};

use crate::error::{AnnotationError, Result};

/// Per-cell scores for each candidate cell type (cells × cell types).
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreMatrix {
    values: Array2<f64>,
    cells: Vec<String>,
    cell_types: Vec<String>,
}

impl ScoreMatrix {
    pub fn new(values: Array2<f64>, cells: Vec<String>, cell_types: Vec<String>) -> Result<Self> {
        if values.dim() != (cells.len(), cell_types.len()) {
            return Err(AnnotationError::shape(format!(
                "score matrix of shape {:?} for {} cells and {} cell types",
                values.dim(),
                cells.len(),
                cell_types.len()
            )));
        }
        Ok(ScoreMatrix {
            values,
            cells,
            cell_types,
        })
    }

    /// All-zero scores for the given cells and cell types.
    pub fn zeros(cells: Vec<String>, cell_types: Vec<String>) -> Self {
        ScoreMatrix {
            values: Array2::zeros((cells.len(), cell_types.len())),
            cells,
            cell_types,
        }
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn cells(&self) -> &[String] {
        &self.cells
    }

    pub fn cell_types(&self) -> &[String] {
        &self.cell_types
    }

    pub fn n_cells(&self) -> usize {
        self.cells.len()
    }

    pub fn n_cell_types(&self) -> usize {
        self.cell_types.len()
    }

    pub fn get(&self, cell: &str, cell_type: &str) -> Option<f64> {
        let row = self.cells.iter().position(|c| c == cell)?;
        let col = self.cell_types.iter().position(|t| t == cell_type)?;
        Some(self.values[[row, col]])
    }

    pub fn column(&self, cell_type: &str) -> Option<ArrayView1<'_, f64>> {
        let col = self.cell_types.iter().position(|t| t == cell_type)?;
        Some(self.values.column(col))
    }

    /// Remove every cell type column that is zero for all cells.
    pub fn drop_zero_columns(self) -> Self {
        let keep: Vec<usize> = self
            .values
            .axis_iter(Axis(1))
            .enumerate()
            .filter_map(|(idx, col)| col.iter().any(|&v| v != 0.0).then_some(idx))
            .collect();

        if keep.len() == self.cell_types.len() {
            return self;
        }

        let values = if keep.is_empty() {
            Array2::zeros((self.cells.len(), 0))
        } else {
            self.values.select(Axis(1), &keep)
        };
        let cell_types = keep.iter().map(|&idx| self.cell_types[idx].clone()).collect();
        ScoreMatrix {
            values,
            cells: self.cells,
            cell_types,
        }
    }

    /// Highest scoring cell type for every cell, `None` where a cell scores zero everywhere.
    pub fn top_cell_types(&self) -> Vec<Option<&str>> {
        self.values
            .axis_iter(Axis(0))
            .map(|row| {
                row.iter()
                    .enumerate()
                    .filter(|(_, v)| **v > 0.0)
                    .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
                    .map(|(idx, _)| self.cell_types[idx].as_str())
            })
            .collect()
    }
}
