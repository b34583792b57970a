use std::collections::{BTreeMap, BTreeSet};

use crate::data::ExpressionMatrix;
use crate::error::{AnnotationError, Result};

/// A single row of a marker table: `gene` is characteristic of `cell_type`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MarkerEntry {
    pub gene: String,
    pub cell_type: String,
}

/// Ordered gene → cell type associations.
///
/// The relation is many-to-many: a gene may mark several cell types and a cell type is
/// usually described by several genes. Gene labels must follow the same naming scheme as
/// the expression matrix columns, since matching is purely lexical.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkerTable {
    entries: Vec<MarkerEntry>,
}

impl MarkerTable {
    pub fn new() -> Self {
        MarkerTable::default()
    }

    pub fn from_pairs<G, C, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (G, C)>,
        G: Into<String>,
        C: Into<String>,
    {
        let entries = pairs
            .into_iter()
            .map(|(gene, cell_type)| MarkerEntry {
                gene: gene.into(),
                cell_type: cell_type.into(),
            })
            .collect();
        MarkerTable { entries }
    }

    /// Build the table from its two columns, `Gene` and `Cell Type`.
    pub fn from_columns(genes: Vec<String>, cell_types: Vec<String>) -> Result<Self> {
        if genes.len() != cell_types.len() {
            return Err(AnnotationError::shape(format!(
                "gene column has {} rows but cell type column has {}",
                genes.len(),
                cell_types.len()
            )));
        }
        Ok(Self::from_pairs(genes.into_iter().zip(cell_types)))
    }

    pub fn push(&mut self, gene: impl Into<String>, cell_type: impl Into<String>) {
        self.entries.push(MarkerEntry {
            gene: gene.into(),
            cell_type: cell_type.into(),
        });
    }

    pub fn entries(&self) -> &[MarkerEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Distinct gene labels, sorted.
    pub fn genes(&self) -> Vec<&str> {
        let unique: BTreeSet<&str> = self.entries.iter().map(|e| e.gene.as_str()).collect();
        unique.into_iter().collect()
    }

    /// Distinct cell type labels, sorted.
    pub fn cell_types(&self) -> Vec<&str> {
        let unique: BTreeSet<&str> = self.entries.iter().map(|e| e.cell_type.as_str()).collect();
        unique.into_iter().collect()
    }

    /// Keep only the rows whose gene is present in `expression`.
    pub fn restrict_to(&self, expression: &ExpressionMatrix) -> MarkerTable {
        let entries = self
            .entries
            .iter()
            .filter(|e| expression.contains_gene(&e.gene))
            .cloned()
            .collect();
        MarkerTable { entries }
    }

    /// Marker column indices per cell type, resolved against `expression`.
    ///
    /// Genes missing from the matrix are skipped and cell types left without any marker are
    /// omitted. Cell types come back sorted, each with deduplicated, ascending gene indices.
    pub fn gene_sets(&self, expression: &ExpressionMatrix) -> Vec<(String, Vec<usize>)> {
        let mut sets: BTreeMap<&str, BTreeSet<usize>> = BTreeMap::new();
        for entry in &self.entries {
            if let Some(idx) = expression.gene_position(&entry.gene) {
                sets.entry(entry.cell_type.as_str()).or_default().insert(idx);
            }
        }
        sets.into_iter()
            .map(|(cell_type, genes)| (cell_type.to_string(), genes.into_iter().collect()))
            .collect()
    }
}
