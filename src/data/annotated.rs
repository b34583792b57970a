use crate::data::{ExpressionMatrix, ScoreMatrix};
use crate::error::{AnnotationError, Result};

/// A column of per-cell metadata.
#[derive(Debug, Clone, PartialEq)]
pub enum ObsColumn {
    Numeric(Vec<f64>),
    Categorical(Vec<String>),
}

impl ObsColumn {
    pub fn len(&self) -> usize {
        match self {
            ObsColumn::Numeric(v) => v.len(),
            ObsColumn::Categorical(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_numeric(&self) -> Option<&[f64]> {
        match self {
            ObsColumn::Numeric(v) => Some(v),
            ObsColumn::Categorical(_) => None,
        }
    }
}

/// Per-cell side table, indexed by cell label. Columns keep insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct CellMetadata {
    index: Vec<String>,
    columns: Vec<(String, ObsColumn)>,
}

impl CellMetadata {
    pub fn new(index: Vec<String>) -> Self {
        CellMetadata {
            index,
            columns: Vec::new(),
        }
    }

    pub fn index(&self) -> &[String] {
        &self.index
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&ObsColumn> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, column)| column)
    }

    /// Add a column, replacing an existing one with the same name in place.
    pub fn insert(&mut self, name: impl Into<String>, column: ObsColumn) -> Result<()> {
        let name = name.into();
        if column.len() != self.index.len() {
            return Err(AnnotationError::shape(format!(
                "column `{}` has {} values for {} cells",
                name,
                column.len(),
                self.index.len()
            )));
        }

        match self.columns.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => {
                log::debug!("Replacing existing obs column `{}`", name);
                slot.1 = column;
            }
            None => self.columns.push((name, column)),
        }
        Ok(())
    }

    /// Append one numeric column per cell type. Rows are matched on cell labels.
    pub fn merge_scores(&mut self, scores: &ScoreMatrix) -> Result<()> {
        if scores.cells() != self.index.as_slice() {
            return Err(AnnotationError::shape(
                "score rows do not match the cell index of the metadata table",
            ));
        }

        for (col, cell_type) in scores.cell_types().iter().enumerate() {
            let values = scores.values().column(col).to_vec();
            self.insert(cell_type.clone(), ObsColumn::Numeric(values))?;
        }
        Ok(())
    }
}

/// Expression matrix bundled with its per-cell metadata, the target of in-place annotation.
#[derive(Debug, Clone)]
pub struct AnnotatedData {
    expression: ExpressionMatrix,
    obs: CellMetadata,
}

impl AnnotatedData {
    pub fn new(expression: ExpressionMatrix) -> Self {
        let obs = CellMetadata::new(expression.cells().to_vec());
        AnnotatedData { expression, obs }
    }

    pub fn with_obs(expression: ExpressionMatrix, obs: CellMetadata) -> Result<Self> {
        if obs.index() != expression.cells() {
            return Err(AnnotationError::shape(
                "metadata index does not match the expression matrix cells",
            ));
        }
        Ok(AnnotatedData { expression, obs })
    }

    pub fn expression(&self) -> &ExpressionMatrix {
        &self.expression
    }

    pub fn obs(&self) -> &CellMetadata {
        &self.obs
    }

    pub fn obs_mut(&mut self) -> &mut CellMetadata {
        &mut self.obs
    }

    pub fn into_parts(self) -> (ExpressionMatrix, CellMetadata) {
        (self.expression, self.obs)
    }
}
