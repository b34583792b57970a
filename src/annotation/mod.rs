//! Cell type annotation from marker genes.
//!
//! The [`Annotator`] prepares the inputs (gene universe, marker/gene intersection), hands
//! them to a [`Scorer`] and post-processes the raw scores (zero-column filtering, merging
//! into per-cell metadata). The scoring itself sits behind the [`Scorer`] trait so the
//! enrichment test can be replaced independently of the surrounding glue.
//!
//! ## Quick Example
//!
//! ```rust,no_run
//! use ndarray::array;
//! use single_annotation::annotation::{Annotator, AnnotatorConfig};
//! use single_annotation::data::{ExpressionMatrix, MarkerTable};
//!
//! let expression = ExpressionMatrix::new(
//!     array![[12.0, 0.0, 1.0, 0.0], [0.0, 8.0, 0.0, 1.0]],
//!     vec!["cell_1".into(), "cell_2".into()],
//!     vec!["CD3E".into(), "MS4A1".into(), "LYZ".into(), "PPBP".into()],
//! )?;
//! let markers = MarkerTable::from_pairs([("CD3E", "T cells"), ("MS4A1", "B cells")]);
//!
//! let config = AnnotatorConfig::default().with_num_genes(20_000);
//! let scores = Annotator::default().annotate(&expression, &markers, &config)?;
//! # Ok::<(), single_annotation::AnnotationError>(())
//! ```

mod config;
#[cfg(feature = "point-annotator")]
mod point;

pub use config::{AnnotatorConfig, PValueMethod, ScoringMethod};
#[cfg(feature = "point-annotator")]
pub use point::PointAnnotator;

use std::fmt;

use log::{debug, info, warn};

use crate::data::{AnnotatedData, ExpressionMatrix, MarkerTable, ScoreMatrix};
use crate::error::{AnnotationError, Result};

/// Computes raw (cells × cell types) scores.
///
/// Implementations receive markers already restricted to genes of `expression` and a
/// config whose `num_genes` is set. Rows must follow the cell order of `expression`.
pub trait Scorer: Send + Sync {
    fn name(&self) -> &str;

    fn score(
        &self,
        expression: &ExpressionMatrix,
        markers: &MarkerTable,
        config: &AnnotatorConfig,
    ) -> Result<ScoreMatrix>;
}

/// Entry point for annotating cells with marker based cell type scores.
pub struct Annotator {
    scorer: Option<Box<dyn Scorer>>,
}

impl Annotator {
    pub fn with_scorer(scorer: impl Scorer + 'static) -> Self {
        Annotator {
            scorer: Some(Box::new(scorer)),
        }
    }

    /// Score every cell of `expression` against the cell types of `markers`.
    ///
    /// Returns a fresh (cells × cell types) matrix whose rows follow the input cell order.
    /// Genes absent from either table are ignored; if none are shared the result is all
    /// zeros (no columns once zero-filtering is on).
    ///
    /// # Errors
    ///
    /// * `DependencyMissing` - no scoring backend is available
    /// * `InvalidArgument` - a tunable is out of range
    pub fn annotate(
        &self,
        expression: &ExpressionMatrix,
        markers: &MarkerTable,
        config: &AnnotatorConfig,
    ) -> Result<ScoreMatrix> {
        let scorer = self
            .scorer
            .as_deref()
            .ok_or_else(AnnotationError::missing_point_annotator)?;
        config.validate(expression.n_genes())?;

        let mut config = config.clone();
        if config.num_genes.is_none() {
            warn!(
                "The number of the organism's genes is not provided, using the {} genes of \
                 the dataset instead. Set `num_genes` to avoid overly optimistic p-values.",
                expression.n_genes()
            );
            config.num_genes = Some(expression.n_genes());
        }

        let markers = markers.restrict_to(expression);
        if markers.is_empty() {
            warn!("Expression matrix and marker table share no genes, all scores will be zero");
        } else {
            debug!(
                "{} marker rows over {} cell types match the expression matrix",
                markers.len(),
                markers.cell_types().len()
            );
        }

        let scores = scorer.score(expression, &markers, &config)?;
        if scores.cells() != expression.cells() {
            return Err(AnnotationError::shape(format!(
                "scorer `{}` returned rows that do not match the input cells",
                scorer.name()
            )));
        }

        let scores = if config.filter_nonzero {
            scores.drop_zero_columns()
        } else {
            scores
        };

        info!(
            "Annotated {} cells with {} cell types using {} ({}, {})",
            scores.n_cells(),
            scores.n_cell_types(),
            scorer.name(),
            config.p_value_method,
            config.scoring_method
        );
        Ok(scores)
    }

    /// Annotate `data` and append one score column per cell type to its `obs` table.
    ///
    /// Existing columns named after a cell type are overwritten.
    pub fn annotate_into(
        &self,
        data: &mut AnnotatedData,
        markers: &MarkerTable,
        config: &AnnotatorConfig,
    ) -> Result<()> {
        let scores = self.annotate(data.expression(), markers, config)?;
        data.obs_mut().merge_scores(&scores)
    }
}

impl Default for Annotator {
    fn default() -> Self {
        Annotator {
            scorer: default_scorer(),
        }
    }
}

impl fmt::Debug for Annotator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Annotator")
            .field("scorer", &self.scorer.as_ref().map(|s| s.name()))
            .finish()
    }
}

#[cfg(feature = "point-annotator")]
fn default_scorer() -> Option<Box<dyn Scorer>> {
    Some(Box::new(PointAnnotator))
}

#[cfg(not(feature = "point-annotator"))]
fn default_scorer() -> Option<Box<dyn Scorer>> {
    None
}
