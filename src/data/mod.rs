//! Labelled tables consumed and produced by the annotator.
//!
//! - [`ExpressionMatrix`]: cells × genes expression values
//! - [`MarkerTable`]: gene → cell type associations
//! - [`ScoreMatrix`]: cells × cell types annotation scores
//! - [`AnnotatedData`]: expression plus per-cell metadata, the target of in-place annotation

mod annotated;
mod expression;
mod markers;
mod scores;

pub use annotated::{AnnotatedData, CellMetadata, ObsColumn};
pub use expression::{ExpressionMatrix, ExpressionValues};
pub use markers::{MarkerEntry, MarkerTable};
pub use scores::ScoreMatrix;
