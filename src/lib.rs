//! # single-annotation
//!
//! Marker-gene based cell type annotation for single-cell expression data, part of the
//! single-rust ecosystem.
//!
//! Given a cells × genes expression matrix and a table of marker genes per cell type, the
//! annotator produces a cells × cell types score matrix telling how well each cell matches
//! each candidate type.
//!
//! ## Method
//!
//! 1. **Gene selection**: within every cell, genes are ranked against the rest of the cell
//!    with a Mann-Whitney U test; genes whose z-score exceeds `z_threshold` are selected.
//! 2. **Enrichment**: for each cell type, the overlap between the selected genes and its
//!    markers is tested with a binomial or hypergeometric survival function, FDR corrected
//!    across cell types and turned into a score.
//!
//! ## Module Organization
//!
//! - **[`annotation`]**: `Annotator`, its configuration and the pluggable `Scorer` backend
//! - **[`data`]**: expression, marker, score and per-cell metadata tables
//! - **[`normalization`]**: log-CPM normalization
//! - **[`testing`]**: rank z-scores, enrichment p-values and multiple testing correction
//!
//! ## Features
//!
//! - `point-annotator` (default): the built-in enrichment scorer. Without it,
//!   `Annotator::default()` has no backend and every call fails with
//!   [`AnnotationError::DependencyMissing`].

pub mod annotation;
pub mod data;
pub mod error;
pub mod normalization;
pub mod testing;

pub use annotation::{Annotator, AnnotatorConfig, PValueMethod, Scorer, ScoringMethod};
pub use data::{AnnotatedData, ExpressionMatrix, MarkerTable, ScoreMatrix};
pub use error::AnnotationError;
