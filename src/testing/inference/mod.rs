//! Statistical inference used by the annotation backend.
//!
//! - [`nonparametric`]: per-cell rank z-scores and gene selection
//! - [`discrete`]: binomial and hypergeometric enrichment p-values

pub mod discrete;

pub mod nonparametric;
