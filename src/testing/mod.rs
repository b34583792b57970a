//! Statistical building blocks for marker based annotation: gene selection, enrichment
//! testing and multiple testing correction.

pub mod correction;
pub mod inference;
