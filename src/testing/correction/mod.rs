use anyhow::{Result, anyhow};
use std::cmp::Ordering;

/// Benjamini-Hochberg false discovery rate for a family of p-values.
///
/// During annotation the family is the set of cell types tested for a single cell.
/// Adjusted values keep the input order and are monotone in the raw p-values.
///
/// # Arguments
/// * `p_values` - Raw p-values, each within [0, 1]
///
/// # Returns
/// * `Result<Vec<f64>>` - FDR values, capped at 1.0
pub fn benjamini_hochberg_correction(p_values: &[f64]) -> Result<Vec<f64>> {
    let n = p_values.len();
    if n == 0 {
        return Err(anyhow!("Empty p-value array"));
    }

    if let Some((i, p)) = p_values
        .iter()
        .enumerate()
        .find(|(_, p)| !(0.0..=1.0).contains(*p))
    {
        return Err(anyhow!("Invalid p-value at index {}: {}", i, p));
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| {
        p_values[a]
            .partial_cmp(&p_values[b])
            .unwrap_or(Ordering::Equal)
    });

    // walk from the largest p-value down, carrying the running minimum
    let mut fdr = vec![1.0; n];
    let mut running = 1.0_f64;
    for (pos, &idx) in order.iter().enumerate().rev() {
        let rank = (pos + 1) as f64;
        running = running.min(p_values[idx] * n as f64 / rank);
        fdr[idx] = running;
    }

    Ok(fdr)
}
