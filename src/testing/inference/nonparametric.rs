//! Rank based gene selection within a single cell.
//!
//! Each gene is compared against the remaining genes of the same cell with a Mann-Whitney U
//! test (one observation against the rest). The normal approximation of U gives a z-score
//! that only depends on ranks, so selection is independent of the absolute expression scale.

/// Ranks with ties replaced by their average rank (1-based).
pub fn average_ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; values.len()];
    let mut i = 0;
    while i < order.len() {
        let val = values[order[i]];
        let mut j = i + 1;
        while j < order.len() && values[order[j]] == val {
            j += 1;
        }

        let rank = (i + j - 1) as f64 / 2.0 + 1.0;
        for &idx in &order[i..j] {
            ranks[idx] = rank;
        }
        i = j;
    }
    ranks
}

/// Mann-Whitney z-score of every gene against the other genes of the same cell.
///
/// With `m` genes, a gene of rank `r` has `U = r - 1`, mean `(m - 1) / 2` and variance
/// `(m - 1)(m + 1) / 12`. Cells with fewer than two genes get all-zero scores.
pub fn rank_z_scores(cell: &[f64]) -> Vec<f64> {
    let m = cell.len();
    if m < 2 {
        return vec![0.0; m];
    }

    let n2 = (m - 1) as f64;
    let mean_u = n2 / 2.0;
    let sd_u = (n2 * (n2 + 2.0) / 12.0).sqrt();

    average_ranks(cell)
        .into_iter()
        .map(|rank| (rank - 1.0 - mean_u) / sd_u)
        .collect()
}

/// Mask of genes whose z-score is strictly above `z_threshold`.
pub fn select_genes(z_scores: &[f64], z_threshold: f64) -> Vec<bool> {
    z_scores.iter().map(|&z| z > z_threshold).collect()
}
