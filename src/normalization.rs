//! Log-CPM normalization of raw counts.

const COUNTS_PER_MILLION: f64 = 1e6;

/// `ln(1 + x / total * 1e6)` over one cell, where `total` is the cell's summed expression.
///
/// Applied cell by cell while scoring, so sparse input never has to be densified as a
/// whole. Cells without any counts are left at zero. Do not apply this to data that is
/// already normalized; nothing here detects it.
pub fn log_cpm(cell: &mut [f64]) {
    let total: f64 = cell.iter().sum();
    if total > 0.0 {
        for v in cell.iter_mut() {
            *v = (*v / total * COUNTS_PER_MILLION).ln_1p();
        }
    } else {
        cell.fill(0.0);
    }
}
