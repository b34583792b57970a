use anyhow::anyhow;
use statrs::distribution::{Binomial, DiscreteCDF, Hypergeometric};

use crate::annotation::PValueMethod;

/// Over-representation p-value of a cell type's markers among the genes selected for a cell.
///
/// Returns `P(X >= overlap)`, the survival function evaluated at `overlap - 1`.
///
/// # Arguments
///
/// * `method` - Binomial with success probability `n_markers / population` over `n_selected`
///   trials, or hypergeometric drawing `n_selected` genes from `population` genes of which
///   `n_markers` are markers
/// * `overlap` - Selected genes that are markers of the cell type
/// * `n_markers` - Marker genes of the cell type present in the data
/// * `n_selected` - Genes selected for the cell
/// * `population` - Size of the organism's gene universe
pub fn enrichment_p_value(
    method: PValueMethod,
    overlap: usize,
    n_markers: usize,
    n_selected: usize,
    population: usize,
) -> anyhow::Result<f64> {
    if overlap == 0 {
        return Ok(1.0);
    }
    if population == 0 || n_markers > population || n_selected > population {
        return Err(anyhow!(
            "Population of {} genes cannot hold {} markers and {} selected genes",
            population,
            n_markers,
            n_selected
        ));
    }

    let x = (overlap - 1) as u64;
    let p = match method {
        PValueMethod::Binom => {
            let probability = n_markers as f64 / population as f64;
            Binomial::new(probability, n_selected as u64)
                .map_err(|e| anyhow!("Invalid binomial parameters: {}", e))?
                .sf(x)
        }
        PValueMethod::Hypergeom => Hypergeometric::new(
            population as u64,
            n_markers as u64,
            n_selected as u64,
        )
        .map_err(|e| anyhow!("Invalid hypergeometric parameters: {}", e))?
        .sf(x),
    };

    Ok(p.clamp(0.0, 1.0))
}
