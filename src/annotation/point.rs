use ndarray::Array2;
use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::annotation::{AnnotatorConfig, Scorer, ScoringMethod};
use crate::data::{ExpressionMatrix, MarkerTable, ScoreMatrix};
use crate::error::{AnnotationError, Result};
use crate::normalization::log_cpm;
use crate::testing::correction::benjamini_hochberg_correction;
use crate::testing::inference::discrete::enrichment_p_value;
use crate::testing::inference::nonparametric::{rank_z_scores, select_genes};

/// Marker enrichment scorer.
///
/// For every cell, genes ranking high within the cell (Mann-Whitney z-score above
/// `z_threshold`) are selected, and each cell type is tested for over-representation of
/// its markers among them. P-values are FDR corrected across the cell types of the cell.
#[derive(Debug, Clone, Copy, Default)]
pub struct PointAnnotator;

impl Scorer for PointAnnotator {
    fn name(&self) -> &str {
        "point-annotator"
    }

    fn score(
        &self,
        expression: &ExpressionMatrix,
        markers: &MarkerTable,
        config: &AnnotatorConfig,
    ) -> Result<ScoreMatrix> {
        let cells = expression.cells().to_vec();
        let gene_sets = markers.gene_sets(expression);
        if gene_sets.is_empty() {
            return Ok(ScoreMatrix::zeros(cells, Vec::new()));
        }

        let population = config.population(expression.n_genes());

        let rows = (0..expression.n_cells())
            .into_par_iter()
            .map(|cell| {
                let mut values = expression.row(cell);
                if config.normalize {
                    log_cpm(&mut values);
                }
                score_cell(&values, &gene_sets, population, config)
            })
            .collect::<anyhow::Result<Vec<Vec<f64>>>>()?;

        let n_types = gene_sets.len();
        let values = Array2::from_shape_vec((cells.len(), n_types), rows.concat())
            .map_err(|e| AnnotationError::shape(e.to_string()))?;
        let cell_types = gene_sets.into_iter().map(|(cell_type, _)| cell_type).collect();
        ScoreMatrix::new(values, cells, cell_types)
    }
}

fn score_cell(
    values: &[f64],
    gene_sets: &[(String, Vec<usize>)],
    population: usize,
    config: &AnnotatorConfig,
) -> anyhow::Result<Vec<f64>> {
    let selected = select_genes(&rank_z_scores(values), config.z_threshold);
    let n_selected = selected.iter().filter(|&&s| s).count();

    let mut hits: Vec<Vec<usize>> = Vec::with_capacity(gene_sets.len());
    let mut p_values = Vec::with_capacity(gene_sets.len());
    for (_, markers) in gene_sets {
        let expressed: Vec<usize> = markers.iter().copied().filter(|&g| selected[g]).collect();
        p_values.push(enrichment_p_value(
            config.p_value_method,
            expressed.len(),
            markers.len(),
            n_selected,
            population,
        )?);
        hits.push(expressed);
    }
    let fdr = benjamini_hochberg_correction(&p_values)?;

    let scores = gene_sets
        .iter()
        .enumerate()
        .map(|(t, (_, markers))| {
            if fdr[t] > config.p_threshold {
                return 0.0;
            }
            match config.scoring_method {
                ScoringMethod::ExpRatio => hits[t].len() as f64 / markers.len() as f64,
                ScoringMethod::SumOfExpressedMarkers => hits[t].iter().map(|&g| values[g]).sum(),
                ScoringMethod::LogFdr => neg_ln(fdr[t]),
                ScoringMethod::LogPValue => neg_ln(p_values[t]),
            }
        })
        .collect();
    Ok(scores)
}

fn neg_ln(p: f64) -> f64 {
    if p >= 1.0 {
        0.0
    } else {
        -p.max(f64::MIN_POSITIVE).ln()
    }
}
