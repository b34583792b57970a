use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AnnotationError, Result};

/// Survival function used to score marker over-representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PValueMethod {
    Binom,
    Hypergeom,
}

impl FromStr for PValueMethod {
    type Err = AnnotationError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "binom" => Ok(PValueMethod::Binom),
            "hypergeom" => Ok(PValueMethod::Hypergeom),
            other => Err(AnnotationError::invalid(format!(
                "unsupported p-value method `{}`, expected `binom` or `hypergeom`",
                other
            ))),
        }
    }
}

impl fmt::Display for PValueMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PValueMethod::Binom => write!(f, "binom"),
            PValueMethod::Hypergeom => write!(f, "hypergeom"),
        }
    }
}

/// How a (cell, cell type) pair is scored once its p-value is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringMethod {
    /// Fraction of the cell type's markers that were selected in the cell
    ExpRatio,
    /// Summed expression of the selected markers
    SumOfExpressedMarkers,
    /// `-ln(FDR)`
    LogFdr,
    /// `-ln(p)`
    LogPValue,
}

impl FromStr for ScoringMethod {
    type Err = AnnotationError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "exp_ratio" => Ok(ScoringMethod::ExpRatio),
            "sum_of_expressed_markers" => Ok(ScoringMethod::SumOfExpressedMarkers),
            "log_fdr" => Ok(ScoringMethod::LogFdr),
            "log_p_value" => Ok(ScoringMethod::LogPValue),
            other => Err(AnnotationError::invalid(format!(
                "unsupported scoring method `{}`, expected one of `exp_ratio`, \
                 `sum_of_expressed_markers`, `log_fdr`, `log_p_value`",
                other
            ))),
        }
    }
}

impl fmt::Display for ScoringMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScoringMethod::ExpRatio => "exp_ratio",
            ScoringMethod::SumOfExpressedMarkers => "sum_of_expressed_markers",
            ScoringMethod::LogFdr => "log_fdr",
            ScoringMethod::LogPValue => "log_p_value",
        };
        write!(f, "{}", name)
    }
}

/// Tunables of a single annotation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotatorConfig {
    /// Number of genes of the organism, the population size of the enrichment test.
    /// Falls back to the number of genes in the data, which is smaller than the real gene
    /// universe and makes p-values optimistic.
    pub num_genes: Option<usize>,
    /// Drop cell types that score zero for every cell.
    pub filter_nonzero: bool,
    /// Scores whose FDR exceeds this value are set to zero.
    pub p_threshold: f64,
    pub p_value_method: PValueMethod,
    /// Genes with a per-cell z-score above this value count as expressed.
    pub z_threshold: f64,
    pub scoring_method: ScoringMethod,
    /// Apply log-CPM normalization before selecting genes. Leave off for data that is
    /// already normalized.
    pub normalize: bool,
}

impl Default for AnnotatorConfig {
    fn default() -> Self {
        AnnotatorConfig {
            num_genes: None,
            filter_nonzero: true,
            p_threshold: 0.05,
            p_value_method: PValueMethod::Binom,
            z_threshold: 1.0,
            scoring_method: ScoringMethod::ExpRatio,
            normalize: false,
        }
    }
}

impl AnnotatorConfig {
    /// Parse a JSON document. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| AnnotationError::invalid(format!("annotator config: {}", e)))
    }

    pub fn with_num_genes(mut self, num_genes: usize) -> Self {
        self.num_genes = Some(num_genes);
        self
    }

    pub fn with_filter_nonzero(mut self, filter_nonzero: bool) -> Self {
        self.filter_nonzero = filter_nonzero;
        self
    }

    pub fn with_p_threshold(mut self, p_threshold: f64) -> Self {
        self.p_threshold = p_threshold;
        self
    }

    pub fn with_p_value_method(mut self, method: PValueMethod) -> Self {
        self.p_value_method = method;
        self
    }

    pub fn with_z_threshold(mut self, z_threshold: f64) -> Self {
        self.z_threshold = z_threshold;
        self
    }

    pub fn with_scoring_method(mut self, method: ScoringMethod) -> Self {
        self.scoring_method = method;
        self
    }

    pub fn with_normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    /// Check the tunables against a dataset with `n_genes` genes.
    pub fn validate(&self, n_genes: usize) -> Result<()> {
        if !(0.0..=1.0).contains(&self.p_threshold) {
            return Err(AnnotationError::invalid(format!(
                "p_threshold must be within [0, 1], got {}",
                self.p_threshold
            )));
        }
        if !self.z_threshold.is_finite() {
            return Err(AnnotationError::invalid(format!(
                "z_threshold must be finite, got {}",
                self.z_threshold
            )));
        }
        if let Some(num_genes) = self.num_genes {
            if num_genes < n_genes.max(1) {
                return Err(AnnotationError::invalid(format!(
                    "num_genes ({}) must cover the {} genes of the expression matrix",
                    num_genes, n_genes
                )));
            }
        }
        Ok(())
    }

    /// Gene universe size used by the enrichment test.
    pub fn population(&self, n_genes: usize) -> usize {
        self.num_genes.unwrap_or(n_genes)
    }
}
