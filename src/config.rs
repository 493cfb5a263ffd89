use anyhow::Result;
use clap::Args;
use serde::{Deserialize, Serialize};

fn default_outcome() -> String {
    "hospital_expire_flag".to_string()
}

fn default_n_boot() -> usize {
    roc::DEFAULT_REPLICATES
}

fn default_alpha() -> f64 {
    0.05
}

fn default_seed() -> u32 {
    matlib::Mwc256::DEFAULT_SEED
}

/// Settings for one AUROC analysis of a cohort file.
#[derive(Debug, Clone, Deserialize, Serialize, Args)]
pub struct AnalysisConfig {
    /// Cohort CSV with one row per subject
    #[arg(value_name = "DATA_FILE")]
    pub data_file: String,

    /// Binary outcome column (0/1)
    #[arg(long, default_value_t = default_outcome())]
    #[serde(default = "default_outcome")]
    pub outcome: String,

    /// Predictor columns in report order (default: every other numeric column)
    #[arg(long, value_delimiter = ',')]
    #[serde(default)]
    pub predictors: Vec<String>,

    /// Subject identifier column, excluded from the predictors
    #[arg(long)]
    #[serde(default)]
    pub id_column: Option<String>,

    /// Bootstrap replicates for the AUROC intervals
    #[arg(long, default_value_t = default_n_boot())]
    #[serde(default = "default_n_boot")]
    pub n_boot: usize,

    /// Significance level for the DeLong tests and intervals
    #[arg(long, default_value_t = default_alpha())]
    #[serde(default = "default_alpha")]
    pub alpha: f64,

    /// Seed of the bootstrap generator
    #[arg(long, default_value_t = default_seed())]
    #[serde(default = "default_seed")]
    pub seed: u32,

    /// Score cut-off for the operating-point table (score >= threshold is positive)
    #[arg(long)]
    #[serde(default)]
    pub threshold: Option<f64>,

    /// Covariates of the logistic baseline model each predictor is added to
    #[arg(long, value_delimiter = ',')]
    #[serde(default)]
    pub baseline_covariates: Vec<String>,
}

impl AnalysisConfig {
    pub fn new(data_file: impl Into<String>) -> Self {
        Self {
            data_file: data_file.into(),
            outcome: default_outcome(),
            predictors: Vec::new(),
            id_column: None,
            n_boot: default_n_boot(),
            alpha: default_alpha(),
            seed: default_seed(),
            threshold: None,
            baseline_covariates: Vec::new(),
        }
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.alpha <= 0.0 || self.alpha >= 1.0 {
            anyhow::bail!("alpha must be in range (0, 1), got {}", self.alpha);
        }

        if self.n_boot == 0 {
            anyhow::bail!("n_boot must be greater than 0");
        }

        if self.outcome.trim().is_empty() {
            anyhow::bail!("outcome column name is empty");
        }

        if self.predictors.iter().any(|p| *p == self.outcome) {
            anyhow::bail!("outcome '{}' is also listed as a predictor", self.outcome);
        }

        if let Some(t) = self.threshold {
            if !t.is_finite() {
                anyhow::bail!("threshold must be finite, got {}", t);
            }
        }

        Ok(())
    }

    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: AnalysisConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Every numeric column the analysis reads: predictors, then covariates.
    pub fn columns(&self) -> Vec<String> {
        let mut cols = self.predictors.clone();
        if !cols.is_empty() {
            for c in &self.baseline_covariates {
                if !cols.contains(c) {
                    cols.push(c.clone());
                }
            }
        }
        cols
    }
}
