use stats::StatError;
use thiserror::Error;

/// Failures outside the statistics engine: reading cohorts, parsing values,
/// fitting predictor models.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing column '{0}'")]
    MissingColumn(String),

    #[error("row {row}, column '{column}': cannot parse '{value}'")]
    Parse {
        row: usize,
        column: String,
        value: String,
    },

    #[error("cohort is empty after dropping incomplete rows")]
    Empty,

    #[error(transparent)]
    Stat(#[from] StatError),
}

pub type Result<T> = std::result::Result<T, DataError>;
