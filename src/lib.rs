//! Mortality-prediction evaluation for the sepsis cohort: cohort loading,
//! configuration, AUROC comparison tables and model-based predictors, built
//! on the `stats`, `matlib` and `roc` engine crates.

pub mod analysis;
pub mod config;
pub mod core;
pub mod error;
pub mod model;

pub use analysis::{baseline_predictions, render_operating_stats, AucTable, Cell, OperatingStats};
pub use config::AnalysisConfig;
pub use crate::core::io::{read_cohort, read_cohort_from, write_json, write_report, Cohort};
pub use error::DataError;
pub use model::{Design, LogisticFit, LogisticModel, PredictorModel};
