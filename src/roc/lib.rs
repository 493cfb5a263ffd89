//! AUROC inference: exact rank-based AUC, DeLong covariance for correlated
//! AUCs, contrast tests, percentile bootstrap and the binormal ROC model.
//!
//! Every function is pure over borrowed inputs and returns `stats::Result`.

mod binormal;
mod bootstrap;
mod contrast;
mod delong;
mod predictors;
mod rank;

pub use binormal::*;
pub use bootstrap::*;
pub use contrast::*;
pub use delong::*;
pub use predictors::*;
pub use rank::*;

pub use stats::{Result, StatError};
