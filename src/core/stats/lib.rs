//! Distribution functions and small-sample statistics shared by the AUROC engine.

mod binomial;
mod descriptive;
mod error;
mod normal;
mod reliability;

pub use binomial::*;
pub use descriptive::*;
pub use error::{check_alpha, check_finite, Result, StatError};
pub use normal::*;
pub use reliability::*;
