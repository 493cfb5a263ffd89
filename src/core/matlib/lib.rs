mod linalg;
mod mwc256;
mod qsorts;

pub use linalg::*;
pub use mwc256::*;
pub use qsorts::*;
