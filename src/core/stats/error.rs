use thiserror::Error;

/// Failure kinds raised by the statistics engine.
///
/// Every operation either returns a complete result or one of these; nothing
/// is ever reported as NaN or a silent default.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StatError {
    /// Mismatched or otherwise invalid vector/matrix lengths
    #[error("shape error: {0}")]
    Shape(String),

    /// Input that leaves the statistic undefined (single-class labels,
    /// zero-variance group, zero contrast variance, too few samples)
    #[error("degenerate input: {0}")]
    DegenerateInput(String),

    /// An iterative solver ran out of iterations
    #[error("numerical non-convergence: {0}")]
    NonConvergence(String),

    /// Argument outside its domain (alpha, counts, non-finite scores)
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

pub type Result<T> = std::result::Result<T, StatError>;

/// Reject `alpha` values outside the open unit interval.
pub fn check_alpha(alpha: f64) -> Result<()> {
    if alpha > 0.0 && alpha < 1.0 {
        Ok(())
    } else {
        Err(StatError::InvalidParameter(format!(
            "alpha must lie in (0, 1), got {}",
            alpha
        )))
    }
}

/// Reject vectors containing NaN or infinite values.
pub fn check_finite(name: &str, values: &[f64]) -> Result<()> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(i) => Err(StatError::InvalidParameter(format!(
            "{} contains a non-finite value at index {}",
            name, i
        ))),
        None => Ok(()),
    }
}
