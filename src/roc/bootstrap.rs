//! Percentile bootstrap over resampled subject indices.
//!
//! Each replicate draws N indices uniformly with replacement from `[0, N)` and
//! hands them to the statistic, so paired data (scores with labels, x with y,
//! item rows) is always resampled together. The reported interval is the
//! [5, 95] percentile pair of the replicates; the point estimate is the
//! statistic of the original data.

use matlib::{percentile, qsortd};
use rand::Rng;
use serde::Serialize;
use stats::{cronbach_alpha, kr20, pearson, Result, StatError};

use crate::rank::auc;

pub const DEFAULT_REPLICATES: usize = 100;
pub const LOWER_PERCENTILE: f64 = 5.0;
pub const UPPER_PERCENTILE: f64 = 95.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BootstrapEstimate {
    pub estimate: f64,
    pub ci: (f64, f64),
}

/// Bootstrap `statistic` over `n` subjects with `n_boot` replicates.
///
/// `statistic` is called once with the identity indices and then once per
/// replicate. The first error from any call is returned.
pub fn bootstrap<R, F>(n: usize, mut statistic: F, n_boot: usize, rng: &mut R) -> Result<BootstrapEstimate>
where
    R: Rng + ?Sized,
    F: FnMut(&[usize]) -> Result<f64>,
{
    if n == 0 {
        return Err(StatError::DegenerateInput(
            "cannot bootstrap an empty sample".to_string(),
        ));
    }
    if n_boot == 0 {
        return Err(StatError::InvalidParameter(
            "bootstrap needs at least one replicate".to_string(),
        ));
    }

    let mut idx: Vec<usize> = (0..n).collect();
    let estimate = statistic(&idx)?;

    let mut work = Vec::with_capacity(n_boot);
    for _ in 0..n_boot {
        for slot in idx.iter_mut() {
            *slot = rng.gen_range(0..n);
        }
        let value = statistic(&idx)?;
        if !value.is_finite() {
            return Err(StatError::DegenerateInput(format!(
                "bootstrap replicate produced {}",
                value
            )));
        }
        work.push(value);
    }

    qsortd(&mut work);
    Ok(BootstrapEstimate {
        estimate,
        ci: (
            percentile(&work, LOWER_PERCENTILE),
            percentile(&work, UPPER_PERCENTILE),
        ),
    })
}

fn gather<T: Copy>(values: &[T], idx: &[usize]) -> Vec<T> {
    idx.iter().map(|&i| values[i]).collect()
}

/// Tie-aware AUC with a bootstrap interval.
///
/// A replicate that happens to draw a single outcome class is an error.
pub fn bootstrap_auc<R: Rng + ?Sized>(
    scores: &[f64],
    labels: &[bool],
    n_boot: usize,
    rng: &mut R,
) -> Result<BootstrapEstimate> {
    if scores.len() != labels.len() {
        return Err(StatError::Shape(format!(
            "{} scores but {} labels",
            scores.len(),
            labels.len()
        )));
    }
    bootstrap(
        scores.len(),
        |idx| auc(&gather(scores, idx), &gather(labels, idx)),
        n_boot,
        rng,
    )
}

/// Cronbach's alpha over subjects (rows of `items`).
pub fn bootstrap_cronbach_alpha<R: Rng + ?Sized>(
    items: &[Vec<f64>],
    n_boot: usize,
    rng: &mut R,
) -> Result<BootstrapEstimate> {
    bootstrap(
        items.len(),
        |idx| cronbach_alpha(&idx.iter().map(|&i| items[i].clone()).collect::<Vec<_>>()),
        n_boot,
        rng,
    )
}

/// KR-20 over subjects (rows of `items`).
pub fn bootstrap_kr20<R: Rng + ?Sized>(
    items: &[Vec<f64>],
    n_boot: usize,
    rng: &mut R,
) -> Result<BootstrapEstimate> {
    bootstrap(
        items.len(),
        |idx| kr20(&idx.iter().map(|&i| items[i].clone()).collect::<Vec<_>>()),
        n_boot,
        rng,
    )
}

/// Pearson correlation with `x` and `y` resampled as pairs.
pub fn bootstrap_pearson<R: Rng + ?Sized>(
    x: &[f64],
    y: &[f64],
    n_boot: usize,
    rng: &mut R,
) -> Result<BootstrapEstimate> {
    if x.len() != y.len() {
        return Err(StatError::Shape(format!(
            "pearson inputs differ in length ({} vs {})",
            x.len(),
            y.len()
        )));
    }
    bootstrap(
        x.len(),
        |idx| pearson(&gather(x, idx), &gather(y, idx)),
        n_boot,
        rng,
    )
}
