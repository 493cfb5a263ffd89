use serde::Serialize;

use crate::error::{check_alpha, Result, StatError};

/// Running sums are divided by this whenever they grow past it.
const RESCALE: f64 = 1e30;

/// Bisection stops once the bracket on `p` is this narrow.
const BISECTION_TOLERANCE: f64 = 1e-5;

/// Hard cap on bisection steps. A healthy search needs about 17.
const MAX_BISECTIONS: usize = 200;

// ============================================================================
// Binomial tail
// ============================================================================

/// Probability that a Binomial(`n`, `p`) variable falls in `[x1, x2]`.
///
/// Sums the PMF directly with the ratio recurrence
/// `v_k = v_{k-1} * p/(1-p) * (n+1-k)/k`, starting from an unnormalized
/// `v_0 = 1`, and divides by the total at the end. All three running values
/// are scaled down by 1e30 whenever the total passes that threshold so the
/// recurrence cannot overflow for `p` close to one.
pub fn binomial_tail(n: u64, p: f64, x1: u64, x2: u64) -> f64 {
    if x1 > x2 || x1 > n {
        return 0.0;
    }
    if p <= 0.0 {
        return if x1 == 0 { 1.0 } else { 0.0 };
    }
    if p >= 1.0 {
        return if x2 >= n { 1.0 } else { 0.0 };
    }

    let q = p / (1.0 - p);
    let mut v = 1.0;
    let mut s = 0.0;
    let mut tot = 0.0;

    for k in 0..=n {
        tot += v;
        if k >= x1 && k <= x2 {
            s += v;
        }
        if tot > RESCALE {
            s /= RESCALE;
            tot /= RESCALE;
            v /= RESCALE;
        }
        v *= q * (n - k) as f64 / (k + 1) as f64;
    }

    s / tot
}

// ============================================================================
// Clopper-Pearson exact interval
// ============================================================================

/// Exact (Clopper-Pearson) confidence interval for `successes` out of `trials`.
///
/// The lower limit solves `P(X >= successes | p) = alpha/2` by bisection on
/// `[0, successes/trials]`, the upper limit solves `P(X <= successes | p) = alpha/2`
/// on `[successes/trials, 1]`. No successes pins the lower limit to exactly 0
/// and all successes pins the upper limit to exactly 1.
///
/// Each search stops once its bracket on `p` is narrower than 1e-5, so both
/// limits are within 1e-5 of the exact root. More than 200 halvings is a
/// `NonConvergence` error.
pub fn binomial_ci(successes: u64, trials: u64, alpha: f64) -> Result<(f64, f64)> {
    check_alpha(alpha)?;
    if trials == 0 {
        return Err(StatError::DegenerateInput(
            "binomial interval needs at least one trial".to_string(),
        ));
    }
    if successes > trials {
        return Err(StatError::InvalidParameter(format!(
            "successes ({}) exceed trials ({})",
            successes, trials
        )));
    }

    let ratio = successes as f64 / trials as f64;
    let target = 0.5 * alpha;

    let low = if successes == 0 {
        0.0
    } else {
        bisect(
            0.0,
            ratio,
            |p| binomial_tail(trials, p, successes, trials),
            |tail| tail > target,
        )?
    };

    let high = if successes == trials {
        1.0
    } else {
        bisect(
            ratio,
            1.0,
            |p| binomial_tail(trials, p, 0, successes),
            |tail| tail < target,
        )?
    };

    Ok((low, high))
}

/// Bisect `[lo, hi]` starting from its midpoint. `root_below(tail(v))` says
/// whether the solution lies below the current point `v`.
fn bisect<F, G>(mut lo: f64, mut hi: f64, tail: F, root_below: G) -> Result<f64>
where
    F: Fn(f64) -> f64,
    G: Fn(f64) -> bool,
{
    let mut v = 0.5 * (lo + hi);

    for _ in 0..MAX_BISECTIONS {
        if hi - lo <= BISECTION_TOLERANCE {
            return Ok(v);
        }
        let t = tail(v);
        if !t.is_finite() {
            return Err(StatError::NonConvergence(format!(
                "binomial tail is not finite at p = {}",
                v
            )));
        }
        if root_below(t) {
            hi = v;
        } else {
            lo = v;
        }
        v = 0.5 * (lo + hi);
    }

    Err(StatError::NonConvergence(format!(
        "bisection did not narrow below {} in {} steps",
        BISECTION_TOLERANCE, MAX_BISECTIONS
    )))
}

/// Observed proportion together with its exact interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Proportion {
    pub successes: u64,
    pub trials: u64,
    pub ratio: f64,
    pub ci: (f64, f64),
}

pub fn proportion_ci(successes: u64, trials: u64, alpha: f64) -> Result<Proportion> {
    let ci = binomial_ci(successes, trials, alpha)?;
    Ok(Proportion {
        successes,
        trials,
        ratio: successes as f64 / trials as f64,
        ci,
    })
}
