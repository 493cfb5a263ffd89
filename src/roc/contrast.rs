use matlib::Matrix;
use serde::Serialize;
use stats::{check_alpha, two_sided_p, Normal, Result, StatError};

use crate::delong::delong_covariance;

/// Outcome of a linear contrast `L * theta` between correlated AUCs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ContrastTest {
    /// `L * theta`
    pub mu: f64,
    /// `sqrt(L * S * L^T)`
    pub sigma: f64,
    pub z: f64,
    pub p_value: f64,
    /// `1 - alpha` interval centred on `theta[0]` with scale `sigma`
    pub ci: (f64, f64),
    pub alpha: f64,
}

/// `[1, -1, 0, ...]`: first predictor against the second.
pub fn default_contrast(p: usize) -> Vec<f64> {
    let mut l = vec![0.0; p];
    if let Some(first) = l.first_mut() {
        *first = 1.0;
    }
    if p > 1 {
        l[1] = -1.0;
    }
    l
}

/// Two-sided z-test of `L * theta = 0` under covariance `s`.
///
/// The p-value uses `mu = L * theta`; the interval is that of the first
/// predictor's own AUC, `theta[0]`, at the contrast's standard deviation.
pub fn compare(theta: &[f64], s: &Matrix, contrast: Option<&[f64]>, alpha: f64) -> Result<ContrastTest> {
    check_alpha(alpha)?;
    let p = theta.len();
    if p == 0 {
        return Err(StatError::Shape("empty AUC vector".to_string()));
    }
    if s.rows() != p || s.cols() != p {
        return Err(StatError::Shape(format!(
            "covariance is {}x{} but there are {} AUCs",
            s.rows(),
            s.cols(),
            p
        )));
    }

    let default;
    let l = match contrast {
        Some(l) => l,
        None => {
            default = default_contrast(p);
            &default[..]
        }
    };
    if l.len() != p {
        return Err(StatError::Shape(format!(
            "contrast has length {}, expected {}",
            l.len(),
            p
        )));
    }

    let mu: f64 = l.iter().zip(theta).map(|(li, ti)| li * ti).sum();
    let var = s.quad_form(l)?;
    let sigma = var.max(0.0).sqrt();
    if !(sigma.is_finite() && sigma > 0.0) {
        return Err(StatError::DegenerateInput(format!(
            "contrast variance is {}; predictors are perfectly correlated",
            var
        )));
    }

    let z = mu / sigma;
    let ci = Normal::new(theta[0], sigma)?.interval(alpha);

    Ok(ContrastTest {
        mu,
        sigma,
        z,
        p_value: two_sided_p(z),
        ci,
        alpha,
    })
}

/// DeLong test of whether two predictors have the same AUC.
pub fn test_auroc(pred1: &[f64], pred2: &[f64], labels: &[bool], alpha: f64) -> Result<ContrastTest> {
    let delong = delong_covariance(&[pred1, pred2], labels)?;
    compare(&delong.theta, &delong.covariance, None, alpha)
}
