use std::f64::consts::{PI, SQRT_2};

use crate::error::{Result, StatError};

// ============================================================================
// Complementary Error Function - fractional error below 1.2e-7
// ============================================================================

pub fn erfc(x: f64) -> f64 {
    let z = x.abs();
    let t = 1.0 / (1.0 + 0.5 * z);
    let poly = -z * z - 1.26551223
        + t * (1.00002368
            + t * (0.37409196
                + t * (0.09678418
                    + t * (-0.18628806
                        + t * (0.27886807
                            + t * (-1.13520398
                                + t * (1.48851587 + t * (-0.82215223 + t * 0.17087277))))))));
    let ans = t * poly.exp();

    if x >= 0.0 { ans } else { 2.0 - ans }
}

// ============================================================================
// Standard normal PDF / CDF
// ============================================================================

pub fn normal_pdf(z: f64) -> f64 {
    (-0.5 * z * z).exp() / (2.0 * PI).sqrt()
}

/// Standard normal CDF. Accurate in relative terms far into both tails,
/// which matters for very small two-sided p-values.
pub fn normal_cdf(z: f64) -> f64 {
    (0.5 * erfc(-z / SQRT_2)).clamp(0.0, 1.0)
}

// ============================================================================
// Inverse Normal CDF - relative error about 1.15e-9
// ============================================================================

pub fn inverse_normal_cdf(p: f64) -> f64 {
    if p <= 0.0 {
        return f64::NEG_INFINITY;
    }
    if p >= 1.0 {
        return f64::INFINITY;
    }

    const A: [f64; 6] = [
        -3.969683028665376e+01,
        2.209460984245205e+02,
        -2.759285104469687e+02,
        1.383577518672690e+02,
        -3.066479806614716e+01,
        2.506628277459239e+00,
    ];
    const B: [f64; 5] = [
        -5.447609879822406e+01,
        1.615858368580409e+02,
        -1.556989798598866e+02,
        6.680131188771972e+01,
        -1.328068155288572e+01,
    ];
    const C: [f64; 6] = [
        -7.784894002430293e-03,
        -3.223964580411365e-01,
        -2.400758277161838e+00,
        -2.549732539343734e+00,
        4.374664141464968e+00,
        2.938163982698783e+00,
    ];
    const D: [f64; 4] = [
        7.784695709041462e-03,
        3.224671290700398e-01,
        2.445134137142996e+00,
        3.754408661907416e+00,
    ];

    let p_low = 0.02425;
    let p_high = 1.0 - p_low;

    if p < p_low {
        let q = (-2.0 * p.ln()).sqrt();
        (((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    } else if p <= p_high {
        let q = p - 0.5;
        let r = q * q;
        (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q
            / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0)
    } else {
        let q = (-2.0 * (1.0 - p).ln()).sqrt();
        -(((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    }
}

/// Two-sided p-value of a standardized statistic, `2 * Phi(-|z|)`.
pub fn two_sided_p(z: f64) -> f64 {
    (2.0 * normal_cdf(-z.abs())).min(1.0)
}

// ============================================================================
// Location/scale normal distribution
// ============================================================================

/// Normal distribution with mean `loc` and standard deviation `scale`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normal {
    loc: f64,
    scale: f64,
}

impl Normal {
    /// `scale` must be strictly positive and finite.
    pub fn new(loc: f64, scale: f64) -> Result<Self> {
        if !loc.is_finite() {
            return Err(StatError::InvalidParameter(format!(
                "normal location must be finite, got {}",
                loc
            )));
        }
        if !(scale.is_finite() && scale > 0.0) {
            return Err(StatError::DegenerateInput(format!(
                "normal scale must be positive, got {}",
                scale
            )));
        }
        Ok(Self { loc, scale })
    }

    pub fn loc(&self) -> f64 {
        self.loc
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn cdf(&self, x: f64) -> f64 {
        normal_cdf((x - self.loc) / self.scale)
    }

    pub fn ppf(&self, p: f64) -> f64 {
        self.loc + self.scale * inverse_normal_cdf(p)
    }

    /// Central interval holding `1 - alpha` of the mass.
    pub fn interval(&self, alpha: f64) -> (f64, f64) {
        (self.ppf(0.5 * alpha), self.ppf(1.0 - 0.5 * alpha))
    }
}
