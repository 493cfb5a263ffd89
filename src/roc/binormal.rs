use matlib::{find_min_max, linspace};
use serde::Serialize;
use stats::{check_finite, mean_std, normal_cdf, Result, StatError};

use crate::rank::RocCurve;

/// Number of thresholds generated when the caller supplies none.
pub const BINORMAL_POINTS: usize = 101;

/// Normal fit of each outcome group (population standard deviations).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Binormal {
    pub mu_pos: f64,
    pub sd_pos: f64,
    pub mu_neg: f64,
    pub sd_neg: f64,
}

impl Binormal {
    pub fn fit(positives: &[f64], negatives: &[f64]) -> Result<Self> {
        check_finite("positive scores", positives)?;
        check_finite("negative scores", negatives)?;
        let (mu_pos, sd_pos) = mean_std(positives)?;
        let (mu_neg, sd_neg) = mean_std(negatives)?;
        if sd_pos == 0.0 || sd_neg == 0.0 {
            return Err(StatError::DegenerateInput(format!(
                "binormal model needs spread in both groups (sd {} and {})",
                sd_pos, sd_neg
            )));
        }
        Ok(Self {
            mu_pos,
            sd_pos,
            mu_neg,
            sd_neg,
        })
    }

    /// Separation `(mu_pos - mu_neg) / sd_pos`.
    pub fn a(&self) -> f64 {
        (self.mu_pos - self.mu_neg) / self.sd_pos
    }

    /// Spread ratio `sd_neg / sd_pos`.
    pub fn b(&self) -> f64 {
        self.sd_neg / self.sd_pos
    }

    pub fn auc(&self) -> f64 {
        let b = self.b();
        normal_cdf(self.a() / (1.0 + b * b).sqrt())
    }

    pub fn fpr(&self, c: f64) -> f64 {
        normal_cdf((self.mu_neg - c) / self.sd_neg)
    }

    pub fn tpr(&self, c: f64) -> f64 {
        normal_cdf((self.mu_pos - c) / self.sd_pos)
    }
}

/// Parametric AUC assuming normally distributed scores in each group.
pub fn binormal_auc(positives: &[f64], negatives: &[f64]) -> Result<f64> {
    Ok(Binormal::fit(positives, negatives)?.auc())
}

/// Smooth ROC curve of the binormal fit.
///
/// Without `thresholds`, uses [`BINORMAL_POINTS`] evenly spaced values from the
/// smallest to the largest observed score.
pub fn binormal_roc(positives: &[f64], negatives: &[f64], thresholds: Option<&[f64]>) -> Result<RocCurve> {
    let model = Binormal::fit(positives, negatives)?;

    let thresholds = match thresholds {
        Some(t) => {
            if t.is_empty() {
                return Err(StatError::Shape("empty threshold list".to_string()));
            }
            check_finite("thresholds", t)?;
            t.to_vec()
        }
        None => {
            let (lo_pos, hi_pos) = find_min_max(positives);
            let (lo_neg, hi_neg) = find_min_max(negatives);
            linspace(lo_pos.min(lo_neg), hi_pos.max(hi_neg), BINORMAL_POINTS)
        }
    };

    Ok(RocCurve {
        fpr: thresholds.iter().map(|&c| model.fpr(c)).collect(),
        tpr: thresholds.iter().map(|&c| model.tpr(c)).collect(),
        thresholds,
    })
}
