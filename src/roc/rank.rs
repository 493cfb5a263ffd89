use matlib::qsortds;
use serde::Serialize;
use stats::Result;

use crate::predictors::{class_counts, Estimate, Predictors};

// ============================================================================
// ROC Area (Mann-Whitney)
// ============================================================================

/// Sort once, then walk tied groups of scores. Each positive earns one point
/// per negative strictly below it and `tie_credit` per negative tied with it.
fn rank_auc(scores: &[f64], labels: &[bool], tie_credit: f64) -> Result<f64> {
    let (n1, n0) = class_counts(scores, labels)?;

    let mut x = scores.to_vec();
    let mut y = labels.to_vec();
    qsortds(&mut x, &mut y)?;

    let mut neg_below = 0usize;
    let mut wins = 0.0;
    let mut i = 0;
    while i < x.len() {
        let mut j = i;
        let mut pos_tied = 0usize;
        let mut neg_tied = 0usize;
        while j < x.len() && x[j] == x[i] {
            if y[j] {
                pos_tied += 1;
            } else {
                neg_tied += 1;
            }
            j += 1;
        }
        wins += pos_tied as f64 * (neg_below as f64 + tie_credit * neg_tied as f64);
        neg_below += neg_tied;
        i = j;
    }

    Ok(wins / (n1 as f64 * n0 as f64))
}

/// Area under the ROC curve, with half credit for tied positive/negative pairs.
///
/// Equals the probability that a random positive outscores a random negative.
/// O(N log N).
pub fn auc(scores: &[f64], labels: &[bool]) -> Result<f64> {
    rank_auc(scores, labels, 0.5)
}

/// AUC that counts tied positive/negative pairs as losses.
///
/// Differs from [`auc`] whenever a positive and a negative share a score.
pub fn auc_no_ties(scores: &[f64], labels: &[bool]) -> Result<f64> {
    rank_auc(scores, labels, 0.0)
}

/// Tie-aware AUC for one or several predictors sharing `labels`.
pub fn calc_auc(pred: &Predictors, labels: &[bool]) -> Result<Estimate<f64>> {
    let values = pred
        .columns()
        .iter()
        .map(|scores| auc(scores, labels))
        .collect::<Result<Vec<f64>>>()?;
    Ok(pred.shape_like(values))
}

// ============================================================================
// Empirical ROC curve
// ============================================================================

/// Operating points of a ROC curve; all three vectors have the same length.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RocCurve {
    pub fpr: Vec<f64>,
    pub tpr: Vec<f64>,
    pub thresholds: Vec<f64>,
}

impl RocCurve {
    pub fn len(&self) -> usize {
        self.thresholds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.thresholds.is_empty()
    }

    /// Trapezoidal area under the points, in the order they are stored.
    pub fn area(&self) -> f64 {
        self.fpr
            .windows(2)
            .zip(self.tpr.windows(2))
            .map(|(f, t)| (f[1] - f[0]) * 0.5 * (t[1] + t[0]))
            .sum::<f64>()
            .abs()
    }
}

/// Empirical (step) ROC curve, classifying `score >= threshold` as positive.
///
/// Thresholds are the distinct scores in descending order, preceded by
/// `+inf` so the curve starts at (0, 0) and ends at (1, 1).
pub fn roc_curve(scores: &[f64], labels: &[bool]) -> Result<RocCurve> {
    let (n1, n0) = class_counts(scores, labels)?;

    let mut x = scores.to_vec();
    let mut y = labels.to_vec();
    qsortds(&mut x, &mut y)?;

    let mut fpr = vec![0.0];
    let mut tpr = vec![0.0];
    let mut thresholds = vec![f64::INFINITY];

    let mut tp = 0usize;
    let mut fp = 0usize;
    let mut j = x.len();
    while j > 0 {
        let value = x[j - 1];
        while j > 0 && x[j - 1] == value {
            if y[j - 1] {
                tp += 1;
            } else {
                fp += 1;
            }
            j -= 1;
        }
        fpr.push(fp as f64 / n0 as f64);
        tpr.push(tp as f64 / n1 as f64);
        thresholds.push(value);
    }

    Ok(RocCurve {
        fpr,
        tpr,
        thresholds,
    })
}
