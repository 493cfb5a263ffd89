//! DeLong, DeLong & Clarke-Pearson (1988) covariance of correlated AUCs.
//!
//! For P predictors scored on the same samples, each positive i gets a
//! placement `V10[i]` (its tie-adjusted share of negatives it beats) and each
//! negative j a placement `V01[j]` (the share of positives that beat it).
//! The AUC is the mean placement, and
//!
//! ```text
//! S = cov(V10) / N1 + cov(V01) / N0
//! ```
//!
//! with sample (N-1) covariances taken across predictors.
//!
//! [`delong_covariance`] finds placements by binary search in sorted groups,
//! O(P (N1 + N0) log N). [`delong_covariance_pairwise`] compares every
//! positive with every negative, O(P N1 N0); both return identical values.

use matlib::{qsortd, Matrix};
use serde::Serialize;
use stats::{covariance_matrix, Normal, Result, StatError};

use crate::predictors::{Estimate, Partition, Predictors};

/// Placement values of every predictor, one vector per predictor.
#[derive(Debug, Clone, PartialEq)]
pub struct Placements {
    /// `v10[p][i]`: placement of positive i among negatives
    pub v10: Vec<Vec<f64>>,
    /// `v01[p][j]`: placement of negative j among positives
    pub v01: Vec<Vec<f64>>,
    /// AUC of each predictor
    pub theta: Vec<f64>,
}

/// Joint AUC estimate and its DeLong covariance matrix.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeLong {
    pub theta: Vec<f64>,
    pub covariance: Matrix,
    pub n_positive: usize,
    pub n_negative: usize,
}

impl DeLong {
    pub fn n_predictors(&self) -> usize {
        self.theta.len()
    }

    /// Standard error of predictor `p`'s AUC.
    pub fn std_error(&self, p: usize) -> f64 {
        self.covariance.get(p, p).max(0.0).sqrt()
    }
}

fn partitions(columns: &[&[f64]], labels: &[bool]) -> Result<Vec<Partition>> {
    if columns.is_empty() {
        return Err(StatError::Shape("no predictors supplied".to_string()));
    }
    let parts = columns
        .iter()
        .map(|scores| Partition::new(scores, labels))
        .collect::<Result<Vec<_>>>()?;

    let n1 = parts[0].n_positive();
    let n0 = parts[0].n_negative();
    if n1 < 2 || n0 < 2 {
        return Err(StatError::DegenerateInput(format!(
            "DeLong covariance needs at least 2 positives and 2 negatives, got {} and {}",
            n1, n0
        )));
    }
    Ok(parts)
}

/// Placements by binary search over the sorted opposite group.
pub fn placements(columns: &[&[f64]], labels: &[bool]) -> Result<Placements> {
    let parts = partitions(columns, labels)?;
    let mut out = Placements {
        v10: Vec::with_capacity(parts.len()),
        v01: Vec::with_capacity(parts.len()),
        theta: Vec::with_capacity(parts.len()),
    };

    for part in &parts {
        let n1 = part.n_positive() as f64;
        let n0 = part.n_negative() as f64;

        let mut neg_sorted = part.negatives.clone();
        qsortd(&mut neg_sorted);
        let mut pos_sorted = part.positives.clone();
        qsortd(&mut pos_sorted);

        let mut wins = 0.0;
        let v10: Vec<f64> = part
            .positives
            .iter()
            .map(|&x| {
                let below = neg_sorted.partition_point(|&y| y < x);
                let tied = neg_sorted.partition_point(|&y| y <= x) - below;
                let count = below as f64 + 0.5 * tied as f64;
                wins += count;
                count / n0
            })
            .collect();

        let v01: Vec<f64> = part
            .negatives
            .iter()
            .map(|&y| {
                let not_above = pos_sorted.partition_point(|&x| x <= y);
                let tied = not_above - pos_sorted.partition_point(|&x| x < y);
                let above = pos_sorted.len() - not_above;
                (above as f64 + 0.5 * tied as f64) / n1
            })
            .collect();

        out.v10.push(v10);
        out.v01.push(v01);
        out.theta.push(wins / (n1 * n0));
    }

    Ok(out)
}

/// Placements by direct comparison of every positive/negative pair.
pub fn placements_pairwise(columns: &[&[f64]], labels: &[bool]) -> Result<Placements> {
    let parts = partitions(columns, labels)?;
    let mut out = Placements {
        v10: Vec::with_capacity(parts.len()),
        v01: Vec::with_capacity(parts.len()),
        theta: Vec::with_capacity(parts.len()),
    };

    for part in &parts {
        let n1 = part.n_positive() as f64;
        let n0 = part.n_negative() as f64;

        let mut wins = 0.0;
        let v10: Vec<f64> = part
            .positives
            .iter()
            .map(|&x| {
                let phi1 = part.negatives.iter().filter(|&&y| x > y).count();
                let phi2 = part.negatives.iter().filter(|&&y| x == y).count();
                let count = phi1 as f64 + 0.5 * phi2 as f64;
                wins += count;
                count / n0
            })
            .collect();

        let v01: Vec<f64> = part
            .negatives
            .iter()
            .map(|&y| {
                let phi1 = part.positives.iter().filter(|&&x| x > y).count();
                let phi2 = part.positives.iter().filter(|&&x| x == y).count();
                (phi1 as f64 + 0.5 * phi2 as f64) / n1
            })
            .collect();

        out.v10.push(v10);
        out.v01.push(v01);
        out.theta.push(wins / (n1 * n0));
    }

    Ok(out)
}

impl Placements {
    /// Combine placement covariances into the covariance of `theta`.
    pub fn into_delong(self) -> Result<DeLong> {
        let p = self.theta.len();
        let n1 = self.v10.first().map(Vec::len).unwrap_or(0);
        let n0 = self.v01.first().map(Vec::len).unwrap_or(0);

        let s10 = Matrix::from_row_major(p, p, covariance_matrix(&self.v10)?)?;
        let s01 = Matrix::from_row_major(p, p, covariance_matrix(&self.v01)?)?;
        let covariance = s10.scaled_sum(1.0 / n1 as f64, &s01, 1.0 / n0 as f64)?;

        Ok(DeLong {
            theta: self.theta,
            covariance,
            n_positive: n1,
            n_negative: n0,
        })
    }
}

/// AUCs of `columns` and their DeLong covariance matrix.
///
/// Needs at least two positives and two negatives.
pub fn delong_covariance(columns: &[&[f64]], labels: &[bool]) -> Result<DeLong> {
    placements(columns, labels)?.into_delong()
}

/// Same result as [`delong_covariance`] by exhaustive pair comparison.
pub fn delong_covariance_pairwise(columns: &[&[f64]], labels: &[bool]) -> Result<DeLong> {
    placements_pairwise(columns, labels)?.into_delong()
}

// ============================================================================
// AUC with DeLong confidence interval
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AucInterval {
    pub auc: f64,
    pub std_error: f64,
    pub ci: (f64, f64),
}

/// AUC of each predictor with a normal-theory `1 - alpha` interval from its
/// DeLong variance.
pub fn auc_with_ci(pred: &Predictors, labels: &[bool], alpha: f64) -> Result<Estimate<AucInterval>> {
    stats::check_alpha(alpha)?;
    let delong = delong_covariance(&pred.columns(), labels)?;

    let intervals = (0..delong.n_predictors())
        .map(|p| {
            let se = delong.std_error(p);
            let ci = Normal::new(delong.theta[p], se)?.interval(alpha);
            Ok(AucInterval {
                auc: delong.theta[p],
                std_error: se,
                ci,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(pred.shape_like(intervals))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rank::auc;
    use matlib::Mwc256;

    fn synthetic(n: usize, seed: u32) -> (Vec<bool>, Vec<f64>, Vec<f64>) {
        let mut rng = Mwc256::with_seed(seed);
        let mut labels = Vec::with_capacity(n);
        let mut a = Vec::with_capacity(n);
        let mut b = Vec::with_capacity(n);
        for _ in 0..n {
            let y = rng.unifrand() < 0.3;
            let shift = if y { 1.0 } else { 0.0 };
            let latent = rng.unifrand();
            labels.push(y);
            // rounded so that ties occur
            a.push(((latent + shift) * 10.0).round());
            b.push(((0.5 * latent + rng.unifrand() + 0.6 * shift) * 10.0).round());
        }
        (labels, a, b)
    }

    #[test]
    fn test_theta_matches_rank_auc() {
        let (labels, a, b) = synthetic(200, 11);
        let d = delong_covariance(&[&a[..], &b[..]], &labels).unwrap();
        assert!((d.theta[0] - auc(&a, &labels).unwrap()).abs() < 1e-12);
        assert!((d.theta[1] - auc(&b, &labels).unwrap()).abs() < 1e-12);
    }

    #[test]
    fn test_fast_matches_pairwise() {
        let (labels, a, b) = synthetic(150, 5);
        let fast = delong_covariance(&[&a[..], &b[..]], &labels).unwrap();
        let slow = delong_covariance_pairwise(&[&a[..], &b[..]], &labels).unwrap();
        assert_eq!(fast.theta, slow.theta);
        assert_eq!(fast.covariance, slow.covariance);
    }

    #[test]
    fn test_placement_means_equal_theta() {
        let (labels, a, _) = synthetic(120, 3);
        let pl = placements(&[&a[..]], &labels).unwrap();
        let m10 = pl.v10[0].iter().sum::<f64>() / pl.v10[0].len() as f64;
        let m01 = pl.v01[0].iter().sum::<f64>() / pl.v01[0].len() as f64;
        assert!((m10 - pl.theta[0]).abs() < 1e-12);
        assert!((m01 - pl.theta[0]).abs() < 1e-12);
    }

    #[test]
    fn test_covariance_small_hand_example() {
        // X = {0.35, 0.8}, Y = {0.1, 0.4}
        // V10 = [0.5, 1.0], V01 = [1.0, 0.5]
        // var(V10) = var(V01) = 0.125, S = 0.125/2 + 0.125/2
        let scores = [0.1, 0.4, 0.35, 0.8];
        let labels = [false, false, true, true];
        let d = delong_covariance(&[&scores[..]], &labels).unwrap();
        assert!((d.theta[0] - 0.75).abs() < 1e-12);
        assert!((d.covariance.get(0, 0) - 0.125).abs() < 1e-12);
    }

    #[test]
    fn test_covariance_symmetric_psd() {
        let (labels, a, b) = synthetic(300, 17);
        let d = delong_covariance(&[&a[..], &b[..]], &labels).unwrap();
        let s = &d.covariance;
        assert_eq!(s.get(0, 1), s.get(1, 0));
        assert!(s.get(0, 0) > 0.0 && s.get(1, 1) > 0.0);
        assert!(s.get(0, 0) * s.get(1, 1) - s.get(0, 1).powi(2) >= -1e-15);
    }

    #[test]
    fn test_requires_two_per_group() {
        let scores = [0.1, 0.4, 0.8];
        let labels = [false, false, true];
        assert!(matches!(
            delong_covariance(&[&scores[..]], &labels),
            Err(StatError::DegenerateInput(_))
        ));
    }

    #[test]
    fn test_auc_with_ci_single() {
        let (labels, a, _) = synthetic(250, 23);
        let est = auc_with_ci(&Predictors::Single(&a), &labels, 0.05).unwrap();
        let iv = est.single().copied().unwrap();
        assert!(iv.ci.0 < iv.auc && iv.auc < iv.ci.1);
        let half = 0.5 * (iv.ci.1 - iv.ci.0);
        assert!((half - 1.959963985 * iv.std_error).abs() < 1e-7);
    }
}
