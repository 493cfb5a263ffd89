//! Study tables: operating-point statistics and the AUROC comparison matrix.

use std::fmt::Write;

use log::{info, warn};
use rand::Rng;
use roc::{bootstrap_auc, test_auroc, BootstrapEstimate, PredictorSet};
use serde::Serialize;
use stats::{check_finite, proportion_ci, Proportion, Result, StatError};

use crate::model::{Design, PredictorModel};

// ============================================================================
// Operating-point statistics
// ============================================================================

/// Confusion matrix at one operating point with the derived rates in percent.
///
/// A rate whose denominator is zero is `None`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OperatingStats {
    pub tn: u64,
    pub fp: u64,
    #[serde(rename = "fn")]
    pub fn_: u64,
    pub tp: u64,
    pub sensitivity: Option<f64>,
    pub specificity: Option<f64>,
    pub ppv: Option<f64>,
    pub npv: Option<f64>,
    pub f1: Option<f64>,
    /// Diagnostic odds ratio `(TP/FP) / (FN/TN)`
    pub dor: Option<f64>,
}

fn percent(num: u64, den: u64) -> Option<f64> {
    (den > 0).then(|| 100.0 * num as f64 / den as f64)
}

impl OperatingStats {
    pub fn from_predictions(predicted: &[bool], labels: &[bool]) -> Result<Self> {
        if predicted.len() != labels.len() {
            return Err(StatError::Shape(format!(
                "{} predictions but {} labels",
                predicted.len(),
                labels.len()
            )));
        }

        let (mut tn, mut fp, mut fn_, mut tp) = (0u64, 0u64, 0u64, 0u64);
        for (&yhat, &y) in predicted.iter().zip(labels) {
            match (y, yhat) {
                (false, false) => tn += 1,
                (false, true) => fp += 1,
                (true, false) => fn_ += 1,
                (true, true) => tp += 1,
            }
        }

        let sensitivity = percent(tp, tp + fn_);
        let ppv = percent(tp, tp + fp);
        let f1 = match (sensitivity, ppv) {
            (Some(s), Some(p)) if s + p > 0.0 => Some(2.0 * s * p / (s + p)),
            _ => None,
        };
        let dor = (fp > 0 && fn_ > 0).then(|| (tp as f64 * tn as f64) / (fp as f64 * fn_ as f64));

        Ok(Self {
            tn,
            fp,
            fn_,
            tp,
            sensitivity,
            specificity: percent(tn, tn + fp),
            ppv,
            npv: percent(tn, tn + fn_),
            f1,
            dor,
        })
    }

    /// Operating point `score >= threshold`.
    pub fn from_scores(scores: &[f64], labels: &[bool], threshold: f64) -> Result<Self> {
        check_finite("scores", scores)?;
        let predicted: Vec<bool> = scores.iter().map(|&s| s >= threshold).collect();
        Self::from_predictions(&predicted, labels)
    }

    pub fn n(&self) -> u64 {
        self.tn + self.fp + self.fn_ + self.tp
    }

    /// Exact interval of the sensitivity, as a proportion of positives.
    pub fn sensitivity_ci(&self, alpha: f64) -> Result<Proportion> {
        proportion_ci(self.tp, self.tp + self.fn_, alpha)
    }

    /// Exact interval of the specificity, as a proportion of negatives.
    pub fn specificity_ci(&self, alpha: f64) -> Result<Proportion> {
        proportion_ci(self.tn, self.tn + self.fp, alpha)
    }
}

const STAT_NAMES: [&str; 10] = ["TN", "FP", "FN", "TP", "Sens", "Spec", "PPV", "NPV", "F1", "DOR"];

/// One row per statistic, one column per prediction.
pub fn render_operating_stats<S: AsRef<str>>(names: &[S], stats: &[OperatingStats]) -> String {
    let mut out = String::from("Metric");
    for name in names {
        let _ = write!(out, "\t{:>7}", name.as_ref());
    }
    out.push('\n');

    for (row, stat_name) in STAT_NAMES.iter().enumerate() {
        let _ = write!(out, "{:<6}", stat_name);
        for s in stats {
            let cell = match row {
                0 => Some(s.tn as f64),
                1 => Some(s.fp as f64),
                2 => Some(s.fn_ as f64),
                3 => Some(s.tp as f64),
                4 => s.sensitivity,
                5 => s.specificity,
                6 => s.ppv,
                7 => s.npv,
                8 => s.f1,
                _ => s.dor,
            };
            let _ = match cell {
                Some(v) if row < 4 => write!(out, "\t{:>7.0}", v),
                Some(v) => write!(out, "\t{:>7.2}", v),
                None => write!(out, "\t{:>7}", "-"),
            };
        }
        out.push('\n');
    }
    out
}

// ============================================================================
// AUROC comparison table
// ============================================================================

/// One cell of the comparison table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Cell {
    /// Diagonal: bootstrap AUROC of the row predictor
    Auc { estimate: f64, ci: (f64, f64) },
    /// Lower triangle: DeLong p-value of row vs column predictor
    PValue { p_value: f64 },
    /// Upper triangle
    Empty,
    /// The statistic is undefined for this cohort
    Failed { reason: String },
}

impl From<BootstrapEstimate> for Cell {
    fn from(b: BootstrapEstimate) -> Self {
        Cell::Auc {
            estimate: b.estimate,
            ci: b.ci,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AucTable {
    names: Vec<String>,
    cells: Vec<Vec<Cell>>,
}

impl AucTable {
    /// Bootstrap AUROC on the diagonal and pairwise DeLong p-values below it.
    ///
    /// A predictor or pair whose statistic is undefined gets a
    /// [`Cell::Failed`] entry and a warning; the rest of the table is kept.
    pub fn compute<R: Rng + ?Sized>(
        predictors: &PredictorSet,
        labels: &[bool],
        n_boot: usize,
        alpha: f64,
        rng: &mut R,
    ) -> Result<Self> {
        if predictors.is_empty() {
            return Err(StatError::Shape("no predictors to tabulate".to_string()));
        }
        if predictors.n_samples() != Some(labels.len()) {
            return Err(StatError::Shape(format!(
                "predictors have {:?} samples but there are {} labels",
                predictors.n_samples(),
                labels.len()
            )));
        }

        let names = predictors.names().to_vec();
        let columns = predictors.columns();
        let p = names.len();
        let mut cells = vec![vec![Cell::Empty; p]; p];

        for i in 0..p {
            for j in 0..i {
                cells[i][j] = match test_auroc(columns[i], columns[j], labels, alpha) {
                    Ok(t) => Cell::PValue { p_value: t.p_value },
                    Err(e) => {
                        warn!("{} vs {}: no valid comparison ({})", names[i], names[j], e);
                        Cell::Failed {
                            reason: e.to_string(),
                        }
                    }
                };
            }
            cells[i][i] = match bootstrap_auc(columns[i], labels, n_boot, rng) {
                Ok(b) => b.into(),
                Err(e) => {
                    warn!("{}: AUROC undefined for this cohort ({})", names[i], e);
                    Cell::Failed {
                        reason: e.to_string(),
                    }
                }
            };
            info!("{}: done", names[i]);
        }

        Ok(Self { names, cells })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn get(&self, row: usize, col: usize) -> &Cell {
        &self.cells[row][col]
    }

    /// Tab-separated table with p-values below 0.001 shown as `< 0.001`.
    pub fn render(&self) -> String {
        let mut out = format!("{:<8}", "");
        for name in &self.names {
            let _ = write!(out, "\t{:<22}", name);
        }
        out.push('\n');

        for (name, row) in self.names.iter().zip(&self.cells) {
            let _ = write!(out, "{:<8}", name);
            for cell in row {
                let text = match cell {
                    Cell::Auc { estimate, ci } => {
                        format!("{:.3} [{:.3}, {:.3}]", estimate, ci.0, ci.1)
                    }
                    Cell::PValue { p_value } if *p_value > 0.001 => format!("{:.3}", p_value),
                    Cell::PValue { .. } => "< 0.001".to_string(),
                    Cell::Empty => String::new(),
                    Cell::Failed { .. } => "n/a".to_string(),
                };
                let _ = write!(out, "\t{:<22}", text);
            }
            out.push('\n');
        }
        out
    }
}

// ============================================================================
// Baseline-adjusted predictions
// ============================================================================

/// Re-score each predictor as the prediction of `model` fitted on the
/// baseline covariates plus that predictor.
///
/// Predictors whose model cannot be fitted are skipped with a warning.
pub fn baseline_predictions<S: AsRef<str>>(
    columns: &PredictorSet,
    predictors: &[S],
    covariates: &[S],
    labels: &[bool],
    model: &dyn PredictorModel,
) -> Result<PredictorSet> {
    let mut base = Design::new();
    for c in covariates {
        let c = c.as_ref();
        let values = columns
            .get(c)
            .ok_or_else(|| StatError::InvalidParameter(format!("unknown covariate '{}'", c)))?;
        base.push(c, values)?;
    }

    let mut out = PredictorSet::new();
    for name in predictors {
        let name = name.as_ref();
        let scores = columns
            .get(name)
            .ok_or_else(|| StatError::InvalidParameter(format!("unknown predictor '{}'", name)))?;

        let mut design = base.clone();
        if !design.names().iter().any(|n| n == name) {
            design.push(name, scores)?;
        }
        match model.fit_predict(&design, labels) {
            Ok(pred) => out.insert(name, pred)?,
            Err(e) => warn!("{}: baseline model not fitted ({})", name, e),
        }
    }
    Ok(out)
}
