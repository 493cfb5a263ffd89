//! Model-based predictors.
//!
//! A [`PredictorModel`] turns a design matrix and the outcome into one score
//! per subject; the AUROC engine then treats those scores like any other
//! predictor.

use matlib::gauss_elimination;
use serde::Serialize;
use stats::{check_finite, Result, StatError};

/// Covariate columns (no intercept) aligned to one subject order.
#[derive(Debug, Clone, Default)]
pub struct Design {
    names: Vec<String>,
    columns: Vec<Vec<f64>>,
}

impl Design {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, column: &[f64]) -> Result<()> {
        let name = name.into();
        if let Some(n) = self.n_rows() {
            if column.len() != n {
                return Err(StatError::Shape(format!(
                    "covariate '{}' has {} rows, expected {}",
                    name,
                    column.len(),
                    n
                )));
            }
        }
        check_finite(&name, column)?;
        self.names.push(name);
        self.columns.push(column.to_vec());
        Ok(())
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn n_rows(&self) -> Option<usize> {
        self.columns.first().map(Vec::len)
    }

    pub fn n_covariates(&self) -> usize {
        self.columns.len()
    }

    /// Row `i` with a leading 1 for the intercept.
    fn row(&self, i: usize) -> Vec<f64> {
        std::iter::once(1.0)
            .chain(self.columns.iter().map(|c| c[i]))
            .collect()
    }
}

/// Produces a score per subject from covariates and the observed outcome.
pub trait PredictorModel {
    fn fit_predict(&self, design: &Design, labels: &[bool]) -> Result<Vec<f64>>;
}

// ============================================================================
// Logistic regression by iteratively reweighted least squares
// ============================================================================

#[derive(Debug, Clone, Copy)]
pub struct LogisticModel {
    pub max_iterations: usize,
    /// Largest coefficient change accepted as converged
    pub tolerance: f64,
}

impl Default for LogisticModel {
    fn default() -> Self {
        Self {
            max_iterations: 50,
            tolerance: 1e-8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogisticFit {
    /// Intercept first, then one coefficient per covariate
    pub coefficients: Vec<f64>,
    pub iterations: usize,
}

fn sigmoid(eta: f64) -> f64 {
    if eta >= 0.0 {
        1.0 / (1.0 + (-eta).exp())
    } else {
        let e = eta.exp();
        e / (1.0 + e)
    }
}

impl LogisticModel {
    pub fn fit(&self, design: &Design, labels: &[bool]) -> Result<LogisticFit> {
        let n = labels.len();
        if let Some(rows) = design.n_rows() {
            if rows != n {
                return Err(StatError::Shape(format!(
                    "design has {} rows but there are {} labels",
                    rows, n
                )));
            }
        }
        let k = design.n_covariates() + 1;
        if n <= k {
            return Err(StatError::DegenerateInput(format!(
                "{} subjects cannot identify {} coefficients",
                n, k
            )));
        }

        let rows: Vec<Vec<f64>> = (0..n).map(|i| design.row(i)).collect();
        let mut beta = vec![0.0; k];

        for iter in 1..=self.max_iterations {
            let mut hess = vec![0.0; k * k];
            let mut grad = vec![0.0; k];

            for (x, &y) in rows.iter().zip(labels) {
                let eta: f64 = x.iter().zip(&beta).map(|(xi, bi)| xi * bi).sum();
                let p = sigmoid(eta);
                let w = p * (1.0 - p);
                let resid = if y { 1.0 - p } else { -p };
                for a in 0..k {
                    grad[a] += x[a] * resid;
                    for b in a..k {
                        hess[a * k + b] += w * x[a] * x[b];
                    }
                }
            }
            for a in 0..k {
                for b in 0..a {
                    hess[a * k + b] = hess[b * k + a];
                }
            }

            let delta = gauss_elimination(&hess, &grad, k)?;
            let mut max_step = 0.0f64;
            for (b, d) in beta.iter_mut().zip(&delta) {
                *b += d;
                max_step = max_step.max(d.abs());
            }
            if !max_step.is_finite() {
                return Err(StatError::NonConvergence(
                    "logistic coefficients diverged".to_string(),
                ));
            }
            if max_step < self.tolerance {
                return Ok(LogisticFit {
                    coefficients: beta,
                    iterations: iter,
                });
            }
        }

        Err(StatError::NonConvergence(format!(
            "logistic regression did not converge in {} iterations",
            self.max_iterations
        )))
    }

    pub fn predict(&self, fit: &LogisticFit, design: &Design) -> Vec<f64> {
        let n = design.n_rows().unwrap_or(0);
        (0..n)
            .map(|i| {
                let eta: f64 = design
                    .row(i)
                    .iter()
                    .zip(&fit.coefficients)
                    .map(|(x, b)| x * b)
                    .sum();
                sigmoid(eta)
            })
            .collect()
    }
}

impl PredictorModel for LogisticModel {
    fn fit_predict(&self, design: &Design, labels: &[bool]) -> Result<Vec<f64>> {
        if design.n_covariates() == 0 {
            return Err(StatError::Shape("design has no covariates".to_string()));
        }
        let fit = self.fit(design, labels)?;
        Ok(self.predict(&fit, design))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use matlib::Mwc256;
    use roc::auc;

    fn simulated(n: usize) -> (Vec<f64>, Vec<f64>, Vec<bool>) {
        let mut rng = Mwc256::with_seed(2016);
        let mut age = Vec::with_capacity(n);
        let mut score = Vec::with_capacity(n);
        let mut labels = Vec::with_capacity(n);
        for _ in 0..n {
            let a = 40.0 + 40.0 * rng.unifrand();
            let s = (10.0 * rng.unifrand()).floor();
            let p = sigmoid(-4.0 + 0.03 * a + 0.3 * s);
            age.push(a);
            score.push(s);
            labels.push(rng.unifrand() < p);
        }
        (age, score, labels)
    }

    #[test]
    fn test_fit_satisfies_score_equations() {
        let (age, score, labels) = simulated(400);
        let mut design = Design::new();
        design.push("age", &age).unwrap();
        design.push("sofa", &score).unwrap();

        let model = LogisticModel::default();
        let fit = model.fit(&design, &labels).unwrap();
        assert_eq!(fit.coefficients.len(), 3);
        assert!(fit.iterations < model.max_iterations);

        // X^T (y - p) = 0 at the maximum likelihood estimate
        let p = model.predict(&fit, &design);
        let observed = labels.iter().filter(|&&l| l).count() as f64;
        assert!((p.iter().sum::<f64>() - observed).abs() < 1e-6);
        let g_age: f64 = (0..p.len())
            .map(|i| age[i] * ((labels[i] as u8 as f64) - p[i]))
            .sum();
        assert!(g_age.abs() < 1e-4);
        assert!(fit.coefficients[2] > 0.0);
    }

    #[test]
    fn test_single_covariate_preserves_ranking() {
        let (_, score, labels) = simulated(300);
        let mut design = Design::new();
        design.push("sofa", &score).unwrap();
        let pred = LogisticModel::default().fit_predict(&design, &labels).unwrap();
        assert!((auc(&pred, &labels).unwrap() - auc(&score, &labels).unwrap()).abs() < 1e-12);
    }

    #[test]
    fn test_separated_data_fails() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let labels = [false, false, false, true, true, true];
        let mut design = Design::new();
        design.push("x", &x).unwrap();
        assert!(LogisticModel::default().fit(&design, &labels).is_err());
    }

    #[test]
    fn test_design_shape_checks() {
        let mut design = Design::new();
        design.push("a", &[1.0, 2.0, 3.0]).unwrap();
        assert!(matches!(design.push("b", &[1.0]), Err(StatError::Shape(_))));
        assert!(matches!(
            LogisticModel::default().fit(&design, &[true, false]),
            Err(StatError::Shape(_))
        ));
        assert!(matches!(
            LogisticModel::default().fit_predict(&Design::new(), &[true, false, true]),
            Err(StatError::Shape(_))
        ));
    }
}
