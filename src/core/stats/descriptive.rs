use crate::error::{check_finite, Result, StatError};

// ============================================================================
// Mean / variance
// ============================================================================

pub fn mean(x: &[f64]) -> f64 {
    x.iter().sum::<f64>() / x.len() as f64
}

/// Variance with `ddof` delta degrees of freedom (0 = population, 1 = sample).
pub fn variance(x: &[f64], ddof: usize) -> f64 {
    let m = mean(x);
    let ss: f64 = x.iter().map(|xi| (xi - m).powi(2)).sum();
    ss / (x.len() - ddof) as f64
}

pub fn std_dev(x: &[f64], ddof: usize) -> f64 {
    variance(x, ddof).sqrt()
}

/// Population mean and standard deviation; errors on empty input.
pub fn mean_std(x: &[f64]) -> Result<(f64, f64)> {
    if x.is_empty() {
        return Err(StatError::DegenerateInput(
            "cannot summarize an empty sample".to_string(),
        ));
    }
    Ok((mean(x), std_dev(x, 0)))
}

// ============================================================================
// Covariance matrix
// ============================================================================

/// Sample covariance (ddof = 1) between the columns of `columns`.
///
/// Every column must hold the same number of observations, at least two.
/// Returns a row-major `p x p` matrix.
pub fn covariance_matrix(columns: &[Vec<f64>]) -> Result<Vec<f64>> {
    let p = columns.len();
    let n = columns.first().map(|c| c.len()).unwrap_or(0);
    if columns.iter().any(|c| c.len() != n) {
        return Err(StatError::Shape(
            "covariance columns differ in length".to_string(),
        ));
    }
    if n < 2 {
        return Err(StatError::DegenerateInput(format!(
            "sample covariance needs at least 2 observations, got {}",
            n
        )));
    }

    let means: Vec<f64> = columns.iter().map(|c| mean(c)).collect();
    let mut cov = vec![0.0; p * p];

    for a in 0..p {
        for b in a..p {
            let s: f64 = columns[a]
                .iter()
                .zip(&columns[b])
                .map(|(xa, xb)| (xa - means[a]) * (xb - means[b]))
                .sum();
            let v = s / (n - 1) as f64;
            cov[a * p + b] = v;
            cov[b * p + a] = v;
        }
    }

    Ok(cov)
}

// ============================================================================
// Pearson correlation
// ============================================================================

pub fn pearson(x: &[f64], y: &[f64]) -> Result<f64> {
    if x.len() != y.len() {
        return Err(StatError::Shape(format!(
            "pearson inputs differ in length ({} vs {})",
            x.len(),
            y.len()
        )));
    }
    if x.len() < 2 {
        return Err(StatError::DegenerateInput(
            "pearson correlation needs at least 2 pairs".to_string(),
        ));
    }
    check_finite("x", x)?;
    check_finite("y", y)?;

    let mx = mean(x);
    let my = mean(y);
    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (xi, yi) in x.iter().zip(y) {
        let dx = xi - mx;
        let dy = yi - my;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    if sxx == 0.0 || syy == 0.0 {
        return Err(StatError::DegenerateInput(
            "pearson correlation of a constant vector".to_string(),
        ));
    }

    Ok((sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_variance() {
        let x = vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((mean(&x) - 5.0).abs() < 1e-12);
        assert!((variance(&x, 0) - 4.0).abs() < 1e-12);
        assert!((variance(&x, 1) - 32.0 / 7.0).abs() < 1e-12);
        assert!((std_dev(&x, 0) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_mean_std_empty() {
        assert!(mean_std(&[]).is_err());
    }

    #[test]
    fn test_covariance_matrix() {
        let cols = vec![vec![1.0, 2.0, 3.0, 4.0], vec![2.0, 4.0, 6.0, 8.0]];
        let cov = covariance_matrix(&cols).unwrap();
        let v = 5.0 / 3.0;
        assert!((cov[0] - v).abs() < 1e-12);
        assert!((cov[1] - 2.0 * v).abs() < 1e-12);
        assert_eq!(cov[1], cov[2]);
        assert!((cov[3] - 4.0 * v).abs() < 1e-12);
    }

    #[test]
    fn test_covariance_matrix_shape_errors() {
        let ragged = vec![vec![1.0, 2.0], vec![1.0]];
        assert!(matches!(covariance_matrix(&ragged), Err(StatError::Shape(_))));
        let short = vec![vec![1.0]];
        assert!(matches!(covariance_matrix(&short), Err(StatError::DegenerateInput(_))));
    }

    #[test]
    fn test_pearson() {
        let x = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let y = vec![2.0, 4.1, 5.9, 8.2, 9.9];
        assert!(pearson(&x, &y).unwrap() > 0.99);
        let z: Vec<f64> = x.iter().map(|v| -3.0 * v).collect();
        assert!((pearson(&x, &z).unwrap() + 1.0).abs() < 1e-12);
        assert!(pearson(&x, &[1.0; 5]).is_err());
        assert!(matches!(pearson(&x, &y[..4]), Err(StatError::Shape(_))));
    }
}
