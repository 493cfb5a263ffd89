//! Internal-consistency coefficients for multi-item scores.
//!
//! `items` is laid out one row per subject and one column per item, so a
//! bootstrap resample of subjects is a resample of rows.

use crate::descriptive::variance;
use crate::error::{check_finite, Result, StatError};

fn check_items(items: &[Vec<f64>]) -> Result<usize> {
    let n = items.len();
    if n < 2 {
        return Err(StatError::DegenerateInput(format!(
            "reliability needs at least 2 subjects, got {}",
            n
        )));
    }
    let k = items[0].len();
    if let Some(row) = items.iter().position(|r| r.len() != k) {
        return Err(StatError::Shape(format!(
            "subject {} has {} items, expected {}",
            row,
            items[row].len(),
            k
        )));
    }
    if k < 2 {
        return Err(StatError::DegenerateInput(format!(
            "reliability needs at least 2 items, got {}",
            k
        )));
    }
    for row in items {
        check_finite("item scores", row)?;
    }
    Ok(k)
}

fn item_columns(items: &[Vec<f64>], k: usize) -> Vec<Vec<f64>> {
    (0..k).map(|j| items.iter().map(|r| r[j]).collect()).collect()
}

fn totals(items: &[Vec<f64>]) -> Vec<f64> {
    items.iter().map(|r| r.iter().sum()).collect()
}

/// Cronbach's alpha, `k/(k-1) * (1 - sum(var(item)) / var(total))`, with sample variances.
pub fn cronbach_alpha(items: &[Vec<f64>]) -> Result<f64> {
    let k = check_items(items)?;

    let item_var: f64 = item_columns(items, k).iter().map(|c| variance(c, 1)).sum();
    let total_var = variance(&totals(items), 1);
    if total_var == 0.0 {
        return Err(StatError::DegenerateInput(
            "total score has zero variance".to_string(),
        ));
    }

    let kf = k as f64;
    Ok(kf / (kf - 1.0) * (1.0 - item_var / total_var))
}

/// Kuder-Richardson formula 20 for dichotomous (0/1) items.
///
/// Uses `p*q` item variances and the population variance of the total, which
/// makes it coincide with Cronbach's alpha on binary data.
pub fn kr20(items: &[Vec<f64>]) -> Result<f64> {
    let k = check_items(items)?;
    if items.iter().flatten().any(|&v| v != 0.0 && v != 1.0) {
        return Err(StatError::InvalidParameter(
            "KR-20 items must be coded 0/1".to_string(),
        ));
    }

    let n = items.len() as f64;
    let pq: f64 = item_columns(items, k)
        .iter()
        .map(|c| {
            let p = c.iter().sum::<f64>() / n;
            p * (1.0 - p)
        })
        .sum();
    let total_var = variance(&totals(items), 0);
    if total_var == 0.0 {
        return Err(StatError::DegenerateInput(
            "total score has zero variance".to_string(),
        ));
    }

    let kf = k as f64;
    Ok(kf / (kf - 1.0) * (1.0 - pq / total_var))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binary_items() -> Vec<Vec<f64>> {
        vec![
            vec![1.0, 1.0, 1.0, 0.0],
            vec![1.0, 1.0, 0.0, 0.0],
            vec![0.0, 1.0, 0.0, 0.0],
            vec![1.0, 1.0, 1.0, 1.0],
            vec![0.0, 0.0, 0.0, 0.0],
            vec![1.0, 0.0, 1.0, 1.0],
        ]
    }

    #[test]
    fn test_cronbach_perfectly_consistent() {
        // every item equals the same latent score
        let items: Vec<Vec<f64>> = [1.0, 3.0, 2.0, 5.0, 4.0]
            .iter()
            .map(|&s| vec![s, s, s])
            .collect();
        assert!((cronbach_alpha(&items).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_cronbach_known_value() {
        let items = vec![
            vec![3.0, 4.0, 3.0],
            vec![2.0, 2.0, 3.0],
            vec![4.0, 5.0, 4.0],
            vec![1.0, 2.0, 1.0],
            vec![3.0, 3.0, 4.0],
        ];
        // item variances 1.3, 1.7, 1.5; total variance 11.7
        let expected = 1.5 * (1.0 - 4.5 / 11.7);
        assert!((cronbach_alpha(&items).unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_kr20_equals_alpha_on_binary_items() {
        let items = binary_items();
        let a = cronbach_alpha(&items).unwrap();
        let r = kr20(&items).unwrap();
        assert!((a - r).abs() < 1e-12, "alpha {} vs kr20 {}", a, r);
    }

    #[test]
    fn test_kr20_rejects_non_binary() {
        let mut items = binary_items();
        items[0][0] = 2.0;
        assert!(matches!(kr20(&items), Err(StatError::InvalidParameter(_))));
    }

    #[test]
    fn test_reliability_shape_and_degenerate() {
        let ragged = vec![vec![1.0, 2.0], vec![1.0]];
        assert!(matches!(cronbach_alpha(&ragged), Err(StatError::Shape(_))));
        let single_item = vec![vec![1.0], vec![2.0]];
        assert!(matches!(cronbach_alpha(&single_item), Err(StatError::DegenerateInput(_))));
        let constant = vec![vec![1.0, 1.0], vec![1.0, 1.0]];
        assert!(matches!(cronbach_alpha(&constant), Err(StatError::DegenerateInput(_))));
    }
}
