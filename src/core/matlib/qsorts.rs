//! Sorting, quantile and grid helpers over `f64` data.
//!
//! Sorting uses the IEEE total order, so callers that need NaN-free data must
//! reject it before sorting.

use stats::{Result, StatError};

/*
--------------------------------------------------------------------------------
   Sort ascending
--------------------------------------------------------------------------------
*/
pub fn qsortd(data: &mut [f64]) {
    data.sort_unstable_by(|a, b| a.total_cmp(b));
}

/*
--------------------------------------------------------------------------------
   Sort ascending, carrying a slave array along
--------------------------------------------------------------------------------
*/
pub fn qsortds<T: Copy>(data: &mut [f64], slave: &mut [T]) -> Result<()> {
    if data.len() != slave.len() {
        return Err(StatError::Shape(format!(
            "qsortds: {} keys but {} slave values",
            data.len(),
            slave.len()
        )));
    }

    let order = argsort(data);
    let sorted: Vec<f64> = order.iter().map(|&i| data[i]).collect();
    let sorted_slave: Vec<T> = order.iter().map(|&i| slave[i]).collect();
    data.copy_from_slice(&sorted);
    slave.copy_from_slice(&sorted_slave);
    Ok(())
}

/// Indices that sort `data` ascending. Ties keep their original order.
pub fn argsort(data: &[f64]) -> Vec<usize> {
    let mut idx: Vec<usize> = (0..data.len()).collect();
    idx.sort_by(|&i, &j| data[i].total_cmp(&data[j]));
    idx
}

/// Percentile of already sorted data, `pct` in [0, 100], interpolating
/// linearly between the two nearest order statistics.
pub fn percentile(sorted_data: &[f64], pct: f64) -> f64 {
    let n = sorted_data.len();
    if n == 0 {
        return f64::NAN;
    }
    if n == 1 {
        return sorted_data[0];
    }

    let pos = (pct / 100.0).clamp(0.0, 1.0) * (n - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = (lo + 1).min(n - 1);
    let frac = pos - lo as f64;

    sorted_data[lo] + frac * (sorted_data[hi] - sorted_data[lo])
}

pub fn find_min_max(data: &[f64]) -> (f64, f64) {
    data.iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        })
}

/// `n` evenly spaced points from `start` to `end`, both included.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { end } else { start + step * i as f64 })
                .collect()
        }
    }
}
