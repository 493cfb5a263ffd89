use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use log::{debug, info, warn};
use roc::PredictorSet;

use crate::error::{DataError, Result};

/// One analysis cohort: a binary outcome and named numeric columns, all
/// aligned to the same subject order.
#[derive(Debug, Clone)]
pub struct Cohort {
    pub ids: Option<Vec<String>>,
    pub labels: Vec<bool>,
    pub columns: PredictorSet,
}

impl Cohort {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn n_positive(&self) -> usize {
        self.labels.iter().filter(|&&l| l).count()
    }

    pub fn column(&self, name: &str) -> Result<&[f64]> {
        self.columns
            .get(name)
            .ok_or_else(|| DataError::MissingColumn(name.to_string()))
    }
}

fn is_missing(field: &str) -> bool {
    let f = field.trim();
    f.is_empty() || f.eq_ignore_ascii_case("na") || f.eq_ignore_ascii_case("nan")
}

fn parse_outcome(field: &str, row: usize, column: &str) -> Result<bool> {
    match field.trim() {
        "1" | "1.0" | "true" | "TRUE" | "True" => Ok(true),
        "0" | "0.0" | "false" | "FALSE" | "False" => Ok(false),
        other => Err(DataError::Parse {
            row,
            column: column.to_string(),
            value: other.to_string(),
        }),
    }
}

fn parse_value(field: &str, row: usize, column: &str) -> Result<f64> {
    let v: f64 = field.trim().parse().map_err(|_| DataError::Parse {
        row,
        column: column.to_string(),
        value: field.to_string(),
    })?;
    if !v.is_finite() {
        return Err(DataError::Parse {
            row,
            column: column.to_string(),
            value: field.to_string(),
        });
    }
    Ok(v)
}

/// A column is numeric when it has at least one value and every non-missing
/// cell parses as a finite number.
fn is_numeric_column(records: &[StringRecord], idx: usize) -> bool {
    let mut seen = false;
    for record in records {
        let field = record.get(idx).unwrap_or("");
        if is_missing(field) {
            continue;
        }
        match field.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => seen = true,
            _ => return false,
        }
    }
    seen
}

/// Read a cohort from CSV text with a header row.
///
/// `columns` lists the numeric columns to keep, in order; when empty every
/// numeric column other than `outcome` and `id_column` is kept and text
/// columns are skipped. Rows with a missing value (empty, `NA`, `NaN`) in the
/// outcome or a kept column are dropped.
pub fn read_cohort_from<R: Read>(
    reader: R,
    outcome: &str,
    columns: &[String],
    id_column: Option<&str>,
) -> Result<Cohort> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let headers = rdr.headers()?.clone();
    let records = rdr.records().collect::<std::result::Result<Vec<_>, _>>()?;

    let position = |name: &str| -> Result<usize> {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| DataError::MissingColumn(name.to_string()))
    };

    let outcome_idx = position(outcome)?;
    let id_idx = id_column.map(position).transpose()?;

    let names: Vec<String> = if columns.is_empty() {
        let mut kept = Vec::new();
        for (i, h) in headers.iter().enumerate() {
            if i == outcome_idx || Some(i) == id_idx {
                continue;
            }
            if is_numeric_column(&records, i) {
                kept.push(h.to_string());
            } else {
                info!("column '{}' is not numeric, skipped", h);
            }
        }
        kept
    } else {
        columns.to_vec()
    };
    let indices = names.iter().map(|n| position(n.as_str())).collect::<Result<Vec<_>>>()?;

    let mut ids = id_idx.map(|_| Vec::new());
    let mut labels = Vec::new();
    let mut values: Vec<Vec<f64>> = vec![Vec::new(); names.len()];
    let mut dropped = 0usize;

    for (row, record) in records.iter().enumerate() {
        // header is line 1
        let line = row + 2;

        let outcome_field = record.get(outcome_idx).unwrap_or("");
        let incomplete = is_missing(outcome_field)
            || indices
                .iter()
                .any(|&i| is_missing(record.get(i).unwrap_or("")));
        if incomplete {
            dropped += 1;
            debug!("line {}: incomplete row dropped", line);
            continue;
        }

        labels.push(parse_outcome(outcome_field, line, outcome)?);
        for (slot, (&i, name)) in values.iter_mut().zip(indices.iter().zip(&names)) {
            slot.push(parse_value(record.get(i).unwrap_or(""), line, name)?);
        }
        if let (Some(ids), Some(i)) = (ids.as_mut(), id_idx) {
            ids.push(record.get(i).unwrap_or("").to_string());
        }
    }

    if dropped > 0 {
        warn!(
            "dropped {} of {} rows with missing values",
            dropped,
            dropped + labels.len()
        );
    }
    if labels.is_empty() {
        return Err(DataError::Empty);
    }

    let mut set = PredictorSet::new();
    for (name, v) in names.into_iter().zip(values) {
        set.insert(name, v)?;
    }

    Ok(Cohort {
        ids,
        labels,
        columns: set,
    })
}

/// Read a cohort CSV file; see [`read_cohort_from`].
pub fn read_cohort<P: AsRef<Path>>(
    path: P,
    outcome: &str,
    columns: &[String],
    id_column: Option<&str>,
) -> Result<Cohort> {
    let file = File::open(path.as_ref())?;
    read_cohort_from(file, outcome, columns, id_column)
}
