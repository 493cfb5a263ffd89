use serde::Serialize;
use stats::{check_finite, Result, StatError};

/// Score input, shaped explicitly by the caller.
///
/// A single score vector and a collection of score vectors are separate
/// variants so that N samples and P predictors can never be confused.
#[derive(Debug, Clone)]
pub enum Predictors<'a> {
    Single(&'a [f64]),
    Multiple(Vec<&'a [f64]>),
}

impl<'a> Predictors<'a> {
    pub fn columns(&self) -> Vec<&'a [f64]> {
        match self {
            Predictors::Single(s) => vec![*s],
            Predictors::Multiple(cols) => cols.clone(),
        }
    }

    /// Number of predictors.
    pub fn len(&self) -> usize {
        match self {
            Predictors::Single(_) => 1,
            Predictors::Multiple(cols) => cols.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Wrap per-predictor values back into the input's shape.
    pub fn shape_like<T>(&self, mut values: Vec<T>) -> Estimate<T> {
        match self {
            Predictors::Single(_) if values.len() == 1 => Estimate::Single(values.remove(0)),
            _ => Estimate::Multiple(values),
        }
    }
}

/// A per-predictor result: a scalar for `Predictors::Single`, otherwise one
/// value per predictor in input order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Estimate<T> {
    Single(T),
    Multiple(Vec<T>),
}

impl<T> Estimate<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Estimate::Single(v) => vec![v],
            Estimate::Multiple(v) => v,
        }
    }

    pub fn single(&self) -> Option<&T> {
        match self {
            Estimate::Single(v) => Some(v),
            Estimate::Multiple(_) => None,
        }
    }
}

/// Count positives and negatives after checking that `scores` lines up with
/// `labels`, is finite and that both classes are present.
pub fn class_counts(scores: &[f64], labels: &[bool]) -> Result<(usize, usize)> {
    if scores.len() != labels.len() {
        return Err(StatError::Shape(format!(
            "{} scores but {} labels",
            scores.len(),
            labels.len()
        )));
    }
    check_finite("scores", scores)?;

    let n1 = labels.iter().filter(|&&l| l).count();
    let n0 = labels.len() - n1;
    if n1 == 0 || n0 == 0 {
        return Err(StatError::DegenerateInput(format!(
            "AUC needs both outcome classes, got {} positive and {} negative",
            n1, n0
        )));
    }
    Ok((n1, n0))
}

// ============================================================================
// Partition
// ============================================================================

/// Scores of one predictor split by outcome: X (label 1) and Y (label 0).
#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    pub positives: Vec<f64>,
    pub negatives: Vec<f64>,
}

impl Partition {
    pub fn new(scores: &[f64], labels: &[bool]) -> Result<Self> {
        let (n1, n0) = class_counts(scores, labels)?;
        let mut positives = Vec::with_capacity(n1);
        let mut negatives = Vec::with_capacity(n0);
        for (&s, &l) in scores.iter().zip(labels) {
            if l {
                positives.push(s);
            } else {
                negatives.push(s);
            }
        }
        Ok(Self {
            positives,
            negatives,
        })
    }

    pub fn n_positive(&self) -> usize {
        self.positives.len()
    }

    pub fn n_negative(&self) -> usize {
        self.negatives.len()
    }
}

// ============================================================================
// PredictorSet
// ============================================================================

/// Named score vectors sharing one sample order, iterated in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PredictorSet {
    names: Vec<String>,
    scores: Vec<Vec<f64>>,
}

impl PredictorSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a predictor, or replace an existing one in place.
    /// Every vector must have the same length as those already present.
    pub fn insert(&mut self, name: impl Into<String>, scores: Vec<f64>) -> Result<()> {
        let name = name.into();
        if let Some(n) = self.n_samples() {
            if scores.len() != n {
                return Err(StatError::Shape(format!(
                    "predictor '{}' has {} samples, expected {}",
                    name,
                    scores.len(),
                    n
                )));
            }
        }

        match self.names.iter().position(|existing| *existing == name) {
            Some(i) => self.scores[i] = scores,
            None => {
                self.names.push(name);
                self.scores.push(scores);
            }
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&[f64]> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.scores[i].as_slice())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of predictors.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Shared sample count, `None` while the set is empty.
    pub fn n_samples(&self) -> Option<usize> {
        self.scores.first().map(|s| s.len())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.scores.iter().map(Vec::as_slice))
    }

    pub fn columns(&self) -> Vec<&[f64]> {
        self.scores.iter().map(Vec::as_slice).collect()
    }

    pub fn as_predictors(&self) -> Predictors<'_> {
        Predictors::Multiple(self.columns())
    }

    /// Subset in the order given by `names`.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<PredictorSet> {
        let mut out = PredictorSet::new();
        for name in names {
            let name = name.as_ref();
            let scores = self.get(name).ok_or_else(|| {
                StatError::InvalidParameter(format!("unknown predictor '{}'", name))
            })?;
            out.insert(name, scores.to_vec())?;
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predictor_set_keeps_insertion_order() {
        let mut set = PredictorSet::new();
        set.insert("sofa", vec![1.0, 2.0, 3.0]).unwrap();
        set.insert("qsofa", vec![0.0, 1.0, 1.0]).unwrap();
        set.insert("sirs", vec![2.0, 2.0, 4.0]).unwrap();
        let names: Vec<&str> = set.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["sofa", "qsofa", "sirs"]);

        // replacing keeps the slot
        set.insert("qsofa", vec![3.0, 2.0, 1.0]).unwrap();
        assert_eq!(set.names()[1], "qsofa");
        assert_eq!(set.get("qsofa").unwrap(), &[3.0, 2.0, 1.0]);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_predictor_set_rejects_length_mismatch() {
        let mut set = PredictorSet::new();
        set.insert("a", vec![1.0, 2.0]).unwrap();
        assert!(matches!(set.insert("b", vec![1.0]), Err(StatError::Shape(_))));
    }

    #[test]
    fn test_predictor_set_select() {
        let mut set = PredictorSet::new();
        set.insert("a", vec![1.0]).unwrap();
        set.insert("b", vec![2.0]).unwrap();
        let sub = set.select(&["b", "a"]).unwrap();
        assert_eq!(sub.names(), &["b".to_string(), "a".to_string()]);
        assert!(set.select(&["c"]).is_err());
    }

    #[test]
    fn test_partition() {
        let part = Partition::new(&[0.1, 0.4, 0.35, 0.8], &[false, false, true, true]).unwrap();
        assert_eq!(part.positives, vec![0.35, 0.8]);
        assert_eq!(part.negatives, vec![0.1, 0.4]);
    }

    #[test]
    fn test_class_counts_errors() {
        assert!(matches!(class_counts(&[1.0], &[true, false]), Err(StatError::Shape(_))));
        assert!(matches!(
            class_counts(&[1.0, 2.0], &[true, true]),
            Err(StatError::DegenerateInput(_))
        ));
        assert!(matches!(
            class_counts(&[1.0, f64::NAN], &[true, false]),
            Err(StatError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_estimate_shape() {
        let x = [1.0, 2.0];
        let single = Predictors::Single(&x);
        assert_eq!(single.shape_like(vec![0.5]), Estimate::Single(0.5));
        let multi = Predictors::Multiple(vec![&x[..], &x[..]]);
        assert_eq!(multi.shape_like(vec![0.5, 0.6]), Estimate::Multiple(vec![0.5, 0.6]));
    }
}
