use std::fs;

use matlib::Mwc256;
use roc::{
    auc, auc_no_ties, binormal_auc, binormal_roc, bootstrap_auc, calc_auc, compare, delong_covariance,
    delong_covariance_pairwise, roc_curve, test_auroc, Estimate, Partition, Predictors,
};
use sepsis_eval::{read_cohort, AucTable, Cell, Design, LogisticModel, OperatingStats, PredictorModel};
use stats::{binomial_ci, StatError};
use tempfile::NamedTempFile;

fn cohort_csv() -> String {
    let mut rng = Mwc256::with_seed(31);
    let mut text = String::from("subject_id,death,sofa,qsofa,lactate\n");
    for i in 0..240 {
        let died = rng.unifrand() < 0.25;
        let shift = if died { 1.0 } else { 0.0 };
        let sofa = (6.0 * (rng.unifrand() + 0.8 * shift)).floor();
        let qsofa = (3.0 * (rng.unifrand() + 0.3 * shift)).floor().min(3.0);
        let lactate = 0.5 + 3.0 * rng.unifrand() + 1.5 * shift;
        text.push_str(&format!(
            "{},{},{},{},{:.2}\n",
            i,
            died as u8,
            sofa,
            qsofa,
            lactate
        ));
    }
    text
}

#[test]
fn test_direct_count_scenario() {
    let labels = [false, false, true, true];
    let scores = [0.1, 0.4, 0.35, 0.8];
    // pairs (0.35, 0.1), (0.8, 0.1), (0.8, 0.4) favour the positive; (0.35, 0.4) does not
    assert!((auc(&scores, &labels).unwrap() - 0.75).abs() < 1e-9);
    assert_eq!(auc_no_ties(&scores, &labels).unwrap(), 0.75);
}

#[test]
fn test_clopper_pearson_table_value() {
    let (lo, hi) = binomial_ci(5, 10, 0.05).unwrap();
    assert!(lo < 0.5 && 0.5 < hi);
    assert!((lo - 0.187).abs() < 5e-4);
    assert!((hi - 0.813).abs() < 5e-4);
}

#[test]
fn test_cohort_file_to_comparison_table() {
    let file = NamedTempFile::new().unwrap();
    fs::write(file.path(), cohort_csv()).unwrap();

    let cohort = read_cohort(file.path(), "death", &[], Some("subject_id")).unwrap();
    assert_eq!(cohort.len(), 240);
    assert_eq!(cohort.columns.names(), &["sofa", "qsofa", "lactate"]);

    let labels = &cohort.labels;
    let set = &cohort.columns;

    // DeLong theta agrees with the rank AUC for every predictor
    let delong = delong_covariance(&set.columns(), labels).unwrap();
    let ranks = calc_auc(&set.as_predictors(), labels).unwrap().into_vec();
    for (t, a) in delong.theta.iter().zip(&ranks) {
        assert!((t - a).abs() < 1e-12);
    }
    let slow = delong_covariance_pairwise(&set.columns(), labels).unwrap();
    assert_eq!(delong.covariance, slow.covariance);

    // general contrast over three predictors
    let t = compare(&delong.theta, &delong.covariance, Some(&[1.0, 0.0, -1.0][..]), 0.05).unwrap();
    assert!((t.mu - (delong.theta[0] - delong.theta[2])).abs() < 1e-12);
    let pair = test_auroc(set.get("sofa").unwrap(), set.get("qsofa").unwrap(), labels, 0.05).unwrap();
    assert!(pair.p_value > 0.0 && pair.p_value <= 1.0);

    let mut rng = Mwc256::with_seed(7);
    let table = AucTable::compute(set, labels, 100, 0.05, &mut rng).unwrap();
    match table.get(2, 0) {
        Cell::PValue { p_value } => {
            let direct = test_auroc(set.get("lactate").unwrap(), set.get("sofa").unwrap(), labels, 0.05)
                .unwrap();
            assert_eq!(*p_value, direct.p_value);
        }
        other => panic!("unexpected cell {:?}", other),
    }
    assert!(table.render().lines().count() == 4);
}

#[test]
fn test_bootstrap_replays_with_seed() {
    let file = NamedTempFile::new().unwrap();
    fs::write(file.path(), cohort_csv()).unwrap();
    let cohort = read_cohort(file.path(), "death", &["lactate".to_string()], None).unwrap();
    let scores = cohort.column("lactate").unwrap();

    let a = bootstrap_auc(scores, &cohort.labels, 200, &mut Mwc256::with_seed(3)).unwrap();
    let b = bootstrap_auc(scores, &cohort.labels, 200, &mut Mwc256::with_seed(3)).unwrap();
    assert_eq!(a, b);
    assert!(a.ci.0 <= a.estimate && a.estimate <= a.ci.1);
}

#[test]
fn test_binormal_and_empirical_curves_coexist() {
    let file = NamedTempFile::new().unwrap();
    fs::write(file.path(), cohort_csv()).unwrap();
    let cohort = read_cohort(file.path(), "death", &[], None).unwrap();
    let scores = cohort.column("lactate").unwrap();

    let part = Partition::new(scores, &cohort.labels).unwrap();
    let smooth = binormal_roc(&part.positives, &part.negatives, None).unwrap();
    let step = roc_curve(scores, &cohort.labels).unwrap();
    assert_eq!(smooth.len(), 101);
    assert_ne!(smooth.len(), step.len());

    // roughly uniform scores: the two estimates agree loosely
    let parametric = binormal_auc(&part.positives, &part.negatives).unwrap();
    let empirical = auc(scores, &cohort.labels).unwrap();
    assert!((parametric - empirical).abs() < 0.1);
}

#[test]
fn test_model_scores_feed_the_engine() {
    let file = NamedTempFile::new().unwrap();
    fs::write(file.path(), cohort_csv()).unwrap();
    let cohort = read_cohort(file.path(), "death", &[], None).unwrap();

    let mut design = Design::new();
    design.push("sofa", cohort.column("sofa").unwrap()).unwrap();
    design.push("lactate", cohort.column("lactate").unwrap()).unwrap();
    let pred = LogisticModel::default().fit_predict(&design, &cohort.labels).unwrap();
    assert_eq!(pred.len(), cohort.len());

    let combined = auc(&pred, &cohort.labels).unwrap();
    assert!(combined > 0.5);

    let ops = OperatingStats::from_scores(&pred, &cohort.labels, 0.5).unwrap();
    assert_eq!(ops.n() as usize, cohort.len());
}

#[test]
fn test_shape_is_chosen_by_caller() {
    // two samples, two predictors: the variant decides, not the lengths
    let a = [0.2, 0.9];
    let b = [0.7, 0.1];
    let labels = [false, true];
    let single = calc_auc(&Predictors::Single(&a), &labels).unwrap();
    assert_eq!(single, Estimate::Single(1.0));
    let multi = calc_auc(&Predictors::Multiple(vec![&a[..], &b[..]]), &labels).unwrap();
    assert_eq!(multi, Estimate::Multiple(vec![1.0, 0.0]));

    assert!(matches!(
        delong_covariance(&[&a[..], &b[..]], &labels),
        Err(StatError::DegenerateInput(_))
    ));
}
