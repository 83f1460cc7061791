//! Integration test: repeated nested vs. non-nested trials

use nestcv::data::{load_dataset, make_moons};
use nestcv::experiment::{ExperimentConfig, TrialRunner};
use nestcv::report::render_boxplot;
use nestcv::search::ParamGrid;

fn quick_config(trials: usize) -> ExperimentConfig {
    ExperimentConfig::new().with_num_trials(trials)
}

#[test]
fn test_score_sequences_have_trial_length() {
    let ds = make_moons(60, 0.3, 4).unwrap();
    let grid = ParamGrid::new().add("C", [1.0, 10.0]).add("gamma", [0.5]);
    for n in [1, 2, 4] {
        let config = quick_config(n).with_grid(grid.clone()).with_folds(3, 3);
        let report = TrialRunner::new(config).unwrap().run(&ds).unwrap();
        assert_eq!(report.non_nested_scores.len(), n);
        assert_eq!(report.nested_scores.len(), n);
        assert_eq!(report.trials.len(), n);
        assert!(report.mean_difference.is_finite());
    }
}

#[test]
fn test_default_experiment_shape_on_iris() {
    let ds = load_dataset("iris-binary").unwrap();
    let report = TrialRunner::new(quick_config(2)).unwrap().run(&ds).unwrap();

    assert_eq!(report.dataset, "iris-binary");
    assert_eq!(report.n_samples, 100);
    for trial in &report.trials {
        assert_eq!(trial.nested.folds.len(), 4);
        assert_eq!(trial.nested.scores.scores.len(), 4);
        assert!(trial.nested.folds.iter().all(|f| f.inner_fits == 25));
        assert!(trial.nested.is_leak_free());
        assert!(trial.non_nested_params.get("C").is_some());
        assert!(trial.non_nested_params.get("gamma").is_some());
    }
}

#[test]
fn test_nested_not_far_above_non_nested() {
    let ds = load_dataset("iris-binary").unwrap();
    let report = TrialRunner::new(quick_config(5)).unwrap().run(&ds).unwrap();

    let mean = |v: &[f64]| v.iter().sum::<f64>() / v.len() as f64;
    let non_nested = mean(&report.non_nested_scores);
    let nested = mean(&report.nested_scores);
    assert!(
        nested <= non_nested + 0.05,
        "nested {:.4} exceeds non-nested {:.4} by a wide margin",
        nested,
        non_nested
    );
    assert!((report.mean_difference - (non_nested - nested)).abs() < 1e-9);
}

#[test]
fn test_reproducible_for_base_seed() {
    let ds = make_moons(60, 0.3, 8).unwrap();
    let grid = ParamGrid::new().add("C", [1.0, 10.0]).add("gamma", [0.1, 1.0]);
    let config = quick_config(3).with_grid(grid).with_folds(3, 3).with_base_seed(21);

    let a = TrialRunner::new(config.clone()).unwrap().run(&ds).unwrap();
    let b = TrialRunner::new(config.with_n_jobs(Some(1))).unwrap().run(&ds).unwrap();
    assert_eq!(a.non_nested_scores, b.non_nested_scores);
    assert_eq!(a.nested_scores, b.nested_scores);
    assert_eq!(
        a.trials.iter().map(|t| t.seed).collect::<Vec<_>>(),
        vec![21, 22, 23]
    );
}

#[test]
fn test_stratified_experiment() {
    let ds = load_dataset("iris-binary").unwrap();
    let config = quick_config(1).with_stratified(true);
    let report = TrialRunner::new(config).unwrap().run(&ds).unwrap();
    for fold in &report.trials[0].nested.folds {
        // 50/50 classes over 4 folds: 12 or 13 of each class per test fold
        let ones = fold
            .test_indices
            .iter()
            .filter(|&&i| ds.y[i] == 1.0)
            .count();
        assert!((12..=13).contains(&ones), "unbalanced fold: {}", ones);
    }
}

#[test]
fn test_report_json_and_plot() {
    let ds = make_moons(48, 0.2, 2).unwrap();
    let config = quick_config(2)
        .with_grid(ParamGrid::new().add("C", [1.0]).add("gamma", [0.5, 2.0]))
        .with_folds(3, 3);
    let report = TrialRunner::new(config).unwrap().run(&ds).unwrap();

    let json: serde_json::Value = serde_json::to_value(&report).unwrap();
    assert_eq!(json["nested_scores"].as_array().unwrap().len(), 2);
    assert_eq!(json["config"]["num_trials"], 2);
    assert!(json["trials"][0]["non_nested_params"]["gamma"].is_number());

    let lines = render_boxplot(
        &[
            ("non-nested", report.non_nested_scores.as_slice()),
            ("nested", report.nested_scores.as_slice()),
        ],
        40,
    );
    assert_eq!(lines.len(), 4);
    assert!(lines[0].contains("non-nested"));
}

#[test]
fn test_multiclass_dataset_rejected() {
    let mut ds = make_moons(30, 0.2, 0).unwrap();
    ds.y[0] = 2.0;
    let runner = TrialRunner::new(quick_config(1)).unwrap();
    assert!(runner.run(&ds).is_err());
}
