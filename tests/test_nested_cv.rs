//! Integration test: grid search and nested cross-validation on real data

use nestcv::data::{load_dataset, make_moons};
use nestcv::nested::NestedCrossValidator;
use nestcv::search::{GridSearchCV, ParamGrid};
use nestcv::training::{CrossValidator, KernelType, SVMConfig};
use std::collections::HashSet;

fn rbf_svm() -> SVMConfig {
    SVMConfig {
        kernel: KernelType::RBF { gamma: 1.0 },
        ..SVMConfig::default()
    }
}

fn default_grid() -> ParamGrid {
    ParamGrid::new()
        .add("C", [1.0, 10.0, 100.0])
        .add("gamma", [0.01, 0.1])
}

#[test]
fn test_grid_search_on_iris() {
    let ds = load_dataset("iris-binary").unwrap();
    let search = GridSearchCV::new(rbf_svm(), default_grid(), CrossValidator::k_fold(4, 0));
    let result = search.fit(&ds.x, &ds.y).unwrap();

    assert_eq!(result.candidates.len(), 6);
    assert_eq!(result.n_fits, 24);
    assert!(result.best_score > 0.8, "best score too low: {}", result.best_score);

    let best = &result.candidates[result.best_index];
    assert_eq!(best.rank, 1);
    assert_eq!(best.params, result.best_params);
    assert!(result
        .candidates
        .iter()
        .all(|c| c.mean_score <= result.best_score));

    // Refit model is available and scores the training data
    let train_acc = result.score(&ds.x, &ds.y).unwrap();
    assert!(train_acc > 0.8);
}

#[test]
fn test_six_by_four_scenario() {
    let ds = load_dataset("iris-binary").unwrap();
    let inner = GridSearchCV::new(rbf_svm(), default_grid(), CrossValidator::k_fold(4, 3));
    let nested = NestedCrossValidator::new(inner, CrossValidator::k_fold(4, 3));
    let result = nested.evaluate(&ds.x, &ds.y).unwrap();

    assert_eq!(result.folds.len(), 4);
    assert_eq!(result.scores.scores.len(), 4);
    for fold in &result.folds {
        // 6 candidates × 4 inner folds, plus the refit of the winner
        assert_eq!(fold.inner_fits, 25);
        assert_eq!(fold.inner_splits.len(), 4);
        assert_eq!(fold.train_indices.len() + fold.test_indices.len(), 100);
        assert!((0.0..=1.0).contains(&fold.test_score));
    }
}

#[test]
fn test_outer_test_never_used_for_selection() {
    let ds = make_moons(120, 0.3, 5).unwrap();
    let inner = GridSearchCV::new(rbf_svm(), default_grid(), CrossValidator::k_fold(3, 11));
    let result = NestedCrossValidator::new(inner, CrossValidator::k_fold(4, 11))
        .evaluate(&ds.x, &ds.y)
        .unwrap();

    assert!(result.is_leak_free());
    for fold in &result.folds {
        let test: HashSet<usize> = fold.test_indices.iter().copied().collect();
        for (inner_train, inner_test) in &fold.inner_splits {
            assert!(inner_train.iter().all(|i| !test.contains(i)));
            assert!(inner_test.iter().all(|i| !test.contains(i)));
        }
    }

    // Outer test folds partition the samples
    let mut all: Vec<usize> = result
        .folds
        .iter()
        .flat_map(|f| f.test_indices.iter().copied())
        .collect();
    all.sort_unstable();
    assert_eq!(all, (0..120).collect::<Vec<_>>());
}

#[test]
fn test_partitions_deterministic_for_seed() {
    let y_len = 100;
    let a = CrossValidator::k_fold(4, 42).split(y_len, None).unwrap();
    let b = CrossValidator::k_fold(4, 42).split(y_len, None).unwrap();
    let c = CrossValidator::k_fold(4, 43).split(y_len, None).unwrap();
    assert_eq!(a, b);
    assert_ne!(a, c);

    let ds = load_dataset("iris-binary").unwrap();
    let run = || {
        let inner = GridSearchCV::new(rbf_svm(), default_grid(), CrossValidator::k_fold(4, 42));
        NestedCrossValidator::new(inner, CrossValidator::k_fold(4, 42))
            .evaluate(&ds.x, &ds.y)
            .unwrap()
    };
    let first = run();
    let second = run();
    assert_eq!(first.scores.scores, second.scores.scores);
    for (f1, f2) in first.folds.iter().zip(&second.folds) {
        assert_eq!(f1.test_indices, f2.test_indices);
        assert_eq!(f1.inner_splits, f2.inner_splits);
        assert_eq!(f1.best_params, f2.best_params);
    }
}

#[test]
fn test_parallelism_does_not_change_scores() {
    let ds = make_moons(80, 0.25, 9).unwrap();
    let serial = GridSearchCV::new(rbf_svm(), default_grid(), CrossValidator::k_fold(4, 1))
        .with_n_jobs(Some(1))
        .unwrap()
        .fit(&ds.x, &ds.y)
        .unwrap();
    let parallel = GridSearchCV::new(rbf_svm(), default_grid(), CrossValidator::k_fold(4, 1))
        .with_n_jobs(Some(4))
        .unwrap()
        .fit(&ds.x, &ds.y)
        .unwrap();

    let means = |r: &nestcv::search::GridSearchResult<_>| {
        r.candidates.iter().map(|c| c.mean_score).collect::<Vec<f64>>()
    };
    assert_eq!(means(&serial), means(&parallel));
    assert_eq!(serial.best_params, parallel.best_params);
}

#[test]
fn test_single_class_training_fold_fails() {
    // Sorted labels without shuffling leave one class out of some training folds
    let ds = load_dataset("iris-binary").unwrap();
    let cv = CrossValidator::new(nestcv::training::CVStrategy::KFold {
        n_splits: 2,
        shuffle: false,
    });
    let search = GridSearchCV::new(rbf_svm(), default_grid(), cv);
    assert!(search.fit(&ds.x, &ds.y).is_err());
}
