//! Nested cross-validation
//!
//! Each outer fold hands only its training rows to a full grid search; the
//! tuned model is then scored once on the outer fold's held-out rows. The
//! outer test rows never reach hyperparameter selection.

use crate::data::select_rows;
use crate::error::{NestError, Result};
use crate::search::{GridSearchCV, ParamSet};
use crate::training::{CVResults, CrossValidator, Estimator};
use ndarray::{Array1, Array2};
use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;

/// What happened in one outer fold
#[derive(Debug, Clone, Serialize)]
pub struct OuterFoldRecord {
    pub fold_idx: usize,
    /// Rows the inner search saw, as indices into the full dataset
    pub train_indices: Vec<usize>,
    /// Rows used only for scoring the tuned model
    pub test_indices: Vec<usize>,
    /// Inner train/test partitions, mapped back to indices into the full dataset
    #[serde(skip)]
    pub inner_splits: Vec<(Vec<usize>, Vec<usize>)>,
    pub best_params: ParamSet,
    /// Inner cross-validated score of `best_params`
    pub inner_score: f64,
    /// Accuracy of the tuned model on `test_indices`
    pub test_score: f64,
    /// Fits performed by the inner search, refit included
    pub inner_fits: usize,
}

/// Per-fold records plus the summary over outer test scores
#[derive(Debug, Clone, Serialize)]
pub struct NestedResult {
    pub folds: Vec<OuterFoldRecord>,
    pub scores: CVResults,
}

impl NestedResult {
    pub fn mean_score(&self) -> f64 {
        self.scores.mean_score
    }

    pub fn std_score(&self) -> f64 {
        self.scores.std_score
    }

    /// True when no outer test row was used for fitting or selecting its fold's model
    pub fn is_leak_free(&self) -> bool {
        self.folds.iter().all(|fold| {
            let test: HashSet<usize> = fold.test_indices.iter().copied().collect();
            let outer_clean = fold.train_indices.iter().all(|i| !test.contains(i));
            let inner_clean = fold.inner_splits.iter().all(|(train, held_out)| {
                train.iter().chain(held_out.iter()).all(|i| !test.contains(i))
            });
            outer_clean && inner_clean
        })
    }
}

/// Outer k-fold loop around an inner [`GridSearchCV`]
#[derive(Debug, Clone)]
pub struct NestedCrossValidator<E> {
    inner: GridSearchCV<E>,
    outer: CrossValidator,
}

impl<E: Estimator> NestedCrossValidator<E> {
    /// The inner search is always refit, since its refit model is what gets scored
    pub fn new(inner: GridSearchCV<E>, outer: CrossValidator) -> Self {
        Self {
            inner: inner.with_refit(true),
            outer,
        }
    }

    pub fn inner(&self) -> &GridSearchCV<E> {
        &self.inner
    }

    pub fn outer(&self) -> &CrossValidator {
        &self.outer
    }

    /// Score one tuned model per outer fold
    pub fn evaluate(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<NestedResult> {
        if x.nrows() != y.len() {
            return Err(NestError::ShapeError {
                expected: format!("{} labels", x.nrows()),
                actual: format!("{} labels", y.len()),
            });
        }

        let outer_splits = self.outer.split(x.nrows(), Some(y))?;
        let mut folds = Vec::with_capacity(outer_splits.len());

        for split in outer_splits {
            if split.test_indices.is_empty() {
                return Err(NestError::ValidationError(format!(
                    "outer fold {} has no test samples",
                    split.fold_idx
                )));
            }

            let (x_train, y_train) = select_rows(x, y, &split.train_indices);
            let (x_test, y_test) = select_rows(x, y, &split.test_indices);

            let search = self.inner.fit(&x_train, &y_train)?;
            let test_score = search.score(&x_test, &y_test)?;

            let to_outer = |idx: &[usize]| -> Vec<usize> {
                idx.iter().map(|&i| split.train_indices[i]).collect()
            };
            let inner_splits = search
                .splits
                .iter()
                .map(|s| (to_outer(&s.train_indices), to_outer(&s.test_indices)))
                .collect();

            debug!(
                fold = split.fold_idx,
                best = %search.best_params,
                inner_score = search.best_score,
                test_score,
                "Outer fold scored"
            );

            folds.push(OuterFoldRecord {
                fold_idx: split.fold_idx,
                inner_fits: search.n_fits + 1,
                best_params: search.best_params,
                inner_score: search.best_score,
                test_score,
                inner_splits,
                train_indices: split.train_indices,
                test_indices: split.test_indices,
            });
        }

        let scores = CVResults::from_scores(folds.iter().map(|f| f.test_score).collect());
        Ok(NestedResult { folds, scores })
    }
}
