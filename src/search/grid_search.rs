//! Exhaustive cross-validated grid search

use super::grid::{ParamGrid, ParamSet};
use crate::data::select_rows;
use crate::error::{NestError, Result};
use crate::training::{CVSplit, Classifier, CrossValidator, Estimator};
use ndarray::{Array1, Array2};
use rayon::prelude::*;
use rayon::ThreadPool;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Scores for one hyperparameter combination
#[derive(Debug, Clone, Serialize)]
pub struct CandidateResult {
    pub params: ParamSet,
    /// Held-out score per fold, in fold order
    pub fold_scores: Vec<f64>,
    pub mean_score: f64,
    pub std_score: f64,
    /// 1 for the best mean score; tied candidates share the lowest rank
    pub rank: usize,
}

/// Outcome of [`GridSearchCV::fit`]
#[derive(Debug, Clone, Serialize)]
pub struct GridSearchResult<M> {
    pub best_params: ParamSet,
    /// Mean held-out score of `best_params`
    pub best_score: f64,
    /// Position of the best combination in grid order
    pub best_index: usize,
    pub candidates: Vec<CandidateResult>,
    pub n_splits: usize,
    /// Fold partition the candidates were scored on, indices relative to the input rows
    #[serde(skip)]
    pub splits: Vec<CVSplit>,
    /// Number of model fits used for scoring (candidates × folds), excluding the refit
    pub n_fits: usize,
    /// `best_params` refit on all samples passed to `fit`
    #[serde(skip)]
    pub best_model: Option<M>,
}

impl<M: Classifier> GridSearchResult<M> {
    /// Predict with the refit model
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        self.best_model
            .as_ref()
            .ok_or(NestError::ModelNotFitted)?
            .predict(x)
    }

    /// Accuracy of the refit model on `(x, y)`
    pub fn score(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<f64> {
        self.best_model
            .as_ref()
            .ok_or(NestError::ModelNotFitted)?
            .score(x, y)
    }
}

/// Evaluates every grid combination with k-fold cross-validation and keeps
/// the one with the highest mean held-out accuracy.
#[derive(Debug, Clone)]
pub struct GridSearchCV<E> {
    estimator: E,
    grid: ParamGrid,
    cv: CrossValidator,
    refit: bool,
    /// Dedicated pool for fold evaluation; `None` uses rayon's global pool
    pool: Option<Arc<ThreadPool>>,
}

/// Build a rayon pool with `n_jobs` worker threads
pub fn build_thread_pool(n_jobs: usize) -> Result<Arc<ThreadPool>> {
    if n_jobs == 0 {
        return Err(NestError::ConfigError("n_jobs must be at least 1".to_string()));
    }
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(n_jobs)
        .build()
        .map_err(|e| NestError::ConfigError(format!("thread pool: {}", e)))?;
    Ok(Arc::new(pool))
}

struct Fold {
    x_train: Array2<f64>,
    y_train: Array1<f64>,
    x_test: Array2<f64>,
    y_test: Array1<f64>,
}

impl<E: Estimator> GridSearchCV<E> {
    pub fn new(estimator: E, grid: ParamGrid, cv: CrossValidator) -> Self {
        Self {
            estimator,
            grid,
            cv,
            refit: true,
            pool: None,
        }
    }

    /// Whether to refit the best combination on the full input (default true)
    pub fn with_refit(mut self, refit: bool) -> Self {
        self.refit = refit;
        self
    }

    /// Worker threads for fold evaluation (None = rayon's global pool).
    ///
    /// The pool is built here once and reused by every call to `fit`.
    pub fn with_n_jobs(mut self, n_jobs: Option<usize>) -> Result<Self> {
        self.pool = n_jobs.map(build_thread_pool).transpose()?;
        Ok(self)
    }

    /// Evaluate folds on an existing pool, shared with other searches
    pub fn with_thread_pool(mut self, pool: Arc<ThreadPool>) -> Self {
        self.pool = Some(pool);
        self
    }

    pub fn thread_pool(&self) -> Option<&Arc<ThreadPool>> {
        self.pool.as_ref()
    }

    /// Replace the splitter, e.g. to reseed it
    pub fn with_cv(mut self, cv: CrossValidator) -> Self {
        self.cv = cv;
        self
    }

    pub fn cv(&self) -> &CrossValidator {
        &self.cv
    }

    pub fn grid(&self) -> &ParamGrid {
        &self.grid
    }

    pub fn estimator(&self) -> &E {
        &self.estimator
    }

    /// Number of fits one call to `fit` performs, including the refit
    pub fn fits_per_search(&self) -> usize {
        self.grid.len() * self.cv.n_splits() + usize::from(self.refit)
    }

    /// Run the search on `(x, y)`
    pub fn fit(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<GridSearchResult<E::Model>> {
        if x.nrows() != y.len() {
            return Err(NestError::ShapeError {
                expected: format!("{} labels", x.nrows()),
                actual: format!("{} labels", y.len()),
            });
        }

        let start = Instant::now();
        let candidates = self.grid.candidates()?;
        // Build every model up front so bad parameters fail before any fitting
        let models: Vec<E::Model> = candidates
            .iter()
            .map(|p| self.estimator.build(p))
            .collect::<Result<_>>()?;

        let splits = self.cv.split(x.nrows(), Some(y))?;
        let folds: Vec<Fold> = splits
            .iter()
            .map(|split| {
                if split.train_indices.is_empty() || split.test_indices.is_empty() {
                    return Err(NestError::ValidationError(format!(
                        "fold {} has an empty train or test subset",
                        split.fold_idx
                    )));
                }
                let (x_train, y_train) = select_rows(x, y, &split.train_indices);
                let (x_test, y_test) = select_rows(x, y, &split.test_indices);
                Ok(Fold { x_train, y_train, x_test, y_test })
            })
            .collect::<Result<_>>()?;

        let n_splits = folds.len();
        let tasks: Vec<(usize, usize)> = (0..models.len())
            .flat_map(|c| (0..n_splits).map(move |f| (c, f)))
            .collect();

        let evaluate = || -> Result<Vec<f64>> {
            tasks
                .par_iter()
                .map(|&(c, f)| {
                    let fold = &folds[f];
                    let mut model = models[c].clone();
                    model.fit(&fold.x_train, &fold.y_train)?;
                    model.score(&fold.x_test, &fold.y_test)
                })
                .collect()
        };

        let scores = match &self.pool {
            Some(pool) => pool.install(evaluate)?,
            None => evaluate()?,
        };

        let mut results: Vec<CandidateResult> = candidates
            .into_iter()
            .zip(scores.chunks(n_splits))
            .map(|(params, fold_scores)| {
                let mean = fold_scores.iter().sum::<f64>() / n_splits as f64;
                let var = fold_scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n_splits as f64;
                CandidateResult {
                    params,
                    fold_scores: fold_scores.to_vec(),
                    mean_score: mean,
                    std_score: var.sqrt(),
                    rank: 0,
                }
            })
            .collect();

        let means: Vec<f64> = results.iter().map(|r| r.mean_score).collect();
        for r in results.iter_mut() {
            r.rank = 1 + means.iter().filter(|&&m| m > r.mean_score).count();
        }

        // First-seen wins on ties
        let mut best_index = 0;
        for (i, &m) in means.iter().enumerate() {
            if m > means[best_index] {
                best_index = i;
            }
        }
        let best_params = results[best_index].params.clone();
        let best_score = results[best_index].mean_score;

        let best_model = if self.refit {
            let mut model = models[best_index].clone();
            model.fit(x, y)?;
            Some(model)
        } else {
            None
        };

        debug!(
            candidates = results.len(),
            folds = n_splits,
            fits = tasks.len(),
            best = %best_params,
            best_score,
            elapsed = ?start.elapsed(),
            "Grid search finished"
        );

        Ok(GridSearchResult {
            best_params,
            best_score,
            best_index,
            candidates: results,
            n_splits,
            splits,
            n_fits: tasks.len(),
            best_model,
        })
    }
}
