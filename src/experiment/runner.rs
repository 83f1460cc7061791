//! Trial repetition loop

use super::config::ExperimentConfig;
use crate::data::Dataset;
use crate::error::Result;
use crate::nested::{NestedCrossValidator, NestedResult};
use crate::search::{build_thread_pool, GridSearchCV, ParamSet};
use crate::training::SVMConfig;
use rayon::ThreadPool;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Scores from one trial
#[derive(Debug, Clone, Serialize)]
pub struct TrialOutcome {
    pub trial: usize,
    /// Seed used by both the inner and the outer splitter
    pub seed: u64,
    /// Best mean inner-CV score of a grid search on the full dataset
    pub non_nested_score: f64,
    /// Parameters that search picked
    pub non_nested_params: ParamSet,
    pub nested: NestedResult,
}

impl TrialOutcome {
    pub fn nested_score(&self) -> f64 {
        self.nested.mean_score()
    }
}

/// All trials plus the paired comparison
#[derive(Debug, Clone, Serialize)]
pub struct ExperimentReport {
    pub dataset: String,
    pub n_samples: usize,
    pub config: ExperimentConfig,
    pub non_nested_scores: Vec<f64>,
    pub nested_scores: Vec<f64>,
    /// `non_nested_scores[i] - nested_scores[i]`
    pub score_difference: Vec<f64>,
    pub mean_difference: f64,
    pub std_difference: f64,
    pub trials: Vec<TrialOutcome>,
    pub elapsed_secs: f64,
}

impl ExperimentReport {
    /// The non-nested search of the first trial
    pub fn first_trial(&self) -> Option<&TrialOutcome> {
        self.trials.first()
    }

    pub fn summary_line(&self) -> String {
        format!(
            "Average difference of {:.6} with std. dev. of {:.6}.",
            self.mean_difference, self.std_difference
        )
    }
}

/// Runs the non-nested search and the nested evaluation once per trial
pub struct TrialRunner {
    config: ExperimentConfig,
    /// Shared by every search of every trial when `n_jobs` is set
    pool: Option<Arc<ThreadPool>>,
}

impl TrialRunner {
    /// Create a runner; the configuration is validated up front
    pub fn new(config: ExperimentConfig) -> Result<Self> {
        config.validate()?;
        let pool = config.n_jobs.map(build_thread_pool).transpose()?;
        Ok(Self { config, pool })
    }

    pub fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    /// Grid search whose splitter is seeded with `seed`
    pub fn search_for(&self, seed: u64) -> GridSearchCV<SVMConfig> {
        let search = GridSearchCV::new(
            self.config.svm.clone(),
            self.config.grid.clone(),
            self.config.splitter(self.config.inner_folds, seed),
        );
        match &self.pool {
            Some(pool) => search.with_thread_pool(Arc::clone(pool)),
            None => search,
        }
    }

    /// Nested evaluator whose inner and outer splitters are both seeded with `seed`
    pub fn nested_for(&self, seed: u64) -> NestedCrossValidator<SVMConfig> {
        NestedCrossValidator::new(
            self.search_for(seed),
            self.config.splitter(self.config.outer_folds, seed),
        )
    }

    /// One trial
    pub fn run_trial(&self, dataset: &Dataset, trial: usize) -> Result<TrialOutcome> {
        let seed = self.config.trial_seed(trial);

        // Same data for tuning and scoring: optimistic
        let search = self
            .search_for(seed)
            .with_refit(false)
            .fit(&dataset.x, &dataset.y)?;

        let nested = self.nested_for(seed).evaluate(&dataset.x, &dataset.y)?;

        Ok(TrialOutcome {
            trial,
            seed,
            non_nested_score: search.best_score,
            non_nested_params: search.best_params,
            nested,
        })
    }

    /// All trials, in order
    pub fn run(&self, dataset: &Dataset) -> Result<ExperimentReport> {
        self.run_with_progress(dataset, |_| {})
    }

    /// All trials, calling `on_trial` after each one
    pub fn run_with_progress<F>(&self, dataset: &Dataset, mut on_trial: F) -> Result<ExperimentReport>
    where
        F: FnMut(&TrialOutcome),
    {
        dataset.ensure_binary()?;

        let start = Instant::now();
        let n_trials = self.config.num_trials;
        info!(
            dataset = %dataset.name,
            samples = dataset.n_samples(),
            trials = n_trials,
            candidates = self.config.grid.len(),
            inner_folds = self.config.inner_folds,
            outer_folds = self.config.outer_folds,
            "Starting nested vs. non-nested comparison"
        );

        let mut trials = Vec::new();
        let mut non_nested_scores = Vec::new();
        let mut nested_scores = Vec::new();

        for trial in 0..n_trials {
            let trial_start = Instant::now();
            let outcome = self.run_trial(dataset, trial)?;

            info!(
                trial = trial + 1,
                of = n_trials,
                non_nested = outcome.non_nested_score,
                nested = outcome.nested_score(),
                "Trial finished"
            );
            debug!(trial, elapsed = ?trial_start.elapsed(), params = %outcome.non_nested_params);

            non_nested_scores.push(outcome.non_nested_score);
            nested_scores.push(outcome.nested_score());
            on_trial(&outcome);
            trials.push(outcome);
        }

        let score_difference: Vec<f64> = non_nested_scores
            .iter()
            .zip(&nested_scores)
            .map(|(a, b)| a - b)
            .collect();
        let (mean_difference, std_difference) = mean_std(&score_difference);

        Ok(ExperimentReport {
            dataset: dataset.name.clone(),
            n_samples: dataset.n_samples(),
            config: self.config.clone(),
            non_nested_scores,
            nested_scores,
            score_difference,
            mean_difference,
            std_difference,
            trials,
            elapsed_secs: start.elapsed().as_secs_f64(),
        })
    }
}

/// Mean and population standard deviation
pub(crate) fn mean_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (f64::NAN, f64::NAN);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, var.sqrt())
}
