//! Experiment configuration

use crate::error::{NestError, Result};
use crate::search::ParamGrid;
use crate::training::{CVStrategy, CrossValidator, KernelType, SVMConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for a nested vs. non-nested comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    /// Bundled dataset name
    pub dataset: String,

    /// Number of trials (one reshuffle each)
    pub num_trials: usize,

    /// Folds used by the grid search
    pub inner_folds: usize,

    /// Folds used to score tuned models
    pub outer_folds: usize,

    /// Shuffle before splitting
    pub shuffle: bool,

    /// Keep class proportions in every fold
    pub stratified: bool,

    /// Added to the trial index to form the split seed
    pub base_seed: u64,

    /// Hyperparameter grid
    pub grid: ParamGrid,

    /// Base classifier the grid is applied to
    pub svm: SVMConfig,

    /// Worker threads per grid search (None = all cores)
    pub n_jobs: Option<usize>,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            dataset: "iris-binary".to_string(),
            num_trials: 20,
            inner_folds: 4,
            outer_folds: 4,
            shuffle: true,
            stratified: false,
            base_seed: 0,
            grid: ParamGrid::new()
                .add("C", [1.0, 10.0, 100.0])
                .add("gamma", [0.01, 0.1]),
            svm: SVMConfig {
                kernel: KernelType::RBF { gamma: 1.0 },
                ..SVMConfig::default()
            },
            n_jobs: None,
        }
    }
}

impl ExperimentConfig {
    /// Create a new configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a JSON file; missing fields take their defaults
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        Ok(config)
    }

    /// Builder method to set the dataset
    pub fn with_dataset(mut self, name: impl Into<String>) -> Self {
        self.dataset = name.into();
        self
    }

    /// Builder method to set number of trials
    pub fn with_num_trials(mut self, n: usize) -> Self {
        self.num_trials = n;
        self
    }

    /// Builder method to set the inner and outer fold counts
    pub fn with_folds(mut self, inner: usize, outer: usize) -> Self {
        self.inner_folds = inner;
        self.outer_folds = outer;
        self
    }

    /// Builder method to set the grid
    pub fn with_grid(mut self, grid: ParamGrid) -> Self {
        self.grid = grid;
        self
    }

    /// Builder method to set the base classifier
    pub fn with_svm(mut self, svm: SVMConfig) -> Self {
        self.svm = svm;
        self
    }

    /// Builder method to enable stratified folds
    pub fn with_stratified(mut self, stratified: bool) -> Self {
        self.stratified = stratified;
        self
    }

    /// Builder method to set the base seed
    pub fn with_base_seed(mut self, seed: u64) -> Self {
        self.base_seed = seed;
        self
    }

    /// Builder method to set parallelism
    pub fn with_n_jobs(mut self, n: Option<usize>) -> Self {
        self.n_jobs = n;
        self
    }

    /// Check the configuration before running
    pub fn validate(&self) -> Result<()> {
        if self.num_trials == 0 {
            return Err(NestError::ConfigError("num_trials must be at least 1".to_string()));
        }
        if self.inner_folds < 2 || self.outer_folds < 2 {
            return Err(NestError::ConfigError(format!(
                "fold counts must be at least 2 (inner = {}, outer = {})",
                self.inner_folds, self.outer_folds
            )));
        }
        if self.n_jobs == Some(0) {
            return Err(NestError::ConfigError("n_jobs must be at least 1".to_string()));
        }
        self.grid.validate()?;
        // Surface bad parameter names before the first trial
        for params in self.grid.candidates()? {
            self.svm.with_params(&params)?;
        }
        Ok(())
    }

    /// Seed shared by the inner and outer splitters of `trial`
    pub fn trial_seed(&self, trial: usize) -> u64 {
        self.base_seed.wrapping_add(trial as u64)
    }

    /// Splitter with `n_splits` folds for `seed`
    pub fn splitter(&self, n_splits: usize, seed: u64) -> CrossValidator {
        let strategy = if self.stratified {
            CVStrategy::StratifiedKFold { n_splits, shuffle: self.shuffle }
        } else {
            CVStrategy::KFold { n_splits, shuffle: self.shuffle }
        };
        CrossValidator::new(strategy).with_random_state(seed)
    }
}
