//! Hyperparameter search
//!
//! - [`ParamGrid`] enumerates candidate combinations
//! - [`GridSearchCV`] scores each combination with k-fold cross-validation

mod grid;
mod grid_search;

pub use grid::{ParamAxis, ParamGrid, ParamSet, ParamValue};
pub use grid_search::{build_thread_pool, CandidateResult, GridSearchCV, GridSearchResult};
