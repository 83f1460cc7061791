//! Repeated nested vs. non-nested comparison
//!
//! Every trial reseeds the inner and outer splitters with the same seed,
//! runs a grid search on the full dataset (the non-nested, optimistic
//! estimate) and a nested evaluation (the unbiased one), and keeps both
//! scores for a paired comparison.

mod config;
mod runner;

pub use config::ExperimentConfig;
pub use runner::{ExperimentReport, TrialOutcome, TrialRunner};
