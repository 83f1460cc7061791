//! nestcv - Nested vs. non-nested cross-validation
//!
//! Tunes an SVM by exhaustive grid search and compares two estimates of its
//! accuracy, repeated over many reshuffled trials:
//! - the best mean inner-CV score of a search run on the full dataset
//!   (non-nested, optimistically biased)
//! - the mean outer-fold score of a search nested inside an outer
//!   cross-validation loop (nested, unbiased)
//!
//! # Modules
//!
//! ## Core
//! - [`data`] - Bundled datasets and CSV loading
//! - [`training`] - K-fold splitting, SVM classifier, scoring
//! - [`search`] - Parameter grids and grid search with cross-validation
//! - [`nested`] - Nested cross-validation
//! - [`experiment`] - Trial repetition loop and its configuration
//!
//! ## Output
//! - [`report`] - Console tables and box plots
//! - [`cli`] - Command-line interface

// Core error handling
pub mod error;

// Core
pub mod data;
pub mod training;
pub mod search;
pub mod nested;
pub mod experiment;

// Output
pub mod report;
pub mod cli;

pub use error::{NestError, Result};

/// Re-export commonly used types
pub mod prelude {
    // Error handling
    pub use crate::error::{NestError, Result};

    // Data
    pub use crate::data::{load_csv_dataset, load_dataset, make_moons, Dataset};

    // Training
    pub use crate::training::{
        accuracy, CVResults, CVSplit, CVStrategy, Classifier, CrossValidator, Estimator,
        KernelType, SVMClassifier, SVMConfig,
    };

    // Search
    pub use crate::search::{GridSearchCV, GridSearchResult, ParamGrid, ParamSet, ParamValue};

    // Nested evaluation
    pub use crate::nested::{NestedCrossValidator, NestedResult, OuterFoldRecord};

    // Experiment
    pub use crate::experiment::{ExperimentConfig, ExperimentReport, TrialOutcome, TrialRunner};

    // Reporting
    pub use crate::report::{render_boxplot, BoxStats};
}
