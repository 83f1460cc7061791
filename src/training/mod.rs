//! Model training
//!
//! - K-fold cross-validation splitters
//! - Support Vector Machine classifier
//! - Classifier / estimator traits and accuracy scoring

pub mod cross_validation;
pub mod models;
pub mod svm;

pub use cross_validation::{CrossValidator, CVStrategy, CVSplit, CVResults};
pub use models::{accuracy, Classifier, Estimator};
pub use svm::{SVMClassifier, SVMConfig, KernelType};
