//! Model traits and scoring

use crate::error::{NestError, Result};
use crate::search::ParamSet;
use ndarray::{Array1, Array2};

/// Trait for classifiers
pub trait Classifier: Send + Sync {
    /// Fit the model to training data
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()>;

    /// Make predictions
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>>;

    /// Accuracy on `(x, y)`
    fn score(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<f64> {
        let predictions = self.predict(x)?;
        accuracy(y, &predictions)
    }
}

/// A model family: builds an unfitted classifier for one hyperparameter setting
pub trait Estimator: Send + Sync {
    type Model: Classifier + Clone;

    fn build(&self, params: &ParamSet) -> Result<Self::Model>;
}

/// Fraction of predictions that match the true label
pub fn accuracy(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<f64> {
    if y_true.len() != y_pred.len() {
        return Err(NestError::ShapeError {
            expected: format!("{} predictions", y_true.len()),
            actual: format!("{} predictions", y_pred.len()),
        });
    }
    if y_true.is_empty() {
        return Err(NestError::ValidationError(
            "cannot score on zero samples".to_string(),
        ));
    }

    let correct = y_true
        .iter()
        .zip(y_pred.iter())
        .filter(|(t, p)| t.round() as i64 == p.round() as i64)
        .count();

    Ok(correct as f64 / y_true.len() as f64)
}
