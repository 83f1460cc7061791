//! Datasets
//!
//! A [`Dataset`] is a dense feature matrix with one label per row, held in
//! memory and never mutated once built. Bundled datasets are loaded by name
//! with [`load_dataset`]; arbitrary CSV files go through [`load_csv_dataset`].

mod loader;
mod synthetic;

pub use loader::{dataframe_to_dataset, load_csv, load_csv_bytes};
pub use synthetic::make_moons;

use crate::error::{NestError, Result};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};
use std::path::Path;

const IRIS_BINARY_CSV: &[u8] = include_bytes!("../../data/iris_binary.csv");

/// Bundled datasets: `(name, description)`
pub const BUNDLED_DATASETS: &[(&str, &str)] = &[
    (
        "iris-binary",
        "Fisher's iris, versicolor (0) vs. virginica (1); 100 samples, 4 features",
    ),
    (
        "moons",
        "Two interleaving half circles with noise 0.3, seed 0; 200 samples, 2 features",
    ),
];

/// Labeled tabular data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    pub name: String,
    pub feature_names: Vec<String>,
    pub target_name: String,
    /// Features, one row per sample
    pub x: Array2<f64>,
    /// Labels
    pub y: Array1<f64>,
}

impl Dataset {
    /// Create a dataset, checking that features and labels line up
    pub fn new(
        name: impl Into<String>,
        feature_names: Vec<String>,
        target_name: impl Into<String>,
        x: Array2<f64>,
        y: Array1<f64>,
    ) -> Result<Self> {
        if x.nrows() != y.len() {
            return Err(NestError::ShapeError {
                expected: format!("{} labels", x.nrows()),
                actual: format!("{} labels", y.len()),
            });
        }
        if feature_names.len() != x.ncols() {
            return Err(NestError::ShapeError {
                expected: format!("{} feature names", x.ncols()),
                actual: format!("{} feature names", feature_names.len()),
            });
        }
        if x.is_empty() {
            return Err(NestError::DataError("dataset is empty".to_string()));
        }
        if x.iter().any(|v| !v.is_finite()) {
            return Err(NestError::DataError(
                "features contain NaN or infinite values".to_string(),
            ));
        }
        if let Some(row) = y.iter().position(|v| !v.is_finite()) {
            return Err(NestError::DataError(format!(
                "label at row {} is NaN or infinite",
                row
            )));
        }

        Ok(Self {
            name: name.into(),
            feature_names,
            target_name: target_name.into(),
            x,
            y,
        })
    }

    pub fn n_samples(&self) -> usize {
        self.x.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.x.ncols()
    }

    /// Sorted distinct labels with their counts
    pub fn class_counts(&self) -> Vec<(i64, usize)> {
        let mut labels: Vec<i64> = self.y.iter().map(|&v| v.round() as i64).collect();
        labels.sort_unstable();

        let mut counts: Vec<(i64, usize)> = Vec::new();
        for label in labels {
            match counts.last_mut() {
                Some((last, n)) if *last == label => *n += 1,
                _ => counts.push((label, 1)),
            }
        }
        counts
    }

    /// Fail unless the labels are integral and exactly two classes are present
    pub fn ensure_binary(&self) -> Result<()> {
        if let Some(v) = self.y.iter().find(|v| !v.is_finite() || (*v - v.round()).abs() > 1e-9) {
            return Err(NestError::DataError(format!(
                "labels must be integral class ids, found {}",
                v
            )));
        }
        let n_classes = self.class_counts().len();
        if n_classes != 2 {
            return Err(NestError::DataError(format!(
                "expected a binary target, found {} classes",
                n_classes
            )));
        }
        Ok(())
    }

    /// Rows at `indices`, in that order
    pub fn select(&self, indices: &[usize]) -> (Array2<f64>, Array1<f64>) {
        select_rows(&self.x, &self.y, indices)
    }
}

/// Gather rows of `x` and `y` at `indices`
pub fn select_rows(
    x: &Array2<f64>,
    y: &Array1<f64>,
    indices: &[usize],
) -> (Array2<f64>, Array1<f64>) {
    (x.select(Axis(0), indices), y.select(Axis(0), indices))
}

/// Load a bundled dataset by name
pub fn load_dataset(name: &str) -> Result<Dataset> {
    match name {
        "iris-binary" | "iris_binary" => {
            let df = load_csv_bytes(IRIS_BINARY_CSV)?;
            dataframe_to_dataset("iris-binary", &df, "species")
        }
        "moons" => make_moons(200, 0.3, 0),
        other => {
            let known: Vec<&str> = BUNDLED_DATASETS.iter().map(|(n, _)| *n).collect();
            Err(NestError::DataError(format!(
                "unknown dataset '{}', expected one of: {}",
                other,
                known.join(", ")
            )))
        }
    }
}

/// Load a CSV file, using `target` as the label column
pub fn load_csv_dataset(path: &Path, target: &str) -> Result<Dataset> {
    let df = load_csv(path)?;
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("csv")
        .to_string();
    dataframe_to_dataset(&name, &df, target)
}
