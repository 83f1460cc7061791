//! Support Vector Machine classifier
//!
//! Binary SVC trained with a simplified SMO (Sequential Minimal Optimization)
//! over a precomputed kernel matrix.

use super::models::{Classifier, Estimator};
use crate::error::{NestError, Result};
use crate::search::{ParamSet, ParamValue};
use ndarray::{Array1, Array2, ArrayView1};
use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Maximum number of samples for eager kernel matrix computation.
/// Beyond this, training will return an error to prevent OOM.
const MAX_KERNEL_MATRIX_SAMPLES: usize = 10_000;

/// Consecutive passes without an alpha update before SMO stops
const MAX_QUIET_PASSES: usize = 5;

/// Kernel function type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum KernelType {
    /// Linear kernel: K(x, y) = x · y
    Linear,
    /// Polynomial kernel: K(x, y) = (γ * x · y + r)^d
    Polynomial { degree: usize, gamma: f64, coef0: f64 },
    /// Radial Basis Function (Gaussian): K(x, y) = exp(-γ * ||x - y||²)
    RBF { gamma: f64 },
    /// Sigmoid kernel: K(x, y) = tanh(γ * x · y + r)
    Sigmoid { gamma: f64, coef0: f64 },
}

impl Default for KernelType {
    fn default() -> Self {
        KernelType::RBF { gamma: 1.0 }
    }
}

impl KernelType {
    fn evaluate(&self, a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
        match self {
            KernelType::Linear => a.dot(&b),
            KernelType::Polynomial { degree, gamma, coef0 } => {
                (*gamma * a.dot(&b) + coef0).powi((*degree).min(i32::MAX as usize) as i32)
            }
            KernelType::RBF { gamma } => {
                let norm_sq: f64 = a.iter().zip(b.iter()).map(|(p, q)| (p - q) * (p - q)).sum();
                (-gamma * norm_sq).exp()
            }
            KernelType::Sigmoid { gamma, coef0 } => (*gamma * a.dot(&b) + coef0).tanh(),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            KernelType::Linear => "linear",
            KernelType::Polynomial { .. } => "poly",
            KernelType::RBF { .. } => "rbf",
            KernelType::Sigmoid { .. } => "sigmoid",
        }
    }

    fn gamma(&self) -> Option<f64> {
        match self {
            KernelType::Linear => None,
            KernelType::Polynomial { gamma, .. }
            | KernelType::RBF { gamma }
            | KernelType::Sigmoid { gamma, .. } => Some(*gamma),
        }
    }
}

/// SVM configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SVMConfig {
    /// Regularization parameter (C)
    pub c: f64,
    /// Kernel function
    pub kernel: KernelType,
    /// Tolerance for stopping criterion
    pub tol: f64,
    /// Maximum number of passes over the training set
    pub max_iter: usize,
    /// Random seed
    pub random_state: Option<u64>,
}

impl Default for SVMConfig {
    fn default() -> Self {
        Self {
            c: 1.0,
            kernel: KernelType::RBF { gamma: 1.0 },
            tol: 1e-3,
            max_iter: 1000,
            random_state: Some(42),
        }
    }
}

impl SVMConfig {
    /// Return a copy of this configuration with `params` applied.
    ///
    /// Recognized names: `C`, `gamma`, `kernel` (`linear`, `poly`, `rbf`,
    /// `sigmoid`), `degree`, `coef0`. `kernel` is applied first so `gamma`,
    /// `degree` and `coef0` land on the selected kernel regardless of order.
    pub fn with_params(&self, params: &ParamSet) -> Result<Self> {
        let mut config = self.clone();

        if let Some(value) = params.get("kernel") {
            let name = value.as_text().ok_or_else(|| invalid("kernel", value, "expected a kernel name"))?;
            let gamma = config.kernel.gamma().unwrap_or(1.0);
            config.kernel = match name {
                "linear" => KernelType::Linear,
                "rbf" => KernelType::RBF { gamma },
                "poly" => KernelType::Polynomial { degree: 3, gamma, coef0: 0.0 },
                "sigmoid" => KernelType::Sigmoid { gamma, coef0: 0.0 },
                _ => return Err(invalid("kernel", value, "expected linear, poly, rbf or sigmoid")),
            };
        }

        for (name, value) in params.iter() {
            match name {
                "kernel" => {}
                "C" => {
                    let c = value.as_f64().ok_or_else(|| invalid(name, value, "expected a number"))?;
                    if !(c > 0.0 && c.is_finite()) {
                        return Err(invalid(name, value, "must be positive"));
                    }
                    config.c = c;
                }
                "gamma" => {
                    let g = value.as_f64().ok_or_else(|| invalid(name, value, "expected a number"))?;
                    if !(g > 0.0 && g.is_finite()) {
                        return Err(invalid(name, value, "must be positive"));
                    }
                    match &mut config.kernel {
                        KernelType::Linear => {
                            return Err(invalid(name, value, "linear kernel has no gamma"));
                        }
                        KernelType::Polynomial { gamma, .. }
                        | KernelType::RBF { gamma }
                        | KernelType::Sigmoid { gamma, .. } => *gamma = g,
                    }
                }
                "degree" => {
                    let d = value.as_i64().ok_or_else(|| invalid(name, value, "expected an integer"))?;
                    match &mut config.kernel {
                        KernelType::Polynomial { degree, .. } if d >= 1 => *degree = d as usize,
                        KernelType::Polynomial { .. } => {
                            return Err(invalid(name, value, "must be at least 1"));
                        }
                        _ => return Err(invalid(name, value, "only the poly kernel has a degree")),
                    }
                }
                "coef0" => {
                    let r = value.as_f64().ok_or_else(|| invalid(name, value, "expected a number"))?;
                    match &mut config.kernel {
                        KernelType::Polynomial { coef0, .. } | KernelType::Sigmoid { coef0, .. } => {
                            *coef0 = r
                        }
                        _ => return Err(invalid(name, value, "only poly and sigmoid kernels have coef0")),
                    }
                }
                _ => return Err(invalid(name, value, "not a parameter of the SVM classifier")),
            }
        }

        Ok(config)
    }

    /// Short human-readable description, e.g. `rbf(C=10, gamma=0.01)`
    pub fn describe(&self) -> String {
        match self.kernel.gamma() {
            Some(g) => format!("{}(C={}, gamma={})", self.kernel.name(), self.c, g),
            None => format!("{}(C={})", self.kernel.name(), self.c),
        }
    }
}

fn invalid(name: &str, value: &ParamValue, reason: &str) -> NestError {
    NestError::InvalidParameter {
        name: name.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

impl Estimator for SVMConfig {
    type Model = SVMClassifier;

    fn build(&self, params: &ParamSet) -> Result<SVMClassifier> {
        Ok(SVMClassifier::new(self.with_params(params)?))
    }
}

/// Support Vector Classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SVMClassifier {
    config: SVMConfig,
    /// Support vectors
    support_vectors: Option<Array2<f64>>,
    /// Alpha coefficients (Lagrange multipliers) times the ±1 label
    dual_coef: Option<Array1<f64>>,
    /// Bias term
    bias: f64,
    /// The two class labels, sorted; the second is the positive class
    classes: Vec<i64>,
    is_fitted: bool,
}

impl SVMClassifier {
    /// Create a new SVM classifier
    pub fn new(config: SVMConfig) -> Self {
        Self {
            config,
            support_vectors: None,
            dual_coef: None,
            bias: 0.0,
            classes: Vec::new(),
            is_fitted: false,
        }
    }

    pub fn config(&self) -> &SVMConfig {
        &self.config
    }

    /// Fit the classifier on binary labels
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        if x.nrows() != y.len() {
            return Err(NestError::ShapeError {
                expected: format!("{} labels", x.nrows()),
                actual: format!("{} labels", y.len()),
            });
        }
        if x.nrows() == 0 {
            return Err(NestError::InvalidInput("cannot fit on zero samples".to_string()));
        }

        // Validate that all labels are integral values (no silent truncation)
        for (i, &v) in y.iter().enumerate() {
            if !v.is_finite() || (v - v.round()).abs() > 1e-9 {
                return Err(NestError::InvalidInput(
                    format!("SVM classifier requires integer class labels, but sample {} has label {}", i, v)
                ));
            }
        }

        let mut classes: Vec<i64> = y.iter().map(|&v| v.round() as i64).collect();
        classes.sort_unstable();
        classes.dedup();

        if classes.len() != 2 {
            return Err(NestError::InvalidInput(format!(
                "SVM classifier requires exactly 2 distinct classes, found {}",
                classes.len()
            )));
        }

        let positive = classes[1];
        let y_signed: Array1<f64> = y.mapv(|v| if v.round() as i64 == positive { 1.0 } else { -1.0 });

        let (alphas, bias) = self.smo_train(x, &y_signed)?;

        let support_indices: Vec<usize> = alphas
            .iter()
            .enumerate()
            .filter(|(_, &a)| a > 1e-8)
            .map(|(i, _)| i)
            .collect();

        let mut support_vectors = Array2::zeros((support_indices.len(), x.ncols()));
        let mut dual_coef = Array1::zeros(support_indices.len());
        for (row, &idx) in support_indices.iter().enumerate() {
            support_vectors.row_mut(row).assign(&x.row(idx));
            dual_coef[row] = alphas[idx] * y_signed[idx];
        }

        self.support_vectors = Some(support_vectors);
        self.dual_coef = Some(dual_coef);
        self.bias = bias;
        self.classes = classes;
        self.is_fitted = true;
        Ok(())
    }

    /// SMO training algorithm, returns `(alphas, bias)`
    fn smo_train(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<(Array1<f64>, f64)> {
        let n = x.nrows();

        if n > MAX_KERNEL_MATRIX_SAMPLES {
            return Err(NestError::InvalidInput(
                format!(
                    "Dataset has {} samples, exceeding the maximum {} for SVM kernel matrix. \
                     Consider subsampling.",
                    n, MAX_KERNEL_MATRIX_SAMPLES
                )
            ));
        }

        let c = self.config.c;
        let tol = self.config.tol;
        let k = self.compute_kernel_matrix(x);
        if k.iter().any(|v| !v.is_finite()) {
            return Err(NestError::TrainingError(
                "kernel matrix contains NaN or infinite values".to_string(),
            ));
        }

        let mut alphas: Array1<f64> = Array1::zeros(n);
        let mut bias = 0.0;
        // f[i] = Σ_k alpha_k y_k K(k, i), kept in sync with every alpha update
        let mut f: Array1<f64> = Array1::zeros(n);

        let mut rng = match self.config.random_state {
            Some(seed) => Xoshiro256PlusPlus::seed_from_u64(seed),
            None => Xoshiro256PlusPlus::from_entropy(),
        };

        let mut quiet_passes = 0;
        let mut total_iter = 0;

        while n > 1 && quiet_passes < MAX_QUIET_PASSES && total_iter < self.config.max_iter {
            let mut num_changed = 0;

            for i in 0..n {
                let e_i = f[i] + bias - y[i];

                // Check KKT conditions
                if !((y[i] * e_i < -tol && alphas[i] < c) || (y[i] * e_i > tol && alphas[i] > 0.0)) {
                    continue;
                }

                let j = loop {
                    let j = rng.gen_range(0..n);
                    if j != i { break j; }
                };
                let e_j = f[j] + bias - y[j];

                let alpha_i_old = alphas[i];
                let alpha_j_old = alphas[j];

                let (l, h) = if y[i] != y[j] {
                    ((alpha_j_old - alpha_i_old).max(0.0), (c + alpha_j_old - alpha_i_old).min(c))
                } else {
                    ((alpha_i_old + alpha_j_old - c).max(0.0), (alpha_i_old + alpha_j_old).min(c))
                };
                if (l - h).abs() < 1e-10 {
                    continue;
                }

                let eta = 2.0 * k[[i, j]] - k[[i, i]] - k[[j, j]];
                if eta >= 0.0 {
                    continue;
                }

                let alpha_j_new = (alpha_j_old - y[j] * (e_i - e_j) / eta).max(l).min(h);
                if (alpha_j_new - alpha_j_old).abs() < 1e-5 {
                    continue;
                }
                let alpha_i_new = alpha_i_old + y[i] * y[j] * (alpha_j_old - alpha_j_new);

                let delta_i = y[i] * (alpha_i_new - alpha_i_old);
                let delta_j = y[j] * (alpha_j_new - alpha_j_old);

                let b1 = bias - e_i - delta_i * k[[i, i]] - delta_j * k[[i, j]];
                let b2 = bias - e_j - delta_i * k[[i, j]] - delta_j * k[[j, j]];

                bias = if alpha_i_new > 0.0 && alpha_i_new < c {
                    b1
                } else if alpha_j_new > 0.0 && alpha_j_new < c {
                    b2
                } else {
                    (b1 + b2) / 2.0
                };

                alphas[i] = alpha_i_new;
                alphas[j] = alpha_j_new;
                for t in 0..n {
                    f[t] += delta_i * k[[i, t]] + delta_j * k[[j, t]];
                }

                num_changed += 1;
            }

            total_iter += 1;
            if num_changed == 0 {
                quiet_passes += 1;
            } else {
                quiet_passes = 0;
            }
        }

        if !bias.is_finite() || alphas.iter().any(|a| !a.is_finite()) {
            return Err(NestError::TrainingError(
                "SMO produced non-finite dual coefficients".to_string(),
            ));
        }

        Ok((alphas, bias))
    }

    /// Compute kernel matrix (parallelized for large datasets)
    fn compute_kernel_matrix(&self, x: &Array2<f64>) -> Array2<f64> {
        let n = x.nrows();
        let kernel = &self.config.kernel;
        let mut k = Array2::zeros((n, n));

        // For small matrices, sequential is faster due to overhead
        if n < 100 {
            for i in 0..n {
                for j in i..n {
                    let val = kernel.evaluate(x.row(i), x.row(j));
                    k[[i, j]] = val;
                    k[[j, i]] = val;
                }
            }
            return k;
        }

        let rows: Vec<Vec<f64>> = (0..n)
            .into_par_iter()
            .map(|i| (i..n).map(|j| kernel.evaluate(x.row(i), x.row(j))).collect())
            .collect();

        for (i, row_vals) in rows.into_iter().enumerate() {
            for (offset, val) in row_vals.into_iter().enumerate() {
                let j = i + offset;
                k[[i, j]] = val;
                k[[j, i]] = val;
            }
        }
        k
    }

    /// Signed distance to the separating surface; positive means the second class
    pub fn decision_function(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if !self.is_fitted {
            return Err(NestError::ModelNotFitted);
        }
        let (sv, dual_coef) = match (&self.support_vectors, &self.dual_coef) {
            (Some(sv), Some(coef)) => (sv, coef),
            _ => return Err(NestError::ModelNotFitted),
        };
        if x.ncols() != sv.ncols() {
            return Err(NestError::ShapeError {
                expected: format!("{} features", sv.ncols()),
                actual: format!("{} features", x.ncols()),
            });
        }

        let scores = x
            .rows()
            .into_iter()
            .map(|sample| {
                sv.rows()
                    .into_iter()
                    .zip(dual_coef.iter())
                    .map(|(v, &coef)| coef * self.config.kernel.evaluate(sample, v))
                    .sum::<f64>()
                    + self.bias
            })
            .collect();

        Ok(scores)
    }

    /// Predict class labels
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let scores = self.decision_function(x)?;
        let (neg, pos) = (self.classes[0] as f64, self.classes[1] as f64);
        Ok(scores.mapv(|s| if s >= 0.0 { pos } else { neg }))
    }

    /// Get number of support vectors
    pub fn n_support_vectors(&self) -> usize {
        self.support_vectors.as_ref().map(|sv| sv.nrows()).unwrap_or(0)
    }

    pub fn classes(&self) -> &[i64] {
        &self.classes
    }
}

impl Classifier for SVMClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        SVMClassifier::fit(self, x, y)
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        SVMClassifier::predict(self, x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::training::models::accuracy;

    fn create_linear_separable_data() -> (Array2<f64>, Array1<f64>) {
        // Simple linearly separable data
        let x = Array2::from_shape_vec((10, 2), vec![
            1.0, 1.0,
            1.5, 1.2,
            2.0, 2.0,
            1.2, 1.8,
            0.8, 1.5,
            5.0, 5.0,
            5.5, 5.2,
            6.0, 6.0,
            5.2, 5.8,
            4.8, 5.5,
        ]).unwrap();

        let y = Array1::from_vec(vec![0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0, 1.0]);

        (x, y)
    }

    #[test]
    fn test_svm_classifier_linear() {
        let (x, y) = create_linear_separable_data();

        let config = SVMConfig {
            c: 1.0,
            kernel: KernelType::Linear,
            ..Default::default()
        };

        let mut svm = SVMClassifier::new(config);
        svm.fit(&x, &y).unwrap();

        let predictions = svm.predict(&x).unwrap();
        let acc = accuracy(&y, &predictions).unwrap();
        assert!(acc > 0.8, "Accuracy {} should be > 0.8", acc);
        assert!(svm.n_support_vectors() > 0);
    }

    #[test]
    fn test_svm_classifier_rbf() {
        let (x, y) = create_linear_separable_data();

        let config = SVMConfig {
            c: 10.0,
            kernel: KernelType::RBF { gamma: 0.5 },
            ..Default::default()
        };

        let mut svm = SVMClassifier::new(config);
        svm.fit(&x, &y).unwrap();

        let predictions = svm.predict(&x).unwrap();
        assert_eq!(predictions.len(), 10);
        assert_eq!(accuracy(&y, &predictions).unwrap(), 1.0);
    }

    #[test]
    fn test_svm_keeps_original_labels() {
        let (x, _) = create_linear_separable_data();
        let y = Array1::from_vec(vec![3.0, 3.0, 3.0, 3.0, 3.0, 7.0, 7.0, 7.0, 7.0, 7.0]);

        let mut svm = SVMClassifier::new(SVMConfig::default());
        svm.fit(&x, &y).unwrap();

        assert_eq!(svm.classes(), &[3, 7]);
        for p in svm.predict(&x).unwrap().iter() {
            assert!(*p == 3.0 || *p == 7.0);
        }
    }

    #[test]
    fn test_svm_deterministic_with_seed() {
        let (x, y) = create_linear_separable_data();
        let mut a = SVMClassifier::new(SVMConfig::default());
        let mut b = SVMClassifier::new(SVMConfig::default());
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();
        assert_eq!(a.decision_function(&x).unwrap(), b.decision_function(&x).unwrap());
    }

    #[test]
    fn test_svm_rejects_single_class() {
        let (x, _) = create_linear_separable_data();
        let y = Array1::zeros(10);
        let mut svm = SVMClassifier::new(SVMConfig::default());
        assert!(matches!(svm.fit(&x, &y), Err(NestError::InvalidInput(_))));
    }

    #[test]
    fn test_svm_rejects_fractional_labels() {
        let (x, mut y) = create_linear_separable_data();
        y[0] = 0.5;
        let mut svm = SVMClassifier::new(SVMConfig::default());
        assert!(svm.fit(&x, &y).is_err());
    }

    #[test]
    fn test_svm_rejects_nan_label() {
        let (x, mut y) = create_linear_separable_data();
        y[3] = f64::NAN;
        let mut svm = SVMClassifier::new(SVMConfig::default());
        assert!(matches!(svm.fit(&x, &y), Err(NestError::InvalidInput(_))));
    }

    #[test]
    fn test_svm_overflowing_kernel_is_training_error() {
        let x = Array2::from_shape_vec((4, 1), vec![1e200, 2e200, -1e200, -2e200]).unwrap();
        let y = Array1::from_vec(vec![1.0, 1.0, 0.0, 0.0]);
        let mut svm = SVMClassifier::new(SVMConfig {
            kernel: KernelType::Linear,
            ..SVMConfig::default()
        });
        assert!(matches!(svm.fit(&x, &y), Err(NestError::TrainingError(_))));
    }

    #[test]
    fn test_predict_before_fit() {
        let (x, _) = create_linear_separable_data();
        let svm = SVMClassifier::new(SVMConfig::default());
        assert!(matches!(svm.predict(&x), Err(NestError::ModelNotFitted)));
    }

    #[test]
    fn test_with_params() {
        let params = ParamSet::from_pairs(vec![
            ("C", ParamValue::Float(10.0)),
            ("gamma", ParamValue::Float(0.01)),
        ]);
        let config = SVMConfig::default().with_params(&params).unwrap();
        assert_eq!(config.c, 10.0);
        assert_eq!(config.kernel, KernelType::RBF { gamma: 0.01 });
        assert_eq!(config.describe(), "rbf(C=10, gamma=0.01)");
    }

    #[test]
    fn test_with_params_kernel_switch_any_order() {
        let params = ParamSet::from_pairs(vec![
            ("degree", ParamValue::Int(2)),
            ("kernel", ParamValue::Text("poly".to_string())),
        ]);
        let config = SVMConfig::default().with_params(&params).unwrap();
        assert_eq!(config.kernel, KernelType::Polynomial { degree: 2, gamma: 1.0, coef0: 0.0 });
    }

    #[test]
    fn test_with_params_rejects_unknown_and_bad_values() {
        let unknown = ParamSet::from_pairs(vec![("alpha", ParamValue::Float(1.0))]);
        assert!(matches!(
            SVMConfig::default().with_params(&unknown),
            Err(NestError::InvalidParameter { .. })
        ));

        let negative = ParamSet::from_pairs(vec![("C", ParamValue::Float(-1.0))]);
        assert!(SVMConfig::default().with_params(&negative).is_err());

        let linear_gamma = ParamSet::from_pairs(vec![
            ("kernel", ParamValue::Text("linear".to_string())),
            ("gamma", ParamValue::Float(0.1)),
        ]);
        assert!(SVMConfig::default().with_params(&linear_gamma).is_err());
    }
}
