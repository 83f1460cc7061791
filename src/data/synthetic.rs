//! Seeded synthetic datasets

use super::Dataset;
use crate::error::{NestError, Result};
use ndarray::{Array1, Array2};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use std::f64::consts::PI;

/// Two interleaving half circles.
///
/// The first `n_samples / 2` points (rounded down) trace the upper moon with
/// label 0, the rest trace the lower moon with label 1. Gaussian noise with
/// standard deviation `noise` is added to both coordinates.
pub fn make_moons(n_samples: usize, noise: f64, seed: u64) -> Result<Dataset> {
    if n_samples < 2 {
        return Err(NestError::InvalidParameter {
            name: "n_samples".to_string(),
            value: n_samples.to_string(),
            reason: "need at least one sample per moon".to_string(),
        });
    }
    if noise < 0.0 || !noise.is_finite() {
        return Err(NestError::InvalidParameter {
            name: "noise".to_string(),
            value: noise.to_string(),
            reason: "must be a finite non-negative number".to_string(),
        });
    }

    let n_outer = n_samples / 2;
    let n_inner = n_samples - n_outer;
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let mut x = Array2::zeros((n_samples, 2));
    let mut y = Array1::zeros(n_samples);

    for i in 0..n_outer {
        let t = PI * i as f64 / (n_outer.max(2) - 1) as f64;
        x[[i, 0]] = t.cos();
        x[[i, 1]] = t.sin();
    }
    for i in 0..n_inner {
        let t = PI * i as f64 / (n_inner.max(2) - 1) as f64;
        let row = n_outer + i;
        x[[row, 0]] = 1.0 - t.cos();
        x[[row, 1]] = 0.5 - t.sin();
        y[row] = 1.0;
    }

    if noise > 0.0 {
        for v in x.iter_mut() {
            *v += noise * standard_normal(&mut rng);
        }
    }

    Dataset::new(
        "moons",
        vec!["x0".to_string(), "x1".to_string()],
        "label",
        x,
        y,
    )
}

/// Box-Muller transform
fn standard_normal<R: Rng>(rng: &mut R) -> f64 {
    let u1: f64 = rng.gen::<f64>().max(f64::MIN_POSITIVE);
    let u2: f64 = rng.gen();
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}
