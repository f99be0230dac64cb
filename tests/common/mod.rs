//! Shared helpers for the integration tests.
#![allow(dead_code)]

use ndarray::Array1;
use zfit_rs::{FitResult, ModelPlugin, TargetSpectrum};

/// Noiseless spectrum of `model` at `truth` on `n` log-spaced frequencies
/// from `10^lo_exp` to `10^hi_exp` Hz.
pub fn synthetic_spectrum<M: ModelPlugin + ?Sized>(
    model: &M,
    truth: &[f64],
    lo_exp: f64,
    hi_exp: f64,
    n: usize,
) -> TargetSpectrum {
    let freq = Array1::logspace(10.0, lo_exp, hi_exp, n);
    let z = model.evaluate_hz(&freq, &Array1::from_vec(truth.to_vec()));
    TargetSpectrum::new(freq, z).unwrap()
}

/// Assert every fitted parameter is within `tol` relative error of `truth`.
pub fn assert_recovers(result: &FitResult, truth: &[f64], tol: f64) {
    assert!(result.success, "{}: {}", result.model, result.message);
    for ((name, fitted), expected) in result.named_parameters().zip(truth) {
        let rel = ((fitted - expected) / expected).abs();
        assert!(
            rel < tol,
            "{}: {} = {} but expected {} (relative error {:e})",
            result.model,
            name,
            fitted,
            expected,
            rel
        );
    }
}
