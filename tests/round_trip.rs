//! Fitting noiseless synthetic data recovers the parameters it was made from.

mod common;

use approx::assert_relative_eq;
use common::{assert_recovers, synthetic_spectrum};
use ndarray::Array1;
use num_complex::Complex64;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use zfit_rs::models::{self, ModelRegistry};
use zfit_rs::parameters::ParameterSpec;
use zfit_rs::{fit, CircuitModel, ConvergenceStatus, ModelPlugin, TargetSpectrum};

const TOL: f64 = 1e-4;

#[test]
fn test_parallel_rc_scenario() {
    let model = models::cpr().unwrap();
    let truth = [1000.0, 10e-12];

    let z = model.evaluate_hz(&Array1::from_vec(vec![1e6]), &Array1::from_vec(truth.to_vec()))[0];
    let y = Complex64::new(1e-3, 2.0 * std::f64::consts::PI * 1e6 * 10e-12);
    let expected = y.inv();
    assert_relative_eq!(z.re, expected.re, max_relative = 1e-12);
    assert_relative_eq!(z.im, expected.im, max_relative = 1e-12);
    assert_relative_eq!(z.arg().to_degrees(), -3.6, epsilon = 0.01);

    // The defaults are the truth here, so the first evaluation is exact
    let spectrum = synthetic_spectrum(&model, &truth, 3.0, 8.0, 50);
    let result = fit(&model, &spectrum).unwrap();
    assert_eq!(result.status, ConvergenceStatus::ExactFit);
    assert_recovers(&result, &truth, TOL);
}

#[test]
fn test_round_trip_lumped() {
    let cases: Vec<(CircuitModel, Vec<f64>, (f64, f64))> = vec![
        (models::cpr().unwrap(), vec![2500.0, 4.7e-11], (3.0, 8.0)),
        (models::lsr().unwrap(), vec![50.0, 3e-6], (3.0, 7.0)),
        (models::lsr_skin().unwrap(), vec![2e-6, 0.2, 2e-4], (3.0, 7.0)),
        (models::ls_cpr().unwrap(), vec![2e-6, 20e-12, 1500.0], (3.0, 8.0)),
        (
            models::lsrs_cpr().unwrap(),
            vec![150e-9, 0.3, 2e-9, 150.0],
            (3.0, 8.0),
        ),
        (
            models::csr_p_lsr().unwrap(),
            vec![2e-3, 12e-12, 1.5e-3, 1.2e-6],
            (5.0, 9.0),
        ),
    ];

    for (model, truth, (lo, hi)) in cases {
        let spectrum = synthetic_spectrum(&model, &truth, lo, hi, 50);
        let result = fit(&model, &spectrum).unwrap();
        assert_recovers(&result, &truth, TOL);
    }
}

#[test]
fn test_round_trip_parallel_branches() {
    let cases: Vec<(CircuitModel, Vec<f64>, (f64, f64), usize)> = vec![
        (
            models::rpcp_lsr().unwrap(),
            vec![1500.0, 12e-12, 1.3e-6, 80e-3],
            (4.0, 9.0),
            50,
        ),
        (
            models::xdcr2().unwrap(),
            vec![120.0, 220e-12, 90.0, 180e-12, 40e-6, 25.0, 280e-12, 22e-6],
            (5.0, 7.0),
            80,
        ),
    ];

    for (model, truth, (lo, hi), n) in cases {
        let spectrum = synthetic_spectrum(&model, &truth, lo, hi, n);
        let result = fit(&model, &spectrum).unwrap();
        assert_recovers(&result, &truth, TOL);
    }
}

#[test]
fn test_round_trip_milliohm_series_resistance() {
    // Rc is pushed far below its milliohm truth on the way, so its
    // derivative has to survive the parameter getting tiny
    let model = models::rp_csr_p_lsr().unwrap();
    let truth = [80e3, 2e-3, 12e-12, 1.5e-2, 1.2e-6];
    let spectrum = synthetic_spectrum(&model, &truth, 4.0, 9.0, 50);

    let result = fit(&model, &spectrum).unwrap();
    assert_recovers(&result, &truth, TOL);
    assert!(result.cost < 1e-12, "cost {:e}", result.cost);
}

#[test]
fn test_round_trip_electrochemical() {
    let cases: Vec<(CircuitModel, Vec<f64>)> = vec![
        (models::r_cr().unwrap(), vec![800.0, 2e-6, 5e4]),
        (models::r_q_rw().unwrap(), vec![450.0, 4e-6, 0.85, 8e4, 6e3]),
        (models::r_c_rw().unwrap(), vec![420.0, 2.2e-6, 1.3e5, 4e4]),
    ];

    for (model, truth) in cases {
        let spectrum = synthetic_spectrum(&model, &truth, -2.0, 5.0, 50);
        let result = fit(&model, &spectrum).unwrap();
        assert_recovers(&result, &truth, TOL);
    }
}

#[test]
fn test_round_trip_skin_effect_line() {
    let model = models::trans_line1().unwrap();
    let truth = [750e-9, 180e-9, 450e-3, 45e-12, 2e-6];
    let spectrum = synthetic_spectrum(&model, &truth, 4.0, 7.0, 60);
    let result = fit(&model, &spectrum).unwrap();
    assert_recovers(&result, &truth, TOL);
}

#[test]
fn test_round_trip_transmission_line() {
    let model = models::trans_line2().unwrap();
    let truth = [750e-9, 1.1, 45e-12, 45e-12];
    let spectrum = synthetic_spectrum(&model, &truth, 4.0, 6.7, 50);
    let result = fit(&model, &spectrum).unwrap();

    assert!(result.success, "{}", result.message);
    // The shunt conductance barely touches the impedance; check the rest
    for (k, expected) in truth.iter().enumerate().take(3) {
        assert_relative_eq!(result.fitted_parameters[k], *expected, max_relative = TOL);
    }
}

#[test]
fn test_every_builtin_fits_its_own_defaults() {
    let registry = ModelRegistry::builtin().unwrap();
    for name in registry.names() {
        let model = registry.get(name).unwrap();
        let defaults = model.parameter_spec().initial_values().to_vec();
        let spectrum = synthetic_spectrum(model.as_ref(), &defaults, 2.0, 7.0, 40);

        let result = fit(model.as_ref(), &spectrum).unwrap();
        assert_eq!(result.status, ConvergenceStatus::ExactFit, "{}", name);
        assert_eq!(result.function_evaluations, 1 + defaults.len(), "{}", name);
        assert_eq!(result.fitted_parameters.to_vec(), defaults, "{}", name);
    }
}

#[test]
fn test_penalty_pulls_start_back_into_bounds() {
    let spec = ParameterSpec::from_tuples(&[
        ("R", -200.0, (0.0, f64::INFINITY)),
        ("C", 1e-11, (1e-12, f64::INFINITY)),
    ])
    .unwrap();
    let model = CircuitModel::new("cpr_negative_start", spec, 1e3, |w, p| {
        Complex64::new(1.0 / p[0], w * p[1]).inv()
    })
    .unwrap();

    let truth = [2500.0, 4.7e-11];
    let spectrum = synthetic_spectrum(&model, &truth, 3.0, 8.0, 50);
    let result = fit(&model, &spectrum).unwrap();
    assert_recovers(&result, &truth, TOL);
}

#[test]
fn test_penalty_holds_parameter_at_bound() {
    // The data wants R = 2500 but the bound stops it at 2000
    let spec = ParameterSpec::from_tuples(&[
        ("R", 1000.0, (0.0, 2000.0)),
        ("C", 1e-11, (1e-12, f64::INFINITY)),
    ])
    .unwrap();
    let model = CircuitModel::new("cpr_capped", spec, 1e3, |w, p| {
        Complex64::new(1.0 / p[0], w * p[1]).inv()
    })
    .unwrap();

    let spectrum = synthetic_spectrum(&model, &[2500.0, 4.7e-11], 3.0, 8.0, 50);
    let result = fit(&model, &spectrum).unwrap();

    assert!(result.success, "{}", result.message);
    assert_relative_eq!(result.parameter("R").unwrap(), 2000.0, max_relative = 1e-6);
    assert_eq!(result.diagnostics.residuals.len(), 2 * 50 + 2);
}

#[test]
fn test_noisy_data() {
    let model = models::cpr().unwrap();
    let truth = [2500.0, 4.7e-11];
    let clean = synthetic_spectrum(&model, &truth, 3.0, 8.0, 50);

    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let noisy: Array1<Complex64> = clean
        .impedance
        .iter()
        .map(|z| *z * (1.0 + rng.gen_range(-1e-3..1e-3)))
        .collect();
    let spectrum = TargetSpectrum::new(clean.frequencies_hz.clone(), noisy).unwrap();

    let result = fit(&model, &spectrum).unwrap();
    assert!(result.success, "{}", result.message);
    assert!(result.cost > 0.0);
    assert_relative_eq!(result.fitted_parameters[0], truth[0], max_relative = 1e-2);
    assert_relative_eq!(result.fitted_parameters[1], truth[1], max_relative = 1e-2);
}
