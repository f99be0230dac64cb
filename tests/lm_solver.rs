//! The solver on plain least-squares problems, independent of circuits.

use approx::assert_relative_eq;
use ndarray::{array, Array1};
use zfit_rs::lm::{ConvergenceStatus, LevenbergMarquardt, LmConfig};
use zfit_rs::{Problem, Result, ZFitError};

/// Rosenbrock as residuals: r = [10 (y - x²), 1 - x]
struct Rosenbrock;

impl Problem for Rosenbrock {
    fn eval(&self, p: &Array1<f64>) -> Result<Array1<f64>> {
        Ok(array![10.0 * (p[1] - p[0] * p[0]), 1.0 - p[0]])
    }

    fn parameter_count(&self) -> usize {
        2
    }

    fn residual_count(&self) -> usize {
        2
    }
}

/// y = a exp(-k x) + c
struct Exponential {
    x: Array1<f64>,
    y: Array1<f64>,
}

impl Exponential {
    fn new(a: f64, k: f64, c: f64) -> Self {
        let x = Array1::linspace(0.0, 4.75, 20);
        let y = x.mapv(|x| a * (-k * x).exp() + c);
        Self { x, y }
    }
}

impl Problem for Exponential {
    fn eval(&self, p: &Array1<f64>) -> Result<Array1<f64>> {
        Ok(self.x.mapv(|x| p[0] * (-p[1] * x).exp() + p[2]) - &self.y)
    }

    fn parameter_count(&self) -> usize {
        3
    }

    fn residual_count(&self) -> usize {
        self.x.len()
    }
}

/// Goes non-finite for negative parameters.
struct SquareRoot;

impl Problem for SquareRoot {
    fn eval(&self, p: &Array1<f64>) -> Result<Array1<f64>> {
        let r = p[0].sqrt() - 3.0;
        if !r.is_finite() {
            return Err(ZFitError::Numerical {
                message: "sqrt of a negative number".to_string(),
                parameters: p.to_vec(),
            });
        }
        Ok(array![r])
    }

    fn parameter_count(&self) -> usize {
        1
    }

    fn residual_count(&self) -> usize {
        1
    }
}

#[test]
fn test_rosenbrock() {
    let result = LevenbergMarquardt::new()
        .minimize(&Rosenbrock, array![-1.2, 1.0])
        .unwrap();

    assert!(result.success, "{}", result);
    assert_relative_eq!(result.params[0], 1.0, epsilon = 1e-8);
    assert_relative_eq!(result.params[1], 1.0, epsilon = 1e-8);
    assert!(result.iterations > 0);
}

#[test]
fn test_exponential_decay() {
    let problem = Exponential::new(3.0, 0.7, 0.5);
    let result = LevenbergMarquardt::new()
        .minimize(&problem, array![1.0, 0.1, 0.0])
        .unwrap();

    assert!(result.success, "{}", result);
    assert_relative_eq!(result.params[0], 3.0, epsilon = 1e-8);
    assert_relative_eq!(result.params[1], 0.7, epsilon = 1e-8);
    assert_relative_eq!(result.params[2], 0.5, epsilon = 1e-8);

    let jac = result.jacobian.unwrap();
    assert_eq!(jac.shape(), &[20, 3]);
    // d r / d c is one everywhere
    for i in 0..20 {
        assert_relative_eq!(jac[[i, 2]], 1.0, epsilon = 1e-6);
    }
}

#[test]
fn test_evaluation_cap() {
    let solver = LevenbergMarquardt::with_config(LmConfig {
        max_evaluations: 10,
        ..LmConfig::default()
    })
    .with_calc_jacobian(false);
    let result = solver.minimize(&Rosenbrock, array![-1.2, 1.0]).unwrap();

    assert!(!result.success);
    assert_eq!(result.status, ConvergenceStatus::MaxEvaluationsReached);
    assert!(result.func_evals <= 10);
    assert!(result.cost < result.initial_cost);
    assert!(result.jacobian.is_none());
}

#[test]
fn test_numerical_error_propagates() {
    let err = LevenbergMarquardt::new()
        .minimize(&SquareRoot, array![-4.0])
        .unwrap_err();
    match err {
        ZFitError::Numerical { parameters, .. } => assert_eq!(parameters, vec![-4.0]),
        other => panic!("expected a numerical error, got {:?}", other),
    }
}

#[test]
fn test_builder_overrides_config() {
    let solver = LevenbergMarquardt::new()
        .with_ftol(1e-6)
        .with_xtol(1e-7)
        .with_gtol(1e-8)
        .with_lambda(1.0)
        .with_max_evaluations(42);
    let config = solver.config();
    assert_eq!(config.ftol, 1e-6);
    assert_eq!(config.xtol, 1e-7);
    assert_eq!(config.gtol, 1e-8);
    assert_eq!(config.initial_lambda, 1.0);
    assert_eq!(config.max_evaluations, 42);
}
