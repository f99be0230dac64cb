//! Fit orchestration: bind a model to a spectrum, run the solver, package
//! the outcome.
//!
//! ```
//! use ndarray::Array1;
//! use zfit_rs::models;
//! use zfit_rs::{fit, ModelPlugin, TargetSpectrum};
//!
//! let model = models::cpr().unwrap();
//! let freq = Array1::logspace(10.0, 3.0, 7.0, 40);
//! let z = model.evaluate_hz(&freq, &ndarray::array![2500.0, 4.7e-11]);
//! let spectrum = TargetSpectrum::new(freq, z).unwrap();
//!
//! let result = fit(&model, &spectrum).unwrap();
//! assert!(result.success);
//! assert!((result.parameter("R").unwrap() - 2500.0).abs() < 1e-3);
//! ```

use ndarray::{Array1, Array2};
use serde::Serialize;

use crate::error::{Result, ZFitError};
use crate::lm::{ConvergenceStatus, LevenbergMarquardt, LmConfig, LmResult};
use crate::model::ModelPlugin;
use crate::residual::ImpedanceProblem;
use crate::spectrum::TargetSpectrum;

/// Solver internals kept for covariance estimation and debugging.
#[derive(Debug, Clone, Serialize)]
pub struct SolverDiagnostics {
    /// Combined data and penalty residuals at the solution, length `2N + P`
    pub residuals: Array1<f64>,

    /// Jacobian of the combined residuals at the solution, if computed
    pub jacobian: Option<Array2<f64>>,

    /// Sum of squared residuals at the initial guess
    pub initial_cost: f64,
}

/// Outcome of one fit.
#[derive(Debug, Clone, Serialize)]
pub struct FitResult {
    /// Name of the fitted model
    pub model: String,

    /// Parameter names in model order
    pub parameter_names: Vec<String>,

    /// Best parameter vector found, in model order
    pub fitted_parameters: Array1<f64>,

    /// Whether the solver met one of its tolerances
    pub success: bool,

    /// Solver termination message
    pub message: String,

    pub status: ConvergenceStatus,

    /// Residual evaluations spent, Jacobian columns included
    pub function_evaluations: usize,

    /// Accepted solver steps
    pub iterations: usize,

    /// Sum of squared combined residuals at the solution
    pub cost: f64,

    pub diagnostics: SolverDiagnostics,
}

impl FitResult {
    fn from_lm(model: &str, parameter_names: Vec<String>, lm: LmResult) -> Self {
        Self {
            model: model.to_string(),
            parameter_names,
            fitted_parameters: lm.params,
            success: lm.success,
            message: lm.message,
            status: lm.status,
            function_evaluations: lm.func_evals,
            iterations: lm.iterations,
            cost: lm.cost,
            diagnostics: SolverDiagnostics {
                residuals: lm.residuals,
                jacobian: lm.jacobian,
                initial_cost: lm.initial_cost,
            },
        }
    }

    /// Fitted value of a parameter by name.
    pub fn parameter(&self, name: &str) -> Option<f64> {
        self.parameter_names
            .iter()
            .position(|n| n == name)
            .map(|i| self.fitted_parameters[i])
    }

    /// `(name, value)` pairs in model order.
    pub fn named_parameters(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.parameter_names
            .iter()
            .map(String::as_str)
            .zip(self.fitted_parameters.iter().copied())
    }

    /// Accept only a converged fit.
    ///
    /// # Errors
    ///
    /// * `ZFitError::ConvergenceWarning` if the solver stopped on its
    ///   evaluation cap or damping ceiling
    pub fn into_converged(self) -> Result<Self> {
        if self.success {
            Ok(self)
        } else {
            Err(ZFitError::ConvergenceWarning {
                message: self.message,
                evaluations: self.function_evaluations,
            })
        }
    }
}

/// Runs fits with a fixed solver configuration.
///
/// A `Fitter` holds no state between fits and can be shared across threads.
#[derive(Debug, Clone, Default)]
pub struct Fitter {
    config: LmConfig,
}

impl Fitter {
    /// A fitter with the default solver configuration.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: LmConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LmConfig {
        &self.config
    }

    /// Fit `model` to `spectrum`, starting from the model's initial guesses.
    ///
    /// Non-convergence is reported through `FitResult::success`, not as an
    /// error.
    ///
    /// # Errors
    ///
    /// * `ZFitError::InvalidInput` if the spectrum fails validation
    /// * `ZFitError::Configuration` if the model's penalty weight is invalid
    /// * `ZFitError::Numerical` if the model produced a non-finite impedance
    pub fn fit<M: ModelPlugin + ?Sized>(
        &self,
        model: &M,
        spectrum: &TargetSpectrum,
    ) -> Result<FitResult> {
        let spec = model.parameter_spec();
        let _span = tracing::info_span!(
            "impedance_fit",
            model = model.name(),
            n_points = spectrum.len(),
            n_params = spec.len()
        )
        .entered();

        let problem = ImpedanceProblem::new(model, spectrum)?;
        let lm = LevenbergMarquardt::with_config(self.config.clone())
            .minimize(&problem, spec.initial_values())?;

        if lm.success {
            tracing::debug!(
                status = ?lm.status,
                cost = lm.cost,
                evaluations = lm.func_evals,
                "fit converged"
            );
        } else {
            tracing::warn!(
                status = ?lm.status,
                cost = lm.cost,
                evaluations = lm.func_evals,
                "fit did not converge"
            );
        }

        Ok(FitResult::from_lm(model.name(), spec.names(), lm))
    }
}

/// Fit with the default solver configuration.
pub fn fit<M: ModelPlugin + ?Sized>(model: &M, spectrum: &TargetSpectrum) -> Result<FitResult> {
    Fitter::new().fit(model, spectrum)
}
