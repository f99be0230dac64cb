//! Model plugin contract and the standard closure-backed implementation.
//!
//! A [`ModelPlugin`] describes one circuit topology: its ordered parameters,
//! a boundary-penalty weight, and a pure impedance function. The fitting
//! engine only ever goes through this trait, so any formula can take part
//! without the engine knowing what it computes.

use std::fmt;
use std::sync::Arc;

use ndarray::Array1;
use num_complex::Complex64;

use crate::error::{Result, ZFitError};
use crate::parameters::ParameterSpec;

/// A circuit topology that can be fitted to an impedance spectrum.
///
/// Implementations must be pure: `evaluate` may be called any number of
/// times with arbitrary trial vectors, including vectors outside the
/// declared bounds, and must not keep state between calls.
pub trait ModelPlugin: Send + Sync {
    /// Unique registry name, e.g. `"ls(cpr)"`.
    fn name(&self) -> &str;

    /// The ordered parameter declarations.
    fn parameter_spec(&self) -> &ParameterSpec;

    /// How hard bound violations are punished relative to the data residuals.
    fn penalty_weight(&self) -> f64;

    /// Impedance at each angular frequency (rad/s) for a parameter vector.
    ///
    /// `params` has exactly `parameter_spec().len()` entries in spec order.
    /// Results must be finite for every `omega > 0`.
    fn evaluate(&self, omega: &Array1<f64>, params: &Array1<f64>) -> Array1<Complex64>;

    /// Number of parameters.
    fn parameter_count(&self) -> usize {
        self.parameter_spec().len()
    }

    /// Evaluate on frequencies given in Hz, e.g. to report a fitted curve.
    fn evaluate_hz(&self, frequencies_hz: &Array1<f64>, params: &Array1<f64>) -> Array1<Complex64> {
        let omega = crate::residual::angular_frequencies(frequencies_hz);
        self.evaluate(&omega, params)
    }
}

/// Impedance of a circuit at a single angular frequency.
pub type ImpedanceFn = dyn Fn(f64, &[f64]) -> Complex64 + Send + Sync;

/// A [`ModelPlugin`] whose formula is evaluated point by point.
///
/// Immutable once built; cloning shares the formula.
#[derive(Clone)]
pub struct CircuitModel {
    name: String,
    description: String,
    spec: ParameterSpec,
    penalty_weight: f64,
    impedance: Arc<ImpedanceFn>,
}

impl CircuitModel {
    /// Create a model.
    ///
    /// # Arguments
    ///
    /// * `name` - Registry name
    /// * `spec` - Ordered parameter declarations
    /// * `penalty_weight` - Boundary penalty weight, finite and `> 0`
    /// * `impedance` - `Z(ω, params)` for one angular frequency
    ///
    /// # Errors
    ///
    /// * `ZFitError::Configuration` if the name is empty or the weight is not
    ///   a positive finite number
    pub fn new<F>(name: &str, spec: ParameterSpec, penalty_weight: f64, impedance: F) -> Result<Self>
    where
        F: Fn(f64, &[f64]) -> Complex64 + Send + Sync + 'static,
    {
        if name.trim().is_empty() {
            return Err(ZFitError::Configuration(
                "model name must not be empty".to_string(),
            ));
        }
        if !(penalty_weight.is_finite() && penalty_weight > 0.0) {
            return Err(ZFitError::Configuration(format!(
                "model '{}': penalty weight must be positive and finite, got {}",
                name, penalty_weight
            )));
        }

        Ok(Self {
            name: name.to_string(),
            description: String::new(),
            spec,
            penalty_weight,
            impedance: Arc::new(impedance),
        })
    }

    /// Attach a human-readable circuit description.
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Impedance at one angular frequency.
    pub fn impedance_at(&self, omega: f64, params: &[f64]) -> Complex64 {
        (self.impedance)(omega, params)
    }
}

impl ModelPlugin for CircuitModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn parameter_spec(&self) -> &ParameterSpec {
        &self.spec
    }

    fn penalty_weight(&self) -> f64 {
        self.penalty_weight
    }

    fn evaluate(&self, omega: &Array1<f64>, params: &Array1<f64>) -> Array1<Complex64> {
        let p = params.to_vec();
        omega.iter().map(|&w| (self.impedance)(w, &p)).collect()
    }
}

impl fmt::Debug for CircuitModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CircuitModel")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("spec", &self.spec)
            .field("penalty_weight", &self.penalty_weight)
            .finish_non_exhaustive()
    }
}
