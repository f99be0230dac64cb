//! Configuration options for the Levenberg-Marquardt algorithm.

use serde::{Deserialize, Serialize};

use crate::utils::finite_difference::DEFAULT_STEP;

/// Configuration options for the Levenberg-Marquardt algorithm.
///
/// Every field has a default, so a partial JSON object is enough to
/// override a single tolerance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LmConfig {
    /// Relative tolerance on the reduction of the cost. Default: 1e-12
    pub ftol: f64,

    /// Relative tolerance on the scaled parameter step. Default: 1e-12
    pub xtol: f64,

    /// Tolerance on the cosine between residuals and Jacobian columns. Default: 1e-12
    pub gtol: f64,

    /// Cap on residual-function evaluations, Jacobian columns included. Default: 1_000_000
    pub max_evaluations: usize,

    /// Initial value for the damping parameter. Default: 1e-3
    pub initial_lambda: f64,

    /// Factor by which to increase lambda after a rejected step. Default: 10.0
    pub lambda_up_factor: f64,

    /// Factor by which to decrease lambda after an accepted step. Default: 0.1
    pub lambda_down_factor: f64,

    /// Minimum value for lambda. Default: 1e-12
    pub min_lambda: f64,

    /// Lambda above which the solver gives up. Default: 1e16
    pub max_lambda: f64,

    /// Relative step for forward-difference derivatives. Default: sqrt(machine epsilon)
    pub diff_step: f64,

    /// Whether to calculate and return the Jacobian at the solution. Default: true
    pub calc_jacobian: bool,
}

impl Default for LmConfig {
    fn default() -> Self {
        Self {
            ftol: 1e-12,
            xtol: 1e-12,
            gtol: 1e-12,
            max_evaluations: 1_000_000,
            initial_lambda: 1e-3,
            lambda_up_factor: 10.0,
            lambda_down_factor: 0.1,
            min_lambda: 1e-12,
            max_lambda: 1e16,
            diff_step: DEFAULT_STEP,
            calc_jacobian: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: LmConfig = serde_json::from_str(r#"{"max_evaluations": 500}"#).unwrap();
        assert_eq!(config.max_evaluations, 500);
        assert_eq!(config.ftol, 1e-12);
        assert!(config.calc_jacobian);
    }
}
