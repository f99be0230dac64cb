//! Termination states of the Levenberg-Marquardt solver.

use serde::{Deserialize, Serialize};

/// Why the solver stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConvergenceStatus {
    /// The residuals are exactly zero.
    ExactFit,

    /// The residual vector is orthogonal to every Jacobian column within `gtol`.
    GradientConvergence,

    /// The scaled step is below `xtol` relative to the scaled parameters.
    ParameterConvergence,

    /// Actual and predicted relative cost reductions are both below `ftol`.
    CostConvergence,

    /// The evaluation cap ran out first.
    MaxEvaluationsReached,

    /// No step reduced the cost before the damping hit its ceiling.
    DampingSaturated,
}

impl ConvergenceStatus {
    /// Returns true if the optimization has converged.
    pub fn is_converged(&self) -> bool {
        matches!(
            self,
            ConvergenceStatus::ExactFit
                | ConvergenceStatus::GradientConvergence
                | ConvergenceStatus::ParameterConvergence
                | ConvergenceStatus::CostConvergence
        )
    }

    /// Returns a description of the convergence status.
    pub fn description(&self) -> &'static str {
        match self {
            ConvergenceStatus::ExactFit => "Converged: residuals are exactly zero",
            ConvergenceStatus::GradientConvergence => {
                "Converged: residuals orthogonal to the Jacobian"
            }
            ConvergenceStatus::ParameterConvergence => "Converged: small parameter change",
            ConvergenceStatus::CostConvergence => "Converged: small cost reduction",
            ConvergenceStatus::MaxEvaluationsReached => {
                "Terminated: maximum function evaluations reached"
            }
            ConvergenceStatus::DampingSaturated => {
                "Terminated: cost could not be reduced, damping at maximum"
            }
        }
    }
}
