//! Finite difference methods for numerical differentiation.

use crate::error::{Result, ZFitError};
use crate::problem::Problem;
use ndarray::{Array1, Array2};

/// Default relative step: the square root of machine epsilon.
pub const DEFAULT_STEP: f64 = 1.4901161193847656e-8;

/// Compute the Jacobian matrix using forward finite differences.
///
/// J[i,j] = ∂residual[i]/∂param[j]. Costs `1 + params.len()` evaluations.
///
/// # Arguments
///
/// * `problem` - The problem to evaluate
/// * `params` - The parameter values at which to evaluate the Jacobian
/// * `step` - Relative step size (optional)
pub fn jacobian<P: Problem + ?Sized>(
    problem: &P,
    params: &Array1<f64>,
    step: Option<f64>,
) -> Result<Array2<f64>> {
    let residuals = problem.eval(params)?;
    let typical = params.mapv(f64::abs);
    jacobian_at(
        problem,
        params,
        &residuals,
        step.unwrap_or(DEFAULT_STEP),
        &typical,
    )
}

/// Forward-difference Jacobian reusing residuals already evaluated at `params`.
///
/// The step for parameter `j` is `step · max(|x_j|, typical_j)`, or `step`
/// itself when both are zero, so parameters of very different magnitude
/// (ohms next to picofarads) are each perturbed in their own last few
/// significant digits. `typical` keeps the step from collapsing with a
/// parameter that drifts towards zero; the solver passes the magnitudes of
/// the initial guess. Costs `params.len()` evaluations.
pub fn jacobian_at<P: Problem + ?Sized>(
    problem: &P,
    params: &Array1<f64>,
    residuals: &Array1<f64>,
    step: f64,
    typical: &Array1<f64>,
) -> Result<Array2<f64>> {
    let n_params = params.len();
    let n_residuals = residuals.len();

    if n_residuals != problem.residual_count() {
        return Err(ZFitError::DimensionMismatch(format!(
            "Expected {} residuals, got {}",
            problem.residual_count(),
            n_residuals
        )));
    }
    if typical.len() != n_params {
        return Err(ZFitError::DimensionMismatch(format!(
            "Expected {} typical magnitudes, got {}",
            n_params,
            typical.len()
        )));
    }

    let mut jac = Array2::zeros((n_residuals, n_params));

    for j in 0..n_params {
        let mut params_perturbed = params.clone();

        let magnitude = params[j].abs().max(typical[j].abs());
        let h = if magnitude > 0.0 {
            step * magnitude
        } else {
            step
        };
        params_perturbed[j] += h;
        // The representable step may differ from h
        let h = params_perturbed[j] - params[j];

        let residuals_perturbed = problem.eval(&params_perturbed)?;
        if residuals_perturbed.len() != n_residuals {
            return Err(ZFitError::DimensionMismatch(format!(
                "Expected {} residuals, got {}",
                n_residuals,
                residuals_perturbed.len()
            )));
        }

        for i in 0..n_residuals {
            jac[[i, j]] = (residuals_perturbed[i] - residuals[i]) / h;
        }
    }

    Ok(jac)
}
