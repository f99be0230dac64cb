//! Implementation of the Levenberg-Marquardt algorithm.
//!
//! Each iteration solves the damped, column-scaled normal equations
//!
//! ```text
//! (Jsᵀ Js + λ I) z = -Jsᵀ r,    Js = J D⁻¹,    δ = D⁻¹ z
//! ```
//!
//! where `D` holds the current Jacobian column norms. The scaling makes
//! every column of `Js` unit length, so a single damping value treats
//! parameters of wildly different magnitude (a 1 kΩ resistor next to a
//! 10 pF capacitor) alike.

use ndarray::{Array1, Array2};
use std::fmt;

use crate::error::{Result, ZFitError};
use crate::problem::Problem;
use crate::utils::finite_difference;

use super::config::LmConfig;
use super::convergence::ConvergenceStatus;

/// Result of the Levenberg-Marquardt optimization.
#[derive(Debug, Clone)]
pub struct LmResult {
    /// Best parameter values found
    pub params: Array1<f64>,

    /// Residuals at `params`
    pub residuals: Array1<f64>,

    /// Sum of squared residuals at `params`
    pub cost: f64,

    /// Sum of squared residuals at the starting point
    pub initial_cost: f64,

    /// Number of accepted steps
    pub iterations: usize,

    /// Number of residual evaluations, Jacobian columns included
    pub func_evals: usize,

    /// Why the solver stopped
    pub status: ConvergenceStatus,

    /// Whether the optimization converged
    pub success: bool,

    /// A message describing the result
    pub message: String,

    /// The Jacobian matrix at `params` (if requested)
    ///
    /// `None` after `MaxEvaluationsReached` unless the last Jacobian was
    /// still current, so `func_evals` never exceeds the cap.
    pub jacobian: Option<Array2<f64>>,
}

impl fmt::Display for LmResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Optimization Result:")?;
        writeln!(f, "  Success: {}", self.success)?;
        writeln!(f, "  Message: {}", self.message)?;
        writeln!(f, "  Cost: {:.6e} (initial {:.6e})", self.cost, self.initial_cost)?;
        writeln!(f, "  Iterations: {}", self.iterations)?;
        writeln!(f, "  Function evaluations: {}", self.func_evals)?;
        writeln!(f, "  Parameters: {:?}", self.params)?;
        Ok(())
    }
}

/// The Levenberg-Marquardt optimizer.
#[derive(Debug, Clone, Default)]
pub struct LevenbergMarquardt {
    /// Configuration options
    config: LmConfig,
}

impl LevenbergMarquardt {
    /// Create a new Levenberg-Marquardt optimizer with default configuration.
    pub fn new() -> Self {
        Self {
            config: LmConfig::default(),
        }
    }

    /// Create a new Levenberg-Marquardt optimizer with the given configuration.
    pub fn with_config(config: LmConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LmConfig {
        &self.config
    }

    /// Set the tolerance for the relative cost reduction.
    pub fn with_ftol(mut self, ftol: f64) -> Self {
        self.config.ftol = ftol;
        self
    }

    /// Set the tolerance for the relative parameter step.
    pub fn with_xtol(mut self, xtol: f64) -> Self {
        self.config.xtol = xtol;
        self
    }

    /// Set the tolerance for the gradient cosine.
    pub fn with_gtol(mut self, gtol: f64) -> Self {
        self.config.gtol = gtol;
        self
    }

    /// Set the cap on residual evaluations.
    pub fn with_max_evaluations(mut self, max_evaluations: usize) -> Self {
        self.config.max_evaluations = max_evaluations;
        self
    }

    /// Set the initial value for the damping parameter.
    pub fn with_lambda(mut self, lambda: f64) -> Self {
        self.config.initial_lambda = lambda;
        self
    }

    /// Set the factor by which to increase lambda.
    pub fn with_lambda_up_factor(mut self, factor: f64) -> Self {
        self.config.lambda_up_factor = factor;
        self
    }

    /// Set the factor by which to decrease lambda.
    pub fn with_lambda_down_factor(mut self, factor: f64) -> Self {
        self.config.lambda_down_factor = factor;
        self
    }

    /// Set the minimum value for lambda.
    pub fn with_min_lambda(mut self, min_lambda: f64) -> Self {
        self.config.min_lambda = min_lambda;
        self
    }

    /// Set the maximum value for lambda.
    pub fn with_max_lambda(mut self, max_lambda: f64) -> Self {
        self.config.max_lambda = max_lambda;
        self
    }

    /// Set the relative finite-difference step.
    pub fn with_diff_step(mut self, diff_step: f64) -> Self {
        self.config.diff_step = diff_step;
        self
    }

    /// Set whether to calculate and return the Jacobian at the solution.
    pub fn with_calc_jacobian(mut self, calc_jacobian: bool) -> Self {
        self.config.calc_jacobian = calc_jacobian;
        self
    }

    /// Minimize the sum of squared residuals for the given problem.
    ///
    /// Running out of evaluations or damping is not an error: the best point
    /// found is returned with `success == false`.
    ///
    /// # Arguments
    ///
    /// * `problem` - The problem to solve
    /// * `initial_params` - Initial guess for the parameter values
    ///
    /// # Errors
    ///
    /// * `ZFitError::DimensionMismatch` if `initial_params` or the residuals
    ///   have the wrong length
    /// * any error raised by `problem.eval`, e.g. `ZFitError::Numerical`
    pub fn minimize<P: Problem + ?Sized>(
        &self,
        problem: &P,
        initial_params: Array1<f64>,
    ) -> Result<LmResult> {
        let n_params = problem.parameter_count();
        if initial_params.len() != n_params {
            return Err(ZFitError::DimensionMismatch(format!(
                "Expected {} parameters, got {}",
                n_params,
                initial_params.len()
            )));
        }

        let cfg = &self.config;
        let numerical_jacobian = !problem.has_custom_jacobian();
        let jacobian_cost = if numerical_jacobian { n_params } else { 0 };

        // Floors the finite-difference step of parameters drifting to zero
        let typical = initial_params.mapv(f64::abs);
        let mut params = initial_params;
        let mut residuals = problem.eval(&params)?;
        let mut func_evals = 1;
        if residuals.len() != problem.residual_count() {
            return Err(ZFitError::DimensionMismatch(format!(
                "Expected {} residuals, got {}",
                problem.residual_count(),
                residuals.len()
            )));
        }

        let mut cost = sum_of_squares(&residuals);
        let initial_cost = cost;
        let mut lambda = cfg.initial_lambda;
        let mut iterations = 0;
        // Jacobian at the current `params`, if one has been computed there
        let mut jacobian: Option<Array2<f64>> = None;

        let status = 'outer: loop {
            if cost == 0.0 {
                break ConvergenceStatus::ExactFit;
            }
            if func_evals + jacobian_cost > cfg.max_evaluations {
                break ConvergenceStatus::MaxEvaluationsReached;
            }

            let j = self.jacobian(problem, &params, &residuals, &typical)?;
            func_evals += jacobian_cost;

            let scale = column_scale(&j);
            let js = &j / &scale;
            let a = js.t().dot(&js);
            let gs = js.t().dot(&residuals);

            let residual_norm = cost.sqrt();
            let gradient_cosine = gs
                .iter()
                .fold(0.0_f64, |acc, g| acc.max(g.abs() / residual_norm));
            let scaled_x_norm = (&params * &scale).iter().map(|v| v * v).sum::<f64>().sqrt();
            jacobian = Some(j.clone());

            if gradient_cosine <= cfg.gtol {
                break ConvergenceStatus::GradientConvergence;
            }

            loop {
                let z = match solve_damped(&a, &gs, lambda) {
                    Some(z) => z,
                    None => {
                        lambda *= cfg.lambda_up_factor;
                        if lambda > cfg.max_lambda {
                            break 'outer ConvergenceStatus::DampingSaturated;
                        }
                        continue;
                    }
                };

                if func_evals >= cfg.max_evaluations {
                    break 'outer ConvergenceStatus::MaxEvaluationsReached;
                }

                let step = -&z / &scale;
                let step_norm = z.iter().map(|v| v * v).sum::<f64>().sqrt();
                let trial = &params + &step;
                let trial_residuals = problem.eval(&trial)?;
                func_evals += 1;
                let trial_cost = sum_of_squares(&trial_residuals);

                let linearized = &residuals + &j.dot(&step);
                let predicted = cost - sum_of_squares(&linearized);
                let actual = cost - trial_cost;

                let small_cost_change =
                    actual.abs() <= cfg.ftol * cost && predicted.abs() <= cfg.ftol * cost;
                let small_step = step_norm <= cfg.xtol * scaled_x_norm.max(f64::MIN_POSITIVE);

                if trial_cost < cost {
                    params = trial;
                    residuals = trial_residuals;
                    cost = trial_cost;
                    jacobian = None;
                    lambda = (lambda * cfg.lambda_down_factor).max(cfg.min_lambda);
                    iterations += 1;

                    tracing::debug!(iterations, cost, lambda, func_evals, "accepted step");

                    if cost == 0.0 {
                        break 'outer ConvergenceStatus::ExactFit;
                    }
                    if small_cost_change {
                        break 'outer ConvergenceStatus::CostConvergence;
                    }
                    if small_step {
                        break 'outer ConvergenceStatus::ParameterConvergence;
                    }
                    continue 'outer;
                }

                tracing::trace!(trial_cost, lambda, "rejected step");

                if small_cost_change {
                    break 'outer ConvergenceStatus::CostConvergence;
                }
                if small_step {
                    break 'outer ConvergenceStatus::ParameterConvergence;
                }

                lambda *= cfg.lambda_up_factor;
                if lambda > cfg.max_lambda {
                    break 'outer ConvergenceStatus::DampingSaturated;
                }
            }
        };

        // A stale Jacobian is only refreshed while the evaluation cap allows it
        let jacobian = match jacobian {
            Some(j) if cfg.calc_jacobian => Some(j),
            None if cfg.calc_jacobian && status != ConvergenceStatus::MaxEvaluationsReached => {
                func_evals += jacobian_cost;
                Some(self.jacobian(problem, &params, &residuals, &typical)?)
            }
            _ => None,
        };

        Ok(LmResult {
            params,
            residuals,
            cost,
            initial_cost,
            iterations,
            func_evals,
            status,
            success: status.is_converged(),
            message: status.description().to_string(),
            jacobian,
        })
    }

    /// Jacobian at `params`, given the residuals already evaluated there.
    fn jacobian<P: Problem + ?Sized>(
        &self,
        problem: &P,
        params: &Array1<f64>,
        residuals: &Array1<f64>,
        typical: &Array1<f64>,
    ) -> Result<Array2<f64>> {
        let j = if problem.has_custom_jacobian() {
            problem.jacobian(params)?
        } else {
            finite_difference::jacobian_at(
                problem,
                params,
                residuals,
                self.config.diff_step,
                typical,
            )?
        };

        if j.shape() != [residuals.len(), params.len()] {
            return Err(ZFitError::DimensionMismatch(format!(
                "Expected Jacobian of shape [{}, {}], got {:?}",
                residuals.len(),
                params.len(),
                j.shape()
            )));
        }
        if j.iter().any(|v| !v.is_finite()) {
            return Err(ZFitError::Numerical {
                message: "non-finite Jacobian entry".to_string(),
                parameters: params.to_vec(),
            });
        }
        Ok(j)
    }
}

fn sum_of_squares(v: &Array1<f64>) -> f64 {
    v.iter().map(|r| r * r).sum()
}

/// Euclidean norm of each Jacobian column; zero columns scale by one.
fn column_scale(j: &Array2<f64>) -> Array1<f64> {
    j.columns()
        .into_iter()
        .map(|col| {
            let norm = col.iter().map(|v| v * v).sum::<f64>().sqrt();
            if norm > 0.0 {
                norm
            } else {
                1.0
            }
        })
        .collect()
}

/// Solve `(A + λI) z = b` by Cholesky decomposition.
///
/// Returns `None` if the damped matrix is not numerically positive definite.
fn solve_damped(a: &Array2<f64>, b: &Array1<f64>, lambda: f64) -> Option<Array1<f64>> {
    let n = a.nrows();
    let mut l = a.clone();
    for i in 0..n {
        l[[i, i]] += lambda;
    }

    for k in 0..n {
        for j in 0..k {
            l[[k, k]] -= l[[k, j]] * l[[k, j]];
        }
        if !(l[[k, k]] > 0.0) {
            return None;
        }
        let lkk = l[[k, k]].sqrt();
        l[[k, k]] = lkk;

        for i in k + 1..n {
            for j in 0..k {
                l[[i, k]] -= l[[i, j]] * l[[k, j]];
            }
            l[[i, k]] /= lkk;
        }
    }

    // Forward substitution (L * y = b)
    let mut y = b.clone();
    for i in 0..n {
        for j in 0..i {
            y[i] -= l[[i, j]] * y[j];
        }
        y[i] /= l[[i, i]];
    }

    // Backward substitution (L^T * z = y)
    let mut z = Array1::zeros(n);
    for i in (0..n).rev() {
        z[i] = y[i];
        for j in (i + 1)..n {
            z[i] -= l[[j, i]] * z[j];
        }
        z[i] /= l[[i, i]];
    }

    if z.iter().all(|v: &f64| v.is_finite()) {
        Some(z)
    } else {
        None
    }
}
