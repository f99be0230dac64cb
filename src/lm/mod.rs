//! Levenberg-Marquardt least-squares solver.
//!
//! The solver works on any [`Problem`](crate::problem::Problem): a residual
//! vector of fixed length as a function of a real parameter vector. Impedance
//! fitting drives it through [`ImpedanceProblem`](crate::residual::ImpedanceProblem),
//! but nothing here knows about circuits.

pub mod algorithm;
pub mod config;
pub mod convergence;

pub use algorithm::{LevenbergMarquardt, LmResult};
pub use config::LmConfig;
pub use convergence::ConvergenceStatus;
