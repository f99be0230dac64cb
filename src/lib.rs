//! # zfit-rs
//!
//! `zfit-rs` fits equivalent-circuit models to measured impedance spectra
//! by nonlinear least squares.
//!
//! A circuit is a [`ModelPlugin`]: ordered parameters with initial guesses
//! and bounds, a penalty weight, and a pure impedance function. The fitting
//! engine turns the complex spectrum into `2N` real residuals, appends one
//! scaled penalty per parameter for bound violations, and hands the result
//! to a Levenberg-Marquardt solver.
//!
//! ## Basic Usage
//!
//! ```
//! use ndarray::{array, Array1};
//! use zfit_rs::{fit, ModelPlugin, ModelRegistry, TargetSpectrum};
//!
//! let registry = ModelRegistry::builtin().unwrap();
//! let model = registry.get("cpr").unwrap();
//!
//! // Synthetic data from R = 2.5 kΩ in parallel with C = 47 pF
//! let freq = Array1::logspace(10.0, 3.0, 8.0, 50);
//! let z = model.evaluate_hz(&freq, &array![2500.0, 4.7e-11]);
//! let spectrum = TargetSpectrum::new(freq, z).unwrap();
//!
//! let result = fit(model.as_ref(), &spectrum).unwrap();
//! assert!(result.success);
//! ```

pub mod batch;
pub mod config;
pub mod error;
pub mod fit;
pub mod io;
pub mod lm;
pub mod model;
pub mod models;
pub mod parameters;
pub mod problem;
pub mod residual;
pub mod spectrum;
pub mod utils;

// Re-exports for convenience
pub use batch::{fit_batch, PotentialStatistics};
pub use error::{Result, ZFitError};
pub use fit::{fit, FitResult, Fitter, SolverDiagnostics};
pub use lm::{ConvergenceStatus, LevenbergMarquardt, LmConfig};
pub use model::{CircuitModel, ModelPlugin};
pub use models::ModelRegistry;
pub use parameters::{Bounds, ParameterSpec};
pub use problem::Problem;
pub use residual::ImpedanceProblem;
pub use spectrum::TargetSpectrum;

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
