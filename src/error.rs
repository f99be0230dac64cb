use thiserror::Error;

/// Error types for the zfit-rs library.
#[derive(Error, Debug)]
pub enum ZFitError {
    /// A model plugin was declared with invalid parameters or weights.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The target spectrum or a data file is malformed.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The impedance function produced a non-finite value at a trial point.
    #[error("Numerical error: {message} (parameters: {parameters:?})")]
    Numerical {
        /// What went wrong and where
        message: String,
        /// The trial parameter vector that produced it
        parameters: Vec<f64>,
    },

    /// The solver stopped before meeting its tolerances.
    #[error("Fit did not converge after {evaluations} evaluations: {message}")]
    ConvergenceWarning {
        /// Solver termination message
        message: String,
        /// Residual-function evaluations spent
        evaluations: usize,
    },

    /// Error indicating a mismatch in vector or matrix dimensions.
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// No model is registered under the requested name.
    #[error("Unknown model: {0}")]
    UnknownModel(String),

    /// I/O error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Delimited-text reader error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl From<crate::parameters::BoundsError> for ZFitError {
    fn from(err: crate::parameters::BoundsError) -> Self {
        ZFitError::Configuration(err.to_string())
    }
}

/// Result type alias for zfit-rs operations.
pub type Result<T> = std::result::Result<T, ZFitError>;
