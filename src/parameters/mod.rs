//! # Parameter System
//!
//! Every circuit model declares an ordered list of named parameters, each
//! with an initial guess and a `[min, max]` interval. The order fixes the
//! mapping between the flat vectors the solver works on and the component
//! values a circuit formula reads.
//!
//! ```rust
//! use zfit_rs::parameters::ParameterSpec;
//!
//! let spec = ParameterSpec::from_tuples(&[
//!     ("R", 1e3, (0.0, f64::INFINITY)),
//!     ("C", 10e-12, (1e-12, f64::INFINITY)),
//! ])
//! .unwrap();
//!
//! assert_eq!(spec.names(), vec!["R", "C"]);
//! assert_eq!(spec.bounds()[1].penalty(0.0), -1e-12);
//! ```

pub mod bounds;
pub mod spec;

pub use bounds::{Bounds, BoundsError};
pub use spec::{ParameterEntry, ParameterSpec};
