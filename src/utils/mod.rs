//! Utility functions and helpers for the zfit-rs library.

pub mod finite_difference;

pub use finite_difference::{jacobian, jacobian_at};
