//! Parameter bounds implementation
//!
//! Bounds are never enforced by clipping. A value that strays outside its
//! interval is pulled back by the soft penalty computed in [`Bounds::penalty`],
//! which the fitting engine appends to the data residuals.

use serde::{Deserialize, Serialize};
use std::f64::{INFINITY, NEG_INFINITY};
use thiserror::Error;

/// Errors that can occur when working with parameter bounds
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BoundsError {
    #[error("Invalid bounds: min ({min}) must not exceed max ({max})")]
    InvalidBounds { min: f64, max: f64 },

    #[error("Bounds must not be NaN")]
    NaNBound,
}

/// Represents the bounds constraints on a parameter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// Minimum allowed value for the parameter
    pub min: f64,

    /// Maximum allowed value for the parameter
    pub max: f64,
}

impl Serialize for Bounds {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("Bounds", 2)?;

        // Open ends are written as null, JSON has no infinity
        if self.min.is_infinite() && self.min.is_sign_negative() {
            state.serialize_field("min", &Option::<f64>::None)?;
        } else {
            state.serialize_field("min", &self.min)?;
        }

        if self.max.is_infinite() && self.max.is_sign_positive() {
            state.serialize_field("max", &Option::<f64>::None)?;
        } else {
            state.serialize_field("max", &self.max)?;
        }

        state.end()
    }
}

impl<'de> Deserialize<'de> for Bounds {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct BoundsHelper {
            #[serde(default)]
            min: Option<f64>,

            #[serde(default)]
            max: Option<f64>,
        }

        let helper = BoundsHelper::deserialize(deserializer)?;

        let min = helper.min.unwrap_or(NEG_INFINITY);
        let max = helper.max.unwrap_or(INFINITY);

        Bounds::new(min, max).map_err(serde::de::Error::custom)
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            min: NEG_INFINITY,
            max: INFINITY,
        }
    }
}

impl Bounds {
    /// Create a new bounds constraint with min and max values
    ///
    /// Equal bounds fix the parameter; infinite bounds leave that side open.
    ///
    /// # Examples
    ///
    /// ```
    /// use zfit_rs::parameters::Bounds;
    ///
    /// let bounds = Bounds::new(0.0, 10.0).unwrap();
    /// assert_eq!(bounds.min, 0.0);
    /// assert_eq!(bounds.max, 10.0);
    /// assert!(Bounds::new(1.0, 0.0).is_err());
    /// ```
    pub fn new(min: f64, max: f64) -> Result<Self, BoundsError> {
        if min.is_nan() || max.is_nan() {
            return Err(BoundsError::NaNBound);
        }
        if min > max {
            return Err(BoundsError::InvalidBounds { min, max });
        }

        Ok(Self { min, max })
    }

    /// Bounds open on both sides.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Bounds with only a lower limit.
    pub fn min_only(min: f64) -> Result<Self, BoundsError> {
        Self::new(min, INFINITY)
    }

    /// Bounds with only an upper limit.
    pub fn max_only(max: f64) -> Result<Self, BoundsError> {
        Self::new(NEG_INFINITY, max)
    }

    /// Bounds that pin the parameter to a single value.
    pub fn fixed(value: f64) -> Result<Self, BoundsError> {
        Self::new(value, value)
    }

    /// Check if a value is within the bounds (inclusive)
    pub fn is_within_bounds(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Returns true when both limits coincide
    pub fn is_fixed(&self) -> bool {
        self.min == self.max
    }

    /// Returns true if there is a finite lower limit
    pub fn has_lower_bound(&self) -> bool {
        self.min.is_finite()
    }

    /// Returns true if there is a finite upper limit
    pub fn has_upper_bound(&self) -> bool {
        self.max.is_finite()
    }

    /// Signed distance of `value` outside the interval.
    ///
    /// `min(x - lo, 0) + max(0, x - hi)`: zero inside `[lo, hi]`, `x - lo`
    /// (negative) below, `x - hi` (positive) above. Infinite limits
    /// contribute nothing.
    pub fn penalty(&self, value: f64) -> f64 {
        (value - self.min).min(0.0) + (value - self.max).max(0.0)
    }
}
