//! Ordered parameter declarations for a circuit model.

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use super::bounds::Bounds;
use crate::error::{Result, ZFitError};

/// One named parameter: its starting value and allowed interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterEntry {
    /// Parameter name, unique within its spec
    pub name: String,

    /// Initial guess handed to the solver
    pub initial: f64,

    /// Allowed interval, enforced softly by the boundary penalty
    #[serde(default)]
    pub bounds: Bounds,
}

impl ParameterEntry {
    /// Create an entry; fails if the bounds are inverted or NaN.
    pub fn new(name: &str, initial: f64, min: f64, max: f64) -> Result<Self> {
        let bounds = Bounds::new(min, max)
            .map_err(|e| ZFitError::Configuration(format!("parameter '{}': {}", name, e)))?;

        Ok(Self {
            name: name.to_string(),
            initial,
            bounds,
        })
    }
}

/// The ordered parameter list of a model.
///
/// Position `k` in every parameter vector refers to `entries[k]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ParameterEntry>", into = "Vec<ParameterEntry>")]
pub struct ParameterSpec {
    entries: Vec<ParameterEntry>,
}

impl ParameterSpec {
    /// Build a spec from entries, validating names, values and bounds.
    pub fn new(entries: Vec<ParameterEntry>) -> Result<Self> {
        if entries.is_empty() {
            return Err(ZFitError::Configuration(
                "a model needs at least one parameter".to_string(),
            ));
        }

        for (i, entry) in entries.iter().enumerate() {
            if entry.bounds.min.is_nan() || entry.bounds.max.is_nan() {
                return Err(ZFitError::Configuration(format!(
                    "parameter '{}' has a NaN bound",
                    entry.name
                )));
            }
            if entry.bounds.min > entry.bounds.max {
                return Err(ZFitError::Configuration(format!(
                    "parameter '{}' has lower bound {} above upper bound {}",
                    entry.name, entry.bounds.min, entry.bounds.max
                )));
            }
            if !entry.initial.is_finite() {
                return Err(ZFitError::Configuration(format!(
                    "parameter '{}' has non-finite initial value {}",
                    entry.name, entry.initial
                )));
            }
            if entries[..i].iter().any(|other| other.name == entry.name) {
                return Err(ZFitError::Configuration(format!(
                    "parameter '{}' is declared twice",
                    entry.name
                )));
            }
        }

        Ok(Self { entries })
    }

    /// Shorthand for `(name, initial, (min, max))` tuples.
    pub fn from_tuples(params: &[(&str, f64, (f64, f64))]) -> Result<Self> {
        let entries = params
            .iter()
            .map(|&(name, initial, (min, max))| ParameterEntry::new(name, initial, min, max))
            .collect::<Result<Vec<_>>>()?;
        Self::new(entries)
    }

    pub fn entries(&self) -> &[ParameterEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.name.clone()).collect()
    }

    /// Position of a named parameter.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.name == name)
    }

    /// The solver's starting vector.
    pub fn initial_values(&self) -> Array1<f64> {
        self.entries.iter().map(|e| e.initial).collect()
    }

    pub fn bounds(&self) -> Vec<Bounds> {
        self.entries.iter().map(|e| e.bounds).collect()
    }
}

impl TryFrom<Vec<ParameterEntry>> for ParameterSpec {
    type Error = ZFitError;

    fn try_from(entries: Vec<ParameterEntry>) -> Result<Self> {
        Self::new(entries)
    }
}

impl From<ParameterSpec> for Vec<ParameterEntry> {
    fn from(spec: ParameterSpec) -> Self {
        spec.entries
    }
}
