//! Fit settings loaded from JSON.
//!
//! ```
//! use zfit_rs::config::FitSettings;
//!
//! let settings = FitSettings::from_json_str(
//!     r#"{ "model": "R(CR)", "data_format": { "delimiter": "comma", "potential_column": true } }"#,
//! )
//! .unwrap();
//! assert_eq!(settings.model, "R(CR)");
//! assert_eq!(settings.data_format.skip_rows, 1);
//! assert_eq!(settings.solver.max_evaluations, 1_000_000);
//! ```

use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::fit::Fitter;
use crate::io::DataFormat;
use crate::lm::LmConfig;
use crate::model::ModelPlugin;
use crate::models::ModelRegistry;

/// Which model to fit, how to read the data, and how to run the solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitSettings {
    /// Registry name of the circuit model
    pub model: String,
    pub data_format: DataFormat,
    pub solver: LmConfig,
}

impl Default for FitSettings {
    fn default() -> Self {
        Self {
            model: "ls(cpr)".to_string(),
            data_format: DataFormat::default(),
            solver: LmConfig::default(),
        }
    }
}

impl FitSettings {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Look the configured model up in `registry`.
    pub fn resolve_model(&self, registry: &ModelRegistry) -> Result<Arc<dyn ModelPlugin>> {
        registry.get(&self.model)
    }

    /// A fitter running the configured solver.
    pub fn fitter(&self) -> Fitter {
        Fitter::with_config(self.solver.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ZFitError;
    use crate::io::{Delimiter, ImportKind};

    #[test]
    fn test_defaults_from_empty_object() {
        let settings = FitSettings::from_json_str("{}").unwrap();
        assert_eq!(settings, FitSettings::default());
        assert_eq!(settings.data_format.delimiter, Delimiter::Tab);
        assert_eq!(settings.data_format.import, ImportKind::RealImag);
        assert!(!settings.data_format.potential_column);
    }

    #[test]
    fn test_round_trip_and_resolve() {
        let settings = FitSettings {
            model: "cpr".to_string(),
            ..FitSettings::default()
        };
        let json = settings.to_json_string().unwrap();
        let back = FitSettings::from_json_str(&json).unwrap();
        assert_eq!(back, settings);

        let registry = ModelRegistry::builtin().unwrap();
        assert_eq!(back.resolve_model(&registry).unwrap().name(), "cpr");

        let unknown = FitSettings {
            model: "nope".to_string(),
            ..FitSettings::default()
        };
        assert!(matches!(
            unknown.resolve_model(&registry),
            Err(ZFitError::UnknownModel(_))
        ));
    }

    #[test]
    fn test_bad_json() {
        assert!(matches!(
            FitSettings::from_json_str(r#"{"data_format": {"delimiter": "pipe"}}"#),
            Err(ZFitError::Json(_))
        ));
    }
}
