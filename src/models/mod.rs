//! Built-in circuit models and the registry that looks them up by name.
//!
//! ```
//! use zfit_rs::models::ModelRegistry;
//! use zfit_rs::ModelPlugin;
//!
//! let registry = ModelRegistry::builtin().unwrap();
//! let model = registry.get("ls(cpr)").unwrap();
//! assert_eq!(model.parameter_spec().names(), vec!["Ls", "Cp", "Rp"]);
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{Result, ZFitError};
use crate::model::ModelPlugin;

pub mod electrochemical;
pub mod lumped;
pub mod transmission_line;

pub use electrochemical::{r_c_rw, r_cr, r_q_rw};
pub use lumped::{cpr, csr_p_lsr, ls_cpr, lsr, lsr_skin, lsrs_cpr, rp_csr_p_lsr, rpcp_lsr, xdcr2};
pub use transmission_line::{trans_line1, trans_line2};

/// Name-keyed collection of model plugins.
///
/// Plugins are shared behind `Arc`, so one registry can serve fits on many
/// threads at once.
#[derive(Clone, Default)]
pub struct ModelRegistry {
    models: BTreeMap<String, Arc<dyn ModelPlugin>>,
}

impl ModelRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in circuit.
    pub fn builtin() -> Result<Self> {
        let mut registry = Self::new();
        for model in [
            cpr()?,
            lsr()?,
            lsr_skin()?,
            ls_cpr()?,
            lsrs_cpr()?,
            csr_p_lsr()?,
            rp_csr_p_lsr()?,
            rpcp_lsr()?,
            xdcr2()?,
            r_cr()?,
            r_q_rw()?,
            r_c_rw()?,
            trans_line1()?,
            trans_line2()?,
        ] {
            registry.register(Arc::new(model))?;
        }
        Ok(registry)
    }

    /// Add a plugin under its own name.
    ///
    /// # Errors
    ///
    /// * `ZFitError::Configuration` if a plugin with that name already exists
    pub fn register(&mut self, model: Arc<dyn ModelPlugin>) -> Result<()> {
        let name = model.name().to_string();
        if self.models.contains_key(&name) {
            return Err(ZFitError::Configuration(format!(
                "model '{}' is already registered",
                name
            )));
        }
        self.models.insert(name, model);
        Ok(())
    }

    /// Look a plugin up by name.
    pub fn get(&self, name: &str) -> Result<Arc<dyn ModelPlugin>> {
        self.models
            .get(name)
            .cloned()
            .ok_or_else(|| ZFitError::UnknownModel(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.models.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        self.models.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

impl fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelRegistry")
            .field("models", &self.names())
            .finish()
    }
}
