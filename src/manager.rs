//! Materialization seam between the storage layers and the typed model
//!
//! Holds the single live model instance and rebuilds it from defaults plus
//! overrides whenever the selection or global settings change, so switching
//! configurations never partially mutates a stale instance.

use tracing::debug;

use crate::model::ConfigModel;
use crate::plugin::ConfigPlugin;
use crate::value::ConfigFields;

pub struct ConfigManager<M: ConfigModel> {
    current: Option<M>,
    plugins: Vec<Box<dyn ConfigPlugin>>,
}

impl<M: ConfigModel> Default for ConfigManager<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: ConfigModel> ConfigManager<M> {
    pub fn new() -> Self {
        Self {
            current: None,
            plugins: Vec::new(),
        }
    }

    /// The live model instance, created from defaults on first access.
    pub fn current_config(&mut self) -> &M {
        self.current.get_or_insert_with(M::default)
    }

    /// Default configuration-scoped field values of a fresh model; used to
    /// seed entries loaded from the static source.
    pub fn model_defaults(&self) -> ConfigFields {
        M::default().to_map()
    }

    /// Discard the current instance and rebuild it from defaults plus the
    /// given overrides.
    pub fn apply_config_to_model(
        &mut self,
        config: &ConfigFields,
        global: &ConfigFields,
        name: Option<&str>,
    ) {
        debug!(config = ?name, "materializing configuration model");
        let mut model = M::default();
        model.apply_overrides(config, global, name);
        self.current = Some(model);
    }

    pub fn add_plugin(&mut self, plugin: Box<dyn ConfigPlugin>) {
        self.plugins.push(plugin);
    }

    pub fn plugins(&self) -> &[Box<dyn ConfigPlugin>] {
        &self.plugins
    }

    pub fn plugins_mut(&mut self) -> &mut [Box<dyn ConfigPlugin>] {
        &mut self.plugins
    }
}
