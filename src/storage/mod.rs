//! Layered configuration storage
//!
//! Owns the three logical layers (predefined configurations from the static
//! source, user-created custom configurations, the global field map) plus
//! the current selection. Resolves the effective configuration, persists
//! the minimal state needed to survive a restart, and broadcasts a single
//! "configuration changed" event.
//!
//! All mutation is expected to run on one logical thread; the async source
//! load is the only suspension point and holds the exclusive borrow across
//! it, so overlapping loads cannot start.

pub mod settings;
pub mod source;

use serde_json::Value;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::constants::{fields, storage_keys};
use crate::manager::ConfigManager;
use crate::model::ConfigModel;
use crate::ordered_map::OrderedMap;
use crate::value::{ConfigFields, ConfigValue};
use settings::SettingsStore;

/// Handle returned by [`ConfigStorage::add_config_observer`], used to
/// unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObserverHandle(u64);

#[derive(Default)]
struct Observers {
    next_handle: u64,
    subscribers: Vec<(u64, Box<dyn Fn()>)>,
}

impl Observers {
    fn add(&mut self, callback: Box<dyn Fn()>) -> ObserverHandle {
        let handle = self.next_handle;
        self.next_handle += 1;
        self.subscribers.push((handle, callback));
        ObserverHandle(handle)
    }

    fn remove(&mut self, handle: ObserverHandle) {
        self.subscribers.retain(|(id, _)| *id != handle.0);
    }

    fn notify(&self) {
        for (_, callback) in &self.subscribers {
            callback();
        }
    }
}

pub struct ConfigStorage<M: ConfigModel> {
    manager: ConfigManager<M>,
    predefined: OrderedMap<String, ConfigFields>,
    custom: OrderedMap<String, ConfigFields>,
    global: ConfigFields,
    selected: Option<String>,
    source_file: Option<PathBuf>,
    custom_loaded: bool,
    activated: bool,
    settings: Box<dyn SettingsStore>,
    observers: Observers,
}

impl<M: ConfigModel> ConfigStorage<M> {
    pub fn new(manager: ConfigManager<M>, settings: Box<dyn SettingsStore>) -> Self {
        Self {
            manager,
            predefined: OrderedMap::new(),
            custom: OrderedMap::new(),
            global: ConfigFields::new(),
            selected: None,
            source_file: None,
            custom_loaded: false,
            activated: false,
            settings,
            observers: Observers::default(),
        }
    }

    /// Supply the static source path. Consulted only by an explicit load
    /// call; a successful load consumes it.
    pub fn set_source_file(&mut self, path: Option<PathBuf>) {
        self.source_file = path;
    }

    /// Restore the persisted selection and global fields, then materialize
    /// the model from them. Marks the storage as activated.
    pub fn activate(&mut self) {
        self.restore_selection();
        self.restore_global();
        let config = self.resolved_selection_fields();
        self.manager
            .apply_config_to_model(&config, &self.global, self.selected.as_deref());
        self.activated = true;
        info!(selected = ?self.selected, "Configuration storage activated");
    }

    /// Whether `activate` has run; lets builds detect if overrides are in
    /// force at all.
    pub fn is_activated(&self) -> bool {
        self.activated
    }

    pub fn manager(&mut self) -> &mut ConfigManager<M> {
        &mut self.manager
    }

    /// The live model instance, rebuilt on every selection or global change.
    pub fn current_config(&mut self) -> &M {
        self.manager.current_config()
    }

    // -- Obtain from storage --

    /// Settings for the given configuration: the custom entry if one exists,
    /// otherwise the predefined entry. Custom entries are returned exactly
    /// as stored (only the fields supplied when they were put).
    pub fn config_settings(&self, config: &str) -> Option<&ConfigFields> {
        self.custom.get(config).or_else(|| self.predefined.get(config))
    }

    pub fn selected_config(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Names of the predefined configurations, in load order.
    pub fn obtain_config_list(&self) -> Vec<String> {
        self.predefined.keys().cloned().collect()
    }

    /// Names of the pure custom configurations (those that do not override a
    /// predefined entry), in creation order.
    pub fn obtain_custom_config_list(&self) -> Vec<String> {
        self.custom
            .keys()
            .filter(|name| !self.predefined.contains_key(name.as_str()))
            .cloned()
            .collect()
    }

    pub fn obtain_global_config(&self) -> &ConfigFields {
        &self.global
    }

    /// A custom entry with no predefined counterpart.
    pub fn is_custom_config(&self, config: &str) -> bool {
        self.custom.contains_key(config) && !self.predefined.contains_key(config)
    }

    /// A custom entry shadowing a predefined entry of the same name.
    pub fn is_config_override(&self, config: &str) -> bool {
        self.custom.contains_key(config) && self.predefined.contains_key(config)
    }

    // -- Mutation --

    /// Store custom values for an existing or new configuration. The entry
    /// keeps only the supplied fields plus the injected `name`; an entry
    /// field-for-field identical to the predefined configuration of the same
    /// name is not stored at all. Callers batch mutations and persist them
    /// with [`Self::synchronize_custom_configs`].
    pub fn put_custom_config(&mut self, settings: ConfigFields, for_config: &str) {
        let mut entry = settings;
        entry.insert(
            fields::NAME.to_string(),
            ConfigValue::String(for_config.to_string()),
        );

        // Replace is delete + insert, so an edited entry moves to the end
        self.custom.remove(for_config);

        let matches_predefined = self
            .predefined
            .get(for_config)
            .is_some_and(|predefined| *predefined == entry);
        if matches_predefined {
            info!(config = %for_config, "Custom settings match the predefined entry, not storing");
            return;
        }
        self.custom.insert(for_config.to_string(), entry);
    }

    /// Remove a configuration: from the custom layer if present there,
    /// otherwise from the predefined layer. Removing the selected
    /// configuration transitions to Unselected, clears the persisted
    /// selection, re-materializes and notifies.
    pub fn remove_config(&mut self, config: &str) -> bool {
        let removed = if self.custom.remove(config).is_some() {
            true
        } else {
            self.predefined.remove(config).is_some()
        };
        if removed && self.selected.as_deref() == Some(config) {
            self.selected = None;
            self.persist_selection();
            self.manager
                .apply_config_to_model(&ConfigFields::new(), &self.global, None);
            info!(config = %config, "Removed the selected configuration");
            self.observers.notify();
        }
        removed
    }

    /// Select a configuration by name (custom layer first, then predefined),
    /// or none. An unresolvable name selects none. Persists the selection
    /// with a frozen snapshot of the resolved fields, re-materializes, and
    /// always notifies, even when the selection did not change.
    pub fn select_config(&mut self, config: Option<&str>) {
        self.selected = config
            .filter(|name| self.custom.contains_key(*name) || self.predefined.contains_key(*name))
            .map(String::from);
        self.persist_selection();
        let fields = self.resolved_selection_fields();
        self.manager
            .apply_config_to_model(&fields, &self.global, self.selected.as_deref());
        info!(selected = ?self.selected, "Configuration selected");
        self.observers.notify();
    }

    /// Replace the global field map wholesale, persist it, re-materialize
    /// and notify. Skipped only when both the old and new maps are empty.
    pub fn update_global_config(&mut self, fields: ConfigFields) {
        if self.global.is_empty() && fields.is_empty() {
            return;
        }
        self.global = fields;
        self.persist_global();
        let config = self.resolved_selection_fields();
        self.manager
            .apply_config_to_model(&config, &self.global, self.selected.as_deref());
        info!(fields = self.global.len(), "Global configuration updated");
        self.observers.notify();
    }

    /// Push the full custom layer to the persisted store.
    pub fn synchronize_custom_configs(&mut self) {
        let mut entries = Vec::new();
        for (name, fields) in self.custom.iter() {
            match serde_json::to_value(fields) {
                Ok(value) => entries.push(value),
                Err(e) => warn!(config = %name, error = %e, "Skipping unserializable custom configuration"),
            }
        }
        self.settings
            .set(storage_keys::CUSTOM_CONFIGS, Value::Array(entries));
    }

    // -- Loading --

    /// Load predefined configurations from the static source, replacing the
    /// layer wholesale on success, then load the persisted custom layer
    /// exactly once per process lifetime. Failures load nothing.
    pub fn load_from_source_sync(&mut self) {
        if let Some(path) = self.source_file.clone() {
            let defaults = self.manager.model_defaults();
            if let Some(loaded) = source::load_predefined(&path, &defaults) {
                self.predefined = loaded;
                self.source_file = None;
            }
        }
        self.load_custom_configs_once();
    }

    /// Asynchronous variant: the blocking parse runs off the current task,
    /// the layers are mutated only after it completes.
    pub async fn load_from_source(&mut self) {
        if let Some(path) = self.source_file.clone() {
            let defaults = self.manager.model_defaults();
            match tokio::task::spawn_blocking(move || source::load_predefined(&path, &defaults)).await
            {
                Ok(Some(loaded)) => {
                    self.predefined = loaded;
                    self.source_file = None;
                }
                Ok(None) => {}
                Err(e) => warn!(error = %e, "Configuration source load task failed"),
            }
        }
        self.load_custom_configs_once();
    }

    // -- Observers --

    /// Subscribe to the "configuration changed" event. Consumers re-query
    /// the storage; the event carries no payload.
    pub fn add_config_observer(&mut self, callback: impl Fn() + 'static) -> ObserverHandle {
        self.observers.add(Box::new(callback))
    }

    pub fn remove_config_observer(&mut self, handle: ObserverHandle) {
        self.observers.remove(handle);
    }

    // -- Internal --

    fn resolved_selection_fields(&self) -> ConfigFields {
        self.selected
            .as_deref()
            .and_then(|name| self.custom.get(name).or_else(|| self.predefined.get(name)))
            .cloned()
            .unwrap_or_default()
    }

    fn restore_selection(&mut self) {
        self.selected = None;
        let Some(name) = self
            .settings
            .get(storage_keys::SELECTED_NAME)
            .and_then(|v| v.as_str().map(String::from))
        else {
            return;
        };
        match self
            .settings
            .get(storage_keys::SELECTED_SNAPSHOT)
            .and_then(fields_from_json)
        {
            Some(snapshot) => {
                // The snapshot stands in for the entry until a source load
                // replaces the layer
                self.predefined.insert(name.clone(), snapshot);
                self.selected = Some(name);
            }
            None => {
                warn!(config = %name, "Persisted selection has no snapshot, falling back to defaults");
            }
        }
    }

    fn persist_selection(&mut self) {
        match &self.selected {
            Some(name) => {
                let fields = self.resolved_selection_fields();
                match serde_json::to_value(&fields) {
                    Ok(snapshot) => {
                        self.settings
                            .set(storage_keys::SELECTED_NAME, Value::String(name.clone()));
                        self.settings.set(storage_keys::SELECTED_SNAPSHOT, snapshot);
                    }
                    Err(e) => warn!(config = %name, error = %e, "Failed to snapshot selection"),
                }
            }
            None => {
                self.settings.remove(storage_keys::SELECTED_NAME);
                self.settings.remove(storage_keys::SELECTED_SNAPSHOT);
            }
        }
    }

    fn restore_global(&mut self) {
        if let Some(fields) = self
            .settings
            .get(storage_keys::GLOBAL_CONFIG)
            .and_then(fields_from_json)
        {
            self.global = fields;
        }
    }

    fn persist_global(&mut self) {
        match serde_json::to_value(&self.global) {
            Ok(value) => self.settings.set(storage_keys::GLOBAL_CONFIG, value),
            Err(e) => warn!(error = %e, "Failed to persist global configuration"),
        }
    }

    fn load_custom_configs_once(&mut self) {
        if self.custom_loaded {
            return;
        }
        self.custom.clear();
        if let Some(Value::Array(entries)) = self.settings.get(storage_keys::CUSTOM_CONFIGS) {
            for entry in entries {
                match serde_json::from_value::<ConfigFields>(entry) {
                    Ok(entry_fields) => {
                        match entry_fields.get(fields::NAME).and_then(|v| v.as_str()) {
                            Some(name) => {
                                self.custom.insert(name.to_string(), entry_fields.clone());
                            }
                            None => warn!("Skipping persisted custom configuration without a name"),
                        }
                    }
                    Err(e) => warn!(error = %e, "Skipping malformed custom configuration entry"),
                }
            }
        }
        self.custom_loaded = true;
    }
}

fn fields_from_json(value: Value) -> Option<ConfigFields> {
    match serde_json::from_value(value) {
        Ok(fields) => Some(fields),
        Err(e) => {
            warn!(error = %e, "Discarding malformed persisted field map");
            None
        }
    }
}
