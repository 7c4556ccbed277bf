//! Static source loading
//!
//! Parses the bundled TOML document of predefined configurations and
//! flattens sub configurations into independent, flatly addressable
//! entries. Loading failures of any kind load nothing: the caller keeps
//! its current predefined layer.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::constants::{fields, source};
use crate::ordered_map::OrderedMap;
use crate::value::{ConfigFields, ConfigValue};

/// Parse the source document at `path`, seeding every top-level entry with
/// `defaults` so a source file only needs to declare the fields that differ
/// from the production baseline. Returns `None` when nothing usable loads.
pub fn load_predefined(
    path: &Path,
    defaults: &ConfigFields,
) -> Option<OrderedMap<String, ConfigFields>> {
    let document = match read_document(path) {
        Ok(document) => document,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to load configuration source");
            return None;
        }
    };

    let Some(entries) = document.get(source::CONFIGS).and_then(|v| v.as_array()) else {
        warn!(path = %path.display(), "Configuration source has no '{}' list", source::CONFIGS);
        return None;
    };

    let mut loaded = OrderedMap::new();
    for entry in entries {
        let Some(table) = entry.as_table() else {
            continue;
        };
        match table.get(fields::NAME).and_then(|v| v.as_str()) {
            Some(name) => add_entry(&mut loaded, name, table, defaults),
            None => warn!("Skipping source entry without a name"),
        }
    }

    if loaded.is_empty() {
        warn!(path = %path.display(), "Configuration source contained no usable entries");
        return None;
    }
    info!(path = %path.display(), count = loaded.len(), "Loaded predefined configurations");
    Some(loaded)
}

fn read_document(path: &Path) -> Result<toml::Table> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read source from {}", path.display()))?;
    toml::from_str(&contents)
        .with_context(|| format!("Failed to parse TOML from {}", path.display()))
}

/// Add one entry, then recurse into its sub configurations. A child inherits
/// every flattened field of its parent (parent fields first, child wins);
/// the reserved nesting key itself is never stored.
fn add_entry(
    loaded: &mut OrderedMap<String, ConfigFields>,
    name: &str,
    table: &toml::Table,
    defaults: &ConfigFields,
) {
    let mut entry = defaults.clone();
    for (key, value) in table {
        if key == fields::SUB_CONFIGS {
            continue;
        }
        match primitive_from_toml(value) {
            Some(value) => {
                entry.insert(key.clone(), value);
            }
            None => warn!(config = %name, key = %key, "Skipping non-primitive value in source entry"),
        }
    }
    loaded.insert(name.to_string(), entry.clone());

    if let Some(subs) = table.get(fields::SUB_CONFIGS).and_then(|v| v.as_array()) {
        for sub in subs {
            let Some(sub_table) = sub.as_table() else {
                continue;
            };
            match sub_table.get(fields::NAME).and_then(|v| v.as_str()) {
                Some(sub_name) => add_entry(loaded, sub_name, sub_table, &entry),
                None => warn!(parent = %name, "Skipping sub configuration without a name"),
            }
        }
    }
}

fn primitive_from_toml(value: &toml::Value) -> Option<ConfigValue> {
    match value {
        toml::Value::Boolean(b) => Some(ConfigValue::Bool(*b)),
        toml::Value::Integer(i) => Some(ConfigValue::Int(*i)),
        toml::Value::Float(f) => Some(ConfigValue::Float(*f)),
        toml::Value::String(s) => Some(ConfigValue::String(s.clone())),
        _ => None,
    }
}
