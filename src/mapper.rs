//! Mapping between the typed model and weakly typed field maps
//!
//! A model declares every field exactly once in its `describe` method; the
//! mapper's mode decides whether that pass collects schema metadata,
//! serializes field values into a map, or overwrites fields from one.

use std::collections::HashMap;

use crate::constants::fields;
use crate::ordered_map::OrderedMap;
use crate::value::{ConfigFields, ConfigValue};

/// What a `describe` pass does with each declared field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapperMode {
    /// Record keys, categories and choice sets; values are not touched
    CollectSchema,
    /// Write each field's current value into an output map
    Serialize,
    /// Overwrite each field whose key is present in the input map; absent
    /// keys leave the field at its current (default) value
    Deserialize,
}

/// Whether a field belongs to the selected configuration or to the
/// selection-independent global set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldScope {
    Config,
    Global,
}

/// String-backed closed choice set for enum-like configuration fields.
///
/// The wire form of such a field is always one of the declared raw strings.
pub trait ChoiceValue: Clone {
    fn as_raw(&self) -> &'static str;
    fn from_raw(raw: &str) -> Option<Self>;
    fn variants() -> &'static [&'static str];
}

/// Field walker passed into [`crate::model::ConfigModel::describe`].
pub struct ModelMapper {
    mode: MapperMode,
    input: ConfigFields,
    global_input: ConfigFields,
    output: ConfigFields,
    global_output: ConfigFields,
    categorized: OrderedMap<String, Vec<String>>,
    global_categorized: OrderedMap<String, Vec<String>>,
    choice_sets: HashMap<String, &'static [&'static str]>,
}

impl ModelMapper {
    /// Mapper for `CollectSchema` or `Serialize` mode.
    pub fn new(mode: MapperMode) -> Self {
        Self {
            mode,
            input: ConfigFields::new(),
            global_input: ConfigFields::new(),
            output: ConfigFields::new(),
            global_output: ConfigFields::new(),
            categorized: OrderedMap::new(),
            global_categorized: OrderedMap::new(),
            choice_sets: HashMap::new(),
        }
    }

    /// Mapper for `Deserialize` mode, with the configuration-scoped and
    /// global-scoped input maps.
    pub fn with_input(input: ConfigFields, global_input: ConfigFields) -> Self {
        let mut mapper = Self::new(MapperMode::Deserialize);
        mapper.input = input;
        mapper.global_input = global_input;
        mapper
    }

    pub fn mode(&self) -> MapperMode {
        self.mode
    }

    /// Declare the reserved `name` field. Serialized and deserialized like a
    /// string field but excluded from schema collection.
    pub fn map_name(&mut self, value: &mut String) {
        match self.mode {
            MapperMode::CollectSchema => {}
            MapperMode::Serialize => {
                self.output
                    .insert(fields::NAME.to_string(), ConfigValue::String(value.clone()));
            }
            MapperMode::Deserialize => {
                if let Some(stored) = self.input.get(fields::NAME) {
                    *value = expect_kind(fields::NAME, stored, stored.as_str().map(String::from));
                }
            }
        }
    }

    pub fn map_bool(&mut self, key: &str, value: &mut bool, category: &str, scope: FieldScope) {
        match self.mode {
            MapperMode::CollectSchema => self.record_key(key, category, scope),
            MapperMode::Serialize => {
                self.output_for(scope)
                    .insert(key.to_string(), ConfigValue::Bool(*value));
            }
            MapperMode::Deserialize => {
                if let Some(stored) = self.input_for(scope).get(key) {
                    *value = expect_kind(key, stored, stored.as_bool());
                }
            }
        }
    }

    pub fn map_int(&mut self, key: &str, value: &mut i64, category: &str, scope: FieldScope) {
        match self.mode {
            MapperMode::CollectSchema => self.record_key(key, category, scope),
            MapperMode::Serialize => {
                self.output_for(scope)
                    .insert(key.to_string(), ConfigValue::Int(*value));
            }
            MapperMode::Deserialize => {
                if let Some(stored) = self.input_for(scope).get(key) {
                    *value = expect_kind(key, stored, stored.as_int());
                }
            }
        }
    }

    pub fn map_float(&mut self, key: &str, value: &mut f64, category: &str, scope: FieldScope) {
        match self.mode {
            MapperMode::CollectSchema => self.record_key(key, category, scope),
            MapperMode::Serialize => {
                self.output_for(scope)
                    .insert(key.to_string(), ConfigValue::Float(*value));
            }
            MapperMode::Deserialize => {
                if let Some(stored) = self.input_for(scope).get(key) {
                    *value = expect_kind(key, stored, stored.as_float());
                }
            }
        }
    }

    pub fn map_string(&mut self, key: &str, value: &mut String, category: &str, scope: FieldScope) {
        match self.mode {
            MapperMode::CollectSchema => self.record_key(key, category, scope),
            MapperMode::Serialize => {
                self.output_for(scope)
                    .insert(key.to_string(), ConfigValue::String(value.clone()));
            }
            MapperMode::Deserialize => {
                if let Some(stored) = self.input_for(scope).get(key) {
                    *value = expect_kind(key, stored, stored.as_str().map(String::from));
                }
            }
        }
    }

    /// Declare an enum-like field with a closed raw-string choice set.
    ///
    /// A stored value that is missing from the declared set (or is not a
    /// string at all) substitutes `fallback` instead of failing.
    pub fn map_choice<T: ChoiceValue>(
        &mut self,
        key: &str,
        value: &mut T,
        fallback: T,
        category: &str,
        scope: FieldScope,
    ) {
        match self.mode {
            MapperMode::CollectSchema => {
                self.record_key(key, category, scope);
                self.choice_sets.insert(key.to_string(), T::variants());
            }
            MapperMode::Serialize => {
                self.output_for(scope)
                    .insert(key.to_string(), ConfigValue::String(value.as_raw().to_string()));
            }
            MapperMode::Deserialize => {
                if let Some(stored) = self.input_for(scope).get(key) {
                    *value = stored
                        .as_str()
                        .and_then(T::from_raw)
                        .unwrap_or(fallback);
                }
            }
        }
    }

    /// Serialized configuration-scoped fields (Serialize mode).
    pub fn into_config_values(self) -> ConfigFields {
        self.output
    }

    /// Serialized global-scoped fields (Serialize mode).
    pub fn into_global_values(self) -> ConfigFields {
        self.global_output
    }

    /// Collected configuration-scoped schema: category to ordered field keys,
    /// categories in first-encounter order with the uncategorized (empty
    /// string) group moved to the end.
    pub fn into_categorized_fields(self) -> OrderedMap<String, Vec<String>> {
        uncategorized_last(self.categorized)
    }

    /// Collected global-scoped schema, same ordering rules.
    pub fn into_global_categorized_fields(self) -> OrderedMap<String, Vec<String>> {
        uncategorized_last(self.global_categorized)
    }

    /// Whether the field was declared with a choice set (CollectSchema mode).
    pub fn is_choice_field(&self, field: &str) -> bool {
        self.choice_sets.contains_key(field)
    }

    /// Declared raw strings for a choice field (CollectSchema mode).
    pub fn choice_values(&self, field: &str) -> Option<Vec<String>> {
        self.choice_sets
            .get(field)
            .map(|variants| variants.iter().map(|v| v.to_string()).collect())
    }

    fn record_key(&mut self, key: &str, category: &str, scope: FieldScope) {
        let categorized = match scope {
            FieldScope::Config => &mut self.categorized,
            FieldScope::Global => &mut self.global_categorized,
        };
        match categorized.get_mut(category) {
            Some(keys) => keys.push(key.to_string()),
            None => {
                categorized.insert(category.to_string(), vec![key.to_string()]);
            }
        }
    }

    fn output_for(&mut self, scope: FieldScope) -> &mut ConfigFields {
        match scope {
            FieldScope::Config => &mut self.output,
            FieldScope::Global => &mut self.global_output,
        }
    }

    fn input_for(&self, scope: FieldScope) -> &ConfigFields {
        match scope {
            FieldScope::Config => &self.input,
            FieldScope::Global => &self.global_input,
        }
    }
}

/// Schema kind mismatches are contract violations: the model is statically
/// declared by the application, so a stored value of the wrong kind means
/// the source or persisted store was edited inconsistently with the build.
fn expect_kind<T>(key: &str, stored: &ConfigValue, converted: Option<T>) -> T {
    match converted {
        Some(value) => value,
        None => panic!(
            "configuration field '{key}' holds a {} value incompatible with its declared kind",
            stored.kind()
        ),
    }
}

fn uncategorized_last(mut categorized: OrderedMap<String, Vec<String>>) -> OrderedMap<String, Vec<String>> {
    if let Some(keys) = categorized.remove("") {
        categorized.insert(String::new(), keys);
    }
    categorized
}
