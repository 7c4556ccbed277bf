//! Base contract for strongly typed configuration models
//!
//! An application model implements `describe` once, declaring every field
//! with its category and scope; the provided helpers replay that single
//! declaration list for schema collection, serialization and overriding.
//! Only flat models with primitive fields and string-backed choice enums
//! are supported.

use crate::constants::fields;
use crate::mapper::{MapperMode, ModelMapper};
use crate::ordered_map::OrderedMap;
use crate::value::{ConfigFields, ConfigValue};

pub trait ConfigModel: Default {
    /// Declare every field exactly once against the mapper. The same
    /// declaration list must report itself identically regardless of the
    /// mapper's mode.
    fn describe(&mut self, mapper: &mut ModelMapper);

    /// Current configuration-scoped field values as a flat map.
    fn to_map(&mut self) -> ConfigFields {
        let mut mapper = ModelMapper::new(MapperMode::Serialize);
        self.describe(&mut mapper);
        mapper.into_config_values()
    }

    /// Current global-scoped field values as a flat map.
    fn to_global_map(&mut self) -> ConfigFields {
        let mut mapper = ModelMapper::new(MapperMode::Serialize);
        self.describe(&mut mapper);
        mapper.into_global_values()
    }

    /// Configuration-scoped field keys grouped by category.
    fn categorized_fields(&mut self) -> OrderedMap<String, Vec<String>> {
        let mut mapper = ModelMapper::new(MapperMode::CollectSchema);
        self.describe(&mut mapper);
        mapper.into_categorized_fields()
    }

    /// Global-scoped field keys grouped by category.
    fn global_categorized_fields(&mut self) -> OrderedMap<String, Vec<String>> {
        let mut mapper = ModelMapper::new(MapperMode::CollectSchema);
        self.describe(&mut mapper);
        mapper.into_global_categorized_fields()
    }

    /// Whether the field was declared with a closed choice set.
    fn is_choice_field(&mut self, field: &str) -> bool {
        let mut mapper = ModelMapper::new(MapperMode::CollectSchema);
        self.describe(&mut mapper);
        mapper.is_choice_field(field)
    }

    /// Declared raw strings for a choice field, in declaration order.
    fn choice_values(&mut self, field: &str) -> Option<Vec<String>> {
        let mut mapper = ModelMapper::new(MapperMode::CollectSchema);
        self.describe(&mut mapper);
        mapper.choice_values(field)
    }

    /// Overwrite fields from the resolved configuration and global maps in
    /// one pass. The selected name is injected into the override map (or
    /// removed from it when no configuration is selected) so the model's
    /// `name` field always tracks the selection.
    fn apply_overrides(
        &mut self,
        config: &ConfigFields,
        global: &ConfigFields,
        name: Option<&str>,
    ) {
        let mut overrides = config.clone();
        match name {
            Some(name) => {
                overrides.insert(fields::NAME.to_string(), ConfigValue::String(name.to_string()));
            }
            None => {
                overrides.remove(fields::NAME);
            }
        }
        let mut mapper = ModelMapper::with_input(overrides, global.clone());
        self.describe(&mut mapper);
    }
}
