#![forbid(unsafe_code)]

//! Runtime configuration selection and override engine
//!
//! Lets a build carry multiple named configurations (Production, Staging,
//! QA), lets a user select one at runtime or create custom configurations
//! that override a predefined one, and maps a strongly typed application
//! model to and from weakly typed key/value storage.
//!
//! The embedding application implements [`ConfigModel`] for its settings
//! struct, constructs one [`ConfigStorage`] at startup with a
//! [`SettingsStore`] for persistence, points it at a bundled source file,
//! and re-reads [`ConfigStorage::current_config`] whenever the
//! "configuration changed" event fires.

pub mod constants;
pub mod manager;
pub mod mapper;
pub mod model;
pub mod ordered_map;
pub mod plugin;
pub mod storage;
pub mod value;

#[cfg(test)]
mod test_fixtures;

// Re-export commonly used types
pub use manager::ConfigManager;
pub use mapper::{ChoiceValue, FieldScope, MapperMode, ModelMapper};
pub use model::ConfigModel;
pub use ordered_map::OrderedMap;
pub use plugin::{ConfigPlugin, HostContext};
pub use storage::settings::{FileSettings, MemorySettings, SettingsStore};
pub use storage::{ConfigStorage, ObserverHandle};
pub use value::{ConfigFields, ConfigValue};
