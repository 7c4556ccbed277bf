//! Application-wide constants
//!
//! Reserved field names and storage keys used throughout the engine,
//! providing a single source of truth for string literals.

/// Reserved keys inside configuration entries
pub mod fields {
    /// Name of the configuration an entry belongs to; always present in a
    /// persisted entry and injected/removed by the engine
    pub const NAME: &str = "name";

    /// Nesting key in the static source; never stored in a flattened entry
    pub const SUB_CONFIGS: &str = "subConfigs";
}

/// Logical keys in the persisted key/value blob store
pub mod storage_keys {
    /// Currently selected configuration name (JSON string)
    pub const SELECTED_NAME: &str = "selected_config_name";

    /// Frozen field snapshot of the selected configuration (JSON object)
    pub const SELECTED_SNAPSHOT: &str = "selected_config_snapshot";

    /// User-created configurations, in layer order (JSON array of objects)
    pub const CUSTOM_CONFIGS: &str = "custom_configs";

    /// Global field overrides, independent of the selection (JSON object)
    pub const GLOBAL_CONFIG: &str = "global_config";
}

/// Static source document structure
pub mod source {
    /// Top-level array key holding the ordered list of entries
    pub const CONFIGS: &str = "configs";
}
