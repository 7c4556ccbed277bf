//! Shared test fixtures: a sample application model and plugin
//!
//! Defaults always reflect the production baseline, the way an embedding
//! application would declare them.

use crate::mapper::{ChoiceValue, FieldScope, ModelMapper};
use crate::model::ConfigModel;
use crate::plugin::{ConfigPlugin, HostContext};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Normal,
    Quick,
    Strict,
}

impl ChoiceValue for RunMode {
    fn as_raw(&self) -> &'static str {
        match self {
            RunMode::Normal => "runNormally",
            RunMode::Quick => "runQuickly",
            RunMode::Strict => "runStrictly",
        }
    }

    fn from_raw(raw: &str) -> Option<Self> {
        match raw {
            "runNormally" => Some(RunMode::Normal),
            "runQuickly" => Some(RunMode::Quick),
            "runStrictly" => Some(RunMode::Strict),
            _ => None,
        }
    }

    fn variants() -> &'static [&'static str] {
        &["runNormally", "runQuickly", "runStrictly"]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Disabled,
    Normal,
    Verbose,
}

impl ChoiceValue for LogLevel {
    fn as_raw(&self) -> &'static str {
        match self {
            LogLevel::Disabled => "logDisabled",
            LogLevel::Normal => "logNormal",
            LogLevel::Verbose => "logVerbose",
        }
    }

    fn from_raw(raw: &str) -> Option<Self> {
        match raw {
            "logDisabled" => Some(LogLevel::Disabled),
            "logNormal" => Some(LogLevel::Normal),
            "logVerbose" => Some(LogLevel::Verbose),
            _ => None,
        }
    }

    fn variants() -> &'static [&'static str] {
        &["logDisabled", "logNormal", "logVerbose"]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SampleModel {
    // Configuration fields
    pub name: String,
    pub api_url: String,
    pub network_timeout_sec: i64,
    pub accept_all_ssl: bool,
    pub retry_backoff: f64,
    pub run_mode: RunMode,

    // Global fields
    pub console_url: String,
    pub console_timeout_sec: i64,
    pub console_enabled: bool,
    pub log_level: LogLevel,
}

impl Default for SampleModel {
    fn default() -> Self {
        Self {
            name: "Production".to_string(),
            api_url: "https://production.example.com/".to_string(),
            network_timeout_sec: 20,
            accept_all_ssl: false,
            retry_backoff: 1.5,
            run_mode: RunMode::Normal,
            console_url: "https://console.example.com/".to_string(),
            console_timeout_sec: 10,
            console_enabled: false,
            log_level: LogLevel::Disabled,
        }
    }
}

impl ConfigModel for SampleModel {
    fn describe(&mut self, mapper: &mut ModelMapper) {
        mapper.map_name(&mut self.name);
        mapper.map_float("retryBackoff", &mut self.retry_backoff, "", FieldScope::Config);
        mapper.map_string("apiUrl", &mut self.api_url, "API related", FieldScope::Config);
        mapper.map_int(
            "networkTimeoutSec",
            &mut self.network_timeout_sec,
            "API related",
            FieldScope::Config,
        );
        mapper.map_bool(
            "acceptAllSSL",
            &mut self.accept_all_ssl,
            "API related",
            FieldScope::Config,
        );
        mapper.map_choice(
            "runMode",
            &mut self.run_mode,
            RunMode::Normal,
            "API related",
            FieldScope::Config,
        );

        mapper.map_string(
            "consoleUrl",
            &mut self.console_url,
            "Console related",
            FieldScope::Global,
        );
        mapper.map_int(
            "consoleTimeoutSec",
            &mut self.console_timeout_sec,
            "Console related",
            FieldScope::Global,
        );
        mapper.map_bool(
            "consoleEnabled",
            &mut self.console_enabled,
            "Console related",
            FieldScope::Global,
        );
        mapper.map_choice(
            "logLevel",
            &mut self.log_level,
            LogLevel::Disabled,
            "Console related",
            FieldScope::Global,
        );
    }
}

#[derive(Debug, Default)]
pub struct TestHost;

impl HostContext for TestHost {}

/// Plugin fixture that counts interactions, like a log viewer row would.
pub struct LogPlugin {
    name: String,
    entries: Vec<String>,
}

impl LogPlugin {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            entries: Vec::new(),
        }
    }
}

impl ConfigPlugin for LogPlugin {
    fn display_name(&self) -> String {
        self.name.clone()
    }

    fn display_value(&self) -> Option<String> {
        Some(format!("{} entries", self.entries.len()))
    }

    fn interact(&mut self, _host: &mut dyn HostContext) {
        self.entries.push("opened".to_string());
    }
}
