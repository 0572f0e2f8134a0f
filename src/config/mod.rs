//! Configuration system (layered: defaults < config file < env).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AgentwireError, Result};
use crate::util::json::DEFAULT_UNWRAP_DEPTH;

pub const ENV_MODEL: &str = "AGENTWIRE_MODEL";
pub const ENV_TEMPERATURE: &str = "AGENTWIRE_TEMPERATURE";
pub const ENV_TOOL_CHOICE: &str = "AGENTWIRE_TOOL_CHOICE";
pub const ENV_PARALLEL_TOOL_CALLS: &str = "AGENTWIRE_PARALLEL_TOOL_CALLS";
pub const ENV_FINISH_REASON: &str = "AGENTWIRE_FINISH_REASON";
pub const ENV_OUTPUT_NAME: &str = "AGENTWIRE_OUTPUT_NAME";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AgentwireConfig {
    pub stream: StreamConfig,
    pub wire: WireConfig,
}

/// Settings for UI stream aggregation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StreamConfig {
    /// Finish reason attached to the synthesized `finish` part.
    pub finish_reason: String,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            finish_reason: "stop".to_string(),
        }
    }
}

/// Settings for chat-completion requests and responses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WireConfig {
    pub model: Option<String>,
    pub temperature: f64,
    pub tool_choice: String,
    pub parallel_tool_calls: bool,
    /// Layers of string-encoding peeled off tool-call arguments.
    pub max_unwrap_depth: usize,
    /// Name of the structured output. When set, decoded text is also
    /// attached as a JSON data item under this name.
    pub output_name: Option<String>,
}

impl Default for WireConfig {
    fn default() -> Self {
        Self {
            model: None,
            temperature: 1.0,
            tool_choice: "auto".to_string(),
            parallel_tool_calls: true,
            max_unwrap_depth: DEFAULT_UNWRAP_DEPTH,
            output_name: None,
        }
    }
}

impl AgentwireConfig {
    /// Parse a TOML document. Missing keys fall back to defaults.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Load a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        debug!(path = %path.display(), "loaded agentwire config file");
        Self::from_toml_str(&source)
    }

    /// `<config dir>/agentwire/config.toml` for the current user.
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "agentwire")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Defaults, then the default config file if it exists, then environment
    /// variables (a `.env` file is honored).
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error

        let base = match Self::default_path() {
            Some(path) if path.is_file() => Self::load(path)?,
            _ => Self::default(),
        };
        base.apply_env()
    }

    /// Override fields from `AGENTWIRE_*` environment variables.
    pub fn apply_env(self) -> Result<Self> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Override fields from an arbitrary variable lookup.
    pub fn apply_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(model) = lookup(ENV_MODEL) {
            self.wire.model = Some(model);
        }
        if let Some(raw) = lookup(ENV_TEMPERATURE) {
            self.wire.temperature = raw.trim().parse().map_err(|_| {
                AgentwireError::Configuration(format!("{ENV_TEMPERATURE} is not a number: {raw}"))
            })?;
        }
        if let Some(choice) = lookup(ENV_TOOL_CHOICE) {
            self.wire.tool_choice = choice;
        }
        if let Some(raw) = lookup(ENV_PARALLEL_TOOL_CALLS) {
            self.wire.parallel_tool_calls = parse_bool(&raw).ok_or_else(|| {
                AgentwireError::Configuration(format!(
                    "{ENV_PARALLEL_TOOL_CALLS} is not a boolean: {raw}"
                ))
            })?;
        }
        if let Some(name) = lookup(ENV_OUTPUT_NAME) {
            self.wire.output_name = Some(name).filter(|n| !n.trim().is_empty());
        }
        if let Some(reason) = lookup(ENV_FINISH_REASON) {
            self.stream.finish_reason = reason;
        }
        Ok(self)
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
