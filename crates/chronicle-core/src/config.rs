//! Tracing configuration
//!
//! Holds the active [`TracingLevel`] with runtime mutability (an atomic,
//! immediately visible to every thread sharing the config) plus the value
//! renderer limits. Configuration is resolved from `chronicle.toml` with a
//! `CHRONICLE_LEVEL` environment override; a missing file means defaults,
//! a malformed one is an error.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use thiserror::Error;

/// Name of the configuration file looked up in a project directory
pub const CONFIG_FILE: &str = "chronicle.toml";

/// Environment variable overriding the configured level
pub const LEVEL_ENV_VAR: &str = "CHRONICLE_LEVEL";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid TOML syntax in {file}: {error}")]
    TomlParse {
        file: PathBuf,
        error: toml::de::Error,
    },

    #[error("unknown tracing level {0:?} (expected off|errors|summary|narrative|detail)")]
    UnknownLevel(String),
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Verbosity of trace capture, ordered from nothing to full detail.
///
/// A higher level enables all behaviors of the levels below it:
/// `Off` captures nothing (the context reports inactive), `Errors` keeps
/// failure paths only, `Summary` keeps root and leaf calls and prunes
/// intermediates, `Narrative` keeps all calls without parameter values,
/// `Detail` keeps everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum TracingLevel {
    Off = 0,
    Errors = 1,
    Summary = 2,
    Narrative = 3,
    Detail = 4,
}

impl TracingLevel {
    /// Whether this level is at least as verbose as `required`
    pub fn is_enabled(self, required: TracingLevel) -> bool {
        self >= required
    }

    fn from_u8(raw: u8) -> TracingLevel {
        match raw {
            0 => TracingLevel::Off,
            1 => TracingLevel::Errors,
            2 => TracingLevel::Summary,
            3 => TracingLevel::Narrative,
            _ => TracingLevel::Detail,
        }
    }
}

impl FromStr for TracingLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> ConfigResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "off" => Ok(TracingLevel::Off),
            "errors" => Ok(TracingLevel::Errors),
            "summary" => Ok(TracingLevel::Summary),
            "narrative" => Ok(TracingLevel::Narrative),
            "detail" => Ok(TracingLevel::Detail),
            other => Err(ConfigError::UnknownLevel(other.to_string())),
        }
    }
}

/// Runtime configuration for trace capture.
///
/// Cloning shares the level cell, so a level change through any clone is
/// immediately visible to every context holding one.
#[derive(Debug, Clone)]
pub struct TraceConfig {
    level: Arc<AtomicU8>,
    max_string_len: usize,
    max_items: usize,
}

impl TraceConfig {
    /// Config with the default level (`Detail`) and default value limits
    pub fn new() -> Self {
        Self::with_level(TracingLevel::Detail)
    }

    pub fn with_level(level: TracingLevel) -> Self {
        Self {
            level: Arc::new(AtomicU8::new(level as u8)),
            max_string_len: 200,
            max_items: 5,
        }
    }

    /// Current tracing level
    pub fn level(&self) -> TracingLevel {
        TracingLevel::from_u8(self.level.load(Ordering::Relaxed))
    }

    /// Change the level at runtime; visible to all sharing threads
    pub fn set_level(&self, level: TracingLevel) {
        self.level.store(level as u8, Ordering::Relaxed);
    }

    /// Maximum rendered string length before truncation
    pub fn max_string_len(&self) -> usize {
        self.max_string_len
    }

    /// Maximum rendered collection items before the overflow marker
    pub fn max_items(&self) -> usize {
        self.max_items
    }
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    level: Option<TracingLevel>,
    values: Option<ValueLimits>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ValueLimits {
    max_string_len: Option<usize>,
    max_items: Option<usize>,
}

/// Resolve configuration for a project directory.
///
/// Reads `chronicle.toml` from `dir` when present, then applies the
/// `CHRONICLE_LEVEL` environment override.
pub fn resolve(dir: &Path) -> ConfigResult<TraceConfig> {
    let env_level = std::env::var(LEVEL_ENV_VAR).ok();
    resolve_with_env(dir, env_level.as_deref())
}

fn resolve_with_env(dir: &Path, env_level: Option<&str>) -> ConfigResult<TraceConfig> {
    let path = dir.join(CONFIG_FILE);
    let file = if path.exists() {
        load_file(&path)?
    } else {
        ConfigFile::default()
    };

    let mut level = file.level.unwrap_or(TracingLevel::Detail);
    if let Some(raw) = env_level {
        level = raw.parse()?;
    }

    let mut config = TraceConfig::with_level(level);
    if let Some(values) = file.values {
        if let Some(len) = values.max_string_len {
            config.max_string_len = len;
        }
        if let Some(items) = values.max_items {
            config.max_items = items;
        }
    }
    Ok(config)
}

fn load_file(path: &Path) -> ConfigResult<ConfigFile> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content).map_err(|error| ConfigError::TomlParse {
        file: path.to_path_buf(),
        error,
    })
}
