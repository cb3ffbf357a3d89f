//! Precedence resolution for configuration.
//!
//! ## Config file location (highest to lowest)
//!
//! 1. `--config <PATH>` flag / `TDL_CONFIG` environment variable
//! 2. `<config_dir>/todoledger/config.kdl` (via `dirs`)
//!
//! A missing file means every value falls back to its default.
//!
//! ## Value precedence (highest to lowest)
//!
//! 1. CLI flags (passed at runtime)
//! 2. config.kdl
//! 3. Built-in defaults

use crate::config::{OutputFormat, TodoConfig};
use crate::timeline::{DismissalPolicy, FoldOptions};
use crate::{Error, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "TDL_CONFIG";

/// Config file name inside the todoledger config directory.
pub const CONFIG_FILE_NAME: &str = "config.kdl";

/// Tracks where a resolved value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSource {
    /// Value from CLI flag
    CliFlag,
    /// Value from a config file
    File(PathBuf),
    /// Built-in default value
    Default,
}

impl std::fmt::Display for ValueSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueSource::CliFlag => write!(f, "cli"),
            ValueSource::File(path) => write!(f, "file:{}", path.display()),
            ValueSource::Default => write!(f, "default"),
        }
    }
}

impl Serialize for ValueSource {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A resolved value with its source.
#[derive(Debug, Clone, Serialize)]
pub struct Resolved<T> {
    /// The resolved value
    pub value: T,
    /// Where the value came from
    pub source: ValueSource,
}

impl<T> Resolved<T> {
    /// Create a new resolved value.
    pub fn new(value: T, source: ValueSource) -> Self {
        Self { value, source }
    }
}

/// Values supplied on the command line.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub dismissal_policy: Option<DismissalPolicy>,
    pub refresh_on_dismissal: Option<bool>,
    pub output_format: Option<OutputFormat>,
}

/// Fully resolved configuration with source tracking.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedConfig {
    /// Config file consulted, whether or not it existed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    pub dismissal_policy: Resolved<DismissalPolicy>,
    pub refresh_on_dismissal: Resolved<bool>,
    pub output_format: Resolved<OutputFormat>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        let defaults = FoldOptions::default();
        Self {
            path: None,
            dismissal_policy: Resolved::new(defaults.dismissal_policy, ValueSource::Default),
            refresh_on_dismissal: Resolved::new(
                defaults.refresh_on_dismissal,
                ValueSource::Default,
            ),
            output_format: Resolved::new(OutputFormat::default(), ValueSource::Default),
        }
    }
}

impl ResolvedConfig {
    /// Fold options for a [`crate::registry::TodoList`].
    pub fn fold_options(&self) -> FoldOptions {
        FoldOptions {
            dismissal_policy: self.dismissal_policy.value,
            refresh_on_dismissal: self.refresh_on_dismissal.value,
        }
    }

    /// Get the output format value.
    pub fn output_format(&self) -> OutputFormat {
        self.output_format.value
    }
}

/// Default config file path, if the platform has a config directory.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("todoledger").join(CONFIG_FILE_NAME))
}

/// Load config.kdl from `path`. A missing file yields an empty config.
pub fn load_config(path: &Path) -> Result<TodoConfig> {
    match std::fs::read_to_string(path) {
        Ok(text) => TodoConfig::parse(&text).map_err(|e| match e {
            Error::Config(msg) => Error::Config(format!("{}: {}", path.display(), msg)),
            other => other,
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(TodoConfig::new()),
        Err(e) => Err(e.into()),
    }
}

/// Resolve configuration from the config file and CLI overrides.
///
/// `explicit_path` comes from `--config` / `TDL_CONFIG`; when absent the
/// default location is used.
pub fn resolve_config(
    explicit_path: Option<&Path>,
    overrides: &ConfigOverrides,
) -> Result<ResolvedConfig> {
    let path = explicit_path.map(Path::to_path_buf).or_else(default_config_path);
    let file = match &path {
        Some(path) => load_config(path)?,
        None => TodoConfig::new(),
    };
    tracing::debug!(path = ?path, "config loaded");

    let mut resolved = ResolvedConfig {
        path: path.clone(),
        ..ResolvedConfig::default()
    };
    let file_source = || ValueSource::File(path.clone().unwrap_or_default());

    if let Some(policy) = overrides.dismissal_policy {
        resolved.dismissal_policy = Resolved::new(policy, ValueSource::CliFlag);
    } else if let Some(policy) = file.dismissal_policy {
        resolved.dismissal_policy = Resolved::new(policy, file_source());
    }

    if let Some(refresh) = overrides.refresh_on_dismissal {
        resolved.refresh_on_dismissal = Resolved::new(refresh, ValueSource::CliFlag);
    } else if let Some(refresh) = file.refresh_on_dismissal {
        resolved.refresh_on_dismissal = Resolved::new(refresh, file_source());
    }

    if let Some(format) = overrides.output_format {
        resolved.output_format = Resolved::new(format, ValueSource::CliFlag);
    } else if let Some(format) = file.output_format {
        resolved.output_format = Resolved::new(format, file_source());
    }

    Ok(resolved)
}
