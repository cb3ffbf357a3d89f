//! Configuration for todoledger.
//!
//! ## config.kdl - Fold behavior and output preferences
//!
//! Located at:
//! - Explicit: `--config <PATH>` or `TDL_CONFIG`
//! - Default: `<config_dir>/todoledger/config.kdl`
//!
//! Contains:
//! - `dismissal-policy` - "void-entry" or "skip-change"
//! - `refresh-on-dismissal` - rebuild cached snapshots when a user is dismissed
//! - `output-format` - "json" or "human"
//!
//! ## Precedence
//!
//! CLI flag > config.kdl > defaults
//!
//! Use the [`resolver`] module for precedence resolution.

pub mod resolver;
pub mod schema;

pub use resolver::{
    CONFIG_FILE_NAME, CONFIG_PATH_ENV, ConfigOverrides, Resolved, ResolvedConfig, ValueSource,
    default_config_path, load_config, resolve_config,
};
pub use schema::{OutputFormat, TodoConfig};
