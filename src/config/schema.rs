//! KDL schema for config.kdl.
//!
//! This module provides:
//! - The Rust struct representing the KDL schema
//! - Serialization/deserialization to/from KDL format
//! - Merging of partially specified configs

use crate::timeline::DismissalPolicy;
use crate::{Error, Result};
use kdl::{KdlDocument, KdlEntry, KdlNode, KdlValue};
use serde::{Deserialize, Serialize};

/// Output format preference for CLI commands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JSON output (default, machine-readable)
    #[default]
    Json,
    /// Human-readable output
    Human,
}

impl OutputFormat {
    /// Parse from string, case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(OutputFormat::Json),
            "human" => Some(OutputFormat::Human),
            _ => None,
        }
    }

    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Human => "human",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Settings stored in config.kdl. Unset values fall through to defaults.
///
/// # KDL Schema
///
/// ```kdl
/// dismissal-policy "void-entry"  // or "skip-change"
/// refresh-on-dismissal #true
/// output-format "human"          // or "json"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoConfig {
    /// What a dismissed user's first `Add` does to an entry
    pub dismissal_policy: Option<DismissalPolicy>,

    /// Whether cached snapshots refresh when a dismissal flag flips
    pub refresh_on_dismissal: Option<bool>,

    /// Default output format for CLI commands
    pub output_format: Option<OutputFormat>,
}

impl TodoConfig {
    /// Create an empty config with no values set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse config from KDL source text.
    pub fn parse(input: &str) -> Result<Self> {
        let doc: KdlDocument = input
            .parse()
            .map_err(|e: kdl::KdlError| Error::Config(e.to_string()))?;
        Self::from_kdl(&doc)
    }

    /// Parse config from a KDL document.
    ///
    /// Unknown nodes are ignored; known nodes with bad values are errors.
    pub fn from_kdl(doc: &KdlDocument) -> Result<Self> {
        let mut config = Self::new();

        if let Some(value) = first_value(doc, "dismissal-policy") {
            let policy = value.as_string().and_then(DismissalPolicy::parse);
            config.dismissal_policy = Some(policy.ok_or_else(|| {
                Error::Config(format!(
                    "dismissal-policy must be \"void-entry\" or \"skip-change\", got {}",
                    value
                ))
            })?);
        }

        if let Some(value) = first_value(doc, "refresh-on-dismissal") {
            config.refresh_on_dismissal = Some(value.as_bool().ok_or_else(|| {
                Error::Config(format!(
                    "refresh-on-dismissal must be #true or #false, got {}",
                    value
                ))
            })?);
        }

        if let Some(value) = first_value(doc, "output-format") {
            let format = value.as_string().and_then(OutputFormat::parse);
            config.output_format = Some(format.ok_or_else(|| {
                Error::Config(format!(
                    "output-format must be \"json\" or \"human\", got {}",
                    value
                ))
            })?);
        }

        Ok(config)
    }

    /// Convert config to a KDL document.
    pub fn to_kdl(&self) -> KdlDocument {
        let mut doc = KdlDocument::new();

        if let Some(policy) = self.dismissal_policy {
            let mut node = KdlNode::new("dismissal-policy");
            node.push(KdlEntry::new(KdlValue::String(policy.as_str().to_string())));
            doc.nodes_mut().push(node);
        }

        if let Some(refresh) = self.refresh_on_dismissal {
            let mut node = KdlNode::new("refresh-on-dismissal");
            node.push(KdlEntry::new(KdlValue::Bool(refresh)));
            doc.nodes_mut().push(node);
        }

        if let Some(format) = self.output_format {
            let mut node = KdlNode::new("output-format");
            node.push(KdlEntry::new(KdlValue::String(format.as_str().to_string())));
            doc.nodes_mut().push(node);
        }

        doc
    }

    /// Merge another config into this one.
    /// Values from `other` override values in `self` if they are Some.
    pub fn merge(&mut self, other: &TodoConfig) {
        if other.dismissal_policy.is_some() {
            self.dismissal_policy = other.dismissal_policy;
        }
        if other.refresh_on_dismissal.is_some() {
            self.refresh_on_dismissal = other.refresh_on_dismissal;
        }
        if other.output_format.is_some() {
            self.output_format = other.output_format;
        }
    }
}

fn first_value<'a>(doc: &'a KdlDocument, name: &str) -> Option<&'a KdlValue> {
    doc.get(name)
        .and_then(|node| node.entries().first())
        .map(|entry| entry.value())
}
