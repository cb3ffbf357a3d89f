//! Command implementations for the tdl CLI.
//!
//! A script is JSONL: one [`Command`] object per line, applied in file
//! order. Entry commands carry their own logical timestamp, so the order of
//! lines only matters for `dismiss_user` / `allow_user`.

use crate::config::ResolvedConfig;
use crate::models::{Entry, EntryId, EntryStatus, Snapshot, Timestamp, UserId};
use crate::registry::TodoList;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;

/// One line of a script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    AddEntry {
        entry: EntryId,
        user: UserId,
        name: String,
        ts: Timestamp,
    },
    RemoveEntry {
        entry: EntryId,
        user: UserId,
        ts: Timestamp,
    },
    MarkDone {
        entry: EntryId,
        user: UserId,
        ts: Timestamp,
    },
    MarkUndone {
        entry: EntryId,
        user: UserId,
        ts: Timestamp,
    },
    DismissUser {
        user: UserId,
    },
    AllowUser {
        user: UserId,
    },
}

/// Command results that can be serialized to JSON or formatted for humans.
pub trait Output {
    /// Serialize to JSON string.
    fn to_json(&self) -> String;

    /// Format for human-readable output.
    fn to_human(&self) -> String;
}

/// Parse a JSONL script. Blank lines are skipped.
pub fn parse_script(input: &str) -> Result<Vec<Command>> {
    input
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            serde_json::from_str(line)
                .map_err(|e| Error::InvalidInput(format!("line {}: {}", idx + 1, e)))
        })
        .collect()
}

/// Read and parse a script from `path`, or from stdin when `path` is `-`.
pub fn read_script(path: &Path) -> Result<Vec<Command>> {
    let input = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(path)?
    };
    parse_script(&input)
}

/// Apply every command to `list`, in order.
pub fn replay(list: &mut TodoList, commands: impl IntoIterator<Item = Command>) -> usize {
    let mut applied = 0;
    for command in commands {
        list.execute(command);
        applied += 1;
    }
    tracing::debug!(applied, "script replayed");
    applied
}

/// Result of `tdl replay`.
#[derive(Debug, Serialize)]
pub struct ReplayResult {
    /// Number of script lines applied
    pub applied: usize,
    /// Number of live entries
    pub count: usize,
    /// Live entries, ascending by id
    pub entries: Vec<Entry>,
}

impl ReplayResult {
    pub fn collect(list: &mut TodoList, applied: usize) -> Self {
        let entries: Vec<Entry> = list.iter().cloned().collect();
        Self {
            applied,
            count: entries.len(),
            entries,
        }
    }
}

impl Output for ReplayResult {
    fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|e| serde_json::json!({ "error": e.to_string() }).to_string())
    }

    fn to_human(&self) -> String {
        if self.entries.is_empty() {
            return format!("No entries ({} commands applied).", self.applied);
        }
        let mut lines = vec![format!(
            "{} entr{} ({} commands applied):",
            self.count,
            if self.count == 1 { "y" } else { "ies" },
            self.applied
        )];
        for entry in &self.entries {
            lines.push(format_entry(entry));
        }
        lines.join("\n")
    }
}

/// Result of `tdl show`.
#[derive(Debug, Serialize)]
pub struct ShowResult {
    pub id: EntryId,
    /// Whether any command referenced this entry
    pub known: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<Snapshot>,
}

impl ShowResult {
    pub fn collect(list: &mut TodoList, id: EntryId) -> Self {
        let snapshot = list.snapshot(id).cloned();
        Self {
            id,
            known: snapshot.is_some(),
            snapshot,
        }
    }
}

impl Output for ShowResult {
    fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|e| serde_json::json!({ "error": e.to_string() }).to_string())
    }

    fn to_human(&self) -> String {
        match &self.snapshot {
            None => format!("Entry {} is unknown.", self.id),
            Some(snapshot) if snapshot.removed => {
                format!("Entry {} is removed.\n{}", self.id, format_entry(&snapshot.entry))
            }
            Some(snapshot) => format_entry(&snapshot.entry),
        }
    }
}

impl Output for ResolvedConfig {
    fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|e| serde_json::json!({ "error": e.to_string() }).to_string())
    }

    fn to_human(&self) -> String {
        let mut lines = Vec::new();
        if let Some(path) = &self.path {
            lines.push(format!("config file: {}", path.display()));
        }
        lines.push(format!(
            "dismissal-policy: {} ({})",
            self.dismissal_policy.value, self.dismissal_policy.source
        ));
        lines.push(format!(
            "refresh-on-dismissal: {} ({})",
            self.refresh_on_dismissal.value, self.refresh_on_dismissal.source
        ));
        lines.push(format!(
            "output-format: {} ({})",
            self.output_format.value, self.output_format.source
        ));
        lines.join("\n")
    }
}

fn format_entry(entry: &Entry) -> String {
    let mark = match entry.status {
        EntryStatus::Done => "x",
        EntryStatus::Undone => " ",
    };
    format!("  [{}] {} {}", mark, entry.id, entry.name)
}
