//! Data models for todoledger entities.
//!
//! This module defines the core data structures:
//! - `Entry` - A to-do item with a name and a done/undone status
//! - `Snapshot` - An entry value plus its tombstone flag
//! - `ChangeOp` / `ChangeKind` - The four proposed mutations
//! - `Change` - One mutation tagged with the user who issued it
//!
//! Changes carry data only. Turning a change into a new snapshot is the job
//! of the pure [`apply`] function.

pub mod users;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use users::{User, UserDirectory};

/// Identifier of a to-do entry.
pub type EntryId = i64;

/// Identifier of a user issuing changes.
pub type UserId = i64;

/// Caller-supplied logical timestamp. Totally ordered, may repeat.
pub type Timestamp = i64;

/// Completion state of an entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    Done,
    #[default]
    Undone,
}

impl EntryStatus {
    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Done => "done",
            Self::Undone => "undone",
        }
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A to-do item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entry {
    /// Entry identifier
    pub id: EntryId,

    /// Display name (empty for placeholders)
    pub name: String,

    /// Current completion state
    pub status: EntryStatus,
}

impl Entry {
    /// Create an entry with the given status.
    pub fn new(id: EntryId, name: impl Into<String>, status: EntryStatus) -> Self {
        Self {
            id,
            name: name.into(),
            status,
        }
    }

    /// Create an undone entry.
    pub fn undone(id: EntryId, name: impl Into<String>) -> Self {
        Self::new(id, name, EntryStatus::Undone)
    }

    /// Create a done entry.
    pub fn done(id: EntryId, name: impl Into<String>) -> Self {
        Self::new(id, name, EntryStatus::Done)
    }

    /// Placeholder value for an entry that was never created.
    pub fn placeholder(id: EntryId) -> Self {
        Self::undone(id, "")
    }

    /// Copy of this entry with a different status.
    pub fn with_status(&self, status: EntryStatus) -> Self {
        Self {
            id: self.id,
            name: self.name.clone(),
            status,
        }
    }
}

/// An entry value plus the tombstone flag carried alongside it.
///
/// A tombstoned snapshot keeps whatever value the entry had when it was
/// removed, or a placeholder if it never existed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Snapshot {
    /// Entry value
    pub entry: Entry,

    /// Tombstone flag
    pub removed: bool,
}

impl Snapshot {
    /// Live snapshot of `entry`.
    pub fn live(entry: Entry) -> Self {
        Self {
            entry,
            removed: false,
        }
    }

    /// Tombstoned snapshot carrying `entry`.
    pub fn tombstone(entry: Entry) -> Self {
        Self {
            entry,
            removed: true,
        }
    }

    /// Tombstoned placeholder for an entry that does not exist.
    pub fn absent(id: EntryId) -> Self {
        Self::tombstone(Entry::placeholder(id))
    }

    /// Whether the entry is visible to enumeration.
    pub fn is_live(&self) -> bool {
        !self.removed
    }
}

/// The four command kinds.
///
/// The derived ordering is the order in which surviving changes of one
/// timestamp are applied during a fold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Add,
    Remove,
    Done,
    Undone,
}

impl ChangeKind {
    /// All kinds in fold order.
    pub const ALL: [ChangeKind; 4] = [
        ChangeKind::Add,
        ChangeKind::Remove,
        ChangeKind::Done,
        ChangeKind::Undone,
    ];

    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Remove => "remove",
            Self::Done => "done",
            Self::Undone => "undone",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A proposed mutation together with the data it needs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChangeOp {
    /// Create the entry or rename it, keeping a done status.
    Add { name: String },
    /// Tombstone the entry.
    Remove,
    /// Mark the entry done.
    Done,
    /// Mark the entry undone.
    Undone,
}

impl ChangeOp {
    /// The kind tag of this op.
    pub fn kind(&self) -> ChangeKind {
        match self {
            Self::Add { .. } => ChangeKind::Add,
            Self::Remove => ChangeKind::Remove,
            Self::Done => ChangeKind::Done,
            Self::Undone => ChangeKind::Undone,
        }
    }
}

/// One mutation issued by one user.
///
/// The user is held by id and resolved against the [`UserDirectory`] at
/// fold time, so dismissal toggles apply retroactively.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Change {
    /// Issuing user
    pub user: UserId,

    /// What the change does
    #[serde(flatten)]
    pub op: ChangeOp,
}

impl Change {
    /// Create a change.
    pub fn new(user: UserId, op: ChangeOp) -> Self {
        Self { user, op }
    }

    pub fn add(user: UserId, name: impl Into<String>) -> Self {
        Self::new(user, ChangeOp::Add { name: name.into() })
    }

    pub fn remove(user: UserId) -> Self {
        Self::new(user, ChangeOp::Remove)
    }

    pub fn done(user: UserId) -> Self {
        Self::new(user, ChangeOp::Done)
    }

    pub fn undone(user: UserId) -> Self {
        Self::new(user, ChangeOp::Undone)
    }

    /// The kind tag of this change.
    pub fn kind(&self) -> ChangeKind {
        self.op.kind()
    }
}

/// Apply `op` to the previous snapshot of entry `id`.
///
/// `prev` is `None` when nothing has been applied yet. Every application
/// fully replaces the snapshot.
pub fn apply(id: EntryId, op: &ChangeOp, prev: Option<&Snapshot>) -> Snapshot {
    match op {
        ChangeOp::Add { name } => match prev {
            Some(prev) if prev.is_live() && prev.entry.status == EntryStatus::Done => {
                Snapshot::live(Entry::done(id, name.clone()))
            }
            _ => Snapshot::live(Entry::undone(id, name.clone())),
        },
        ChangeOp::Remove => match prev {
            Some(prev) => Snapshot::tombstone(prev.entry.clone()),
            None => Snapshot::absent(id),
        },
        ChangeOp::Done => mark(id, EntryStatus::Done, prev),
        ChangeOp::Undone => mark(id, EntryStatus::Undone, prev),
    }
}

fn mark(id: EntryId, status: EntryStatus, prev: Option<&Snapshot>) -> Snapshot {
    match prev {
        Some(prev) => Snapshot::live(prev.entry.with_status(status)),
        None => Snapshot::live(Entry::new(id, "", status)),
    }
}
