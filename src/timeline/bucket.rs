//! Per-timestamp conflict resolution.
//!
//! All changes for one entry that share a timestamp land in one [`Bucket`].
//! Inserting a change reduces the bucket immediately, so a bucket holds
//! either a single `Remove`, or at most one `Add` plus at most one of
//! `Done`/`Undone`.
//!
//! Rules, applied per incoming change:
//! - `Remove` evicts everything else; later non-`Remove` inserts are dropped.
//! - `Add` replaces the current `Add` only if its user id is strictly smaller.
//! - `Undone` evicts `Done`; `Done` is dropped while an `Undone` is present.
//! - Two changes of the same kind keep the smaller user id (first writer on
//!   equal ids), so the outcome does not depend on insertion order.

use crate::models::{Change, ChangeKind};

/// Conflict-resolved set of changes sharing one timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Bucket {
    /// A `Remove` won; nothing else survives at this timestamp.
    Removed(Change),
    /// No `Remove` at this timestamp.
    Open {
        add: Option<Change>,
        /// Either a `Done` or an `Undone` change.
        mark: Option<Change>,
    },
}

impl Bucket {
    /// Bucket holding a single change.
    pub fn new(change: Change) -> Self {
        match change.kind() {
            ChangeKind::Remove => Self::Removed(change),
            ChangeKind::Add => Self::Open {
                add: Some(change),
                mark: None,
            },
            ChangeKind::Done | ChangeKind::Undone => Self::Open {
                add: None,
                mark: Some(change),
            },
        }
    }

    /// Insert a change, resolving conflicts with the current survivors.
    ///
    /// Returns `true` if the incoming change survived.
    pub fn insert(&mut self, change: Change) -> bool {
        match self {
            Self::Removed(current) => match change.kind() {
                ChangeKind::Remove => keep_lowest(current, change),
                ChangeKind::Add | ChangeKind::Done | ChangeKind::Undone => false,
            },
            Self::Open { add, mark } => match change.kind() {
                ChangeKind::Remove => {
                    *self = Self::Removed(change);
                    true
                }
                ChangeKind::Add => fill_or_keep_lowest(add, change),
                ChangeKind::Done => {
                    if mark.as_ref().is_some_and(|c| c.kind() == ChangeKind::Undone) {
                        false
                    } else {
                        fill_or_keep_lowest(mark, change)
                    }
                }
                ChangeKind::Undone => {
                    if let Some(current) = mark.as_mut().filter(|c| c.kind() == ChangeKind::Undone) {
                        keep_lowest(current, change)
                    } else {
                        *mark = Some(change);
                        true
                    }
                }
            },
        }
    }

    /// Surviving changes in fold order (`Add`, `Remove`, `Done`, `Undone`).
    pub fn changes(&self) -> impl Iterator<Item = &Change> {
        let (add, remove, mark) = match self {
            Self::Removed(remove) => (None, Some(remove), None),
            Self::Open { add, mark } => (add.as_ref(), None, mark.as_ref()),
        };
        add.into_iter().chain(remove).chain(mark)
    }

    /// The surviving change of `kind`, if any.
    pub fn get(&self, kind: ChangeKind) -> Option<&Change> {
        self.changes().find(|c| c.kind() == kind)
    }

    /// Number of surviving changes.
    pub fn len(&self) -> usize {
        self.changes().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn keep_lowest(current: &mut Change, incoming: Change) -> bool {
    if incoming.user < current.user {
        *current = incoming;
        true
    } else {
        false
    }
}

fn fill_or_keep_lowest(slot: &mut Option<Change>, incoming: Change) -> bool {
    match slot {
        Some(current) => keep_lowest(current, incoming),
        None => {
            *slot = Some(incoming);
            true
        }
    }
}
