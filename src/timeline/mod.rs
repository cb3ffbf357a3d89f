//! Per-entry event log and lazy fold.
//!
//! A [`Timeline`] keeps every conflict-resolved [`Bucket`] for one entry,
//! ordered by timestamp, and memoizes the snapshot obtained by replaying
//! them. Appending a change only marks the timeline dirty; the replay
//! happens on the next read.
//!
//! Replay is a pure function of the buckets, the user directory, and the
//! [`DismissalPolicy`], so it can be rerun from scratch whenever a user's
//! dismissal state changes.

pub mod bucket;

use crate::models::{Change, ChangeKind, EntryId, Snapshot, Timestamp, UserDirectory, apply};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry as MapEntry;

pub use bucket::Bucket;

/// How a dismissed user's first `Add` affects the rest of an entry's log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DismissalPolicy {
    /// The first `Add` in fold order decides whether the entry exists at
    /// all. If its author is dismissed, or there is no `Add`, the entry
    /// folds to a tombstoned placeholder.
    #[default]
    VoidEntry,
    /// Only the dismissed user's own changes are skipped.
    SkipChange,
}

impl DismissalPolicy {
    /// Parse from string, case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "void-entry" | "void" => Some(Self::VoidEntry),
            "skip-change" | "skip" => Some(Self::SkipChange),
            _ => None,
        }
    }

    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VoidEntry => "void-entry",
            Self::SkipChange => "skip-change",
        }
    }
}

impl std::fmt::Display for DismissalPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Knobs controlling how timelines fold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoldOptions {
    pub dismissal_policy: DismissalPolicy,

    /// Rebuild a cached snapshot when any user's dismissal state changed
    /// since it was computed. When false, a dismissal is only observed by a
    /// timeline after its next append.
    pub refresh_on_dismissal: bool,
}

impl Default for FoldOptions {
    fn default() -> Self {
        Self {
            dismissal_policy: DismissalPolicy::default(),
            refresh_on_dismissal: true,
        }
    }
}

/// Ordered log of buckets for one entry plus its memoized snapshot.
#[derive(Debug, Clone)]
pub struct Timeline {
    id: EntryId,
    buckets: BTreeMap<Timestamp, Bucket>,
    dirty: bool,
    cached: Snapshot,
    /// Directory version the cached snapshot was folded against.
    folded_at: u64,
}

impl Timeline {
    /// Empty timeline for entry `id`.
    pub fn new(id: EntryId) -> Self {
        Self {
            id,
            buckets: BTreeMap::new(),
            dirty: true,
            cached: Snapshot::absent(id),
            folded_at: 0,
        }
    }

    pub fn id(&self) -> EntryId {
        self.id
    }

    /// Append a change at `timestamp`, resolving conflicts with changes
    /// already recorded there. Returns `true` if the change survived.
    pub fn add_change(&mut self, timestamp: Timestamp, change: Change) -> bool {
        self.dirty = true;
        match self.buckets.entry(timestamp) {
            MapEntry::Vacant(slot) => {
                slot.insert(Bucket::new(change));
                true
            }
            MapEntry::Occupied(mut slot) => {
                let kind = change.kind();
                let user = change.user;
                let kept = slot.get_mut().insert(change);
                if !kept {
                    tracing::trace!(
                        entry = self.id,
                        timestamp,
                        %kind,
                        user,
                        "conflicting change discarded"
                    );
                }
                kept
            }
        }
    }

    /// Current snapshot, rebuilt from the log if anything changed.
    pub fn current(&mut self, users: &UserDirectory, options: &FoldOptions) -> &Snapshot {
        if self.needs_rebuild(users, options) {
            self.cached = fold(self.id, &self.buckets, users, options.dismissal_policy);
            self.dirty = false;
            self.folded_at = users.version();
            tracing::trace!(
                entry = self.id,
                buckets = self.buckets.len(),
                removed = self.cached.removed,
                "timeline rebuilt"
            );
        }
        &self.cached
    }

    /// Whether a change was appended since the last fold.
    ///
    /// Dismissal changes are not reflected here, see [`Self::needs_rebuild`].
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Whether the next [`Self::current`] call has to replay the log: a
    /// change was appended, or `options.refresh_on_dismissal` is set and the
    /// directory version moved since the cached fold.
    pub fn needs_rebuild(&self, users: &UserDirectory, options: &FoldOptions) -> bool {
        self.dirty || (options.refresh_on_dismissal && self.folded_at != users.version())
    }

    /// The bucket recorded at `timestamp`, if any.
    pub fn bucket(&self, timestamp: Timestamp) -> Option<&Bucket> {
        self.buckets.get(&timestamp)
    }

    /// Buckets in ascending timestamp order.
    pub fn buckets(&self) -> impl Iterator<Item = (Timestamp, &Bucket)> {
        self.buckets.iter().map(|(ts, b)| (*ts, b))
    }

    /// Number of distinct timestamps recorded.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

/// Replay `buckets` in timestamp order into a snapshot of entry `id`.
///
/// Changes issued by currently dismissed users are skipped. With
/// [`DismissalPolicy::VoidEntry`] the first `Add` also gates the whole
/// entry, see the policy docs.
pub fn fold(
    id: EntryId,
    buckets: &BTreeMap<Timestamp, Bucket>,
    users: &UserDirectory,
    policy: DismissalPolicy,
) -> Snapshot {
    let mut current: Option<Snapshot> = None;
    let mut created = false;

    for change in buckets.values().flat_map(Bucket::changes) {
        let dismissed = users.is_dismissed(change.user);
        if change.kind() == ChangeKind::Add && !created {
            created = true;
            if dismissed && policy == DismissalPolicy::VoidEntry {
                return Snapshot::absent(id);
            }
        }
        if dismissed {
            continue;
        }
        current = Some(apply(id, &change.op, current.as_ref()));
    }

    match (policy, current) {
        (DismissalPolicy::VoidEntry, _) if !created => Snapshot::absent(id),
        (_, Some(snapshot)) => snapshot,
        (_, None) => Snapshot::absent(id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Entry, EntryStatus};

    fn skip() -> FoldOptions {
        FoldOptions {
            dismissal_policy: DismissalPolicy::SkipChange,
            ..FoldOptions::default()
        }
    }

    #[test]
    fn test_empty_timeline_is_absent() {
        let mut timeline = Timeline::new(1);
        let users = UserDirectory::new();
        assert_eq!(
            timeline.current(&users, &FoldOptions::default()),
            &Snapshot::absent(1)
        );
    }

    #[test]
    fn test_fold_in_timestamp_order_not_append_order() {
        let mut timeline = Timeline::new(1);
        let users = UserDirectory::new();
        timeline.add_change(300, Change::remove(10));
        timeline.add_change(100, Change::add(10, "buy milk"));
        timeline.add_change(200, Change::done(10));

        assert_eq!(timeline.id(), 1);
        let order: Vec<Timestamp> = timeline.buckets().map(|(ts, _)| ts).collect();
        assert_eq!(order, vec![100, 200, 300]);

        let snap = timeline.current(&users, &FoldOptions::default());
        assert!(snap.removed);
        assert_eq!(snap.entry, Entry::done(1, "buy milk"));
    }

    #[test]
    fn test_current_is_memoized() {
        let mut timeline = Timeline::new(1);
        let users = UserDirectory::new();
        timeline.add_change(1, Change::add(1, "a"));
        assert!(timeline.is_dirty());

        let first = timeline.current(&users, &FoldOptions::default()).clone();
        assert!(!timeline.is_dirty());
        let second = timeline.current(&users, &FoldOptions::default()).clone();
        assert_eq!(first, second);

        timeline.add_change(2, Change::done(1));
        assert!(timeline.is_dirty());
    }

    #[test]
    fn test_add_and_done_at_same_timestamp() {
        let mut timeline = Timeline::new(1);
        let users = UserDirectory::new();
        timeline.add_change(5, Change::done(2));
        timeline.add_change(5, Change::add(2, "x"));

        let snap = timeline.current(&users, &FoldOptions::default());
        assert_eq!(snap, &Snapshot::live(Entry::done(1, "x")));
    }

    #[test]
    fn test_add_preserves_done_across_timestamps() {
        let mut timeline = Timeline::new(1);
        let users = UserDirectory::new();
        timeline.add_change(1, Change::add(1, "old"));
        timeline.add_change(2, Change::done(1));
        timeline.add_change(3, Change::add(1, "new"));

        let snap = timeline.current(&users, &FoldOptions::default());
        assert_eq!(snap.entry, Entry::done(1, "new"));
    }

    #[test]
    fn test_discarded_change_reported() {
        let mut timeline = Timeline::new(1);
        assert!(timeline.add_change(1, Change::remove(1)));
        assert!(!timeline.add_change(1, Change::add(0, "x")));
        assert_eq!(timeline.len(), 1);
        assert_eq!(timeline.bucket(1), Some(&Bucket::Removed(Change::remove(1))));
    }

    #[test]
    fn test_dismissed_changes_skipped() {
        let mut timeline = Timeline::new(1);
        let mut users = UserDirectory::new();
        timeline.add_change(1, Change::add(1, "a"));
        timeline.add_change(2, Change::done(2));
        users.dismiss(2);

        let snap = timeline.current(&users, &FoldOptions::default());
        assert_eq!(snap.entry.status, EntryStatus::Undone);
    }

    #[test]
    fn test_void_entry_when_creator_dismissed() {
        let mut timeline = Timeline::new(1);
        let mut users = UserDirectory::new();
        timeline.add_change(1, Change::add(7, "x"));
        timeline.add_change(2, Change::done(8));
        users.dismiss(7);

        let snap = timeline.current(&users, &FoldOptions::default());
        assert_eq!(snap, &Snapshot::absent(1));
    }

    #[test]
    fn test_skip_change_when_creator_dismissed() {
        let mut timeline = Timeline::new(1);
        let mut users = UserDirectory::new();
        timeline.add_change(1, Change::add(7, "x"));
        timeline.add_change(2, Change::done(8));
        users.dismiss(7);

        let snap = timeline.current(&users, &skip());
        assert_eq!(snap, &Snapshot::live(Entry::done(1, "")));
    }

    #[test]
    fn test_void_entry_only_checks_first_add() {
        let mut timeline = Timeline::new(1);
        let mut users = UserDirectory::new();
        timeline.add_change(1, Change::add(1, "first"));
        timeline.add_change(2, Change::add(2, "second"));
        users.dismiss(2);

        let snap = timeline.current(&users, &FoldOptions::default());
        assert_eq!(snap, &Snapshot::live(Entry::undone(1, "first")));
    }

    #[test]
    fn test_marks_without_add() {
        let mut void = Timeline::new(3);
        let mut skipping = Timeline::new(3);
        let users = UserDirectory::new();
        void.add_change(1, Change::done(1));
        skipping.add_change(1, Change::done(1));

        assert_eq!(void.current(&users, &FoldOptions::default()), &Snapshot::absent(3));
        assert_eq!(
            skipping.current(&users, &skip()),
            &Snapshot::live(Entry::done(3, ""))
        );
    }

    #[test]
    fn test_refresh_on_dismissal() {
        let mut timeline = Timeline::new(1);
        let mut users = UserDirectory::new();
        timeline.add_change(1, Change::add(1, "a"));
        timeline.add_change(2, Change::done(2));
        let options = FoldOptions::default();
        assert_eq!(timeline.current(&users, &options).entry.status, EntryStatus::Done);

        users.dismiss(2);
        assert!(!timeline.is_dirty());
        assert!(timeline.needs_rebuild(&users, &options));
        assert_eq!(timeline.current(&users, &options).entry.status, EntryStatus::Undone);
        assert!(!timeline.needs_rebuild(&users, &options));

        users.allow(2);
        assert_eq!(timeline.current(&users, &options).entry.status, EntryStatus::Done);
    }

    #[test]
    fn test_stale_cache_without_refresh() {
        let mut timeline = Timeline::new(1);
        let mut users = UserDirectory::new();
        let options = FoldOptions {
            refresh_on_dismissal: false,
            ..FoldOptions::default()
        };
        timeline.add_change(1, Change::add(1, "a"));
        timeline.add_change(2, Change::done(2));
        assert_eq!(timeline.current(&users, &options).entry.status, EntryStatus::Done);

        users.dismiss(2);
        assert!(!timeline.needs_rebuild(&users, &options));
        assert_eq!(timeline.current(&users, &options).entry.status, EntryStatus::Done);

        // Any append forces the rebuild that picks up the dismissal.
        timeline.add_change(0, Change::add(1, "a"));
        assert_eq!(timeline.current(&users, &options).entry.status, EntryStatus::Undone);
    }

    #[test]
    fn test_dismissal_policy_parse() {
        assert_eq!(DismissalPolicy::parse("VOID-ENTRY"), Some(DismissalPolicy::VoidEntry));
        assert_eq!(DismissalPolicy::parse("skip"), Some(DismissalPolicy::SkipChange));
        assert_eq!(DismissalPolicy::parse("nope"), None);
        assert_eq!(DismissalPolicy::SkipChange.to_string(), "skip-change");
    }
}
