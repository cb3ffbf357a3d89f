//! The to-do list aggregate.
//!
//! [`TodoList`] routes the four entry commands to per-entry timelines,
//! owns the user directory, and answers enumeration and count queries over
//! live entries. None of its operations fail: unknown entries and users are
//! created on first reference.

use crate::commands::Command;
use crate::models::{Change, Entry, EntryId, Snapshot, Timestamp, UserDirectory, UserId};
use crate::timeline::{FoldOptions, Timeline};
use std::collections::BTreeMap;

/// Entry id to timeline map plus the users editing it.
#[derive(Debug, Clone, Default)]
pub struct TodoList {
    users: UserDirectory,
    timelines: BTreeMap<EntryId, Timeline>,
    options: FoldOptions,
}

impl TodoList {
    /// Create an empty list with default fold options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty list with the given fold options.
    pub fn with_options(options: FoldOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn options(&self) -> &FoldOptions {
        &self.options
    }

    /// Create entry `entry_id` or rename it.
    pub fn add_entry(
        &mut self,
        entry_id: EntryId,
        user_id: UserId,
        name: impl Into<String>,
        timestamp: Timestamp,
    ) {
        self.record(entry_id, timestamp, Change::add(user_id, name));
    }

    pub fn remove_entry(&mut self, entry_id: EntryId, user_id: UserId, timestamp: Timestamp) {
        self.record(entry_id, timestamp, Change::remove(user_id));
    }

    pub fn mark_done(&mut self, entry_id: EntryId, user_id: UserId, timestamp: Timestamp) {
        self.record(entry_id, timestamp, Change::done(user_id));
    }

    pub fn mark_undone(&mut self, entry_id: EntryId, user_id: UserId, timestamp: Timestamp) {
        self.record(entry_id, timestamp, Change::undone(user_id));
    }

    /// Exclude every change issued by `user_id` from future folds.
    pub fn dismiss_user(&mut self, user_id: UserId) {
        tracing::info!(user = user_id, "user dismissed");
        self.users.dismiss(user_id);
    }

    /// Re-include the changes of a dismissed user.
    pub fn allow_user(&mut self, user_id: UserId) {
        tracing::info!(user = user_id, "user allowed");
        self.users.allow(user_id);
    }

    /// Live entries, in ascending entry id order.
    pub fn iter(&mut self) -> impl Iterator<Item = &Entry> + '_ {
        let users = &self.users;
        let options = self.options;
        self.timelines.values_mut().filter_map(move |timeline| {
            let snapshot = timeline.current(users, &options);
            snapshot.is_live().then_some(&snapshot.entry)
        })
    }

    /// Number of live entries.
    pub fn count(&mut self) -> usize {
        self.iter().count()
    }

    /// Current snapshot of one entry, tombstoned or not.
    ///
    /// Returns `None` if no command ever referenced `entry_id`.
    pub fn snapshot(&mut self, entry_id: EntryId) -> Option<&Snapshot> {
        let timeline = self.timelines.get_mut(&entry_id)?;
        Some(timeline.current(&self.users, &self.options))
    }

    /// Timeline of one entry, if it was ever referenced.
    pub fn timeline(&self, entry_id: EntryId) -> Option<&Timeline> {
        self.timelines.get(&entry_id)
    }

    pub fn users(&self) -> &UserDirectory {
        &self.users
    }

    /// Apply one command.
    pub fn execute(&mut self, command: Command) {
        match command {
            Command::AddEntry {
                entry,
                user,
                name,
                ts,
            } => self.add_entry(entry, user, name, ts),
            Command::RemoveEntry { entry, user, ts } => self.remove_entry(entry, user, ts),
            Command::MarkDone { entry, user, ts } => self.mark_done(entry, user, ts),
            Command::MarkUndone { entry, user, ts } => self.mark_undone(entry, user, ts),
            Command::DismissUser { user } => self.dismiss_user(user),
            Command::AllowUser { user } => self.allow_user(user),
        }
    }

    fn record(&mut self, entry_id: EntryId, timestamp: Timestamp, change: Change) {
        self.users.get_or_create(change.user);
        let kind = change.kind();
        let user = change.user;
        let kept = self
            .timelines
            .entry(entry_id)
            .or_insert_with(|| Timeline::new(entry_id))
            .add_change(timestamp, change);
        tracing::debug!(entry = entry_id, user, timestamp, %kind, kept, "change recorded");
    }
}
