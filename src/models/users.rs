//! User directory: maps user ids to a mutable dismissed flag.

use super::UserId;
use std::collections::HashMap;

/// A user known to the directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub dismissed: bool,
}

/// Registry of users and their dismissal state.
///
/// Users are created lazily on first reference and never deleted.
/// `version` increases every time a dismissal flag actually flips, which
/// lets timelines notice that a cached fold is out of date.
#[derive(Debug, Clone, Default)]
pub struct UserDirectory {
    users: HashMap<UserId, User>,
    version: u64,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a user, creating it (not dismissed) on first reference.
    pub fn get_or_create(&mut self, id: UserId) -> &User {
        self.users.entry(id).or_insert(User {
            id,
            dismissed: false,
        })
    }

    /// Dismiss a user. Their changes are excluded from every later fold.
    pub fn dismiss(&mut self, id: UserId) {
        self.set_dismissed(id, true);
    }

    /// Re-allow a previously dismissed user.
    pub fn allow(&mut self, id: UserId) {
        self.set_dismissed(id, false);
    }

    /// Whether `id` is currently dismissed. Unknown users are not.
    pub fn is_dismissed(&self, id: UserId) -> bool {
        self.users.get(&id).is_some_and(|u| u.dismissed)
    }

    /// Counter bumped on every effective dismissal toggle.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Number of known users.
    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    fn set_dismissed(&mut self, id: UserId, dismissed: bool) {
        let user = self.users.entry(id).or_insert(User {
            id,
            dismissed: false,
        });
        if user.dismissed != dismissed {
            user.dismissed = dismissed;
            self.version += 1;
        }
    }
}
