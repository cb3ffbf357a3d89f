//! todoledger - Deterministic reconciliation of concurrently edited to-do entries.
//!
//! Users edit shared entries through four commands (add, remove, mark done,
//! mark undone), each tagged with a logical timestamp. Commands may arrive in
//! any order; every entry still converges to one current value:
//!
//! - [`timeline::Bucket`] resolves conflicts between changes that share a
//!   timestamp.
//! - [`timeline::Timeline`] keeps the ordered log for one entry and lazily
//!   folds it into a [`models::Snapshot`].
//! - [`registry::TodoList`] routes commands to timelines and enumerates live
//!   entries.
//!
//! Dismissing a user retroactively removes their changes from every fold.
//!
//! ```
//! use todoledger::registry::TodoList;
//!
//! let mut list = TodoList::new();
//! list.add_entry(1, 9, "A", 5);
//! list.add_entry(1, 3, "B", 5);
//! assert_eq!(list.snapshot(1).unwrap().entry.name, "B");
//! assert_eq!(list.count(), 1);
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod models;
pub mod registry;
pub mod timeline;

/// Library-level error type for the outer layers (scripts, config, CLI).
///
/// The reconciliation core itself never fails.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for todoledger operations.
pub type Result<T> = std::result::Result<T, Error>;
