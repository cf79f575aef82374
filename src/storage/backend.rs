//! Storage backend abstractions.
//!
//! Two narrow traits, one per use case in the worker thread: a table store
//! that executes [`StoreCommand`]s when no remote store is configured, and the
//! single-slot session store that remembers who is logged in.

use crate::domain::error::Result;
use crate::domain::User;
use crate::remote::{StoreCommand, StoreOutcome};

/// Executes store commands against locally held tables.
///
/// # Implementations
///
/// - [`JsonStorage`](crate::storage::JsonStorage): one JSON file with atomic writes
///
/// # Examples
///
/// ```no_run
/// use hirafi::query::Query;
/// use hirafi::remote::StoreCommand;
/// use hirafi::storage::{JsonStorage, TableStore};
/// use std::path::PathBuf;
///
/// let mut storage = JsonStorage::new(PathBuf::from("/tmp/tables.json"))?;
/// let rows = storage.execute(&StoreCommand::Select(Query::new("users")))?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub trait TableStore: Send {
    /// Runs one command.
    ///
    /// Guarded transitions report how many rows they changed; a transition
    /// whose guard no longer holds changes nothing and reports zero.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be applied or persisted.
    fn execute(&mut self, command: &StoreCommand) -> Result<StoreOutcome>;
}

/// Durable slot holding the logged-in user.
pub trait SessionStore: Send {
    /// Reads the slot. An empty slot is `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the slot exists but cannot be read.
    fn load(&self) -> Result<Option<User>>;

    /// Replaces the slot content with `user`.
    ///
    /// # Errors
    ///
    /// Returns an error if the slot cannot be written.
    fn save(&mut self, user: &User) -> Result<()>;

    /// Empties the slot. Clearing an empty slot succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the slot exists but cannot be removed.
    fn clear(&mut self) -> Result<()>;
}
