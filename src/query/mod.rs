//! Query description layer.
//!
//! Queries are plain data: a table name plus ANDed [`Predicate`]s. They are
//! built by the [`compiler`] from UI state, executed either remotely (rendered
//! to PostgREST parameters) or locally (evaluated against JSON records), and
//! their results are turned back into domain types by [`normalize`].
//!
//! ```text
//! Filter ──compile──▶ Query ──to_params──▶ REST store ─┐
//!                       └────matches─────▶ local store ┴─▶ rows ──normalize──▶ Vec<Worker>
//! ```

pub mod compiler;
pub mod normalize;
pub mod predicate;

pub use compiler::{
    compile_filter, compile_pending_bookings, compile_seeker_bookings, compile_user_lookup,
    CategoryShape, WorkerSchema,
};
pub use normalize::{normalize_bookings, normalize_users, normalize_workers, verification_inclusion};
pub use predicate::Predicate;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A selection over one table: every predicate must hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub table: String,
    pub predicates: Vec<Predicate>,
}

impl Query {
    /// Creates an unconstrained query over `table`.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            predicates: Vec::new(),
        }
    }

    /// Adds a predicate, returning the query for chaining.
    #[must_use]
    pub fn with(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// True when `record` satisfies every predicate.
    #[must_use]
    pub fn matches(&self, record: &Value) -> bool {
        self.predicates.iter().all(|p| p.matches(record))
    }

    /// Renders the query as PostgREST parameters, `select=*` first.
    ///
    /// ```
    /// use hirafi::query::{Predicate, Query};
    ///
    /// let query = Query::new("users").with(Predicate::eq("role", "worker"));
    /// assert_eq!(
    ///     query.to_params(),
    ///     vec![
    ///         ("select".to_string(), "*".to_string()),
    ///         ("role".to_string(), "eq.worker".to_string()),
    ///     ]
    /// );
    /// ```
    #[must_use]
    pub fn to_params(&self) -> Vec<(String, String)> {
        std::iter::once(("select".to_string(), "*".to_string()))
            .chain(self.predicates.iter().map(Predicate::to_param))
            .collect()
    }
}
