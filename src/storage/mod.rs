//! Local persistence used by the worker thread.
//!
//! Two concerns live here: the session slot remembering the logged-in user,
//! and a JSON table store that stands in for the remote store when none is
//! configured. Both write atomically (temp file + rename).
//!
//! # Modules
//!
//! - `backend`: Storage traits
//! - `json`: JSON file table store
//! - `session`: JSON session slot

pub mod backend;
pub mod json;
pub mod session;

pub use backend::{SessionStore, TableStore};
pub use json::JsonStorage;
pub use session::JsonSessionStore;
