//! Application layer coordinating state, events, and actions.
//!
//! This module sits between the plugin runtime (main.rs) and the domain,
//! query, remote and worker layers.
//!
//! # Architecture
//!
//! ```text
//! Keys / Replies → Events → Store::dispatch → handle_event → State Mutations
//!                                 │                               │
//!                                 ├── notify subscribers          └── Actions → Side Effects
//!                                 ↑                                                  ↓
//!                                 └────────── Worker responses / Web replies ────────┘
//! ```
//!
//! # Modules
//!
//! - [`actions`]: Side effect commands emitted by the event handler
//! - [`handler`]: Event processing logic and state transition coordinator
//! - [`modes`]: Views and input modes
//! - [`state`]: Central application state container and view model computation
//! - [`store`]: Observable owner of the state

pub mod actions;
pub mod handler;
pub mod modes;
pub mod state;
pub mod store;

pub use actions::Action;
pub use handler::{handle_event, Event};
pub use modes::{InputField, InputMode, View};
pub use state::{Alert, AppState, Services};
pub use store::Store;
