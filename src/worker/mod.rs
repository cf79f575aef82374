//! Background worker thread for local storage.
//!
//! The worker keeps filesystem I/O off the main plugin thread. It uses
//! Zellij's worker API for cross-thread communication and restores the
//! sender's trace context for each message.
//!
//! # Architecture
//!
//! - `messages`: Request/response protocol types with trace context propagation
//! - `handler`: Worker implementation and message processing logic

pub mod handler;
pub mod messages;

pub use handler::HirafiWorker;
pub use messages::{TraceContext, WorkerMessage, WorkerResponse};
