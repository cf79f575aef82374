//! Worker thread implementation for local storage operations.
//!
//! This module implements the Zellij worker thread interface. The worker owns
//! the session slot and the JSON table store, so the main plugin thread never
//! touches the filesystem while rendering. Trace context attached to each
//! message is restored before handling it.

use crate::domain::error::{HirafiError, Result};
use crate::domain::User;
use crate::infrastructure::paths;
use crate::remote::{RequestContext, StoreCommand};
use crate::storage::{JsonSessionStore, JsonStorage, SessionStore, TableStore};
use crate::worker::{WorkerMessage, WorkerResponse};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use zellij_tile::prelude::{PluginMessage, ZellijWorker};
use zellij_tile::shim::post_message_to_plugin;

/// Worker thread state for handling storage operations.
///
/// Runs on a separate thread spawned by Zellij and processes messages sent
/// from the main plugin thread. Each store is opened lazily and on its own,
/// so a broken table file does not take the session slot down with it. A
/// store that failed to open is retried on the next message.
#[derive(Serialize, Deserialize, Default)]
pub struct HirafiWorker {
    #[serde(skip)]
    tables: Option<Box<dyn TableStore>>,

    #[serde(skip)]
    session: Option<Box<dyn SessionStore>>,

    /// Directory the stores are opened in; the plugin data directory if unset.
    #[serde(skip)]
    data_dir: Option<PathBuf>,

    /// Why the table store last failed to open.
    #[serde(skip)]
    tables_error: Option<String>,

    /// Why the session store last failed to open.
    #[serde(skip)]
    session_error: Option<String>,
}

impl HirafiWorker {
    /// Creates a worker over explicit stores.
    #[must_use]
    pub fn with_stores(tables: Box<dyn TableStore>, session: Box<dyn SessionStore>) -> Self {
        Self {
            tables: Some(tables),
            session: Some(session),
            ..Self::default()
        }
    }

    /// Creates a worker that opens its stores under `dir` when first needed.
    #[must_use]
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: Some(dir.into()),
            ..Self::default()
        }
    }

    /// Opens whichever store is not open yet. A failure is remembered and
    /// reported by the commands that need that store.
    fn open_missing_stores(&mut self) {
        let dir = self.data_dir.clone().unwrap_or_else(paths::get_data_dir);

        if self.tables.is_none() {
            match JsonStorage::new(dir.join(paths::TABLES_FILE)) {
                Ok(tables) => {
                    self.tables = Some(Box::new(tables));
                    self.tables_error = None;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "failed to open table store");
                    self.tables_error = Some(format!("failed to open table store: {e}"));
                }
            }
        }

        if self.session.is_none() {
            match JsonSessionStore::new(dir.join(paths::SESSION_FILE)) {
                Ok(session) => {
                    self.session = Some(Box::new(session));
                    self.session_error = None;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "failed to open session store");
                    self.session_error = Some(format!("failed to open session store: {e}"));
                }
            }
        }
    }

    fn get_tables(&mut self) -> Result<&mut Box<dyn TableStore>> {
        let reason = &self.tables_error;
        self.tables.as_mut().ok_or_else(|| {
            HirafiError::Worker(
                reason
                    .clone()
                    .unwrap_or_else(|| "table store not initialized".to_string()),
            )
        })
    }

    fn get_session(&mut self) -> Result<&mut Box<dyn SessionStore>> {
        let reason = &self.session_error;
        self.session.as_mut().ok_or_else(|| {
            HirafiError::Worker(
                reason
                    .clone()
                    .unwrap_or_else(|| "session store not initialized".to_string()),
            )
        })
    }

    /// Helper for handling storage operation results with consistent logging.
    fn handle_db_result<T, F>(operation: &str, result: Result<T>, on_success: F) -> WorkerResponse
    where
        F: FnOnce(T) -> WorkerResponse,
    {
        match result {
            Ok(value) => {
                tracing::debug!(operation = operation, "storage operation successful");
                on_success(value)
            }
            Err(e) => {
                tracing::warn!(operation = operation, error = %e, "storage operation failed");
                WorkerResponse::Error {
                    message: format!("{operation}: {e}"),
                }
            }
        }
    }

    /// Runs a store command. Failures keep the request context so the main
    /// thread can route the error to the caller that issued it.
    fn handle_execute(&mut self, command: &StoreCommand, context: RequestContext) -> WorkerResponse {
        match self.get_tables().and_then(|tables| tables.execute(command)) {
            Ok(outcome) => {
                tracing::debug!(
                    command = command.name(),
                    affected = outcome.affected(),
                    "command completed"
                );
                WorkerResponse::CommandCompleted { context, outcome }
            }
            Err(e) => {
                tracing::warn!(command = command.name(), error = %e, "command failed");
                WorkerResponse::CommandFailed {
                    context,
                    message: e.to_string(),
                }
            }
        }
    }

    fn handle_save_session(&mut self, user: &User) -> WorkerResponse {
        Self::handle_db_result(
            "save session",
            self.get_session().and_then(|session| session.save(user)),
            |()| WorkerResponse::SessionSaved,
        )
    }

    fn handle_clear_session(&mut self) -> WorkerResponse {
        Self::handle_db_result(
            "clear session",
            self.get_session().and_then(|session| session.clear()),
            |()| WorkerResponse::SessionCleared,
        )
    }

    fn handle_load_session(&mut self) -> WorkerResponse {
        Self::handle_db_result(
            "load session",
            self.get_session().and_then(|session| session.load()),
            |user| {
                tracing::debug!(restored = user.is_some(), "session read");
                WorkerResponse::SessionLoaded { user }
            },
        )
    }

    /// Attaches the parent trace context from a message to the current thread.
    ///
    /// Returns a context guard that must be held for the duration of the operation.
    fn attach_parent_trace_context(message: &WorkerMessage) -> Option<opentelemetry::ContextGuard> {
        use opentelemetry::trace::{SpanContext, SpanId, TraceContextExt, TraceFlags, TraceId, TraceState};

        let trace_context = message.trace_context()?;

        let trace_id = TraceId::from_hex(&trace_context.trace_id).ok()?;
        let span_id = SpanId::from_hex(&trace_context.parent_span_id).ok()?;

        let span_context = SpanContext::new(
            trace_id,
            span_id,
            TraceFlags::SAMPLED,
            true,
            TraceState::default(),
        );

        let otel_context = opentelemetry::Context::current().with_remote_span_context(span_context);

        Some(otel_context.attach())
    }

    /// Decodes a serialized [`WorkerMessage`], opens any store that is not
    /// open yet, and handles the message.
    ///
    /// Returns `None` only for payloads that are not worker messages. A store
    /// that cannot be opened fails the commands that need it, and a store
    /// command failure keeps its request context.
    pub fn respond(&mut self, payload: &str) -> Option<WorkerResponse> {
        let message: WorkerMessage = match serde_json::from_str(payload) {
            Ok(message) => message,
            Err(e) => {
                tracing::debug!(error = %e, "failed to deserialize worker message");
                return None;
            }
        };

        self.open_missing_stores();
        Some(self.handle_message(message))
    }

    /// Processes a worker message and returns the response to post back.
    pub fn handle_message(&mut self, message: WorkerMessage) -> WorkerResponse {
        let _context_guard = Self::attach_parent_trace_context(&message);

        let span = tracing::debug_span!("worker_handle_message", message_type = ?message);
        let _guard = span.entered();

        match message {
            WorkerMessage::Execute {
                command, context, ..
            } => self.handle_execute(&command, context),
            WorkerMessage::SaveSession { user, .. } => self.handle_save_session(&user),
            WorkerMessage::ClearSession { .. } => self.handle_clear_session(),
            WorkerMessage::LoadSession { .. } => self.handle_load_session(),
        }
    }
}

/// Initializes tracing for the worker thread.
///
/// Uses the default configuration so logs from both threads land in the same
/// file.
fn init_worker_tracing() {
    use crate::observability;
    use crate::Config;

    observability::init_tracing(&Config::default());
}

static WORKER_TRACING_INITIALIZED: std::sync::atomic::AtomicBool =
    std::sync::atomic::AtomicBool::new(false);

fn post_response(name: String, response: &WorkerResponse) {
    match serde_json::to_string(response) {
        Ok(payload) => post_message_to_plugin(PluginMessage {
            name,
            payload,
            worker_name: None,
        }),
        Err(e) => tracing::debug!(error = %e, "failed to serialize worker response"),
    }
}

impl ZellijWorker<'_> for HirafiWorker {
    /// Handles incoming messages from the main plugin thread.
    ///
    /// 1. Initializes tracing on first message (once per worker lifetime)
    /// 2. Answers the payload via [`HirafiWorker::respond`]
    /// 3. Posts the serialized response back under the same message name
    fn on_message(&mut self, message: String, payload: String) {
        if !WORKER_TRACING_INITIALIZED.swap(true, std::sync::atomic::Ordering::Relaxed) {
            init_worker_tracing();
        }

        if let Some(response) = self.respond(&payload) {
            post_response(message, &response);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;
    use crate::query::Query;
    use crate::remote::{ReplyKind, RequestToken, StoreOutcome};
    use serde_json::json;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn worker(dir: &TempDir) -> HirafiWorker {
        let tables = JsonStorage::new(dir.path().join("tables.json")).unwrap();
        let session = JsonSessionStore::new(dir.path().join("session.json")).unwrap();
        HirafiWorker::with_stores(Box::new(tables), Box::new(session))
    }

    fn context(kind: ReplyKind) -> RequestContext {
        RequestContext {
            kind,
            token: RequestToken(1),
            subject: None,
        }
    }

    #[test]
    fn uninitialized_worker_reports_errors() {
        let mut worker = HirafiWorker::default();
        let response = worker.handle_message(WorkerMessage::load_session());
        assert!(matches!(response, WorkerResponse::Error { .. }));

        let response = worker.handle_message(WorkerMessage::execute(
            StoreCommand::Select(Query::new("users")),
            context(ReplyKind::Search),
        ));
        assert!(matches!(response, WorkerResponse::CommandFailed { .. }));
    }

    #[test]
    fn broken_table_file_fails_commands_but_not_the_session() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(paths::TABLES_FILE), "{ not json").unwrap();
        let mut worker = HirafiWorker::in_dir(dir.path());

        let search = WorkerMessage::execute(
            StoreCommand::Select(Query::new("users")),
            context(ReplyKind::Search),
        );
        let response = worker
            .respond(&serde_json::to_string(&search).unwrap())
            .unwrap();
        let WorkerResponse::CommandFailed { context: echoed, message } = response else {
            panic!("expected a command failure, got {response:?}");
        };
        assert_eq!(echoed, context(ReplyKind::Search));
        assert!(message.contains("failed to open table store"));

        let user = User::new("7", "Nadia", "Ziani", "0661", Role::Worker);
        let save = WorkerMessage::save_session(user);
        assert_eq!(
            worker.respond(&serde_json::to_string(&save).unwrap()),
            Some(WorkerResponse::SessionSaved)
        );
    }

    #[test]
    fn table_store_is_retried_once_the_file_is_fixed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(paths::TABLES_FILE);
        std::fs::write(&path, "{ not json").unwrap();
        let mut worker = HirafiWorker::in_dir(dir.path());
        let payload = serde_json::to_string(&WorkerMessage::execute(
            StoreCommand::Select(Query::new("users")),
            context(ReplyKind::Search),
        ))
        .unwrap();

        assert!(matches!(
            worker.respond(&payload),
            Some(WorkerResponse::CommandFailed { .. })
        ));
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(
            worker.respond(&payload),
            Some(WorkerResponse::CommandCompleted { .. })
        ));
    }

    #[test]
    fn foreign_payloads_get_no_answer() {
        let dir = TempDir::new().unwrap();
        let mut worker = HirafiWorker::in_dir(dir.path());
        assert_eq!(worker.respond("not a worker message"), None);
    }

    #[test]
    fn session_messages_round_trip() {
        let dir = TempDir::new().unwrap();
        let mut worker = worker(&dir);
        let user = User::new("7", "Nadia", "Ziani", "0661", Role::Worker);

        assert_eq!(
            worker.handle_message(WorkerMessage::save_session(user.clone())),
            WorkerResponse::SessionSaved
        );
        assert_eq!(
            worker.handle_message(WorkerMessage::load_session()),
            WorkerResponse::SessionLoaded { user: Some(user) }
        );
        assert_eq!(
            worker.handle_message(WorkerMessage::clear_session()),
            WorkerResponse::SessionCleared
        );
        assert_eq!(
            worker.handle_message(WorkerMessage::load_session()),
            WorkerResponse::SessionLoaded { user: None }
        );
    }

    #[test]
    fn execute_echoes_context() {
        let dir = TempDir::new().unwrap();
        let mut worker = worker(&dir);
        let insert = StoreCommand::Insert {
            table: "bookings".to_string(),
            record: json!({"status": "pending"}),
        };
        let response = worker.handle_message(WorkerMessage::execute(
            insert,
            context(ReplyKind::CreateBooking),
        ));
        let WorkerResponse::CommandCompleted { context: echoed, outcome } = response else {
            panic!("expected completion, got {response:?}");
        };
        assert_eq!(echoed, context(ReplyKind::CreateBooking));
        assert_eq!(outcome.affected(), 1);

        let accept = StoreCommand::Transition {
            table: "bookings".to_string(),
            id: "1".to_string(),
            from: "pending".to_string(),
            to: "accepted".to_string(),
            assign: BTreeMap::new(),
        };
        for expected in [1, 0] {
            let response = worker.handle_message(WorkerMessage::execute(
                accept.clone(),
                context(ReplyKind::AcceptBooking),
            ));
            assert!(matches!(
                response,
                WorkerResponse::CommandCompleted { outcome: StoreOutcome::Affected(n), .. } if n == expected
            ));
        }
    }
}
