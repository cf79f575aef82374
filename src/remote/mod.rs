//! Store access.
//!
//! Every store call is a [`StoreCommand`] issued under a [`RequestContext`].
//! Where it runs depends on the configured [`Backend`]:
//!
//! - [`Backend::Rest`]: rendered to an HTTP request the host performs; the
//!   reply arrives as a web-request result event.
//! - [`Backend::Local`]: posted to the worker thread, which executes it
//!   against the JSON table file and answers with a worker response.
//!
//! Both paths end in the same reducer branch, so the application cannot tell
//! them apart.

pub mod command;
pub mod http;
pub mod rest;

pub use command::{
    ReplyKind, RequestContext, RequestLedger, RequestToken, StoreCommand, StoreOutcome,
};
pub use http::{HttpMethod, HttpRequest};
pub use rest::{parse_reply, RestBackend};

use crate::app::Action;
use crate::domain::Result;
use crate::worker::WorkerMessage;

/// Where store commands are executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    Rest(RestBackend),
    Local,
}

impl Backend {
    /// Turns a command into the side effect that will execute it.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be rendered as a request.
    pub fn dispatch(&self, command: StoreCommand, context: &RequestContext) -> Result<Action> {
        let _span = tracing::debug_span!("backend_dispatch",
            command = command.name(),
            kind = context.kind.as_str(),
            token = context.token.0
        )
        .entered();

        match self {
            Self::Rest(rest) => {
                let request = rest.request(&command)?.with_context(context.encode());
                Ok(Action::WebRequest(request))
            }
            Self::Local => Ok(Action::PostToWorker(WorkerMessage::execute(
                command,
                context.clone(),
            ))),
        }
    }

    #[must_use]
    pub const fn is_local(&self) -> bool {
        matches!(self, Self::Local)
    }
}
