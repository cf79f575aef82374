//! Actions representing side effects to be executed by the plugin runtime.
//!
//! The event handler never performs I/O. It returns a `Vec<Action>` after each
//! event and the plugin runtime executes them in order. Every network call and
//! every worker message therefore shows up here first, which is what lets the
//! tests assert that an operation made no network call at all.
//!
//! ```
//! use hirafi::app::Action;
//! use hirafi::worker::WorkerMessage;
//!
//! let actions = vec![Action::PostToWorker(WorkerMessage::load_session())];
//! assert!(!actions[0].is_network());
//! ```

use crate::remote::HttpRequest;
use crate::worker::WorkerMessage;

/// Commands representing side effects to be executed by the plugin runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Hides the plugin pane.
    CloseFocus,

    /// Posts a message to the background worker thread.
    ///
    /// Used for the session slot and, without a remote store, for every
    /// store command.
    PostToWorker(WorkerMessage),

    /// Asks the host to perform an HTTP request.
    ///
    /// The reply comes back as a web-request result event carrying the
    /// request's context map.
    WebRequest(HttpRequest),
}

impl Action {
    /// Short name used in spans.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::CloseFocus => "close_focus",
            Self::PostToWorker(_) => "post_to_worker",
            Self::WebRequest(_) => "web_request",
        }
    }

    /// True when executing the action leaves the machine.
    #[must_use]
    pub const fn is_network(&self) -> bool {
        matches!(self, Self::WebRequest(_))
    }
}
