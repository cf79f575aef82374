//! Zellij plugin wrapper and entry point.
//!
//! This module is the thin integration layer between the Hirafi library and
//! the Zellij plugin system. It implements `ZellijPlugin`, registers the
//! storage worker, and translates between host events and library events.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────┐
//! │   Zellij Main Thread     │
//! │  ┌───────────────────┐   │
//! │  │  State (plugin)   │   │  ← Store, key mapping, web requests
//! │  └───────────────────┘   │
//! │          │               │
//! │          │ IPC           │
//! │          ▼               │
//! │  ┌───────────────────┐   │
//! │  │   HirafiWorker    │   │  ← Session slot, local table store
//! │  │  (worker thread)  │   │
//! │  └───────────────────┘   │
//! └──────────────────────────┘
//! ```
//!
//! # Plugin Lifecycle
//!
//! 1. **Load**: Parse config, initialize tracing, build the store
//! 2. **Subscribe**: Key, `CustomMessage`, `WebRequestResult`, permission results
//! 3. **Permissions granted**: Ask the worker for the saved session
//! 4. **Update**: Map the host event, dispatch it, execute the actions
//! 5. **Render**: Call the library render function
//!
//! # Keybindings
//!
//! Global (all modes):
//! - `Ctrl+n`: Move down
//! - `Ctrl+p`: Move up
//!
//! In normal mode:
//! - `j`/`Down`, `k`/`Up`: Move or scroll
//! - `Enter`: Open the highlighted row
//! - `/`: Edit the search filter
//! - `Esc`: Back
//! - `q`: Close plugin
//! - `s`: Search, `l`: Log in, `u`: Account, `L`: Log out
//! - `r`: Recommend a worker, `g`: Draft a bio
//! - `b`: Book (on a profile) or open bookings, `a`: Accept a booking
//!
//! While editing a field:
//! - Characters are typed into the field
//! - `Tab`: Accept the suggestion or move to the next filter field
//! - `Enter`: Submit, `Esc`: Stop editing
//!
//! While an alert is open, `Enter` or `Esc` dismisses it.

#![allow(clippy::multiple_crate_versions)]

use std::cell::Cell;
use std::collections::BTreeMap;
use std::rc::Rc;

use zellij_tile::prelude::*;
use zellij_tile::shim::post_message_to;

use hirafi::remote::{HttpMethod, HttpRequest};
use hirafi::worker::{HirafiWorker, WorkerMessage, WorkerResponse};
use hirafi::{Action, Config, Event, InputMode, Store, View};

register_plugin!(State);
register_worker!(HirafiWorker, hirafi_worker, HIRAFI_WORKER);

const WORKER_NAME: &str = "hirafi";

/// Plugin state wrapper.
///
/// Owns the library's [`Store`] plus the render flag its listener raises.
struct State {
    store: Store,

    /// Set by the store listener, cleared when `update` reports it.
    dirty: Rc<Cell<bool>>,
}

impl Default for State {
    fn default() -> Self {
        Self::with_config(&Config::default())
    }
}

impl State {
    fn with_config(config: &Config) -> Self {
        let mut store = Store::new(hirafi::initialize(config));
        let dirty = Rc::new(Cell::new(false));
        let flag = Rc::clone(&dirty);
        store.subscribe(move |_| flag.set(true));
        Self { store, dirty }
    }
}

impl ZellijPlugin for State {
    /// Initializes the plugin on load.
    ///
    /// # Permissions
    ///
    /// - `ReadApplicationState`: Receive worker messages
    /// - `WebAccess`: Reach the remote store and the assistant
    fn load(&mut self, configuration: BTreeMap<String, String>) {
        let config = Config::from_zellij(&configuration);
        hirafi::observability::init_tracing(&config);

        let span = tracing::debug_span!("plugin_load");
        let _guard = span.entered();

        tracing::debug!(
            remote = config.store_url.is_some(),
            assistant = config.assistant_key.is_some(),
            "parsed configuration"
        );
        *self = Self::with_config(&config);

        request_permission(&[
            PermissionType::ReadApplicationState,
            PermissionType::WebAccess,
        ]);

        subscribe(&[
            EventType::Key,
            EventType::CustomMessage,
            EventType::WebRequestResult,
            EventType::PermissionRequestResult,
        ]);

        tracing::debug!("plugin load complete - waiting for permissions");
    }

    /// Translates the host event, dispatches it through the store, and
    /// executes the resulting actions. Returns `true` if a subscriber was
    /// notified.
    fn update(&mut self, event: zellij_tile::prelude::Event) -> bool {
        let event_name = Self::get_event_name(&event);
        let span = tracing::debug_span!("plugin_update_event", event_type = %event_name);
        let _guard = span.entered();

        let our_event = match event {
            zellij_tile::prelude::Event::Key(ref key) => match self.map_key_event(key) {
                Some(event) => event,
                None => return false,
            },
            zellij_tile::prelude::Event::CustomMessage(message, payload) => {
                match Self::map_custom_message_event(&message, &payload) {
                    Some(event) => event,
                    None => return false,
                }
            }
            zellij_tile::prelude::Event::WebRequestResult(status, _headers, body, context) => {
                tracing::debug!(status, body_len = body.len(), "web request result");
                Event::HttpReply {
                    status,
                    body,
                    context,
                }
            }
            zellij_tile::prelude::Event::PermissionRequestResult(PermissionStatus::Granted) => {
                Event::PermissionsGranted
            }
            zellij_tile::prelude::Event::PermissionRequestResult(PermissionStatus::Denied) => {
                tracing::warn!("permissions denied - plugin functionality limited");
                return false;
            }
            _ => return false,
        };

        match self.store.dispatch(&our_event) {
            Ok(actions) => {
                tracing::debug!(action_count = actions.len(), "event handled successfully");
                for a in actions {
                    self.execute_action(&a);
                }
            }
            Err(e) => tracing::warn!(error = %e, "error handling event"),
        }
        self.dirty.replace(false)
    }

    fn render(&mut self, rows: usize, cols: usize) {
        hirafi::ui::render(self.store.state(), rows, cols);
    }
}

impl State {
    fn get_event_name(event: &zellij_tile::prelude::Event) -> String {
        match event {
            zellij_tile::prelude::Event::Key(key) => format!("Key({:?})", key.bare_key),
            zellij_tile::prelude::Event::CustomMessage(msg, _) => format!("CustomMessage({msg})"),
            zellij_tile::prelude::Event::WebRequestResult(status, ..) => {
                format!("WebRequestResult({status})")
            }
            zellij_tile::prelude::Event::PermissionRequestResult(..) => {
                "PermissionRequestResult".to_string()
            }
            _ => "Other".to_string(),
        }
    }

    /// Maps keyboard events to application events.
    fn map_key_event(&self, key: &KeyWithModifier) -> Option<Event> {
        tracing::debug!(bare_key = ?key.bare_key, "key event");
        let state = self.store.state();

        if state.alert.is_some() {
            return match key.bare_key {
                BareKey::Enter | BareKey::Esc => Some(Event::DismissAlert),
                _ => None,
            };
        }

        if key.bare_key == BareKey::Char('n') && key.has_modifiers(&[KeyModifier::Ctrl]) {
            return Some(Event::KeyDown);
        }
        if key.bare_key == BareKey::Char('p') && key.has_modifiers(&[KeyModifier::Ctrl]) {
            return Some(Event::KeyUp);
        }

        if let InputMode::Editing(_) = state.input_mode {
            return Some(match key.bare_key {
                BareKey::Enter => Event::Submit,
                BareKey::Esc => Event::Back,
                BareKey::Tab => Event::NextField,
                BareKey::Backspace => Event::Backspace,
                BareKey::Char(c) => Event::Char(c),
                _ => return None,
            });
        }

        Some(match key.bare_key {
            BareKey::Down | BareKey::Char('j') => Event::KeyDown,
            BareKey::Up | BareKey::Char('k') => Event::KeyUp,
            BareKey::Enter => Event::Select,
            BareKey::Esc => Event::Back,
            BareKey::Char('/') => Event::EditFilter,
            BareKey::Char('q') => Event::CloseFocus,
            BareKey::Char('s') => Event::Navigate(View::Search),
            BareKey::Char('l') => Event::Navigate(View::Login),
            BareKey::Char('u') => Event::Navigate(View::Account),
            BareKey::Char('L') => Event::Logout,
            BareKey::Char('r') => Event::Recommend,
            BareKey::Char('g') => Event::DraftBio,
            BareKey::Char('b') => Event::Book,
            BareKey::Char('a') => Event::Accept,
            _ => return None,
        })
    }

    /// Maps custom message events to application events.
    fn map_custom_message_event(message: &str, payload: &str) -> Option<Event> {
        tracing::debug!(message_name = %message, payload_len = payload.len(), "custom message event");

        if message != WORKER_NAME {
            tracing::debug!(message_name = %message, "ignoring custom message with unknown name");
            return None;
        }
        match serde_json::from_str::<WorkerResponse>(payload) {
            Ok(response) => Some(Event::WorkerResponse(response)),
            Err(e) => {
                tracing::debug!(error = %e, "failed to deserialize worker response");
                None
            }
        }
    }

    /// Serializes the message as JSON and posts it to the worker thread.
    /// Serialization errors are logged, not propagated.
    fn post_worker_message(message: &WorkerMessage) {
        match serde_json::to_string(&message) {
            Ok(payload) => {
                tracing::debug!(payload_len = payload.len(), "posting message to worker");
                post_message_to(PluginMessage {
                    worker_name: Some(WORKER_NAME.to_string()),
                    name: WORKER_NAME.to_string(),
                    payload,
                });
            }
            Err(e) => {
                tracing::debug!(error = %e, "failed to serialize worker message");
            }
        }
    }

    fn send_web_request(request: &HttpRequest) {
        let verb = match request.method {
            HttpMethod::Get => HttpVerb::Get,
            HttpMethod::Post => HttpVerb::Post,
        };
        tracing::debug!(
            method = ?request.method,
            host = request.host().as_deref().unwrap_or("-"),
            "issuing web request"
        );
        web_request(
            &request.url,
            verb,
            request.headers.clone(),
            request.body.clone(),
            request.context.clone(),
        );
    }

    /// Executes an action returned from event handling.
    #[tracing::instrument(level = "debug", skip(self, action), fields(action = action.name()))]
    fn execute_action(&self, action: &Action) {
        match action {
            Action::CloseFocus => {
                tracing::debug!("closing plugin focus");
                hide_self();
            }
            Action::PostToWorker(message) => Self::post_worker_message(message),
            Action::WebRequest(request) => Self::send_web_request(request),
        }
    }
}
