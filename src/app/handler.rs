//! Event handling and state transition logic.
//!
//! This module implements the reducer that processes user input, host events,
//! worker responses and web-request replies, translating them into state
//! changes and action sequences.
//!
//! # Architecture
//!
//! The handler follows a unidirectional data flow pattern:
//! 1. Events arrive from the plugin runtime or worker thread
//! 2. [`handle_event`] pattern-matches the event type
//! 3. State mutations occur via `AppState` methods
//! 4. Actions are collected and returned for execution
//!
//! Store replies reach the handler by two routes (a web-request result from the
//! REST backend, or a worker response from the local table store) and both end
//! in the same branch. A reply that replaces state (search results, bookings,
//! assistant text) is dropped there once a newer request of its kind exists;
//! booking writes always apply, each to the booking it names.
//!
//! # Example
//!
//! ```rust
//! use hirafi::app::{handle_event, AppState, Event, Services, View};
//! use hirafi::ui::Theme;
//!
//! let mut state = AppState::new(Theme::default(), Services::default());
//! let (render, actions) = handle_event(&mut state, &Event::Navigate(View::Search))?;
//! assert!(render);
//! assert_eq!(actions.len(), 1); // the search
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::collections::BTreeMap;

use serde_json::Value;

use crate::app::modes::{InputField, InputMode, View};
use crate::app::state::Alert;
use crate::app::{Action, AppState};
use crate::domain::catalog;
use crate::domain::error::Result;
use crate::domain::{Booking, BookingStatus, FilterField};
use crate::query::{
    compile_filter, compile_pending_bookings, compile_seeker_bookings, compile_user_lookup,
    normalize_bookings, normalize_users, normalize_workers,
};
use crate::remote::{ReplyKind, RequestContext, StoreCommand, StoreOutcome};
use crate::worker::{WorkerMessage, WorkerResponse};

/// Events triggered by user input, host callbacks, or replies.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Moves the cursor down (wraps), or scrolls text views.
    KeyDown,
    /// Moves the cursor up (wraps), or scrolls text views.
    KeyUp,
    /// Hides the plugin pane.
    CloseFocus,

    /// Routes to a view. Views backed by data load it on arrival.
    Navigate(View),
    /// Leaves the current edit, or returns to the parent view.
    Back,
    /// Activates the highlighted row of the current view.
    Select,

    /// Opens the filter bar for editing.
    EditFilter,
    /// Appends a character to the field being edited.
    Char(char),
    /// Removes the last character of the field being edited.
    Backspace,
    /// Accepts the top suggestion, or moves to the next filter field.
    NextField,
    /// Submits the field being edited.
    Submit,
    /// Leaves editing without submitting.
    CancelEdit,

    Logout,
    /// Asks the assistant which listed worker fits the current filter.
    Recommend,
    /// Asks the assistant for a bio draft for the logged-in worker.
    DraftBio,
    /// Starts a booking request on a profile; elsewhere opens the bookings.
    Book,
    /// Accepts the highlighted pending booking.
    Accept,
    DismissAlert,

    /// The host granted the requested permissions.
    PermissionsGranted,

    /// Wraps a response from the background worker thread.
    WorkerResponse(WorkerResponse),

    /// Result of a web request made on the plugin's behalf.
    HttpReply {
        status: u16,
        body: Vec<u8>,
        context: BTreeMap<String, String>,
    },
}

impl Event {
    /// Short name used in spans.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::KeyDown => "key_down",
            Self::KeyUp => "key_up",
            Self::CloseFocus => "close_focus",
            Self::Navigate(_) => "navigate",
            Self::Back => "back",
            Self::Select => "select",
            Self::EditFilter => "edit_filter",
            Self::Char(_) => "char",
            Self::Backspace => "backspace",
            Self::NextField => "next_field",
            Self::Submit => "submit",
            Self::CancelEdit => "cancel_edit",
            Self::Logout => "logout",
            Self::Recommend => "recommend",
            Self::DraftBio => "draft_bio",
            Self::Book => "book",
            Self::Accept => "accept",
            Self::DismissAlert => "dismiss_alert",
            Self::PermissionsGranted => "permissions_granted",
            Self::WorkerResponse(_) => "worker_response",
            Self::HttpReply { .. } => "http_reply",
        }
    }
}

/// Processes an event, mutates application state, and returns whether a
/// render is needed plus the actions to execute.
///
/// # Errors
///
/// Returns an error only when a store record cannot be serialized. Store
/// and assistant failures are absorbed into state (empty results, notices,
/// alerts, fallback text).
#[allow(clippy::too_many_lines)]
pub fn handle_event(state: &mut AppState, event: &Event) -> Result<(bool, Vec<Action>)> {
    let _span = tracing::debug_span!("handle_event", event = event.name()).entered();

    match event {
        Event::KeyDown => {
            if scrolls(state.view) {
                state.scroll_down();
            } else {
                state.move_selection_down();
            }
            Ok((true, vec![]))
        }
        Event::KeyUp => {
            if scrolls(state.view) {
                state.scroll_up();
            } else {
                state.move_selection_up();
            }
            Ok((true, vec![]))
        }
        Event::CloseFocus => Ok((false, vec![Action::CloseFocus])),
        Event::Navigate(view) => Ok((true, navigate_to(state, *view))),
        Event::Back => {
            if let InputMode::Editing(field) = state.input_mode {
                cancel_edit(state, field);
                return Ok((true, vec![]));
            }
            match state.view.parent() {
                Some(parent) => {
                    state.navigate(parent);
                    Ok((true, vec![]))
                }
                None => Ok((false, vec![])),
            }
        }
        Event::Select => select(state),
        Event::EditFilter => {
            if state.view != View::Search {
                state.navigate(View::Search);
            }
            state.input_mode = InputMode::Editing(InputField::Filter(FilterField::Query));
            Ok((true, vec![]))
        }
        Event::Char(c) => {
            let InputMode::Editing(field) = state.input_mode else {
                return Ok((false, vec![]));
            };
            state.input_buffer_mut(field).push(*c);
            tracing::trace!(field = ?field, char = %c, "input updated");
            Ok((true, vec![]))
        }
        Event::Backspace => {
            let InputMode::Editing(field) = state.input_mode else {
                return Ok((false, vec![]));
            };
            state.input_buffer_mut(field).pop();
            Ok((true, vec![]))
        }
        Event::NextField => {
            let Some(field) = state.input_mode.filter_field() else {
                return Ok((false, vec![]));
            };
            match state.suggestions().first().copied() {
                Some(top) if top != state.filter.field(field) => {
                    tracing::debug!(field = field.label(), suggestion = top, "suggestion accepted");
                    *state.filter.field_mut(field) = top.to_string();
                }
                _ => state.input_mode = InputMode::Editing(InputField::Filter(field.next())),
            }
            Ok((true, vec![]))
        }
        Event::Submit => match state.input_mode {
            InputMode::Editing(InputField::Filter(_)) => {
                state.input_mode = InputMode::Normal;
                state.selected_index = 0;
                Ok((true, search(state)))
            }
            InputMode::Editing(InputField::Phone) => Ok((true, login(state))),
            InputMode::Editing(InputField::BookingDetails) => {
                create_booking(state).map(|actions| (true, actions))
            }
            InputMode::Normal => Ok((false, vec![])),
        },
        Event::CancelEdit => {
            let InputMode::Editing(field) = state.input_mode else {
                return Ok((false, vec![]));
            };
            cancel_edit(state, field);
            Ok((true, vec![]))
        }
        Event::Logout => {
            if state.current_user.is_none() {
                return Ok((false, vec![]));
            }
            let action = state.set_current_user(None);
            state.bookings.clear();
            state.navigate(View::Home);
            state.notice = Some("Logged out".to_string());
            Ok((true, vec![action]))
        }
        Event::Recommend => Ok(recommend(state)),
        Event::DraftBio => Ok(draft_bio(state)),
        Event::Book => {
            if state.view == View::WorkerDetail {
                Ok(start_booking(state))
            } else {
                Ok((true, navigate_to(state, View::Bookings)))
            }
        }
        Event::Accept => Ok(accept(state)),
        Event::DismissAlert => Ok((state.alert.take().is_some(), vec![])),
        Event::PermissionsGranted => {
            tracing::debug!("permissions granted, restoring session");
            Ok((false, vec![Action::PostToWorker(WorkerMessage::load_session())]))
        }
        Event::WorkerResponse(response) => Ok(handle_worker_response(state, response)),
        Event::HttpReply {
            status,
            body,
            context,
        } => Ok(handle_http_reply(state, *status, body, context)),
    }
}

const fn scrolls(view: View) -> bool {
    matches!(view, View::WorkerDetail | View::Account)
}

fn navigate_to(state: &mut AppState, view: View) -> Vec<Action> {
    state.navigate(view);
    match view {
        View::Search => search(state),
        View::Bookings => load_bookings(state),
        View::Login => {
            state.phone_input.clear();
            state.input_mode = InputMode::Editing(InputField::Phone);
            vec![]
        }
        View::Home | View::WorkerDetail | View::Account => vec![],
    }
}

fn select(state: &mut AppState) -> Result<(bool, Vec<Action>)> {
    match state.view {
        View::Home => {
            let Some(category) = state.selected_category() else {
                return Ok((false, vec![]));
            };
            tracing::debug!(category = category.key, "category selected");
            state.filter.category = category.key.to_string();
            Ok((true, navigate_to(state, View::Search)))
        }
        View::Search => {
            let Some(worker) = state.selected_worker().cloned() else {
                tracing::debug!("no worker selected");
                return Ok((false, vec![]));
            };
            tracing::debug!(worker_id = %worker.user.id, "opening profile");
            state.detail = Some(worker);
            state.navigate(View::WorkerDetail);
            Ok((true, vec![]))
        }
        View::WorkerDetail => Ok(start_booking(state)),
        View::Login => {
            state.input_mode = InputMode::Editing(InputField::Phone);
            Ok((true, vec![]))
        }
        View::Bookings => Ok(accept(state)),
        View::Account => Ok((false, vec![])),
    }
}

fn cancel_edit(state: &mut AppState, field: InputField) {
    if field == InputField::BookingDetails {
        state.booking_details.clear();
    }
    state.input_mode = InputMode::Normal;
}

/// Issues a store command under a fresh token for `kind`.
fn issue(
    state: &mut AppState,
    kind: ReplyKind,
    subject: Option<String>,
    command: StoreCommand,
) -> Result<Action> {
    let context = state.ledger.issue(kind, subject);
    state.services.backend.dispatch(command, &context)
}

fn search(state: &mut AppState) -> Vec<Action> {
    let query = compile_filter(&state.filter, &state.services.schema);
    state.loading = true;
    state.recommendation = None;

    match issue(state, ReplyKind::Search, None, StoreCommand::Select(query)) {
        Ok(action) => vec![action],
        Err(e) => {
            tracing::warn!(error = %e, "search could not be issued");
            state.loading = false;
            state.workers.clear();
            vec![]
        }
    }
}

fn login(state: &mut AppState) -> Vec<Action> {
    let phone = state.phone_input.trim().to_string();
    if phone.is_empty() {
        state.notice = Some("Enter the phone number you registered with".to_string());
        return vec![];
    }
    state.input_mode = InputMode::Normal;

    let query = compile_user_lookup(&phone, &state.services.schema);
    match issue(state, ReplyKind::Login, None, StoreCommand::Select(query)) {
        Ok(action) => {
            state.notice = Some("Looking up your account...".to_string());
            vec![action]
        }
        Err(e) => {
            tracing::warn!(error = %e, "login could not be issued");
            state.notice = Some("Login is unavailable right now".to_string());
            vec![]
        }
    }
}

fn start_booking(state: &mut AppState) -> (bool, Vec<Action>) {
    if state.current_user.is_none() {
        state.alert = Some(Alert::login_required());
        return (true, vec![]);
    }
    if state.detail.is_none() {
        return (false, vec![]);
    }
    state.booking_details.clear();
    state.input_mode = InputMode::Editing(InputField::BookingDetails);
    (true, vec![])
}

fn create_booking(state: &mut AppState) -> Result<Vec<Action>> {
    state.input_mode = InputMode::Normal;
    let Some(user) = state.current_user.as_ref() else {
        state.alert = Some(Alert::login_required());
        return Ok(vec![]);
    };

    let booking = Booking::pending(
        user.id.clone(),
        state.detail.as_ref().map(|worker| worker.user.id.clone()),
        state.booking_details.trim(),
    );
    let record = serde_json::to_value(&booking)?;
    state.booking_details.clear();

    tracing::debug!(seeker_id = %booking.seeker_id, worker_id = ?booking.worker_id, "creating booking");
    let command = StoreCommand::Insert {
        table: state.services.schema.bookings_table.clone(),
        record,
    };
    match issue(state, ReplyKind::CreateBooking, None, command) {
        Ok(action) => {
            state.notice = Some("Sending booking request...".to_string());
            Ok(vec![action])
        }
        Err(e) => {
            state.alert = Some(Alert::new("Booking failed", e.detail()));
            Ok(vec![])
        }
    }
}

fn load_bookings(state: &mut AppState) -> Vec<Action> {
    let Some(user) = state.current_user.as_ref() else {
        return vec![];
    };
    let query = if user.is_worker() {
        compile_pending_bookings(&state.services.schema)
    } else {
        compile_seeker_bookings(&user.id, &state.services.schema)
    };

    state.bookings_loading = true;
    match issue(state, ReplyKind::LoadBookings, None, StoreCommand::Select(query)) {
        Ok(action) => vec![action],
        Err(e) => {
            tracing::warn!(error = %e, "bookings could not be loaded");
            state.bookings_loading = false;
            state.bookings.clear();
            vec![]
        }
    }
}

fn accept(state: &mut AppState) -> (bool, Vec<Action>) {
    let Some(user) = state.current_user.as_ref() else {
        state.alert = Some(Alert::login_required());
        return (true, vec![]);
    };
    if !user.is_worker() {
        state.notice = Some("Only craftsmen can accept bookings".to_string());
        return (true, vec![]);
    }
    let worker_id = user.id.clone();

    let Some(booking) = state.selected_booking() else {
        return (false, vec![]);
    };
    let Some(id) = booking.id.clone() else {
        tracing::warn!("selected booking has no id");
        return (false, vec![]);
    };
    if !booking.acceptable_by(&worker_id) {
        state.notice = Some("Booking already accepted".to_string());
        return (true, vec![]);
    }

    tracing::debug!(booking_id = %id, worker_id = %worker_id, "accepting booking");
    let command = StoreCommand::Transition {
        table: state.services.schema.bookings_table.clone(),
        id: id.clone(),
        from: BookingStatus::Pending.as_str().to_string(),
        to: BookingStatus::Accepted.as_str().to_string(),
        assign: BTreeMap::from([("worker_id".to_string(), Value::String(worker_id))]),
    };
    match issue(state, ReplyKind::AcceptBooking, Some(id), command) {
        Ok(action) => (true, vec![action]),
        Err(e) => {
            state.alert = Some(Alert::new("Could not accept booking", e.detail()));
            (true, vec![])
        }
    }
}

fn recommend(state: &mut AppState) -> (bool, Vec<Action>) {
    if state.view != View::Search {
        return (false, vec![]);
    }
    let need = state.recommendation_need();
    match state
        .services
        .assistant
        .recommendation_request(&need, &state.workers)
    {
        Some(request) => {
            let context = state.ledger.issue(ReplyKind::Recommendation, None);
            state.recommending = true;
            state.recommendation = None;
            (true, vec![Action::WebRequest(request.with_context(context.encode()))])
        }
        None => {
            tracing::debug!("assistant disabled, using fallback recommendation");
            state.recommendation = Some(state.services.assistant.recommendation_text(None));
            (true, vec![])
        }
    }
}

fn draft_bio(state: &mut AppState) -> (bool, Vec<Action>) {
    let Some(user) = state.current_user.as_ref() else {
        state.alert = Some(Alert::login_required());
        return (true, vec![]);
    };
    if !user.is_worker() {
        state.notice = Some("Only craftsmen have a public bio".to_string());
        return (true, vec![]);
    }

    let category = user
        .category
        .as_deref()
        .map_or("craftsman", catalog::category_label)
        .to_string();
    let skills = user.skills.clone();

    match state.services.assistant.bio_request(&category, &skills) {
        Some(request) => {
            let context = state.ledger.issue(ReplyKind::BioDraft, None);
            state.drafting = true;
            (true, vec![Action::WebRequest(request.with_context(context.encode()))])
        }
        None => {
            let text = state.services.assistant.bio_text(None);
            set_bio_draft(state, text);
            (true, vec![])
        }
    }
}

fn set_bio_draft(state: &mut AppState, text: String) {
    if text.trim().is_empty() {
        state.bio_draft = None;
        state.notice = Some("No bio draft available".to_string());
    } else {
        state.bio_draft = Some(text);
    }
}

fn handle_worker_response(state: &mut AppState, response: &WorkerResponse) -> (bool, Vec<Action>) {
    match response {
        WorkerResponse::CommandCompleted { context, outcome } => {
            handle_store_reply(state, context, Ok(outcome.clone()))
        }
        WorkerResponse::CommandFailed { context, message } => {
            handle_store_reply(state, context, Err(message.clone()))
        }
        WorkerResponse::SessionLoaded { user } => {
            if state.current_user.is_some() {
                tracing::debug!("user already set, ignoring stored session");
                return (false, vec![]);
            }
            tracing::debug!(restored = user.is_some(), "session loaded");
            state.current_user.clone_from(user);
            (user.is_some(), vec![])
        }
        WorkerResponse::SessionSaved | WorkerResponse::SessionCleared => {
            tracing::trace!(response = ?response, "session slot updated");
            (false, vec![])
        }
        WorkerResponse::Error { message } => {
            tracing::error!(error = %message, "worker error");
            (false, vec![])
        }
    }
}

fn handle_http_reply(
    state: &mut AppState,
    status: u16,
    body: &[u8],
    context: &BTreeMap<String, String>,
) -> (bool, Vec<Action>) {
    let Some(context) = RequestContext::decode(context) else {
        tracing::debug!(status, "ignoring reply without a request context");
        return (false, vec![]);
    };

    match context.kind {
        ReplyKind::Recommendation | ReplyKind::BioDraft => {
            handle_assistant_reply(state, &context, crate::assistant::parse_reply(status, body))
        }
        _ => {
            let result = crate::remote::parse_reply(status, body).map_err(|e| e.detail());
            handle_store_reply(state, &context, result)
        }
    }
}

fn handle_assistant_reply(
    state: &mut AppState,
    context: &RequestContext,
    reply: Option<String>,
) -> (bool, Vec<Action>) {
    if !state.ledger.is_current(context) {
        tracing::debug!(kind = context.kind.as_str(), token = context.token.0, "stale reply dropped");
        return (false, vec![]);
    }

    if context.kind == ReplyKind::Recommendation {
        state.recommending = false;
        state.recommendation = Some(state.services.assistant.recommendation_text(reply));
    } else {
        state.drafting = false;
        let text = state.services.assistant.bio_text(reply);
        set_bio_draft(state, text);
    }
    (true, vec![])
}

/// Applies a store reply, from either backend, to the state.
#[allow(clippy::too_many_lines)]
fn handle_store_reply(
    state: &mut AppState,
    context: &RequestContext,
    result: std::result::Result<StoreOutcome, String>,
) -> (bool, Vec<Action>) {
    let _span = tracing::debug_span!("store_reply",
        kind = context.kind.as_str(),
        token = context.token.0,
        ok = result.is_ok()
    )
    .entered();

    if !state.ledger.is_current(context) {
        tracing::debug!("stale reply dropped");
        return (false, vec![]);
    }

    match context.kind {
        ReplyKind::Search => {
            state.loading = false;
            state.workers = match result {
                Ok(outcome) => normalize_workers(outcome.into_rows()),
                Err(message) => {
                    tracing::warn!(error = %message, "search failed");
                    Vec::new()
                }
            };
            tracing::debug!(result_count = state.workers.len(), "search results installed");
            state.clamp_selection();
            (true, vec![])
        }
        ReplyKind::Login => match result {
            Ok(outcome) => match normalize_users(outcome.into_rows()).into_iter().next() {
                Some(user) => {
                    let name = user.full_name();
                    state.phone_input.clear();
                    let action = state.set_current_user(Some(user));
                    state.navigate(View::Account);
                    state.notice = Some(format!("Welcome, {name}"));
                    (true, vec![action])
                }
                None => {
                    state.notice = Some("No account found for this phone number".to_string());
                    (true, vec![])
                }
            },
            Err(message) => {
                tracing::warn!(error = %message, "login lookup failed");
                state.notice = Some("Login is unavailable right now".to_string());
                (true, vec![])
            }
        },
        ReplyKind::CreateBooking => {
            match result {
                Ok(_) => state.notice = Some("Booking request sent".to_string()),
                Err(message) => state.alert = Some(Alert::new("Booking failed", message)),
            }
            (true, vec![])
        }
        ReplyKind::LoadBookings => {
            state.bookings_loading = false;
            state.bookings = match result {
                Ok(outcome) => {
                    let mut bookings = normalize_bookings(outcome.into_rows());
                    if let Some(user) = state.current_user.as_ref().filter(|u| u.is_worker()) {
                        bookings.retain(|booking| booking.acceptable_by(&user.id));
                    }
                    bookings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                    bookings
                }
                Err(message) => {
                    tracing::warn!(error = %message, "bookings failed to load");
                    Vec::new()
                }
            };
            state.clamp_selection();
            (true, vec![])
        }
        ReplyKind::AcceptBooking => {
            match result {
                Ok(outcome) if outcome.affected() == 0 => {
                    tracing::debug!(booking_id = ?context.subject, "booking was already accepted");
                    state.notice = Some("Booking already accepted".to_string());
                }
                Ok(_) => {
                    let worker_id = state.current_user.as_ref().map(|u| u.id.clone());
                    if let Some(booking) = state
                        .bookings
                        .iter_mut()
                        .find(|b| b.id.is_some() && b.id == context.subject)
                    {
                        booking.status = BookingStatus::Accepted;
                        booking.worker_id = worker_id;
                    }
                    state.notice = Some("Booking accepted".to_string());
                }
                Err(message) => {
                    state.alert = Some(Alert::new("Could not accept booking", message));
                }
            }
            (true, vec![])
        }
        ReplyKind::Recommendation | ReplyKind::BioDraft => {
            tracing::warn!("assistant reply routed as a store reply");
            (false, vec![])
        }
    }
}
