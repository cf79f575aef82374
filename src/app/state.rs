//! Application state management and view model computation.
//!
//! [`AppState`] is the single source of truth for everything on screen: the
//! current view, the logged-in user, the search filter and its results, the
//! text fields being edited, and the in-flight request bookkeeping. It is
//! mutated only by the event handler and projected to a
//! [`UIViewModel`] by [`AppState::compute_viewmodel`], which is pure.
//!
//! # Example
//!
//! ```rust
//! use hirafi::app::{AppState, Services, View};
//! use hirafi::ui::Theme;
//!
//! let mut state = AppState::new(Theme::default(), Services::default());
//! state.navigate(View::Search);
//! let viewmodel = state.compute_viewmodel(24, 80);
//! assert!(viewmodel.header.title.contains("Find a Craftsman"));
//! ```

use super::modes::{InputField, InputMode, View};
use super::Action;
use crate::assistant::Assistant;
use crate::domain::catalog::{self, Category, CATEGORIES};
use crate::domain::{Booking, BookingStatus, Filter, FilterField, User, Verification, Worker};
use crate::query::WorkerSchema;
use crate::remote::{Backend, RequestLedger};
use crate::ui::helpers::wrap;
use crate::ui::theme::Theme;
use crate::ui::viewmodel::{
    AlertInfo, Body, DetailLine, DetailView, DisplayItem, EmptyState, FieldInfo, FilterBarInfo,
    FooterInfo, HeaderInfo, LineStyle, ListView, PanelInfo, PromptView, UIViewModel,
};
use crate::worker::WorkerMessage;

/// Suggestions shown under the filter bar.
const MAX_SUGGESTIONS: usize = 5;

/// Collaborators the event handler turns requests over to.
#[derive(Debug, Clone)]
pub struct Services {
    pub backend: Backend,
    pub assistant: Assistant,
    pub schema: WorkerSchema,
}

impl Default for Services {
    fn default() -> Self {
        Self {
            backend: Backend::Local,
            assistant: Assistant::new(crate::assistant::AssistantConfig::default()),
            schema: WorkerSchema::default(),
        }
    }
}

/// Blocking message the user must dismiss.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub message: String,
}

impl Alert {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }

    /// Shown when an action needs a logged-in user and there is none.
    #[must_use]
    pub fn login_required() -> Self {
        Self::new("Login required", "Log in with your phone number first (press l).")
    }
}

/// Central application state container.
#[derive(Debug, Clone)]
pub struct AppState {
    pub view: View,

    /// Restored from the session slot at startup, set on login, cleared on
    /// logout.
    pub current_user: Option<User>,

    /// Result set of the latest handled search.
    pub workers: Vec<Worker>,

    /// True strictly between issuing the latest search and handling its reply.
    pub loading: bool,

    pub filter: Filter,

    /// Cursor within the current view's list.
    pub selected_index: usize,

    /// First visible line of scrollable text views.
    pub scroll_offset: usize,

    pub input_mode: InputMode,

    pub phone_input: String,
    pub booking_details: String,

    /// Worker whose profile is open.
    pub detail: Option<Worker>,

    pub recommendation: Option<String>,
    pub recommending: bool,

    pub bio_draft: Option<String>,
    pub drafting: bool,

    pub bookings: Vec<Booking>,
    pub bookings_loading: bool,

    pub alert: Option<Alert>,

    /// Non-blocking status line, replaced by the next notice.
    pub notice: Option<String>,

    pub ledger: RequestLedger,
    pub services: Services,
    pub theme: Theme,
}

impl AppState {
    /// Creates the startup state: home view, nobody logged in, no results.
    #[must_use]
    pub fn new(theme: Theme, services: Services) -> Self {
        Self {
            view: View::Home,
            current_user: None,
            workers: Vec::new(),
            loading: false,
            filter: Filter::default(),
            selected_index: 0,
            scroll_offset: 0,
            input_mode: InputMode::Normal,
            phone_input: String::new(),
            booking_details: String::new(),
            detail: None,
            recommendation: None,
            recommending: false,
            bio_draft: None,
            drafting: false,
            bookings: Vec::new(),
            bookings_loading: false,
            alert: None,
            notice: None,
            ledger: RequestLedger::new(),
            services,
            theme,
        }
    }

    /// Switches to `view`, resetting selection, scroll, input mode and the
    /// status notice.
    ///
    /// Navigating to the current view still resets them.
    pub fn navigate(&mut self, view: View) {
        tracing::debug!(from = ?self.view, to = ?view, "navigate");
        self.view = view;
        self.selected_index = 0;
        self.scroll_offset = 0;
        self.input_mode = InputMode::Normal;
        self.notice = None;
    }

    /// Sets or clears the logged-in user and returns the action persisting
    /// that change to the session slot.
    pub fn set_current_user(&mut self, user: Option<User>) -> Action {
        let message = match &user {
            Some(user) => {
                tracing::debug!(user_id = %user.id, role = user.role().as_str(), "user set");
                WorkerMessage::save_session(user.clone())
            }
            None => {
                tracing::debug!("user cleared");
                WorkerMessage::clear_session()
            }
        };
        self.current_user = user;
        self.bio_draft = None;
        Action::PostToWorker(message)
    }

    /// Number of selectable rows in the current view.
    #[must_use]
    pub fn list_len(&self) -> usize {
        match self.view {
            View::Home => CATEGORIES.len(),
            View::Search => self.workers.len(),
            View::Bookings => self.bookings.len(),
            View::WorkerDetail | View::Login | View::Account => 0,
        }
    }

    /// Moves the cursor down, wrapping to the top. No-op on an empty list.
    pub fn move_selection_down(&mut self) {
        let len = self.list_len();
        if len == 0 {
            return;
        }
        self.selected_index = (self.selected_index + 1) % len;
    }

    /// Moves the cursor up, wrapping to the bottom. No-op on an empty list.
    pub fn move_selection_up(&mut self) {
        let len = self.list_len();
        if len == 0 {
            return;
        }
        self.selected_index = if self.selected_index == 0 {
            len - 1
        } else {
            self.selected_index - 1
        };
    }

    pub fn scroll_down(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_add(1);
    }

    pub fn scroll_up(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_sub(1);
    }

    /// Keeps the cursor inside the list after it shrank.
    pub fn clamp_selection(&mut self) {
        self.selected_index = self.selected_index.min(self.list_len().saturating_sub(1));
    }

    #[must_use]
    pub fn selected_worker(&self) -> Option<&Worker> {
        self.workers.get(self.selected_index)
    }

    #[must_use]
    pub fn selected_category(&self) -> Option<&'static Category> {
        CATEGORIES.get(self.selected_index)
    }

    #[must_use]
    pub fn selected_booking(&self) -> Option<&Booking> {
        self.bookings.get(self.selected_index)
    }

    /// Text buffer behind an input field.
    pub fn input_buffer_mut(&mut self, field: InputField) -> &mut String {
        match field {
            InputField::Filter(field) => self.filter.field_mut(field),
            InputField::Phone => &mut self.phone_input,
            InputField::BookingDetails => &mut self.booking_details,
        }
    }

    /// Completions for the filter field being edited.
    ///
    /// Only the region and category fields have a catalog to complete from.
    #[must_use]
    pub fn suggestions(&self) -> Vec<&'static str> {
        let mut suggestions = match self.input_mode.filter_field() {
            Some(FilterField::Region) => catalog::suggest_region(&self.filter.region),
            Some(FilterField::Category) => catalog::suggest_category(&self.filter.category),
            Some(FilterField::Query) | None => Vec::new(),
        };
        suggestions.truncate(MAX_SUGGESTIONS);
        suggestions
    }

    /// Describes what the seeker is looking for, for the recommendation prompt.
    #[must_use]
    pub fn recommendation_need(&self) -> String {
        let mut parts = Vec::new();
        if let Some(text) = self.filter.query() {
            parts.push(text.to_string());
        }
        if let Some(category) = self.filter.category() {
            parts.push(catalog::category_label(category).to_string());
        }
        if let Some(region) = self.filter.region() {
            parts.push(format!("in {region}"));
        }
        if parts.is_empty() {
            "a reliable craftsman".to_string()
        } else {
            parts.join(" ")
        }
    }

    /// Projects the state to a renderable view model for a `rows` x `cols`
    /// pane.
    #[must_use]
    pub fn compute_viewmodel(&self, rows: usize, cols: usize) -> UIViewModel {
        UIViewModel {
            header: self.compute_header(),
            footer: self.compute_footer(),
            notice: self.compute_notice(),
            alert: self.alert.as_ref().map(|alert| AlertInfo {
                title: alert.title.clone(),
                message: alert.message.clone(),
            }),
            body: self.compute_body(rows, cols),
        }
    }

    fn compute_header(&self) -> HeaderInfo {
        let title = match self.view {
            View::Search => format!(" {} ({}) ", self.view.title(), self.workers.len()),
            View::Bookings => format!(" {} ({}) ", self.view.title(), self.bookings.len()),
            _ => format!(" {} ", self.view.title()),
        };
        HeaderInfo {
            title,
            badge: self
                .current_user
                .as_ref()
                .map(|user| format!("{} · {}", user.full_name(), user.role().as_str())),
        }
    }

    fn compute_footer(&self) -> FooterInfo {
        let keybindings = if self.alert.is_some() {
            "Enter/Esc: dismiss"
        } else {
            match (self.input_mode, self.view) {
                (InputMode::Editing(InputField::Filter(_)), _) => {
                    "Tab: next field / accept suggestion  Enter: search  Esc: done"
                }
                (InputMode::Editing(InputField::Phone), _) => "Enter: log in  Esc: cancel",
                (InputMode::Editing(InputField::BookingDetails), _) => {
                    "Enter: send request  Esc: cancel"
                }
                (InputMode::Normal, View::Home) => {
                    "j/k: navigate  Enter: browse craft  /: search  l: log in  u: account  b: bookings  q: quit"
                }
                (InputMode::Normal, View::Search) => {
                    "j/k: navigate  Enter: profile  /: edit filter  r: recommend  Esc: back  q: quit"
                }
                (InputMode::Normal, View::WorkerDetail) => {
                    "j/k: scroll  b: request booking  Esc: back  q: quit"
                }
                (InputMode::Normal, View::Login) => "Enter: type phone number  Esc: back  q: quit",
                (InputMode::Normal, View::Account) => {
                    "j/k: scroll  g: draft bio  L: log out  b: bookings  Esc: back  q: quit"
                }
                (InputMode::Normal, View::Bookings) => {
                    "j/k: navigate  a: accept  Esc: back  q: quit"
                }
            }
        };
        FooterInfo {
            keybindings: keybindings.to_string(),
        }
    }

    fn compute_notice(&self) -> Option<String> {
        if let Some(notice) = &self.notice {
            return Some(notice.clone());
        }
        let busy = match self.view {
            View::Search if self.loading => "Searching...",
            View::Search if self.recommending => "Asking the assistant...",
            View::Account if self.drafting => "Drafting a bio...",
            View::Bookings if self.bookings_loading => "Loading bookings...",
            _ => return None,
        };
        Some(busy.to_string())
    }

    fn compute_body(&self, rows: usize, cols: usize) -> Body {
        match self.view {
            View::Home => Body::List(self.compute_home(rows)),
            View::Search => Body::List(self.compute_search(rows)),
            View::WorkerDetail => self.detail.as_ref().map_or_else(
                || {
                    Body::Empty(EmptyState {
                        message: "No profile selected".to_string(),
                        subtitle: "Press Esc to return to the results".to_string(),
                    })
                },
                |worker| Body::Detail(self.compute_worker_detail(worker, rows, cols)),
            ),
            View::Login => Body::Prompt(PromptView {
                field: FieldInfo {
                    label: "Phone number".to_string(),
                    value: self.phone_input.clone(),
                    focused: self.input_mode == InputMode::Editing(InputField::Phone),
                },
                hint: "Log in with the phone number you registered with.".to_string(),
            }),
            View::Account => self.current_user.as_ref().map_or_else(
                || {
                    Body::Empty(EmptyState {
                        message: "You are not logged in".to_string(),
                        subtitle: "Press l to log in".to_string(),
                    })
                },
                |user| Body::Detail(self.compute_account(user, rows, cols)),
            ),
            View::Bookings => {
                if self.current_user.is_none() {
                    Body::Empty(EmptyState {
                        message: "Log in to see your bookings".to_string(),
                        subtitle: "Press l to log in".to_string(),
                    })
                } else {
                    Body::List(self.compute_bookings(rows))
                }
            }
        }
    }

    fn compute_home(&self, rows: usize) -> ListView {
        let available = available_rows(rows, 0);
        let (start, end) = visible_window(self.selected_index, available, CATEGORIES.len());
        ListView {
            filter_bar: None,
            columns: vec!["CRAFT".to_string(), "الحرفة".to_string()],
            rows: CATEGORIES[start..end]
                .iter()
                .enumerate()
                .map(|(offset, category)| DisplayItem {
                    cells: vec![category.label.to_string(), category.label_ar.to_string()],
                    is_selected: start + offset == self.selected_index,
                    is_marked: self.filter.category() == Some(category.key),
                    highlight_ranges: Vec::new(),
                })
                .collect(),
            selected_index: self.selected_index.saturating_sub(start),
            empty_state: None,
            panel: None,
        }
    }

    fn compute_search(&self, rows: usize) -> ListView {
        let filter_bar = self.compute_filter_bar();
        let panel = self.recommendation.as_ref().map(|text| PanelInfo {
            title: "Recommendation".to_string(),
            text: text.clone(),
        });
        let reserved = FILTER_BAR_ROWS + panel.as_ref().map_or(0, |_| PANEL_ROWS);
        let available = available_rows(rows, reserved);
        let (start, end) = visible_window(self.selected_index, available, self.workers.len());
        let needle = self.filter.query();

        let empty_state = self.workers.is_empty().then(|| {
            if self.loading {
                EmptyState {
                    message: "Searching...".to_string(),
                    subtitle: String::new(),
                }
            } else {
                EmptyState {
                    message: "No craftsmen found".to_string(),
                    subtitle: "Try another wilaya or craft, or clear the filter with /".to_string(),
                }
            }
        });

        ListView {
            filter_bar: Some(filter_bar),
            columns: ["NAME", "CRAFT", "WILAYA", "RATING"]
                .into_iter()
                .map(String::from)
                .collect(),
            rows: self.workers[start..end]
                .iter()
                .enumerate()
                .map(|(offset, worker)| {
                    let name = worker.user.full_name();
                    let highlight_ranges = needle.map_or_else(Vec::new, |n| match_ranges(&name, n));
                    DisplayItem {
                        cells: vec![
                            name,
                            worker
                                .primary_category()
                                .map(|key| catalog::category_label(key).to_string())
                                .unwrap_or_default(),
                            worker.user.location.label(),
                            format!("{:.1} ({})", worker.rating, worker.completed_jobs),
                        ],
                        is_selected: start + offset == self.selected_index,
                        is_marked: is_verified(worker),
                        highlight_ranges,
                    }
                })
                .collect(),
            selected_index: self.selected_index.saturating_sub(start),
            empty_state,
            panel,
        }
    }

    fn compute_filter_bar(&self) -> FilterBarInfo {
        let focused = self.input_mode.filter_field();
        FilterBarInfo {
            fields: [FilterField::Query, FilterField::Region, FilterField::Category]
                .into_iter()
                .map(|field| FieldInfo {
                    label: field.label().to_string(),
                    value: match field {
                        FilterField::Category if focused != Some(FilterField::Category) => self
                            .filter
                            .category()
                            .map(|key| catalog::category_label(key).to_string())
                            .unwrap_or_default(),
                        _ => self.filter.field(field).to_string(),
                    },
                    focused: focused == Some(field),
                })
                .collect(),
            suggestions: self
                .suggestions()
                .into_iter()
                .map(|s| match focused {
                    Some(FilterField::Category) => catalog::category_label(s).to_string(),
                    _ => s.to_string(),
                })
                .collect(),
        }
    }

    fn compute_worker_detail(&self, worker: &Worker, rows: usize, cols: usize) -> DetailView {
        let width = text_width(cols);
        let user = &worker.user;
        let mut lines = Vec::new();

        let mut title = user.full_name();
        if is_verified(worker) {
            title.push_str("  ✓ verified");
        }
        lines.push(line(title, LineStyle::Heading));

        let crafts: Vec<String> = worker
            .categories
            .iter()
            .map(|key| {
                catalog::category(key)
                    .map_or_else(|| key.clone(), |c| format!("{} ({})", c.label, c.label_ar))
            })
            .collect();
        if !crafts.is_empty() {
            lines.push(line(format!("Craft: {}", crafts.join(", ")), LineStyle::Body));
        }
        lines.push(line(format!("Wilaya: {}", user.location.label()), LineStyle::Body));
        lines.push(line(
            format!(
                "Rating: {:.1} ★   {} jobs completed",
                worker.rating, worker.completed_jobs
            ),
            LineStyle::Accent,
        ));
        if !user.phone.is_empty() {
            lines.push(line(format!("Phone: {}", user.phone), LineStyle::Body));
        }

        lines.push(line(String::new(), LineStyle::Body));
        lines.push(line("About".to_string(), LineStyle::Heading));
        if user.bio.trim().is_empty() {
            lines.push(line("No description yet.".to_string(), LineStyle::Muted));
        } else {
            lines.extend(wrap(&user.bio, width).into_iter().map(|l| line(l, LineStyle::Body)));
        }

        lines.push(line(String::new(), LineStyle::Body));
        lines.push(line("Skills".to_string(), LineStyle::Heading));
        if worker.skills.is_empty() {
            lines.push(line("No skills listed.".to_string(), LineStyle::Muted));
        } else {
            lines.extend(
                wrap(&worker.skills.join(", "), width)
                    .into_iter()
                    .map(|l| line(l, LineStyle::Body)),
            );
        }

        lines.push(line(String::new(), LineStyle::Body));
        lines.push(line(
            format!("Reviews ({})", worker.reviews.len()),
            LineStyle::Heading,
        ));
        for review in &worker.reviews {
            lines.push(line(
                format!("★ {:.1}  {}", review.rating, review.created_at.format("%Y-%m-%d")),
                LineStyle::Accent,
            ));
            lines.extend(
                wrap(&review.comment, width)
                    .into_iter()
                    .map(|l| line(l, LineStyle::Body)),
            );
        }

        let input = (self.input_mode == InputMode::Editing(InputField::BookingDetails)).then(|| {
            FieldInfo {
                label: "Describe the job".to_string(),
                value: self.booking_details.clone(),
                focused: true,
            }
        });
        let reserved = input.as_ref().map_or(0, |_| FIELD_ROWS);

        DetailView {
            lines: scroll_window(lines, self.scroll_offset, available_rows(rows, reserved)),
            input,
            panel: None,
        }
    }

    fn compute_account(&self, user: &User, rows: usize, cols: usize) -> DetailView {
        let width = text_width(cols);
        let mut lines = vec![
            line(user.full_name(), LineStyle::Heading),
            line(format!("Phone: {}", user.phone), LineStyle::Body),
            line(format!("Role: {}", user.role().as_str()), LineStyle::Body),
        ];
        if !user.location.region.is_empty() {
            lines.push(line(format!("Wilaya: {}", user.location.label()), LineStyle::Body));
        }
        if let Some(category) = user.category.as_deref() {
            lines.push(line(
                format!("Craft: {}", catalog::category_label(category)),
                LineStyle::Body,
            ));
        }
        let (status, style) = match user.verification {
            Verification::Verified => ("verified", LineStyle::Accent),
            Verification::Pending => ("under review", LineStyle::Muted),
            Verification::Unverified => ("not verified", LineStyle::Muted),
        };
        lines.push(line(format!("Identity: {status}"), style));
        lines.push(line(String::new(), LineStyle::Body));
        lines.push(line("About".to_string(), LineStyle::Heading));
        if user.bio.trim().is_empty() {
            let hint = if user.is_worker() {
                "No description yet. Press g to draft one."
            } else {
                "No description yet."
            };
            lines.push(line(hint.to_string(), LineStyle::Muted));
        } else {
            lines.extend(wrap(&user.bio, width).into_iter().map(|l| line(l, LineStyle::Body)));
        }

        let panel = self.bio_draft.as_ref().map(|text| PanelInfo {
            title: "Suggested bio".to_string(),
            text: text.clone(),
        });
        let reserved = panel.as_ref().map_or(0, |_| PANEL_ROWS);

        DetailView {
            lines: scroll_window(lines, self.scroll_offset, available_rows(rows, reserved)),
            input: None,
            panel,
        }
    }

    fn compute_bookings(&self, rows: usize) -> ListView {
        let available = available_rows(rows, 0);
        let (start, end) = visible_window(self.selected_index, available, self.bookings.len());
        ListView {
            filter_bar: None,
            columns: ["REQUEST", "STATUS", "CREATED"]
                .into_iter()
                .map(String::from)
                .collect(),
            rows: self.bookings[start..end]
                .iter()
                .enumerate()
                .map(|(offset, booking)| DisplayItem {
                    cells: vec![
                        if booking.details.trim().is_empty() {
                            "(no details)".to_string()
                        } else {
                            booking.details.clone()
                        },
                        booking.status.as_str().to_string(),
                        booking.created_at.format("%Y-%m-%d %H:%M").to_string(),
                    ],
                    is_selected: start + offset == self.selected_index,
                    is_marked: booking.status == BookingStatus::Accepted,
                    highlight_ranges: Vec::new(),
                })
                .collect(),
            selected_index: self.selected_index.saturating_sub(start),
            empty_state: (self.bookings.is_empty() && !self.bookings_loading).then(|| EmptyState {
                message: "No bookings yet".to_string(),
                subtitle: "Requests you send or can accept appear here".to_string(),
            }),
            panel: None,
        }
    }
}

/// Rows taken by the header, borders, column headings, status line, footer
/// and the spare last line.
const CHROME_ROWS: usize = 8;
/// Filter bar box plus its suggestion line.
const FILTER_BAR_ROWS: usize = 4;
/// Panel title, text and spacing.
const PANEL_ROWS: usize = 5;
/// Framed input field.
const FIELD_ROWS: usize = 3;

const fn available_rows(total_rows: usize, reserved: usize) -> usize {
    let rows = total_rows.saturating_sub(CHROME_ROWS + reserved);
    if rows == 0 {
        1
    } else {
        rows
    }
}

const fn text_width(cols: usize) -> usize {
    let width = cols.saturating_sub(4);
    if width < 20 {
        20
    } else {
        width
    }
}

/// Window of `available` rows around `selected`, kept full near the ends.
fn visible_window(selected: usize, available: usize, len: usize) -> (usize, usize) {
    let mut start = selected.saturating_sub(available / 2);
    let end = (start + available).min(len);
    if end - start.min(end) < available && len >= available {
        start = end.saturating_sub(available);
    }
    (start.min(end), end)
}

fn scroll_window(lines: Vec<DetailLine>, offset: usize, available: usize) -> Vec<DetailLine> {
    let start = offset.min(lines.len().saturating_sub(1));
    lines.into_iter().skip(start).take(available).collect()
}

fn line(text: String, style: LineStyle) -> DetailLine {
    DetailLine { text, style }
}

fn is_verified(worker: &Worker) -> bool {
    worker.verified == Some(true) || worker.user.verification == Verification::Verified
}

/// Character ranges of case-insensitive, non-overlapping occurrences of
/// `needle` in `text`.
fn match_ranges(text: &str, needle: &str) -> Vec<(usize, usize)> {
    let hay: Vec<char> = text.chars().collect();
    let pat: Vec<char> = needle.chars().collect();
    if pat.is_empty() || pat.len() > hay.len() {
        return Vec::new();
    }

    let same = |a: &char, b: &char| a.to_lowercase().eq(b.to_lowercase());
    let mut ranges = Vec::new();
    let mut i = 0;
    while i + pat.len() <= hay.len() {
        if hay[i..i + pat.len()].iter().zip(&pat).all(|(a, b)| same(a, b)) {
            ranges.push((i, i + pat.len()));
            i += pat.len();
        } else {
            i += 1;
        }
    }
    ranges
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Location, Role};
    use rstest::rstest;

    fn state() -> AppState {
        AppState::new(Theme::default(), Services::default())
    }

    fn worker(id: &str, first: &str, region: &str) -> Worker {
        let mut user = User::new(id, first, "Test", "0", Role::Worker);
        user.location = Location {
            region: region.to_string(),
            sub_region: None,
        };
        Worker {
            user,
            categories: vec!["plumbing".to_string()],
            skills: Vec::new(),
            rating: 4.0,
            completed_jobs: 3,
            reviews: Vec::new(),
            verified: None,
        }
    }

    #[test]
    fn navigate_resets_cursor_scroll_and_input() {
        let mut state = state();
        state.selected_index = 4;
        state.scroll_offset = 9;
        state.input_mode = InputMode::Editing(InputField::Phone);

        state.navigate(View::Home);

        assert_eq!(state.view, View::Home);
        assert_eq!(state.selected_index, 0);
        assert_eq!(state.scroll_offset, 0);
        assert_eq!(state.input_mode, InputMode::Normal);
    }

    #[test]
    fn set_current_user_saves_or_clears_the_session() {
        let mut state = state();
        let user = User::new("1", "Amina", "K", "0550", Role::Seeker);

        let action = state.set_current_user(Some(user.clone()));
        assert!(matches!(
            action,
            Action::PostToWorker(WorkerMessage::SaveSession { user: saved, .. }) if saved == user
        ));
        assert_eq!(state.current_user, Some(user));

        let action = state.set_current_user(None);
        assert!(matches!(action, Action::PostToWorker(WorkerMessage::ClearSession { .. })));
        assert_eq!(state.current_user, None);
    }

    #[test]
    fn selection_wraps_in_both_directions() {
        let mut state = state();
        state.view = View::Search;
        state.workers = vec![worker("1", "A", "Oran"), worker("2", "B", "Oran")];

        state.move_selection_up();
        assert_eq!(state.selected_index, 1);
        state.move_selection_down();
        assert_eq!(state.selected_index, 0);
    }

    #[test]
    fn empty_search_shows_neutral_empty_state() {
        let mut state = state();
        state.navigate(View::Search);
        let Body::List(list) = state.compute_viewmodel(24, 80).body else {
            panic!("search renders a list");
        };
        assert_eq!(list.empty_state.unwrap().message, "No craftsmen found");
        assert!(list.filter_bar.is_some());
    }

    #[test]
    fn search_rows_highlight_free_text_in_names() {
        let mut state = state();
        state.navigate(View::Search);
        state.filter.query = "kar".to_string();
        state.workers = vec![worker("1", "Karim", "Algiers")];

        let Body::List(list) = state.compute_viewmodel(24, 80).body else {
            panic!("search renders a list");
        };
        assert_eq!(list.rows[0].cells[0], "Karim Test");
        assert_eq!(list.rows[0].highlight_ranges, vec![(0, 3)]);
    }

    #[test]
    fn window_follows_selection_in_long_lists() {
        let mut state = state();
        state.navigate(View::Search);
        state.workers = (0..50)
            .map(|i| worker(&i.to_string(), &format!("W{i}"), "Oran"))
            .collect();
        state.selected_index = 49;

        let Body::List(list) = state.compute_viewmodel(20, 80).body else {
            panic!("search renders a list");
        };
        assert!(list.rows.len() < 50);
        assert!(list.rows[list.selected_index].is_selected);
        assert_eq!(list.rows.last().unwrap().cells[0], "W49 Test");
    }

    #[test]
    fn header_badge_names_the_logged_in_user() {
        let mut state = state();
        let _ = state.set_current_user(Some(User::new("1", "Nadia", "Z", "0", Role::Worker)));
        let header = state.compute_viewmodel(24, 80).header;
        assert_eq!(header.badge.as_deref(), Some("Nadia Z · worker"));
    }

    #[test]
    fn region_suggestions_follow_the_focused_field() {
        let mut state = state();
        state.filter.region = "tizi".to_string();
        assert!(state.suggestions().is_empty());

        state.input_mode = InputMode::Editing(InputField::Filter(FilterField::Region));
        assert_eq!(state.suggestions().first(), Some(&"Tizi Ouzou"));
    }

    #[rstest]
    #[case("Karim", "KAR", vec![(0, 3)])]
    #[case("abcabc", "bc", vec![(1, 3), (4, 6)])]
    #[case("Lina", "", vec![])]
    #[case("Li", "Lina", vec![])]
    fn match_ranges_are_case_insensitive(
        #[case] text: &str,
        #[case] needle: &str,
        #[case] expected: Vec<(usize, usize)>,
    ) {
        assert_eq!(match_ranges(text, needle), expected);
    }
}
