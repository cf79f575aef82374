//! View model types representing renderable UI state.
//!
//! View models are computed by `AppState::compute_viewmodel()` and consumed by
//! the renderer. They hold display-ready strings, selection and highlight
//! data, and no business logic. Every screen is one [`Body`] variant framed by
//! the same header, status line and footer.
//!
//! ```rust
//! use hirafi::ui::viewmodel::{Body, FooterInfo, HeaderInfo, UIViewModel};
//!
//! let vm = UIViewModel {
//!     header: HeaderInfo { title: " Crafts ".to_string(), badge: None },
//!     footer: FooterInfo { keybindings: "q: quit".to_string() },
//!     notice: None,
//!     alert: None,
//!     body: Body::Empty(hirafi::ui::viewmodel::EmptyState {
//!         message: "Nothing here".to_string(),
//!         subtitle: String::new(),
//!     }),
//! };
//! assert!(vm.alert.is_none());
//! ```

/// Complete UI view model for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UIViewModel {
    pub header: HeaderInfo,
    pub footer: FooterInfo,
    /// One-line status message above the footer.
    pub notice: Option<String>,
    /// Blocking alert drawn over the body.
    pub alert: Option<AlertInfo>,
    pub body: Body,
}

/// Main area of the screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    /// Selectable table, optionally under the filter bar.
    List(ListView),
    /// Scrollable text, optionally with an input field.
    Detail(DetailView),
    /// Single input prompt.
    Prompt(PromptView),
    /// Centered message for screens with nothing to show.
    Empty(EmptyState),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListView {
    pub filter_bar: Option<FilterBarInfo>,
    /// Column headings, one per [`DisplayItem`] column.
    pub columns: Vec<String>,
    /// Rows inside the visible window.
    pub rows: Vec<DisplayItem>,
    /// Selected row relative to `rows`.
    pub selected_index: usize,
    /// Replaces the rows when there is nothing to list.
    pub empty_state: Option<EmptyState>,
    /// Assistant output shown under the table.
    pub panel: Option<PanelInfo>,
}

/// One table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayItem {
    /// Cell texts; the first column is the name.
    pub cells: Vec<String>,
    pub is_selected: bool,
    /// Marked rows carry a leading indicator (verified worker, accepted booking).
    pub is_marked: bool,
    /// Character ranges of the first cell to highlight.
    pub highlight_ranges: Vec<(usize, usize)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterBarInfo {
    pub fields: Vec<FieldInfo>,
    /// Completions for the focused region or category field, best first.
    pub suggestions: Vec<String>,
}

/// An input field and its current text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInfo {
    pub label: String,
    pub value: String,
    pub focused: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailView {
    /// Lines inside the visible window.
    pub lines: Vec<DetailLine>,
    pub input: Option<FieldInfo>,
    pub panel: Option<PanelInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailLine {
    pub text: String,
    pub style: LineStyle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Heading,
    Body,
    Muted,
    Accent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptView {
    pub field: FieldInfo,
    pub hint: String,
}

/// Titled block of free text, such as a recommendation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelInfo {
    pub title: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertInfo {
    pub title: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderInfo {
    pub title: String,
    /// Logged-in user shown at the right edge.
    pub badge: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FooterInfo {
    pub keybindings: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmptyState {
    pub message: String,
    pub subtitle: String,
}
