//! View and input mode types.
//!
//! [`View`] is the router's destination: which screen is showing. [`InputMode`]
//! decides how keys are interpreted: in `Normal` they navigate and trigger
//! commands, in `Editing` they go into one of the store-held text fields.
//!
//! ```
//! use hirafi::app::modes::{InputField, InputMode, View};
//! use hirafi::domain::FilterField;
//!
//! let mode = InputMode::Editing(InputField::Filter(FilterField::Region));
//! assert!(mode.is_editing());
//! assert_eq!(View::WorkerDetail.parent(), Some(View::Search));
//! ```

use crate::domain::FilterField;

/// Screens the router can show.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum View {
    /// Category catalog; the landing screen.
    #[default]
    Home,
    /// Filter bar plus result table.
    Search,
    /// One worker's profile, reviews and booking request.
    WorkerDetail,
    /// Phone number prompt.
    Login,
    /// The logged-in user, plus the bio assistant for workers.
    Account,
    /// Bookings made (seekers) or waiting to be accepted (workers).
    Bookings,
}

impl View {
    /// Screen that Esc returns to, `None` on the landing screen.
    #[must_use]
    pub const fn parent(self) -> Option<Self> {
        match self {
            Self::Home => None,
            Self::WorkerDetail => Some(Self::Search),
            Self::Search | Self::Login | Self::Account | Self::Bookings => Some(Self::Home),
        }
    }

    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Home => "Crafts",
            Self::Search => "Find a Craftsman",
            Self::WorkerDetail => "Profile",
            Self::Login => "Log In",
            Self::Account => "My Account",
            Self::Bookings => "Bookings",
        }
    }
}

/// Store-held text field that receives typed characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputField {
    Filter(FilterField),
    Phone,
    BookingDetails,
}

/// Current input handling mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InputMode {
    /// Keys navigate and trigger commands.
    #[default]
    Normal,

    /// Keys edit the given field; Enter submits, Esc cancels.
    Editing(InputField),
}

impl InputMode {
    #[must_use]
    pub const fn is_editing(self) -> bool {
        matches!(self, Self::Editing(_))
    }

    /// Filter field being edited, if any.
    #[must_use]
    pub const fn filter_field(self) -> Option<FilterField> {
        match self {
            Self::Editing(InputField::Filter(field)) => Some(field),
            _ => None,
        }
    }
}
