//! Hirafi: a Zellij plugin for finding and booking independent craftsmen
//! across the Algerian wilayas.
//!
//! Hirafi provides:
//! - A category catalog and a filterable craftsman search (wilaya, category,
//!   free text) compiled to store queries
//! - Worker profiles with skills, reviews and a verification marker
//! - Phone-number login with a persisted session
//! - Booking requests that workers accept exactly once
//! - An optional language-model assistant for recommendations and bio drafts

#![allow(clippy::multiple_crate_versions)]

//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │  Zellij Plugin Shim (main.rs)                       │  ← Entry point
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Application Layer (app/)                           │  ← Store + reducer
//! │  - Event handling, routing, request fencing         │
//! │  - View model computation                           │
//! └─────────────────────────────────────────────────────┘
//!         │                    │                    │
//! ┌───────────────┐   ┌───────────────┐   ┌───────────────┐
//! │ Query Layer   │   │ Remote Layer  │   │ Assistant     │
//! │ (query/)      │   │ (remote/)     │   │ (assistant/)  │
//! │ - Compiler    │   │ - REST dialect│   │ - Prompts     │
//! │ - Normalizer  │   │ - Ledger      │   │ - Fallbacks   │
//! └───────────────┘   └───────────────┘   └───────────────┘
//!         │                    │
//! ┌───────────────┐   ┌───────────────┐   ┌───────────────┐
//! │ UI Layer      │   │ Storage Layer │   │ Worker Layer  │
//! │ (ui/)         │   │ (storage/)    │   │ (worker/)     │
//! └───────────────┘   └───────────────┘   └───────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Domain (domain/) · Paths (infrastructure/)         │
//! │  Observability (observability/)                     │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Configuration
//!
//! ```kdl
//! pane {
//!     plugin location="file:/path/to/hirafi.wasm" {
//!         store_url "https://project.supabase.co"
//!         store_key "anon-key"
//!         category_shape "list"
//!         assistant_key "..."
//!         theme "catppuccin-mocha"
//!         trace_level "info"
//!     }
//! }
//! ```
//!
//! Without `store_url` every store command runs against the local JSON table
//! file on the worker thread. Without `assistant_key` the assistant makes no
//! network call and answers with its fallback text.
//!
//! # Example
//!
//! ```rust
//! use hirafi::{handle_event, initialize, Config, Event, View};
//!
//! let mut state = initialize(&Config::default());
//! let (render, actions) = handle_event(&mut state, &Event::Navigate(View::Search))?;
//! assert!(render);
//! assert!(actions.iter().all(|a| !a.is_network()));
//! # Ok::<(), hirafi::HirafiError>(())
//! ```

pub mod app;
pub mod assistant;
pub mod domain;
pub mod infrastructure;
pub mod query;
pub mod remote;
pub mod storage;
pub mod worker;

pub mod ui;

pub mod observability;

pub use app::{handle_event, Action, AppState, Event, InputMode, Services, Store, View};
pub use domain::{HirafiError, Result};
pub use ui::Theme;

use std::collections::BTreeMap;

use assistant::{Assistant, AssistantConfig, DEFAULT_ENDPOINT, DEFAULT_MODEL};
use query::{CategoryShape, WorkerSchema};
use remote::{Backend, RestBackend};

/// Plugin configuration parsed from Zellij's configuration system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the remote store. `None` selects the local table file.
    pub store_url: Option<String>,

    /// Anonymous API key sent with every store request.
    pub store_key: Option<String>,

    pub users_table: String,
    pub bookings_table: String,

    /// Column holding a worker's category.
    pub category_field: String,

    /// Whether the category column holds one key or a list of keys.
    pub category_shape: CategoryShape,

    /// Language-model API key. Blank or missing disables the assistant.
    pub assistant_key: Option<String>,
    pub assistant_model: String,
    pub assistant_endpoint: String,

    /// Built-in theme name. Ignored if `theme_file` is set.
    pub theme_name: Option<String>,

    /// Path to a custom TOML theme file; `~` means the host home directory.
    pub theme_file: Option<String>,

    /// `EnvFilter` directive for spans. Default: `"info"`
    pub trace_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        let schema = WorkerSchema::default();
        Self {
            store_url: None,
            store_key: None,
            users_table: schema.users_table,
            bookings_table: schema.bookings_table,
            category_field: schema.category_field,
            category_shape: schema.category_shape,
            assistant_key: None,
            assistant_model: DEFAULT_MODEL.to_string(),
            assistant_endpoint: DEFAULT_ENDPOINT.to_string(),
            theme_name: None,
            theme_file: None,
            trace_level: None,
        }
    }
}

impl Config {
    /// Parses configuration from Zellij's configuration map.
    ///
    /// Blank values count as missing, and an unknown `category_shape` falls
    /// back to `scalar`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::collections::BTreeMap;
    /// use hirafi::query::CategoryShape;
    /// use hirafi::Config;
    ///
    /// let mut map = BTreeMap::new();
    /// map.insert("store_url".to_string(), "https://example.supabase.co".to_string());
    /// map.insert("category_shape".to_string(), "list".to_string());
    ///
    /// let config = Config::from_zellij(&map);
    /// assert_eq!(config.store_url.as_deref(), Some("https://example.supabase.co"));
    /// assert_eq!(config.category_shape, CategoryShape::List);
    /// assert_eq!(config.users_table, "users");
    /// ```
    #[must_use]
    pub fn from_zellij(config: &BTreeMap<String, String>) -> Self {
        let get = |key: &str| {
            config
                .get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(String::from)
        };
        let defaults = Self::default();

        let category_shape = match get("category_shape") {
            Some(value) => CategoryShape::parse(&value).unwrap_or_else(|| {
                tracing::warn!(category_shape = %value, "unknown category shape, using scalar");
                CategoryShape::Scalar
            }),
            None => defaults.category_shape,
        };

        Self {
            store_url: get("store_url"),
            store_key: get("store_key"),
            users_table: get("users_table").unwrap_or(defaults.users_table),
            bookings_table: get("bookings_table").unwrap_or(defaults.bookings_table),
            category_field: get("category_field").unwrap_or(defaults.category_field),
            category_shape,
            assistant_key: get("assistant_key"),
            assistant_model: get("assistant_model").unwrap_or(defaults.assistant_model),
            assistant_endpoint: get("assistant_endpoint").unwrap_or(defaults.assistant_endpoint),
            theme_name: get("theme"),
            theme_file: get("theme_file").map(|path| infrastructure::expand_tilde(&path)),
            trace_level: get("trace_level"),
        }
    }

    /// Column layout the query compiler and normalizer work against.
    #[must_use]
    pub fn schema(&self) -> WorkerSchema {
        WorkerSchema {
            users_table: self.users_table.clone(),
            bookings_table: self.bookings_table.clone(),
            category_field: self.category_field.clone(),
            category_shape: self.category_shape,
            ..WorkerSchema::default()
        }
    }

    /// Remote store when `store_url` is usable, otherwise the local table
    /// file.
    #[must_use]
    pub fn backend(&self) -> Backend {
        let Some(url) = self.store_url.as_deref() else {
            return Backend::Local;
        };
        match RestBackend::new(url, self.store_key.clone().unwrap_or_default()) {
            Ok(rest) => Backend::Rest(rest),
            Err(e) => {
                tracing::warn!(error = %e, "falling back to the local table store");
                Backend::Local
            }
        }
    }

    #[must_use]
    pub fn assistant(&self) -> Assistant {
        Assistant::new(AssistantConfig {
            key: self.assistant_key.clone(),
            model: self.assistant_model.clone(),
            endpoint: self.assistant_endpoint.clone(),
        })
    }

    fn theme(&self) -> Theme {
        if let Some(theme_file) = &self.theme_file {
            return Theme::from_file(theme_file).unwrap_or_else(|e| {
                tracing::debug!(theme_file = %theme_file, error = %e, "failed to load theme from file, using default");
                Theme::default()
            });
        }
        self.theme_name.as_ref().map_or_else(Theme::default, |theme_name| {
            Theme::from_name(theme_name).unwrap_or_else(|| {
                tracing::debug!(theme_name = %theme_name, "unknown theme, using default");
                Theme::default()
            })
        })
    }
}

/// Builds the initial application state from configuration.
///
/// The state starts on the category catalog with nobody logged in; the
/// runtime restores a saved session once permissions are granted.
///
/// ```rust
/// use hirafi::{initialize, Config, View};
///
/// let state = initialize(&Config::default());
/// assert_eq!(state.view, View::Home);
/// assert!(state.services.backend.is_local());
/// assert!(!state.services.assistant.is_enabled());
/// ```
#[must_use]
pub fn initialize(config: &Config) -> AppState {
    tracing::debug!("initializing hirafi plugin");

    let services = Services {
        backend: config.backend(),
        assistant: config.assistant(),
        schema: config.schema(),
    };
    tracing::debug!(
        local = services.backend.is_local(),
        assistant = services.assistant.is_enabled(),
        "services configured"
    );

    AppState::new(config.theme(), services)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn empty_configuration_uses_defaults() {
        assert_eq!(Config::from_zellij(&BTreeMap::new()), Config::default());
    }

    #[rstest]
    #[case("scalar", CategoryShape::Scalar)]
    #[case("list", CategoryShape::List)]
    #[case("array", CategoryShape::List)]
    #[case("nonsense", CategoryShape::Scalar)]
    fn category_shape_is_parsed(#[case] value: &str, #[case] expected: CategoryShape) {
        let config = Config::from_zellij(&map(&[("category_shape", value)]));
        assert_eq!(config.category_shape, expected);
    }

    #[test]
    fn blank_values_count_as_missing() {
        let config = Config::from_zellij(&map(&[("store_url", "  "), ("assistant_key", "")]));
        assert_eq!(config.store_url, None);
        assert_eq!(config.assistant_key, None);
    }

    #[test]
    fn theme_file_expands_home() {
        let config = Config::from_zellij(&map(&[("theme_file", "~/dark.toml")]));
        assert_eq!(config.theme_file.as_deref(), Some("/host/dark.toml"));
    }

    #[test]
    fn schema_carries_table_overrides() {
        let config = Config::from_zellij(&map(&[
            ("users_table", "profiles"),
            ("category_field", "categories"),
            ("category_shape", "list"),
        ]));
        let schema = config.schema();
        assert_eq!(schema.users_table, "profiles");
        assert_eq!(schema.category_field, "categories");
        assert_eq!(schema.category_shape, CategoryShape::List);
        assert_eq!(schema.bookings_table, "bookings");
    }

    #[rstest]
    #[case(None, true)]
    #[case(Some("not a url"), true)]
    #[case(Some("https://example.supabase.co"), false)]
    fn backend_selection(#[case] url: Option<&str>, #[case] local: bool) {
        let config = Config {
            store_url: url.map(String::from),
            ..Config::default()
        };
        assert_eq!(config.backend().is_local(), local);
    }

    #[test]
    fn assistant_is_enabled_by_key() {
        let config = Config::from_zellij(&map(&[("assistant_key", "k")]));
        assert!(initialize(&config).services.assistant.is_enabled());
    }

    #[test]
    fn unknown_theme_falls_back_to_default() {
        let config = Config {
            theme_name: Some("no-such-theme".to_string()),
            ..Config::default()
        };
        assert_eq!(config.theme(), Theme::default());
    }
}
