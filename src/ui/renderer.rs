//! Top-level rendering coordinator.
//!
//! Rendering is two steps: compute the view model from `AppState`, then
//! hand it to the component layer, which prints ANSI output to stdout.
//!
//! # Example
//!
//! ```rust
//! use hirafi::app::{AppState, Services};
//! use hirafi::ui::{render, Theme};
//!
//! let state = AppState::new(Theme::default(), Services::default());
//! render(&state, 24, 80); // Render to stdout
//! ```

use crate::app::AppState;
use crate::ui::components;

/// Renders the plugin UI to stdout.
///
/// Does not clear the screen; the host hands the plugin a blank pane for each
/// render call.
pub fn render(state: &AppState, rows: usize, cols: usize) {
    let viewmodel = state.compute_viewmodel(rows, cols);
    components::render_screen(&viewmodel, &state.theme, rows, cols);
}
