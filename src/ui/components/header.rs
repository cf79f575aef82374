//! Header component renderer.
//!
//! Renders the title bar: the view title centered, and the logged-in user's
//! badge right-aligned when there is room for it.

use crate::ui::helpers::{position_cursor, text_len};
use crate::ui::theme::Theme;
use crate::ui::viewmodel::HeaderInfo;

/// Renders the header title bar at the specified row.
///
/// Displays the title centered horizontally with bold styling and theme
/// colors, padded to the full terminal width. The badge is dropped on panes
/// too narrow to show it beside the title.
///
/// # Layout
///
/// ```text
/// [left padding] TITLE [right padding] Badge
/// ```
///
/// # Returns
///
/// The next available row position (row + 1)
pub fn render_header(row: usize, header: &HeaderInfo, theme: &Theme, cols: usize) -> usize {
    let title_len = text_len(&header.title);
    let padding = (cols.saturating_sub(title_len)) / 2;

    let badge = header
        .badge
        .as_ref()
        .map(|badge| format!("{badge} "))
        .filter(|badge| padding + title_len + text_len(badge) < cols);
    let badge_len = badge.as_deref().map_or(0, text_len);

    position_cursor(row, 1);
    print!("{}", Theme::bold());
    print!("{}", Theme::fg(&theme.colors.header_fg));
    if let Some(bg) = &theme.colors.header_bg {
        print!("{}", Theme::bg(bg));
    }

    print!("{}", " ".repeat(padding));
    print!("{}", header.title);
    print!(
        "{}",
        " ".repeat(cols.saturating_sub(padding + title_len + badge_len))
    );

    if let Some(badge) = badge {
        print!("{}", Theme::fg(&theme.colors.accent_fg));
        print!("{badge}");
    }

    print!("{}", Theme::reset());
    row + 1
}
