//! Blocking alert modal.

use crate::ui::helpers::{fit, position_cursor, text_len, wrap};
use crate::ui::theme::Theme;
use crate::ui::viewmodel::AlertInfo;

const MAX_WIDTH: usize = 60;
const MAX_MESSAGE_LINES: usize = 6;

/// Draws the alert centered over whatever is already on screen.
///
/// ```text
/// ┌─ Booking failed ─────────────────┐
/// │ duplicate key value violates ... │
/// │                                  │
/// │ Enter/Esc to dismiss             │
/// └──────────────────────────────────┘
/// ```
pub fn render_alert(alert: &AlertInfo, theme: &Theme, rows: usize, cols: usize) {
    let box_width = cols.saturating_sub(4).min(MAX_WIDTH);
    let inner_width = box_width.saturating_sub(2);
    let text_width = inner_width.saturating_sub(2).max(1);

    let mut message = wrap(&alert.message, text_width);
    message.truncate(MAX_MESSAGE_LINES);
    let height = message.len() + 4;

    let left = (cols.saturating_sub(box_width)) / 2 + 1;
    let top = (rows.saturating_sub(height)) / 2 + 1;

    let title = format!("─ {} ", alert.title);
    let title_len = text_len(&title).min(inner_width);
    position_cursor(top, left);
    print!("{}", Theme::fg(&theme.colors.alert_fg));
    print!("┌");
    print!("{}", Theme::bold());
    print!("{}", fit(&title, title_len));
    print!("{}", Theme::reset());
    print!("{}", Theme::fg(&theme.colors.alert_fg));
    print!("{}┐", "─".repeat(inner_width - title_len));

    let mut row = top + 1;
    let body = message
        .iter()
        .map(|line| (line.as_str(), &theme.colors.text_normal))
        .chain([
            ("", &theme.colors.text_normal),
            ("Enter/Esc to dismiss", &theme.colors.text_dim),
        ]);
    for (text, color) in body {
        position_cursor(row, left);
        print!("{}", Theme::fg(&theme.colors.alert_fg));
        print!("│ ");
        print!("{}", Theme::fg(color));
        print!("{}", fit(text, text_width));
        print!("{}", Theme::fg(&theme.colors.alert_fg));
        print!(" │");
        row += 1;
    }

    position_cursor(row, left);
    print!("└{}┘", "─".repeat(inner_width));
    print!("{}", Theme::reset());
}
