//! Filter bar component renderer.
//!
//! Renders the three filter fields in one framed box, followed by a line of
//! completions for the field being edited.

use crate::ui::helpers::{fit, position_cursor, text_len};
use crate::ui::theme::Theme;
use crate::ui::viewmodel::{FieldInfo, FilterBarInfo};

/// Horizontal margin for the box (spaces on left and right).
const BOX_MARGIN: usize = 2;

/// Cursor drawn after the focused field's value.
const CURSOR: &str = "▏";

/// Renders the filter bar at the specified row.
///
/// ```text
/// [margin] ┌──────────────────────────────────────────┐ [margin]
/// [margin] │ Search: leak▏  Wilaya: Oran  Craft: ...  │ [margin]
/// [margin] └──────────────────────────────────────────┘ [margin]
///            Tab: Oran · Ouargla
/// ```
///
/// The frame takes the focus color while any field is being edited.
///
/// # Returns
///
/// The next available row position (row + 4)
pub fn render_filter_bar(row: usize, bar: &FilterBarInfo, theme: &Theme, cols: usize) -> usize {
    let box_width = cols.saturating_sub(BOX_MARGIN * 2);
    let inner_width = box_width.saturating_sub(2);
    let frame = if bar.fields.iter().any(|f| f.focused) {
        &theme.colors.field_focus
    } else {
        &theme.colors.field_border
    };

    position_cursor(row, 1);
    print!("{}", " ".repeat(BOX_MARGIN));
    print!("{}", Theme::fg(frame));
    print!("┌{}┐", "─".repeat(inner_width));
    print!("{}", Theme::reset());

    position_cursor(row + 1, 1);
    print!("{}", " ".repeat(BOX_MARGIN));
    print!("{}", Theme::fg(frame));
    print!("│");
    let mut used = 0;
    for field in &bar.fields {
        used += render_field_segment(field, theme, inner_width.saturating_sub(used));
    }
    print!("{}", " ".repeat(inner_width.saturating_sub(used)));
    print!("{}", Theme::fg(frame));
    print!("│");
    print!("{}", Theme::reset());

    position_cursor(row + 2, 1);
    print!("{}", " ".repeat(BOX_MARGIN));
    print!("{}", Theme::fg(frame));
    print!("└{}┘", "─".repeat(inner_width));
    print!("{}", Theme::reset());

    position_cursor(row + 3, 1);
    if bar.suggestions.is_empty() {
        print!("{}", " ".repeat(cols));
    } else {
        let line = format!("   Tab: {}", bar.suggestions.join(" · "));
        print!("{}", Theme::fg(&theme.colors.text_dim));
        print!("{}", fit(&line, cols));
        print!("{}", Theme::reset());
    }

    row + 4
}

/// Prints ` Label: value` within `room` cells and returns the cells used.
fn render_field_segment(field: &FieldInfo, theme: &Theme, room: usize) -> usize {
    let label = format!(" {}: ", field.label);
    let value = if field.focused {
        format!("{}{CURSOR} ", field.value)
    } else {
        format!("{} ", field.value)
    };
    let label_len = text_len(&label).min(room);
    let value_len = text_len(&value).min(room - label_len);

    print!("{}", Theme::fg(&theme.colors.text_dim));
    print!("{}", fit(&label, label_len));
    if field.focused {
        print!("{}", Theme::bold());
        print!("{}", Theme::fg(&theme.colors.field_focus));
    } else {
        print!("{}", Theme::fg(&theme.colors.text_normal));
    }
    print!("{}", fit(&value, value_len));
    print!("{}", Theme::reset());

    label_len + value_len
}
