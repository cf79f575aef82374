//! Text views: profile and account details, input fields, the login prompt
//! and assistant panels.

use crate::ui::helpers::{fit, position_cursor, text_len, wrap};
use crate::ui::theme::Theme;
use crate::ui::viewmodel::{DetailLine, DetailView, FieldInfo, LineStyle, PanelInfo, PromptView};

/// Left margin of text content.
const MARGIN: usize = 2;

/// Lines of assistant text shown in a panel.
const PANEL_TEXT_LINES: usize = 3;

/// Renders the visible detail lines, then the input field and panel if any.
pub fn render_detail(row: usize, detail: &DetailView, theme: &Theme, cols: usize) -> usize {
    let mut current_row = row;
    for line in &detail.lines {
        current_row = render_line(current_row, line, theme, cols);
    }
    if let Some(field) = &detail.input {
        current_row = render_field(current_row, field, theme, cols);
    }
    if let Some(panel) = &detail.panel {
        current_row = render_panel(current_row, panel, theme, cols);
    }
    current_row
}

fn render_line(row: usize, line: &DetailLine, theme: &Theme, cols: usize) -> usize {
    position_cursor(row, 1);
    match line.style {
        LineStyle::Heading => {
            print!("{}", Theme::bold());
            print!("{}", Theme::fg(&theme.colors.header_fg));
        }
        LineStyle::Body => print!("{}", Theme::fg(&theme.colors.text_normal)),
        LineStyle::Muted => {
            print!("{}", Theme::dim());
            print!("{}", Theme::fg(&theme.colors.text_dim));
        }
        LineStyle::Accent => print!("{}", Theme::fg(&theme.colors.rating_fg)),
    }
    print!("{}", " ".repeat(MARGIN));
    print!("{}", fit(&line.text, cols.saturating_sub(MARGIN)));
    print!("{}", Theme::reset());
    row + 1
}

/// Renders a framed single-line input.
///
/// ```text
///   ┌──────────────────────────────┐
///   │ Phone number: 0550▏          │
///   └──────────────────────────────┘
/// ```
///
/// # Returns
///
/// The next available row position (row + 3)
pub fn render_field(row: usize, field: &FieldInfo, theme: &Theme, cols: usize) -> usize {
    let inner_width = cols.saturating_sub(MARGIN * 2 + 2);
    let frame = if field.focused {
        &theme.colors.field_focus
    } else {
        &theme.colors.field_border
    };
    let cursor = if field.focused { "▏" } else { "" };

    position_cursor(row, 1);
    print!("{}", " ".repeat(MARGIN));
    print!("{}", Theme::fg(frame));
    print!("┌{}┐", "─".repeat(inner_width));

    let label = format!(" {}: ", field.label);
    let label_len = text_len(&label).min(inner_width);
    // Long values scroll so the end being typed stays visible.
    let value = format!("{}{cursor}", field.value);
    let room = inner_width - label_len;
    let skip = text_len(&value).saturating_sub(room);
    let value: String = value.chars().skip(skip).collect();

    position_cursor(row + 1, 1);
    print!("{}", " ".repeat(MARGIN));
    print!("│");
    print!("{}", Theme::fg(&theme.colors.text_dim));
    print!("{}", fit(&label, label_len));
    print!("{}", Theme::fg(&theme.colors.text_normal));
    print!("{}", fit(&value, room));
    print!("{}", Theme::fg(frame));
    print!("│");

    position_cursor(row + 2, 1);
    print!("{}", " ".repeat(MARGIN));
    print!("└{}┘", "─".repeat(inner_width));
    print!("{}", Theme::reset());

    row + 3
}

/// Renders the login prompt: a hint line above a focused field.
pub fn render_prompt(row: usize, prompt: &PromptView, theme: &Theme, cols: usize) -> usize {
    position_cursor(row + 1, 1);
    print!("{}", Theme::fg(&theme.colors.text_dim));
    print!("{}", " ".repeat(MARGIN));
    print!("{}", fit(&prompt.hint, cols.saturating_sub(MARGIN)));
    print!("{}", Theme::reset());

    render_field(row + 3, &prompt.field, theme, cols)
}

/// Renders an assistant panel: a blank line, the title, and up to three
/// wrapped lines of text.
pub fn render_panel(row: usize, panel: &PanelInfo, theme: &Theme, cols: usize) -> usize {
    let width = cols.saturating_sub(MARGIN * 2).max(1);

    position_cursor(row + 1, 1);
    print!("{}", Theme::bold());
    print!("{}", Theme::fg(&theme.colors.notice_fg));
    print!("{}", " ".repeat(MARGIN));
    print!("{}", fit(&panel.title, width));
    print!("{}", Theme::reset());

    let mut current_row = row + 2;
    let lines = wrap(&panel.text, width);
    let overflow = lines.len() > PANEL_TEXT_LINES;
    for (index, line) in lines.iter().take(PANEL_TEXT_LINES).enumerate() {
        let text = if overflow && index + 1 == PANEL_TEXT_LINES {
            format!("{line} …")
        } else {
            line.clone()
        };
        position_cursor(current_row, 1);
        print!("{}", Theme::fg(&theme.colors.text_normal));
        print!("{}", " ".repeat(MARGIN));
        print!("{}", fit(&text, width));
        print!("{}", Theme::reset());
        current_row += 1;
    }
    current_row
}
