//! Composable UI component renderers.
//!
//! Each component renders one part of the interface at a given row and
//! returns the next free row.
//!
//! # Components
//!
//! - [`header`]: Title bar with the logged-in user badge
//! - [`footer`]: Keybinding hints
//! - [`filter_bar`]: Search, wilaya and craft fields plus suggestions
//! - [`table`]: Column table with selection, markers and match highlighting
//! - [`detail`]: Styled text lines, input fields, prompts and assistant panels
//! - [`empty`]: Centered message for screens with nothing to show
//! - [`alert`]: Blocking modal drawn over everything else
//!
//! # Layout
//!
//! ```text
//! [blank line]
//! [Header]
//! [Border]
//! [Body: list | detail | prompt | empty]
//! [Blank padding to fill screen]
//! [Notice]
//! [Border]
//! [Footer]
//! ```

mod alert;
mod detail;
mod empty;
mod filter_bar;
mod footer;
mod header;
mod table;

pub use empty::render_empty_state;

use crate::ui::helpers::{fit, position_cursor};
use crate::ui::theme::Theme;
use crate::ui::viewmodel::{Body, ListView, UIViewModel};

use alert::render_alert;
use detail::{render_detail, render_panel, render_prompt};
use filter_bar::render_filter_bar;
use footer::render_footer;
use header::render_header;
use table::{column_widths, render_table_headers, render_table_rows};

/// Renders a horizontal border line and returns the next row.
fn render_border(row: usize, color: &str, cols: usize) -> usize {
    position_cursor(row, 1);
    print!("{}", Theme::fg(color));
    print!("{}", "─".repeat(cols));
    print!("{}", Theme::reset());
    row + 1
}

/// Renders a full screen for `vm`.
pub fn render_screen(vm: &UIViewModel, theme: &Theme, rows: usize, cols: usize) {
    let mut current_row = 2; // row 1 stays blank

    current_row = render_header(current_row, &vm.header, theme, cols);
    current_row = render_border(current_row, &theme.colors.border, cols);

    match &vm.body {
        Body::List(list) => {
            render_list(current_row, list, theme, cols);
        }
        Body::Detail(detail) => {
            render_detail(current_row, detail, theme, cols);
        }
        Body::Prompt(prompt) => {
            render_prompt(current_row, prompt, theme, cols);
        }
        Body::Empty(empty) => {
            render_empty_state(current_row + 2, empty, theme, cols);
        }
    }

    let footer_start = rows.saturating_sub(1);
    let border_row = footer_start.saturating_sub(1);

    if let Some(notice) = &vm.notice {
        render_notice(border_row.saturating_sub(1), notice, theme, cols);
    }
    render_border(border_row, &theme.colors.border, cols);
    render_footer(footer_start, &vm.footer, theme, cols);

    if let Some(alert) = &vm.alert {
        render_alert(alert, theme, rows, cols);
    }
}

fn render_list(row: usize, list: &ListView, theme: &Theme, cols: usize) -> usize {
    let mut current_row = row;

    if let Some(bar) = &list.filter_bar {
        current_row = render_filter_bar(current_row, bar, theme, cols);
    }

    if let Some(empty) = &list.empty_state {
        current_row = render_empty_state(current_row + 1, empty, theme, cols);
    } else {
        let widths = column_widths(list.columns.len(), cols);
        current_row = render_table_headers(current_row, &list.columns, &widths, theme);
        current_row = render_table_rows(current_row, &list.rows, &widths, theme, cols);
    }

    if let Some(panel) = &list.panel {
        current_row = render_panel(current_row, panel, theme, cols);
    }
    current_row
}

fn render_notice(row: usize, notice: &str, theme: &Theme, cols: usize) -> usize {
    position_cursor(row, 1);
    print!("{}", Theme::fg(&theme.colors.notice_fg));
    print!("{}", fit(&format!(" {notice}"), cols));
    print!("{}", Theme::reset());
    row + 1
}
