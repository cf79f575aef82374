//! Table component renderer.
//!
//! Renders a list of rows under column headings. The first column is the
//! widest and carries match highlighting; the remaining columns share the
//! rest of the width. A two-cell indicator in front of each row marks
//! verified workers and accepted bookings.

use crate::ui::helpers::{self, clip_ranges, fit, position_cursor, text_len};
use crate::ui::theme::Theme;
use crate::ui::viewmodel::DisplayItem;

/// Width of the marker column in front of every row.
const INDICATOR_WIDTH: usize = 2;

/// Narrowest first column before the others start shrinking instead.
const MIN_FIRST_COLUMN: usize = 12;

/// Splits the usable width between `count` columns.
///
/// The first column takes two fifths (at least [`MIN_FIRST_COLUMN`]), the
/// others share the remainder evenly.
pub fn column_widths(count: usize, cols: usize) -> Vec<usize> {
    let available = cols.saturating_sub(INDICATOR_WIDTH);
    if count <= 1 {
        return vec![available; count];
    }
    let first = (available * 2 / 5).max(MIN_FIRST_COLUMN).min(available);
    let rest = (available - first) / (count - 1);
    std::iter::once(first)
        .chain(std::iter::repeat(rest).take(count - 1))
        .collect()
}

/// Renders the column headings at the specified row.
///
/// # Returns
///
/// The next available row position (row + 1)
pub fn render_table_headers(row: usize, columns: &[String], widths: &[usize], theme: &Theme) -> usize {
    position_cursor(row, 1);
    print!("{}", Theme::bold());
    print!("{}", Theme::fg(&theme.colors.header_fg));
    print!("{}", " ".repeat(INDICATOR_WIDTH));
    for (column, width) in columns.iter().zip(widths) {
        print!("{} ", fit(column, width.saturating_sub(1)));
    }
    print!("{}", Theme::reset());
    row + 1
}

/// Renders all table rows starting at the specified row.
///
/// # Returns
///
/// The next available row position (row + number of items)
pub fn render_table_rows(
    row: usize,
    items: &[DisplayItem],
    widths: &[usize],
    theme: &Theme,
    cols: usize,
) -> usize {
    let mut current_row = row;
    for item in items {
        current_row = render_table_row(current_row, item, widths, theme, cols);
    }
    current_row
}

/// Renders one row.
///
/// # Styling Precedence
///
/// 1. Selection background (if `is_selected`)
/// 2. Match highlights in the first column
/// 3. Normal text color
///
/// The row is padded to the full terminal width so the selection background
/// spans the whole line.
fn render_table_row(
    row: usize,
    item: &DisplayItem,
    widths: &[usize],
    theme: &Theme,
    cols: usize,
) -> usize {
    position_cursor(row, 1);

    let base_fg = if item.is_selected {
        &theme.colors.selection_fg
    } else {
        &theme.colors.text_normal
    };
    if item.is_selected {
        print!("{}", Theme::bg(&theme.colors.selection_bg));
    }

    if item.is_marked {
        print!("{}", Theme::fg(&theme.colors.accent_fg));
        print!("✓ ");
    } else {
        print!("  ");
    }
    print!("{}", Theme::fg(base_fg));

    let mut line_len = INDICATOR_WIDTH;
    for (index, (cell, width)) in item.cells.iter().zip(widths).enumerate() {
        let cell_width = width.saturating_sub(1);
        let shown = fit(cell, cell_width);

        if index == 0 && !item.highlight_ranges.is_empty() {
            let cell_len = text_len(cell);
            let visible = if cell_len > cell_width {
                cell_width.saturating_sub(1)
            } else {
                cell_len
            };
            helpers::render_highlighted_text(
                &shown,
                &clip_ranges(&item.highlight_ranges, visible),
                theme,
                item.is_selected,
            );
        } else {
            print!("{shown}");
        }
        print!(" ");
        line_len += width;
    }

    print!("{}", " ".repeat(cols.saturating_sub(line_len)));
    print!("{}", Theme::reset());
    row + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(4, 82, vec![32, 16, 16, 16])]
    #[case(2, 30, vec![12, 16])]
    #[case(1, 40, vec![38])]
    #[case(0, 40, vec![])]
    fn widths_favor_the_first_column(
        #[case] count: usize,
        #[case] cols: usize,
        #[case] expected: Vec<usize>,
    ) {
        assert_eq!(column_widths(count, cols), expected);
    }
}
