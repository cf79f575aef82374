//! Shared rendering utilities and helpers.
//!
//! Low-level text handling used across UI components: cursor placement,
//! match highlighting with proper ANSI escape sequence management, and
//! width-aware truncation and wrapping. Everything operates on character
//! indices, never byte indices, so Arabic labels and accented names are
//! measured correctly.
//!
//! # Example
//!
//! ```rust
//! use hirafi::ui::helpers::{fit, wrap};
//!
//! assert_eq!(fit("Plumbing", 5), "Plum…");
//! assert_eq!(fit("Oran", 6), "Oran  ");
//! assert_eq!(wrap("fixes leaking taps", 10), vec!["fixes", "leaking", "taps"]);
//! ```

use crate::ui::theme::Theme;

/// Positions the cursor at a specific row and column.
///
/// Uses ANSI escape sequence `\u{1b}[{row};{col}H` to move the cursor.
/// Coordinates are 1-indexed (row 1 = first row, col 1 = first column).
pub fn position_cursor(row: usize, col: usize) {
    print!("\u{1b}[{row};{col}H");
}

/// Number of terminal cells `text` occupies, counted in characters.
#[must_use]
pub fn text_len(text: &str) -> usize {
    text.chars().count()
}

/// Truncates `text` to `width` characters (ending in `…` when cut) and pads
/// it with spaces to exactly `width`.
#[must_use]
pub fn fit(text: &str, width: usize) -> String {
    let len = text_len(text);
    if len <= width {
        return format!("{text}{}", " ".repeat(width - len));
    }
    if width == 0 {
        return String::new();
    }
    let mut cut: String = text.chars().take(width - 1).collect();
    cut.push('…');
    cut
}

/// Greedy word wrap on character counts. Words longer than `width` get a
/// line of their own.
#[must_use]
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let needed = text_len(&current) + text_len(word) + usize::from(!current.is_empty());
            if needed > width && !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }
    lines
}

/// Clips highlight ranges to the first `len` characters, dropping empty ones.
#[must_use]
pub fn clip_ranges(ranges: &[(usize, usize)], len: usize) -> Vec<(usize, usize)> {
    ranges
        .iter()
        .map(|&(start, end)| (start.min(len), end.min(len)))
        .filter(|(start, end)| start < end)
        .collect()
}

/// Renders text with highlighted character ranges.
///
/// Highlighted sections use the match highlight colors. When the row is
/// selected, the selection colors are restored after each highlight so the
/// rest of the row keeps its background.
///
/// Ranges must be sorted and non-overlapping; ones past the end of `text` are
/// ignored.
pub fn render_highlighted_text(
    text: &str,
    ranges: &[(usize, usize)],
    theme: &Theme,
    is_selected: bool,
) {
    let chars: Vec<char> = text.chars().collect();
    let ranges = clip_ranges(ranges, chars.len());
    if ranges.is_empty() {
        print!("{text}");
        return;
    }

    let mut current_pos = 0;
    for (start, end) in ranges {
        if start < current_pos {
            continue;
        }
        let normal_section: String = chars[current_pos..start].iter().collect();
        print!("{normal_section}");

        print!("{}", Theme::fg(&theme.colors.match_highlight_fg));
        print!("{}", Theme::bg(&theme.colors.match_highlight_bg));
        let highlighted_section: String = chars[start..end].iter().collect();
        print!("{highlighted_section}");
        print!("{}", Theme::reset());

        if is_selected {
            print!("{}", Theme::fg(&theme.colors.selection_fg));
            print!("{}", Theme::bg(&theme.colors.selection_bg));
        } else {
            print!("{}", Theme::fg(&theme.colors.text_normal));
        }

        current_pos = end;
    }

    if current_pos < chars.len() {
        let remaining: String = chars[current_pos..].iter().collect();
        print!("{remaining}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Oran", 4, "Oran")]
    #[case("Oran", 0, "")]
    #[case("Tizi Ouzou", 6, "Tizi …")]
    #[case("سباكة", 7, "سباكة  ")]
    fn fit_pads_or_truncates_by_characters(
        #[case] text: &str,
        #[case] width: usize,
        #[case] expected: &str,
    ) {
        assert_eq!(fit(text, width), expected);
        assert_eq!(text_len(&fit(text, width)), width);
    }

    #[test]
    fn wrap_breaks_on_word_boundaries_and_keeps_paragraphs() {
        assert_eq!(
            wrap("one two three four\nfive", 9),
            vec!["one two", "three", "four", "five"]
        );
        assert_eq!(wrap("unbreakable", 4), vec!["unbreakable"]);
        assert!(wrap("   ", 10).is_empty());
    }

    #[test]
    fn ranges_are_clipped_to_visible_text() {
        assert_eq!(clip_ranges(&[(0, 3), (5, 9), (12, 14)], 7), vec![(0, 3), (5, 7)]);
    }
}
