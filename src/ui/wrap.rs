//! Hard wrapping for the source pane.
//!
//! The source pane and its off-screen measuring surface must agree on every
//! row break, so both go through [`wrap_rows`].

use unicode_width::UnicodeWidthChar;

use crate::sync::Measure;

/// One screen row of source text: a byte range of logical line `line`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WrappedRow {
    pub line: usize,
    pub start: usize,
    pub end: usize,
}

/// Break `text` into rows at most `width` columns wide.
///
/// Every `\n` ends a line, so a trailing newline yields a final empty row,
/// and an empty line still takes a row. A character wider than `width`
/// gets a row to itself.
pub fn wrap_rows(text: &str, width: usize) -> Vec<WrappedRow> {
    let width = width.max(1);
    let mut rows = Vec::new();
    for (line, content) in text.split('\n').enumerate() {
        let mut start = 0;
        let mut used = 0;
        for (idx, ch) in content.char_indices() {
            let w = ch.width().unwrap_or(0);
            if used + w > width && idx > start {
                rows.push(WrappedRow {
                    line,
                    start,
                    end: idx,
                });
                start = idx;
                used = 0;
            }
            used += w;
        }
        rows.push(WrappedRow {
            line,
            start,
            end: content.len(),
        });
    }
    rows
}

/// Number of rows `text` wraps to.
pub fn row_count(text: &str, width: usize) -> usize {
    wrap_rows(text, width).len()
}

/// Off-screen twin of the source pane: measures text in rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WrapMeasure {
    pub width: usize,
    /// Blank rows above and below the text.
    pub padding: usize,
}

impl Measure for WrapMeasure {
    #[allow(clippy::cast_precision_loss)]
    fn content_height(&mut self, text: &str) -> f64 {
        (row_count(text, self.width) + self.padding * 2) as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_lines_take_one_row_each() {
        let rows = wrap_rows("ab\ncd", 10);
        assert_eq!(
            rows,
            vec![
                WrappedRow { line: 0, start: 0, end: 2 },
                WrappedRow { line: 1, start: 0, end: 2 },
            ]
        );
    }

    #[test]
    fn test_long_line_breaks_at_width() {
        let rows = wrap_rows("abcdefg", 3);
        let spans: Vec<_> = rows.iter().map(|r| (r.start, r.end)).collect();
        assert_eq!(spans, vec![(0, 3), (3, 6), (6, 7)]);
    }

    #[test]
    fn test_trailing_newline_adds_empty_row() {
        assert_eq!(row_count("abc\n", 10), 2);
        assert_eq!(row_count("", 10), 1);
    }

    #[test]
    fn test_wide_characters_count_double() {
        // Each ideograph is two columns wide.
        let rows = wrap_rows("日本語", 4);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].end, "日本".len());
    }

    #[test]
    fn test_character_wider_than_pane_gets_own_row() {
        assert_eq!(row_count("日日", 1), 2);
    }

    #[test]
    fn test_measure_adds_padding_rows() {
        let mut measure = WrapMeasure { width: 4, padding: 1 };
        assert_eq!(measure.content_height("abcdef\nx"), 5.0);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn rows_cover_every_line(text in "[a-z \\n]{0,200}", width in 1..40usize) {
                let rows = wrap_rows(&text, width);
                let lines = text.split('\n').count();
                prop_assert_eq!(rows.last().map(|r| r.line + 1), Some(lines));
                for row in &rows {
                    prop_assert!(row.end - row.start <= width);
                }
            }
        }
    }
}
