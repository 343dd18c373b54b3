//! Row-based scroll state shared by both panes.

use std::ops::Range;

/// The visible window onto a pane's rows.
///
/// Offsets are whole terminal rows. The sync core works in `f64`; the panes
/// round its targets onto this grid.
///
/// # Example
///
/// ```
/// use marksync::ui::viewport::Viewport;
///
/// let mut vp = Viewport::new(80, 24, 100);
/// assert_eq!(vp.visible_range(), 0..24);
///
/// vp.scroll_down(10);
/// assert_eq!(vp.visible_range(), 10..34);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewport {
    width: u16,
    height: u16,
    offset: usize,
    total_rows: usize,
}

impl Viewport {
    pub const fn new(width: u16, height: u16, total_rows: usize) -> Self {
        Self {
            width,
            height,
            offset: 0,
            total_rows,
        }
    }

    pub const fn offset(&self) -> usize {
        self.offset
    }

    pub const fn width(&self) -> u16 {
        self.width
    }

    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Rows in the scrollable content, padding and margins included.
    pub const fn total_rows(&self) -> usize {
        self.total_rows
    }

    /// Largest offset that still fills the viewport.
    pub const fn max_offset(&self) -> usize {
        self.total_rows.saturating_sub(self.height as usize)
    }

    pub fn visible_range(&self) -> Range<usize> {
        let end = (self.offset + self.height as usize).min(self.total_rows);
        self.offset.min(end)..end
    }

    /// Scroll position as a percentage (0-100). Unscrollable content is at 100.
    pub fn scroll_percent(&self) -> u8 {
        let max_offset = self.max_offset();
        if max_offset == 0 {
            return 100;
        }
        #[allow(
            clippy::cast_precision_loss,
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss
        )]
        {
            (self.offset as f64 / max_offset as f64 * 100.0).round() as u8
        }
    }

    pub const fn scroll_up(&mut self, n: usize) {
        self.offset = self.offset.saturating_sub(n);
    }

    pub fn scroll_down(&mut self, n: usize) {
        self.set_offset(self.offset.saturating_add(n));
    }

    pub const fn page_up(&mut self) {
        self.scroll_up(self.height as usize);
    }

    pub fn page_down(&mut self) {
        self.scroll_down(self.height as usize);
    }

    pub const fn go_to_top(&mut self) {
        self.offset = 0;
    }

    pub const fn go_to_bottom(&mut self) {
        self.offset = self.max_offset();
    }

    /// Move to `offset`, clamped to the scrollable range.
    pub fn set_offset(&mut self, offset: usize) {
        self.offset = offset.min(self.max_offset());
    }

    pub fn go_to_percent(&mut self, percent: u8) {
        let percent = percent.min(100);
        #[allow(
            clippy::cast_precision_loss,
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss
        )]
        let target = (self.max_offset() as f64 * f64::from(percent) / 100.0).round() as usize;
        self.set_offset(target);
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.set_offset(self.offset);
    }

    pub fn set_total_rows(&mut self, total: usize) {
        self.total_rows = total;
        self.set_offset(self.offset);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visible_range_at_bottom() {
        let mut vp = Viewport::new(80, 24, 100);
        vp.go_to_bottom();
        assert_eq!(vp.visible_range(), 76..100);
    }

    #[test]
    fn test_visible_range_with_short_content() {
        let vp = Viewport::new(80, 24, 10);
        assert_eq!(vp.visible_range(), 0..10);
    }

    #[test]
    fn test_scroll_down_clamps_to_max() {
        let mut vp = Viewport::new(80, 24, 100);
        vp.scroll_down(1000);
        assert_eq!(vp.offset(), 76);
    }

    #[test]
    fn test_page_up_from_middle() {
        let mut vp = Viewport::new(80, 24, 100);
        vp.set_offset(50);
        vp.page_up();
        assert_eq!(vp.offset(), 26);
    }

    #[test]
    fn test_go_to_percent_fifty() {
        let mut vp = Viewport::new(80, 24, 100);
        vp.go_to_percent(50);
        assert_eq!(vp.offset(), 38);
        assert_eq!(vp.scroll_percent(), 50);
    }

    #[test]
    fn test_scroll_percent_unscrollable_is_full() {
        assert_eq!(Viewport::new(80, 24, 0).scroll_percent(), 100);
        assert_eq!(Viewport::new(80, 24, 10).scroll_percent(), 100);
    }

    #[test]
    fn test_growing_viewport_pulls_offset_back() {
        let mut vp = Viewport::new(80, 24, 100);
        vp.set_offset(70);
        vp.resize(80, 60);
        assert_eq!(vp.offset(), 40);
    }

    #[test]
    fn test_shrinking_content_pulls_offset_back() {
        let mut vp = Viewport::new(80, 24, 100);
        vp.set_offset(80);
        assert_eq!(vp.offset(), 76);
        vp.set_total_rows(50);
        assert_eq!(vp.offset(), 26);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn offset_never_exceeds_bounds(
                total in 0..10000usize,
                height in 1..100u16,
                offset in 0..20000usize,
            ) {
                let mut vp = Viewport::new(80, height, total);
                vp.set_offset(offset);
                prop_assert!(vp.offset() <= vp.max_offset());
                let range = vp.visible_range();
                prop_assert!(range.start <= range.end && range.end <= total);
                prop_assert!(vp.scroll_percent() <= 100);
            }
        }
    }
}
