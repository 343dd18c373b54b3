//! The two panes as the sync core sees them.
//!
//! Both panes work in whole terminal rows: one source line is one row tall
//! and preview offsets are row indices among the rows currently shown.

use std::collections::HashMap;

use anyhow::Result;
use unicode_width::UnicodeWidthStr;

use crate::document::{Document, RenderedLine, parse_with_layout};
use crate::editor::SourceBuffer;
use crate::sync::{
    Dataset, RenderPane, RenderedHeading, ScrollMetrics, SourceMetrics, SourcePane,
};
use crate::ui::viewport::Viewport;
use crate::ui::wrap::{WrapMeasure, WrappedRow, wrap_rows};

/// Blank rows above and below the source text at rest.
pub const SOURCE_PADDING: usize = 1;

#[allow(clippy::cast_precision_loss)]
fn rows_f64(rows: usize) -> f64 {
    rows as f64
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn rows_usize(value: f64) -> usize {
    value.round().max(0.0) as usize
}

/// The editable markdown pane.
pub struct SourceView {
    buffer: SourceBuffer,
    viewport: Viewport,
    rows: Vec<WrappedRow>,
    bottom_padding: Option<f64>,
    attrs: HashMap<String, String>,
}

impl SourceView {
    pub fn new(text: &str, width: u16, height: u16) -> Self {
        let mut view = Self {
            buffer: SourceBuffer::from_text(text),
            viewport: Viewport::new(width, height, 0),
            rows: Vec::new(),
            bottom_padding: None,
            attrs: HashMap::new(),
        };
        view.rewrap();
        view
    }

    pub const fn buffer(&self) -> &SourceBuffer {
        &self.buffer
    }

    /// Mutable access for edits; call [`Self::rewrap`] afterwards.
    pub const fn buffer_mut(&mut self) -> &mut SourceBuffer {
        &mut self.buffer
    }

    pub const fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub const fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn rows(&self) -> &[WrappedRow] {
        &self.rows
    }

    /// Re-layout after the text or the width changed.
    pub fn rewrap(&mut self) {
        self.rows = wrap_rows(&self.buffer.text(), usize::from(self.viewport.width()));
        self.sync_total_rows();
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.viewport.resize(width, height);
        self.rewrap();
    }

    /// The off-screen surface matching this pane's layout.
    pub fn measure(&self) -> WrapMeasure {
        WrapMeasure {
            width: usize::from(self.viewport.width()),
            padding: SOURCE_PADDING,
        }
    }

    /// Wrapped row holding the cursor.
    pub fn cursor_row(&self) -> usize {
        let (line, col) = self.buffer.cursor_byte_col();
        self.rows
            .iter()
            .rposition(|row| row.line == line && row.start <= col)
            .unwrap_or(0)
    }

    /// Screen position of the cursor relative to the pane, if visible.
    pub fn cursor_screen_pos(&self) -> Option<(u16, u16)> {
        let row_idx = self.cursor_row();
        let virtual_row = row_idx + SOURCE_PADDING;
        if !self.viewport.visible_range().contains(&virtual_row) {
            return None;
        }
        let row = self.rows.get(row_idx)?;
        let (_, col) = self.buffer.cursor_byte_col();
        let line = self.buffer.line_at(row.line)?;
        let before = line.get(row.start.min(line.len())..col.min(line.len()))?;
        let x = u16::try_from(before.width()).ok()?;
        let y = u16::try_from(virtual_row - self.viewport.offset()).ok()?;
        Some((x, y))
    }

    /// Scroll the cursor row into view. Returns whether the offset moved.
    pub fn ensure_cursor_visible(&mut self) -> bool {
        let virtual_row = self.cursor_row() + SOURCE_PADDING;
        let before = self.viewport.offset();
        let height = usize::from(self.viewport.height()).max(1);
        if virtual_row < before {
            self.viewport.set_offset(virtual_row);
        } else if virtual_row >= before + height {
            self.viewport.set_offset(virtual_row + 1 - height);
        }
        self.viewport.offset() != before
    }

    /// Text of virtual row `idx`; `None` for padding rows.
    pub fn row_text(&self, idx: usize) -> Option<String> {
        let row = self.rows.get(idx.checked_sub(SOURCE_PADDING)?)?;
        let line = self.buffer.line_at(row.line)?;
        line.get(row.start.min(line.len())..row.end.min(line.len()))
            .map(str::to_string)
    }

    fn sync_total_rows(&mut self) {
        let bottom = self
            .bottom_padding
            .map_or(SOURCE_PADDING, rows_usize);
        self.viewport
            .set_total_rows(SOURCE_PADDING + self.rows.len() + bottom);
    }
}

impl Dataset for SourceView {
    fn data(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }

    fn set_data(&mut self, key: &str, value: String) {
        self.attrs.insert(key.to_string(), value);
    }
}

impl ScrollMetrics for SourceView {
    fn scroll_top(&self) -> f64 {
        rows_f64(self.viewport.offset())
    }

    fn set_scroll_top(&mut self, offset: f64) {
        self.viewport.set_offset(rows_usize(offset));
    }

    fn scroll_height(&self) -> f64 {
        let bottom = self
            .bottom_padding
            .unwrap_or_else(|| rows_f64(SOURCE_PADDING));
        rows_f64(SOURCE_PADDING + self.rows.len()) + bottom
    }

    fn client_height(&self) -> f64 {
        f64::from(self.viewport.height())
    }
}

impl SourcePane for SourceView {
    fn text(&self) -> String {
        self.buffer.text()
    }

    fn metrics(&self) -> SourceMetrics {
        SourceMetrics {
            line_height: 1.0,
            padding: rows_f64(SOURCE_PADDING),
        }
    }

    fn bottom_padding(&self) -> Option<f64> {
        self.bottom_padding
    }

    fn set_bottom_padding(&mut self, padding: f64) {
        self.bottom_padding = Some(padding);
        self.sync_total_rows();
    }
}

/// The rendered preview pane.
pub struct PreviewView {
    document: Document,
    viewport: Viewport,
    /// Open state per disclosure of `document`.
    open: Vec<bool>,
    /// Indices of the document lines currently shown.
    visible: Vec<usize>,
    image_sizes: HashMap<String, Option<(u32, u32)>>,
    eager_images: bool,
    bottom_margin: usize,
    attrs: HashMap<String, String>,
}

impl PreviewView {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            document: Document::empty(),
            viewport: Viewport::new(width, height, 0),
            open: Vec::new(),
            visible: Vec::new(),
            image_sizes: HashMap::new(),
            eager_images: false,
            bottom_margin: 0,
            attrs: HashMap::new(),
        }
    }

    pub const fn document(&self) -> &Document {
        &self.document
    }

    pub const fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub const fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub const fn eager_images(&self) -> bool {
        self.eager_images
    }

    /// Replace the output with a fresh rendering of `source`.
    ///
    /// Like replacing a page's content: disclosures fall back to their
    /// initial state, images to lazy loading and the scroll offset to 0.
    ///
    /// # Errors
    /// Returns an error if the markdown cannot be laid out.
    pub fn render(&mut self, source: &str) -> Result<()> {
        let _scope = crate::perf::scope("preview.render");
        self.document = parse_with_layout(source, self.viewport.width(), &self.image_rows())?;
        self.open = self.document.initial_open_state();
        self.eager_images = false;
        self.refresh_visible();
        self.viewport.set_offset(0);
        Ok(())
    }

    /// Lay the current document out again, keeping the scroll offset and
    /// open disclosures. Used when the width or an image size changed.
    ///
    /// # Errors
    /// Returns an error if the markdown cannot be laid out.
    pub fn reflow(&mut self) -> Result<()> {
        let _scope = crate::perf::scope("preview.reflow");
        let source = self.document.source().to_string();
        let document = parse_with_layout(&source, self.viewport.width(), &self.image_rows())?;
        if document.disclosures().len() != self.open.len() {
            self.open = document.initial_open_state();
        }
        self.document = document;
        self.refresh_visible();
        Ok(())
    }

    /// # Errors
    /// Returns an error if the markdown cannot be laid out.
    pub fn resize(&mut self, width: u16, height: u16) -> Result<()> {
        let reflow = width != self.viewport.width();
        self.viewport.resize(width, height);
        if reflow { self.reflow() } else { Ok(()) }
    }

    /// Record a probe result. Returns whether the layout must change.
    pub fn set_image_size(&mut self, src: &str, dimensions: Option<(u32, u32)>) -> bool {
        let previous = self.image_sizes.insert(src.to_string(), dimensions);
        previous != Some(dimensions)
            && dimensions.is_some()
            && self.document.images().iter().any(|image| image.src == src)
    }

    /// Flip disclosure `idx`. Returns false if there is no such disclosure.
    pub fn toggle_disclosure(&mut self, idx: usize) -> bool {
        let Some(open) = self.open.get_mut(idx) else {
            return false;
        };
        *open = !*open;
        self.refresh_visible();
        true
    }

    pub fn is_open(&self, idx: usize) -> bool {
        self.open.get(idx).copied().unwrap_or(false)
    }

    /// Document line shown at pane row `row` (0 is the top of the pane).
    pub fn line_at_row(&self, row: usize) -> Option<&RenderedLine> {
        let idx = *self.visible.get(self.viewport.offset() + row)?;
        self.document.line_at(idx)
    }

    /// Image sources to probe: all of them once eager loading was
    /// requested, otherwise those within `overscan` rows of the view.
    pub fn wanted_images(&self, overscan: usize) -> Vec<String> {
        let range = self.viewport.visible_range();
        let lo = range.start.saturating_sub(overscan);
        let hi = range.end + overscan;
        let mut wanted: Vec<String> = Vec::new();
        for image in self.document.images() {
            let shown_at = self
                .visible
                .iter()
                .position(|&line| line == image.line_range.start);
            let near = shown_at.is_some_and(|row| (lo..hi).contains(&row));
            if (self.eager_images || near) && !wanted.contains(&image.src) {
                wanted.push(image.src.clone());
            }
        }
        wanted
    }

    fn image_rows(&self) -> HashMap<String, usize> {
        let width = self.viewport.width();
        self.image_sizes
            .iter()
            .filter_map(|(src, dims)| dims.map(|d| (src.clone(), crate::image::rows_for(d, width))))
            .collect()
    }

    fn refresh_visible(&mut self) {
        self.visible = self.document.visible_lines(&self.open);
        self.viewport
            .set_total_rows(self.visible.len() + self.bottom_margin);
    }
}

impl Dataset for PreviewView {
    fn data(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }

    fn set_data(&mut self, key: &str, value: String) {
        self.attrs.insert(key.to_string(), value);
    }
}

impl ScrollMetrics for PreviewView {
    fn scroll_top(&self) -> f64 {
        rows_f64(self.viewport.offset())
    }

    fn set_scroll_top(&mut self, offset: f64) {
        self.viewport.set_offset(rows_usize(offset));
    }

    fn scroll_height(&self) -> f64 {
        rows_f64(self.visible.len() + self.bottom_margin)
    }

    fn client_height(&self) -> f64 {
        f64::from(self.viewport.height())
    }
}

impl RenderPane for PreviewView {
    fn open_disclosures(&mut self) {
        if self.open.iter().all(|&open| open) {
            return;
        }
        self.open.fill(true);
        self.refresh_visible();
    }

    fn load_images_eagerly(&mut self) {
        self.eager_images = true;
    }

    fn image_natural_heights(&self) -> Vec<f64> {
        let width = self.viewport.width();
        self.document
            .images()
            .iter()
            .map(|image| match self.image_sizes.get(&image.src) {
                Some(Some(dims)) => rows_f64(crate::image::rows_for(*dims, width)),
                _ => 0.0,
            })
            .collect()
    }

    fn headings(&self) -> Vec<RenderedHeading> {
        self.document
            .headings()
            .iter()
            .filter_map(|heading| {
                let row = self.visible.iter().position(|&line| line == heading.line)?;
                Some(RenderedHeading {
                    level: heading.level,
                    title: heading.text.clone(),
                    offset: rows_f64(row),
                })
            })
            .collect()
    }

    fn set_bottom_margin(&mut self, margin: f64) {
        self.bottom_margin = rows_usize(margin);
        self.refresh_visible();
    }
}
