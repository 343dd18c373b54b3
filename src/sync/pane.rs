//! Ports through which the core reads and drives the two panes.

/// String attributes attached to a pane.
///
/// The coordinate sequences are cached here so that any code path holding
/// the pane can read them back.
pub trait Dataset {
    fn data(&self, key: &str) -> Option<&str>;
    fn set_data(&mut self, key: &str, value: String);
}

/// Vertical scroll state of a scroll container.
pub trait ScrollMetrics {
    /// Current scroll offset from the top.
    fn scroll_top(&self) -> f64;

    /// Scroll to `offset`. Implementations clamp to `[0, max_scroll_top]`.
    fn set_scroll_top(&mut self, offset: f64);

    /// Full content height including padding.
    fn scroll_height(&self) -> f64;

    /// Height of the visible area.
    fn client_height(&self) -> f64;

    /// Largest offset the container can natively scroll to.
    fn max_scroll_top(&self) -> f64 {
        (self.scroll_height() - self.client_height()).max(0.0)
    }
}

/// Text layout metrics of the source pane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceMetrics {
    /// Height of one line of text.
    pub line_height: f64,
    /// Vertical padding on each side when the pane is at rest.
    pub padding: f64,
}

impl Default for SourceMetrics {
    fn default() -> Self {
        Self {
            line_height: 21.0,
            padding: 10.0,
        }
    }
}

/// The plain-text editing pane.
pub trait SourcePane: ScrollMetrics + Dataset {
    /// The full source text.
    fn text(&self) -> String;

    fn metrics(&self) -> SourceMetrics;

    /// Bottom padding currently applied, `None` while the resting padding
    /// is in effect.
    fn bottom_padding(&self) -> Option<f64>;

    /// Override the bottom padding. Changes `scroll_height` accordingly.
    fn set_bottom_padding(&mut self, padding: f64);
}

/// A heading in the rendered output.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedHeading {
    /// Heading level, 1 to 6.
    pub level: u8,
    /// Plain text of the heading.
    pub title: String,
    /// Offset of the heading from the top of the scroll container.
    pub offset: f64,
}

/// The rendered preview pane.
pub trait RenderPane: ScrollMetrics + Dataset {
    /// Expand every collapsible section so its content takes up space.
    fn open_disclosures(&mut self);

    /// Request every image now instead of when it scrolls into view.
    fn load_images_eagerly(&mut self);

    /// Intrinsic height of each image, 0 while it has not been decoded.
    fn image_natural_heights(&self) -> Vec<f64>;

    /// Headings of levels 1–6 in document order.
    fn headings(&self) -> Vec<RenderedHeading>;

    /// Extra space below the content.
    fn set_bottom_margin(&mut self, margin: f64);
}
