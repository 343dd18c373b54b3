//! In-memory panes for unit tests.

use std::collections::HashMap;

use super::pane::{
    Dataset, RenderPane, RenderedHeading, ScrollMetrics, SourceMetrics, SourcePane,
};
use super::source::Measure;

pub const METRICS: SourceMetrics = SourceMetrics {
    line_height: 20.0,
    padding: 5.0,
};

/// A source pane whose text never wraps: one row per line.
#[derive(Debug, Clone)]
pub struct FakeSource {
    pub text: String,
    pub client_height: f64,
    pub scroll_top: f64,
    pub bottom_padding: Option<f64>,
    pub attrs: HashMap<String, String>,
}

impl FakeSource {
    pub fn new(text: &str, client_height: f64) -> Self {
        Self {
            text: text.to_string(),
            client_height,
            scroll_top: 0.0,
            bottom_padding: None,
            attrs: HashMap::new(),
        }
    }

    /// `rows` lines of text.
    pub fn with_rows(rows: usize, client_height: f64) -> Self {
        Self::new(&vec!["x"; rows].join("\n"), client_height)
    }

    pub fn push_rows(&mut self, rows: usize) {
        for _ in 0..rows {
            if !self.text.is_empty() {
                self.text.push('\n');
            }
            self.text.push('x');
        }
    }

    fn content_height(&self) -> f64 {
        RowMeasure::rows(&self.text) * METRICS.line_height
    }
}

impl Dataset for FakeSource {
    fn data(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }

    fn set_data(&mut self, key: &str, value: String) {
        self.attrs.insert(key.to_string(), value);
    }
}

impl ScrollMetrics for FakeSource {
    fn scroll_top(&self) -> f64 {
        self.scroll_top
    }

    fn set_scroll_top(&mut self, offset: f64) {
        self.scroll_top = offset.clamp(0.0, self.max_scroll_top());
    }

    fn scroll_height(&self) -> f64 {
        self.content_height() + METRICS.padding + self.bottom_padding.unwrap_or(METRICS.padding)
    }

    fn client_height(&self) -> f64 {
        self.client_height
    }
}

impl SourcePane for FakeSource {
    fn text(&self) -> String {
        self.text.clone()
    }

    fn metrics(&self) -> SourceMetrics {
        METRICS
    }

    fn bottom_padding(&self) -> Option<f64> {
        self.bottom_padding
    }

    fn set_bottom_padding(&mut self, padding: f64) {
        self.bottom_padding = Some(padding);
    }
}

/// Measures one row per `\n`-separated line plus the surface padding.
#[derive(Debug, Default)]
pub struct RowMeasure;

impl RowMeasure {
    pub fn rows(text: &str) -> f64 {
        text.split('\n').count() as f64
    }
}

impl Measure for RowMeasure {
    fn content_height(&mut self, text: &str) -> f64 {
        Self::rows(text) * METRICS.line_height + METRICS.padding * 2.0
    }
}

/// A rendered pane with fixed heading offsets.
#[derive(Debug, Clone, Default)]
pub struct FakeRender {
    pub headings: Vec<RenderedHeading>,
    pub content_height: f64,
    pub client_height: f64,
    pub scroll_top: f64,
    pub bottom_margin: f64,
    pub images: Vec<f64>,
    pub disclosures_open: bool,
    pub eager_images: bool,
    pub attrs: HashMap<String, String>,
}

impl FakeRender {
    pub fn new(headings: &[(&str, f64)], content_height: f64, client_height: f64) -> Self {
        Self {
            headings: headings
                .iter()
                .map(|&(title, offset)| RenderedHeading {
                    level: 1,
                    title: title.to_string(),
                    offset,
                })
                .collect(),
            content_height,
            client_height,
            ..Self::default()
        }
    }
}

impl Dataset for FakeRender {
    fn data(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }

    fn set_data(&mut self, key: &str, value: String) {
        self.attrs.insert(key.to_string(), value);
    }
}

impl ScrollMetrics for FakeRender {
    fn scroll_top(&self) -> f64 {
        self.scroll_top
    }

    fn set_scroll_top(&mut self, offset: f64) {
        self.scroll_top = offset.clamp(0.0, self.max_scroll_top());
    }

    fn scroll_height(&self) -> f64 {
        self.content_height + self.bottom_margin
    }

    fn client_height(&self) -> f64 {
        self.client_height
    }
}

impl RenderPane for FakeRender {
    fn open_disclosures(&mut self) {
        self.disclosures_open = true;
    }

    fn load_images_eagerly(&mut self) {
        self.eager_images = true;
    }

    fn image_natural_heights(&self) -> Vec<f64> {
        self.images.clone()
    }

    fn headings(&self) -> Vec<RenderedHeading> {
        self.headings.clone()
    }

    fn set_bottom_margin(&mut self, margin: f64) {
        self.bottom_margin = margin;
    }
}
