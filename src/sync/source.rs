//! Source-side coordinate extraction.
//!
//! Wrapping depends on the pane width and the text itself, so heights come
//! from a [`Measure`] implementation that lays text out exactly like the
//! source pane does. The core never estimates heights on its own.

use super::coords::CoordinateSequence;
use super::landmark::split_segments;
use super::pane::SourceMetrics;

/// An off-screen surface sharing the source pane's layout metrics.
pub trait Measure {
    /// Height `text` occupies in the surface, including the surface's own
    /// top and bottom padding.
    fn content_height(&mut self, text: &str) -> f64;
}

impl<M: Measure + ?Sized> Measure for &mut M {
    fn content_height(&mut self, text: &str) -> f64 {
        (**self).content_height(text)
    }
}

/// Source coordinates together with the landmark titles they belong to.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceLayout {
    /// `[0, (0,) end of segment 0, end of segment 1, ..., end of text]`.
    pub coordinates: CoordinateSequence,
    /// One title per landmark, in document order.
    pub landmarks: Vec<String>,
}

/// Measure where every landmark starts in the source pane.
///
/// Offset *i* is the height of segments `0..=i` minus the surface padding,
/// which is the scroll offset at which the following landmark comes into
/// view. A second leading zero is inserted when the text opens with a
/// landmark so that every sequence has `landmarks.len() + 2` entries.
pub fn extract_source_layout(
    text: &str,
    metrics: SourceMetrics,
    surface: &mut impl Measure,
) -> SourceLayout {
    let segments = split_segments(text);
    let mut offsets = Vec::with_capacity(segments.len() + 2);
    offsets.push(0.0);
    if segments.first().is_some_and(|s| s.landmark.is_some()) {
        offsets.push(0.0);
    }

    let mut end = 0;
    for segment in &segments {
        end += segment.text.len();
        let height = surface.content_height(&text[..end]) - metrics.padding * 2.0;
        offsets.push(height.max(0.0));
    }

    let landmarks = segments
        .into_iter()
        .filter_map(|segment| segment.landmark)
        .collect();

    SourceLayout {
        coordinates: CoordinateSequence::new(offsets),
        landmarks,
    }
}
