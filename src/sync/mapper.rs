//! Source offset → render offset.

use tracing::trace;

use super::coords::CoordinatePair;
use super::pane::{Dataset, ScrollMetrics};

/// Map a source-pane scroll offset to the matching render-pane offset.
///
/// Between two landmarks the mapping is linear; at or above the start it
/// pins to 0 and at or past the last boundary it pins to the render end
/// sentinel. Returns `None` when the sequences are unusable (fewer than 2
/// entries or different lengths).
pub fn map_offset(source: &[f64], render: &[f64], current: f64) -> Option<f64> {
    if source.len() != render.len() || source.len() < 2 {
        return None;
    }
    if current <= source[0] {
        return Some(0.0);
    }

    let last = source.len() - 1;
    let i = source.iter().rposition(|&x| x <= current).unwrap_or(0);
    if i == last {
        return Some(render[last]);
    }

    let span = source[i + 1] - source[i];
    if span <= 0.0 {
        // Two landmarks measured at the same height.
        return Some(render[i + 1]);
    }
    Some(render[i] + (render[i + 1] - render[i]) / span * (current - source[i]))
}

/// Scroll `render` to the position matching `source`, using the coordinate
/// sequences cached on both panes.
///
/// Leaves `render` untouched and returns `None` while the cached pair is
/// missing or invalid.
pub fn apply_mapping<S, R>(source: &S, render: &mut R) -> Option<f64>
where
    S: ScrollMetrics + Dataset,
    R: ScrollMetrics + Dataset,
{
    let pair = CoordinatePair::load(source, render)?;
    let current = source.scroll_top();
    let target = map_offset(
        pair.source().as_slice(),
        pair.render().as_slice(),
        current,
    )?;
    trace!(current, target, "mapped source scroll");
    render.set_scroll_top(target);
    Some(target)
}
