//! Render-side coordinate extraction.
//!
//! Heading offsets in the preview are only final once every image has its
//! real height, and there is no single completion signal covering every
//! image state. Extraction therefore polls: [`RenderExtraction::poll`] is
//! called from the host's event loop and returns [`Poll::Pending`] until the
//! images settle or the deadline passes.

use std::task::Poll;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use super::align::Alignment;
use super::coords::CoordinateSequence;
use super::pane::RenderPane;
use super::source::SourceLayout;

/// How long and how often to wait for images.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettlePolicy {
    pub poll_interval: Duration,
    /// Give up waiting after this long and use the current layout. `None`
    /// waits forever.
    pub deadline: Option<Duration>,
}

impl Default for SettlePolicy {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(10),
            deadline: Some(Duration::from_millis(2000)),
        }
    }
}

/// A finished extraction: both sequences of one recomputation.
#[derive(Debug, Clone, PartialEq)]
pub struct Extracted {
    pub source: CoordinateSequence,
    pub render: CoordinateSequence,
    /// `false` when the deadline cut the image wait short.
    pub settled: bool,
}

/// One in-flight render-side extraction.
#[derive(Debug, Clone)]
pub struct RenderExtraction {
    source: SourceLayout,
    alignment: Alignment,
    policy: SettlePolicy,
    started: Instant,
    next_poll: Instant,
}

impl RenderExtraction {
    /// Prepare the pane for measuring and start waiting.
    ///
    /// Opens every disclosure and requests every image so that the final
    /// layout can be observed. `source` is the source side measured for the
    /// same content.
    pub fn begin(
        pane: &mut impl RenderPane,
        source: SourceLayout,
        alignment: Alignment,
        policy: SettlePolicy,
        now: Instant,
    ) -> Self {
        pane.open_disclosures();
        pane.load_images_eagerly();
        Self {
            source,
            alignment,
            policy,
            started: now,
            next_poll: now,
        }
    }

    /// Earliest instant at which polling can make progress.
    pub const fn next_poll(&self) -> Instant {
        self.next_poll
    }

    /// Check the images and, once they settle, read the headings.
    ///
    /// Also gives the pane a bottom margin of one viewport so its last
    /// heading can be scrolled to the top; the end sentinel is the total
    /// scroll height with that margin in place.
    pub fn poll(&mut self, pane: &mut impl RenderPane, now: Instant) -> Poll<Extracted> {
        if now < self.next_poll {
            return Poll::Pending;
        }

        let settled = images_settled(pane);
        if !settled {
            let expired = self
                .policy
                .deadline
                .is_some_and(|deadline| now.duration_since(self.started) >= deadline);
            if !expired {
                self.next_poll = now + self.policy.poll_interval;
                return Poll::Pending;
            }
            warn!(
                waited_ms = now.duration_since(self.started).as_millis(),
                "images did not settle before the deadline, using current layout"
            );
        }

        pane.set_bottom_margin(pane.client_height());
        let headings = pane.headings();
        let trailing = pane.scroll_height();
        let (source, render) = self.alignment.align(&self.source, &headings, trailing);
        debug!(
            headings = headings.len(),
            landmarks = self.source.landmarks.len(),
            mapped = render.len().saturating_sub(2),
            settled,
            "render coordinates extracted"
        );
        Poll::Ready(Extracted {
            source,
            render,
            settled,
        })
    }
}

/// Whether every image reports a natural height.
pub fn images_settled(pane: &impl RenderPane) -> bool {
    pane.image_natural_heights().iter().all(|&height| height > 0.0)
}
