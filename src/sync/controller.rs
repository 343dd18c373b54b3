//! Wiring between host events and the sync core.
//!
//! The host owns an [`EventHub`] whose listener values include
//! [`SyncAction`]s. After emitting a channel it hands each returned action
//! back to the matching [`ScrollSync`] method together with its two panes.

use std::task::Poll;
use std::time::Instant;

use tracing::debug;

use super::align::Alignment;
use super::error::SyncError;
use super::events::{Channel, EventHub, ListenerId, Owner};
use super::mapper::apply_mapping;
use super::overscroll::{OverscrollController, WheelDelta, WheelOutcome};
use super::pane::{RenderPane, SourcePane};
use super::render::{Extracted, RenderExtraction, SettlePolicy};
use super::source::{Measure, extract_source_layout};

/// Tunables for one [`ScrollSync`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncConfig {
    pub settle: SettlePolicy,
    pub alignment: Alignment,
}

/// What a sync listener asks the host to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    /// Source scrolled: [`ScrollSync::on_scroll`].
    MapScroll,
    /// Wheel over the source: [`ScrollSync::on_wheel`].
    Overscroll,
    /// Source text edited: [`ScrollSync::on_input`].
    ReconcileInput,
    /// Content, preview or size changed: [`ScrollSync::on_content_changed`].
    Recompute,
    /// Preview reset its scroll after an edit: [`ScrollSync::on_render_reset`].
    CorrectRender,
}

/// Heading-anchored scroll sync for one source/render pair.
#[derive(Debug)]
pub struct ScrollSync {
    config: SyncConfig,
    overscroll: OverscrollController,
    pending: Vec<RenderExtraction>,
    correction: Option<ListenerId>,
}

impl ScrollSync {
    /// `baseline_padding` is the source pane's natural bottom padding.
    pub fn new(config: SyncConfig, baseline_padding: f64) -> Self {
        Self {
            config,
            overscroll: OverscrollController::new(baseline_padding),
            pending: Vec::new(),
            correction: None,
        }
    }

    pub const fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub const fn overscroll(&self) -> &OverscrollController {
        &self.overscroll
    }

    /// Register the sync listeners and take the source-scroll channel.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::ChannelClaimed`] if the host already claimed one
    /// of the channels for itself.
    pub fn attach<L>(&self, hub: &mut EventHub<L>) -> Result<(), SyncError>
    where
        L: Clone + From<SyncAction>,
    {
        hub.claim(Channel::SourceScroll, Owner::Sync)?;
        for (channel, action) in [
            (Channel::SourceScroll, SyncAction::MapScroll),
            (Channel::SourceWheel, SyncAction::Overscroll),
            (Channel::SourceInput, SyncAction::ReconcileInput),
            (Channel::ContentChanged, SyncAction::Recompute),
        ] {
            hub.subscribe(channel, Owner::Sync, action.into())?;
        }
        debug!("scroll sync attached");
        Ok(())
    }

    /// Re-map the preview after the source scrolled.
    pub fn on_scroll<S, R>(&self, source: &S, render: Option<&mut R>) -> Option<f64>
    where
        S: SourcePane,
        R: RenderPane,
    {
        let Some(render) = render else {
            debug!("no render pane, scroll ignored");
            return None;
        };
        apply_mapping(source, render)
    }

    /// Run the overscroll illusion for a wheel event on the source.
    ///
    /// Growing the padding moves the source to its new bottom, so the
    /// preview is re-mapped as well.
    pub fn on_wheel<S, R>(
        &mut self,
        source: &mut S,
        render: Option<&mut R>,
        delta: WheelDelta,
    ) -> WheelOutcome
    where
        S: SourcePane,
        R: RenderPane,
    {
        let Some(render) = render else {
            return WheelOutcome::Unchanged;
        };
        let outcome = self.overscroll.on_wheel(source, delta);
        if outcome == WheelOutcome::Overscrolled {
            apply_mapping(source, render);
        }
        outcome
    }

    /// Reconcile overscroll after an edit and arm a single preview
    /// correction for the scroll reset the re-render will cause.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::ChannelClaimed`] if the host claimed the
    /// render-scroll channel.
    pub fn on_input<S, R, L>(
        &mut self,
        source: &mut S,
        render: Option<&mut R>,
        hub: &mut EventHub<L>,
    ) -> Result<bool, SyncError>
    where
        S: SourcePane,
        R: RenderPane,
        L: Clone + From<SyncAction>,
    {
        if render.is_none() {
            return Ok(false);
        }
        let shrunk = self.overscroll.on_input(source);
        if self.correction.is_none() {
            let id = hub.once(
                Channel::RenderScroll,
                Owner::Sync,
                SyncAction::CorrectRender.into(),
            )?;
            self.correction = Some(id);
        }
        Ok(shrunk)
    }

    /// The armed correction fired: map once more.
    pub fn on_render_reset<S, R>(&mut self, source: &S, render: Option<&mut R>) -> Option<f64>
    where
        S: SourcePane,
        R: RenderPane,
    {
        self.correction = None;
        apply_mapping(source, render?)
    }

    /// Start a recomputation of both coordinate sequences.
    ///
    /// The source side is measured now. The render side completes here when
    /// its images are already settled, otherwise on a later [`Self::tick`].
    /// Returns whether a new pair was stored.
    pub fn on_content_changed<S, R>(
        &mut self,
        source: &mut S,
        render: Option<&mut R>,
        measure: &mut impl Measure,
        now: Instant,
    ) -> bool
    where
        S: SourcePane,
        R: RenderPane,
    {
        let Some(render) = render else {
            debug!("no render pane, recomputation skipped");
            self.pending.clear();
            return false;
        };
        let layout = extract_source_layout(&source.text(), source.metrics(), measure);
        let extraction = RenderExtraction::begin(
            render,
            layout,
            self.config.alignment,
            self.config.settle,
            now,
        );
        self.pending.push(extraction);
        self.tick(source, Some(render), now)
    }

    /// Poll pending extractions. Returns whether a new pair was stored.
    ///
    /// Extractions are never cancelled; when several finish, the one
    /// started last is stored last and wins.
    pub fn tick<S, R>(&mut self, source: &mut S, render: Option<&mut R>, now: Instant) -> bool
    where
        S: SourcePane,
        R: RenderPane,
    {
        if self.pending.is_empty() {
            return false;
        }
        let Some(render) = render else {
            self.pending.clear();
            return false;
        };
        let mut stored = false;
        let mut still_pending = Vec::with_capacity(self.pending.len());
        for mut extraction in self.pending.drain(..) {
            match extraction.poll(render, now) {
                Poll::Ready(extracted) => {
                    store(&extracted, source, render);
                    stored = true;
                }
                Poll::Pending => still_pending.push(extraction),
            }
        }
        self.pending = still_pending;
        if stored {
            apply_mapping(source, render);
        }
        stored
    }

    /// When [`Self::tick`] should next be called, if anything is pending.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.iter().map(RenderExtraction::next_poll).min()
    }

    pub fn is_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}

fn store(extracted: &Extracted, source: &mut impl SourcePane, render: &mut impl RenderPane) {
    // Stored even when lengths differ; the mapper then refuses the pair
    // instead of using a stale one.
    extracted.source.store(source);
    extracted.render.store(render);
    debug!(
        entries = extracted.render.len(),
        matched = extracted.source.len() == extracted.render.len(),
        settled = extracted.settled,
        "coordinates stored"
    );
}
