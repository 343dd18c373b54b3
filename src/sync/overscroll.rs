//! The overscroll illusion.
//!
//! A source pane stops scrolling once its last line reaches the bottom of
//! the viewport, but the last heading is usually far from the top at that
//! point while the preview can still scroll on. Wheeling past the native
//! limit grows the pane's bottom padding instead, so the user can keep
//! scrolling until the last heading sits where they want it.

use super::pane::SourcePane;

/// Scroll offsets closer than this to the maximum count as the bottom.
const BOTTOM_TOLERANCE: f64 = 0.5;

/// Unit of a wheel delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeltaMode {
    Pixel,
    Line,
    Page,
}

/// Vertical wheel input. Positive values scroll down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelDelta {
    pub mode: DeltaMode,
    pub delta_y: f64,
}

impl WheelDelta {
    pub const fn pixels(delta_y: f64) -> Self {
        Self {
            mode: DeltaMode::Pixel,
            delta_y,
        }
    }

    pub const fn lines(delta_y: f64) -> Self {
        Self {
            mode: DeltaMode::Line,
            delta_y,
        }
    }

    pub const fn pages(delta_y: f64) -> Self {
        Self {
            mode: DeltaMode::Page,
            delta_y,
        }
    }

    /// The delta in the pane's length unit.
    ///
    /// A page is one full viewport in the direction of the delta.
    pub fn normalized(self, line_height: f64, client_height: f64) -> f64 {
        match self.mode {
            DeltaMode::Pixel => self.delta_y,
            DeltaMode::Line => self.delta_y * line_height,
            DeltaMode::Page if self.delta_y == 0.0 => 0.0,
            DeltaMode::Page => client_height.copysign(self.delta_y),
        }
    }
}

/// What a wheel event did to the padding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelOutcome {
    /// Padding changed at the bottom and the pane was re-pinned to its new
    /// maximum. The host must not also scroll natively.
    Overscrolled,
    /// Padding snapped back to baseline away from the bottom.
    Reset,
    Unchanged,
}

/// Owner of the source pane's simulated bottom padding.
#[derive(Debug, Clone, PartialEq)]
pub struct OverscrollController {
    baseline: f64,
    padding: f64,
}

impl OverscrollController {
    /// Start at rest with the pane's natural bottom padding.
    pub const fn new(baseline: f64) -> Self {
        Self {
            baseline,
            padding: baseline,
        }
    }

    pub const fn baseline(&self) -> f64 {
        self.baseline
    }

    /// Current bottom padding.
    pub const fn padding(&self) -> f64 {
        self.padding
    }

    /// Padding above baseline.
    pub fn excess(&self) -> f64 {
        self.padding - self.baseline
    }

    /// Handle a wheel event on the source pane, before any native scroll.
    pub fn on_wheel(&mut self, pane: &mut impl SourcePane, delta: WheelDelta) -> WheelOutcome {
        if !is_at_bottom(pane) {
            if self.padding == self.baseline {
                return WheelOutcome::Unchanged;
            }
            self.apply(pane, self.baseline);
            return WheelOutcome::Reset;
        }

        let client_height = pane.client_height();
        let delta_y = delta.normalized(pane.metrics().line_height, client_height);
        let grown = self.padding + delta_y;
        if delta_y >= 0.0 && grown >= client_height {
            return WheelOutcome::Unchanged;
        }

        let next = grown.max(self.baseline);
        if next == self.padding {
            return WheelOutcome::Unchanged;
        }
        self.apply(pane, next);
        pane.set_scroll_top(pane.max_scroll_top());
        WheelOutcome::Overscrolled
    }

    /// Give back padding that freshly typed text now occupies.
    ///
    /// Called after every edit. Returns whether the padding changed.
    pub fn on_input(&mut self, pane: &mut impl SourcePane) -> bool {
        if self.padding <= self.baseline {
            return false;
        }
        // Negative by however far the true content bottom moved down.
        let grown = (pane.scroll_top() - pane.scroll_height() + pane.client_height()).min(0.0);
        let next = (self.padding + grown).max(self.baseline);
        if next == self.padding {
            return false;
        }
        self.apply(pane, next);
        true
    }

    fn apply(&mut self, pane: &mut impl SourcePane, padding: f64) {
        self.padding = padding;
        pane.set_bottom_padding(padding);
    }
}

fn is_at_bottom(pane: &impl SourcePane) -> bool {
    (pane.max_scroll_top() - pane.scroll_top()).abs() < BOTTOM_TOLERANCE
}
