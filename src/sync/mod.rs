//! Heading-anchored scroll synchronization between a source pane and a
//! rendered preview pane.
//!
//! The core never touches a concrete UI. It reads and writes the two panes
//! through the traits in [`pane`] and measures source text through
//! [`source::Measure`]. A host (the terminal app in [`crate::app`], or any
//! other) implements those ports and forwards its events to
//! [`ScrollSync`].
//!
//! - [`source`]: source-side coordinate extraction
//! - [`render`]: render-side coordinate extraction with image settlement
//! - [`mapper`]: piecewise-linear source → render mapping
//! - [`overscroll`]: bottom-padding overscroll illusion
//! - [`controller`]: recomputation triggers and event dispatch
//! - [`events`]: owned event channels with exclusive claims and one-shots

pub mod align;
pub mod controller;
pub mod coords;
pub mod events;
pub mod landmark;
pub mod mapper;
pub mod overscroll;
pub mod pane;
pub mod render;
pub mod source;

mod error;
#[cfg(test)]
pub(crate) mod testing;

pub use align::Alignment;
pub use controller::{ScrollSync, SyncAction, SyncConfig};
pub use coords::{CoordinatePair, CoordinateSequence};
pub use error::SyncError;
pub use events::{Channel, EventHub, ListenerId, Owner};
pub use mapper::{apply_mapping, map_offset};
pub use overscroll::{DeltaMode, OverscrollController, WheelDelta, WheelOutcome};
pub use pane::{Dataset, RenderPane, RenderedHeading, ScrollMetrics, SourceMetrics, SourcePane};
pub use render::{Extracted, RenderExtraction, SettlePolicy};
pub use source::{Measure, SourceLayout, extract_source_layout};
