//! Terminal UI components.
//!
//! This module contains all UI-related code including:
//! - [`viewport`]: Scroll position and visible range management
//! - [`wrap`]: Source-pane wrapping shared with the sync measurement
//! - [`style`]: Theming and colors

pub mod style;
pub mod viewport;
pub mod wrap;

mod render;
mod status;

pub use render::{PaneAreas, pane_areas, render};

#[cfg(test)]
mod tests;
