// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. sync::SyncConfig)
    clippy::module_name_repetitions
)]

//! # Marksync
//!
//! A side-by-side markdown editor for the terminal whose preview follows
//! the source by heading landmarks.
//!
//! - Source and preview panes scroll together, anchored on headings
//! - Proportional fallback for documents outside the activation patterns
//! - Bottom overscroll so the end of the source can reach the top
//! - Coordinates recomputed after debounced re-renders and image loads
//! - File watching for external edits
//!
//! ## Architecture
//!
//! Marksync uses The Elm Architecture (TEA) pattern:
//! - **Model**: Application state
//! - **Message**: Events and actions
//! - **Update**: Pure state transitions
//! - **View**: Render to terminal
//!
//! The scroll-sync core in [`sync`] knows nothing about the terminal; it
//! talks to the panes through the traits in [`sync::pane`].
//!
//! ## Modules
//!
//! - [`app`]: Main application loop and state
//! - [`sync`]: Heading-anchored scroll synchronization
//! - [`document`]: Markdown parsing and preview layout
//! - [`editor`]: Source text buffer
//! - [`ui`]: Terminal UI components
//! - [`image`]: Image dimension probing
//! - [`watcher`]: File watching
//! - [`activation`]: Which documents get heading sync

pub mod activation;
pub mod app;
pub mod config;
pub mod document;
pub mod editor;
pub mod image;
pub mod perf;
pub mod sync;
pub mod ui;
pub mod watcher;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::app::{App, Message, Model};
    pub use crate::document::Document;
    pub use crate::sync::{ScrollSync, SyncConfig};
    pub use crate::ui::viewport::Viewport;
}
