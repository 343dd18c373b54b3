//! Application state and main event loop.
//!
//! This module implements The Elm Architecture (TEA):
//! - [`Model`]: The complete application state
//! - [`Message`]: All possible events and actions
//! - [`update`]: State transitions
//! - [`App::run`]: Main event loop with rendering
//!
//! The panes reach the sync core through [`SourceView`] and
//! [`PreviewView`]; pane events go through the model's
//! [`EventHub`](crate::sync::EventHub) as [`HostEvent`]s.

mod effects;
mod event_loop;
mod input;
mod model;
mod panes;
mod update;

pub use model::{HostEvent, Listener, Model, ModelOptions, RENDER_DEBOUNCE, SyncMode, ToastLevel};
pub use panes::{PreviewView, SOURCE_PADDING, SourceView};
pub use update::{Message, WHEEL_LINES, WheelStep, update};

use std::path::PathBuf;

use crate::activation::RoutePatterns;
use crate::sync::SyncConfig;

/// Main application struct that owns the terminal and runs the event loop.
pub struct App {
    file_path: PathBuf,
    watch_enabled: bool,
    preview: bool,
    sync: Option<SyncConfig>,
    routes: RoutePatterns,
}

impl App {
    /// Create a new application for the given file.
    pub fn new(file_path: PathBuf) -> Self {
        Self {
            file_path,
            watch_enabled: false,
            preview: true,
            sync: Some(SyncConfig::default()),
            routes: RoutePatterns::default(),
        }
    }

    /// Enable or disable file watching.
    #[must_use]
    pub const fn with_watch(mut self, enabled: bool) -> Self {
        self.watch_enabled = enabled;
        self
    }

    /// Show or hide the preview at startup.
    #[must_use]
    pub const fn with_preview(mut self, visible: bool) -> Self {
        self.preview = visible;
        self
    }

    /// Heading sync settings; `None` always uses proportional scrolling.
    #[must_use]
    pub const fn with_sync(mut self, config: Option<SyncConfig>) -> Self {
        self.sync = config;
        self
    }

    /// Documents heading sync is activated for.
    #[must_use]
    pub fn with_routes(mut self, routes: RoutePatterns) -> Self {
        self.routes = routes;
        self
    }
}
