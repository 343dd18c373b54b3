use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use ratatui::layout::Rect;
use tracing::debug;

use crate::editor::SourceBuffer;
use crate::image::ImageLoader;
use crate::sync::{
    Channel, EventHub, Owner, ScrollSync, SourcePane, SyncAction, SyncConfig, WheelDelta,
    WheelOutcome,
};
use crate::ui::{PaneAreas, pane_areas};

use super::panes::{PreviewView, SourceView};

/// Quiet time after the last edit before the preview re-renders.
pub const RENDER_DEBOUNCE: Duration = Duration::from_millis(150);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
struct Toast {
    level: ToastLevel,
    message: String,
    expires_at: Instant,
}

/// What the host runs when a channel fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Listener {
    Sync(SyncAction),
    /// Scroll the preview to the source's scroll percentage.
    Proportional,
}

impl From<SyncAction> for Listener {
    fn from(action: SyncAction) -> Self {
        Self::Sync(action)
    }
}

/// Something that happened to one of the panes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostEvent {
    Scroll,
    /// Wheel over the source, before it scrolls natively.
    Wheel(WheelDelta),
    Input,
    RenderScroll,
    ContentChanged,
}

impl HostEvent {
    pub const fn channel(self) -> Channel {
        match self {
            Self::Scroll => Channel::SourceScroll,
            Self::Wheel(_) => Channel::SourceWheel,
            Self::Input => Channel::SourceInput,
            Self::RenderScroll => Channel::RenderScroll,
            Self::ContentChanged => Channel::ContentChanged,
        }
    }
}

/// How the preview follows the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    Headings,
    Proportional,
    Off,
}

/// Startup choices for a [`Model`].
#[derive(Debug, Clone, Default)]
pub struct ModelOptions {
    pub preview: bool,
    /// Heading sync settings; `None` leaves the proportional fallback.
    pub sync: Option<SyncConfig>,
}

/// The complete application state.
pub struct Model {
    pub source: SourceView,
    /// `None` while the preview is hidden.
    pub preview: Option<PreviewView>,
    pub sync: Option<ScrollSync>,
    pub hub: EventHub<Listener>,
    pub images: ImageLoader,
    pub file_path: PathBuf,
    pub terminal_size: (u16, u16),
    /// When the preview is due to re-render after edits.
    pub render_due: Option<Instant>,
    /// Time of the event being handled.
    pub clock: Instant,
    pub watch_enabled: bool,
    pub should_quit: bool,
    pub quit_confirmed: bool,
    toast: Option<Toast>,
    /// Something visible changed since the last draw.
    redraw: bool,
}

impl Model {
    /// Build the model and render the preview for the first time.
    pub fn new(
        file_path: PathBuf,
        text: &str,
        terminal_size: (u16, u16),
        options: ModelOptions,
    ) -> Self {
        let areas = pane_areas(
            Rect::new(0, 0, terminal_size.0, terminal_size.1),
            options.preview,
        );
        let base_dir = file_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        let mut model = Self {
            source: SourceView::new(text, areas.source.width, areas.source.height),
            preview: None,
            sync: None,
            hub: EventHub::new(),
            images: ImageLoader::new(base_dir),
            file_path,
            terminal_size,
            render_due: None,
            clock: Instant::now(),
            watch_enabled: false,
            should_quit: false,
            quit_confirmed: false,
            toast: None,
            redraw: true,
        };

        if let Some(config) = options.sync {
            let sync = ScrollSync::new(config, model.source.metrics().padding);
            match sync.attach(&mut model.hub) {
                Ok(()) => model.sync = Some(sync),
                Err(err) => debug!(%err, "heading sync not attached"),
            }
        }
        if let Err(err) = model
            .hub
            .subscribe(Channel::SourceScroll, Owner::Host("proportional"), Listener::Proportional)
        {
            debug!(%err, "proportional scrolling refused");
        }

        if let Some(area) = areas.preview {
            model.preview = Some(model.new_preview(area));
            model.emit(HostEvent::ContentChanged);
        }
        model
    }

    pub fn sync_mode(&self) -> SyncMode {
        if self.sync.is_some() {
            SyncMode::Headings
        } else if self.hub.listener_count(Channel::SourceScroll) > 0 {
            SyncMode::Proportional
        } else {
            SyncMode::Off
        }
    }

    pub fn areas(&self) -> PaneAreas {
        pane_areas(
            Rect::new(0, 0, self.terminal_size.0, self.terminal_size.1),
            self.preview.is_some(),
        )
    }

    /// Forward `event` to its channel's listeners.
    ///
    /// Returns true when a listener consumed a wheel event, in which case
    /// the source must not scroll natively.
    pub fn emit(&mut self, event: HostEvent) -> bool {
        let mut consumed = false;
        for listener in self.hub.emit(event.channel()) {
            consumed |= self.dispatch(listener, event);
        }
        self.redraw = true;
        self.request_images();
        consumed
    }

    fn dispatch(&mut self, listener: Listener, event: HostEvent) -> bool {
        match listener {
            Listener::Proportional => {
                if let Some(preview) = self.preview.as_mut() {
                    let percent = self.source.viewport().scroll_percent();
                    preview.viewport_mut().go_to_percent(percent);
                }
                false
            }
            Listener::Sync(action) => self.run_sync(action, event),
        }
    }

    fn run_sync(&mut self, action: SyncAction, event: HostEvent) -> bool {
        let Some(sync) = self.sync.as_mut() else {
            return false;
        };
        let source = &mut self.source;
        let preview = self.preview.as_mut();
        match action {
            SyncAction::MapScroll => {
                sync.on_scroll(&*source, preview);
                false
            }
            SyncAction::Overscroll => {
                let HostEvent::Wheel(delta) = event else {
                    return false;
                };
                sync.on_wheel(source, preview, delta) == WheelOutcome::Overscrolled
            }
            SyncAction::ReconcileInput => {
                if let Err(err) = sync.on_input(source, preview, &mut self.hub) {
                    debug!(%err, "render correction not armed");
                }
                false
            }
            SyncAction::Recompute => {
                let mut measure = source.measure();
                sync.on_content_changed(source, preview, &mut measure, self.clock);
                false
            }
            SyncAction::CorrectRender => {
                sync.on_render_reset(&*source, preview);
                false
            }
        }
    }

    /// Apply `edit` to the source buffer. `edit` returns whether the text
    /// changed; cursor-only moves just keep the cursor in view.
    pub(super) fn edit_source(&mut self, edit: impl FnOnce(&mut SourceBuffer) -> bool) {
        let changed = edit(self.source.buffer_mut());
        if changed {
            self.source.rewrap();
            self.quit_confirmed = false;
        }
        if self.source.ensure_cursor_visible() {
            self.emit(HostEvent::Scroll);
        }
        if changed {
            self.emit(HostEvent::Input);
            self.schedule_render();
        }
    }

    /// Scroll the source natively by `rows` (negative is up).
    pub(super) fn scroll_source(&mut self, rows: isize) {
        let viewport = self.source.viewport_mut();
        let before = viewport.offset();
        if rows < 0 {
            viewport.scroll_up(rows.unsigned_abs());
        } else {
            viewport.scroll_down(rows.unsigned_abs());
        }
        if viewport.offset() != before {
            self.emit(HostEvent::Scroll);
        }
    }

    /// Scroll the preview on the user's behalf.
    ///
    /// Not a render-scroll event: that channel carries the reset a
    /// re-render causes, and an armed correction must survive until then.
    pub(super) fn scroll_preview(&mut self, rows: isize) {
        let Some(preview) = self.preview.as_mut() else {
            return;
        };
        let viewport = preview.viewport_mut();
        if rows < 0 {
            viewport.scroll_up(rows.unsigned_abs());
        } else {
            viewport.scroll_down(rows.unsigned_abs());
        }
        self.redraw = true;
        self.request_images();
    }

    pub(super) fn schedule_render(&mut self) {
        self.render_due = Some(self.clock + RENDER_DEBOUNCE);
    }

    /// Re-render the preview from the current source.
    pub(super) fn rerender(&mut self) {
        self.render_due = None;
        let text = self.source.buffer().text();
        let Some(preview) = self.preview.as_mut() else {
            return;
        };
        if let Err(err) = preview.render(&text) {
            self.show_toast(ToastLevel::Error, format!("Render failed: {err}"));
            return;
        }
        self.emit(HostEvent::ContentChanged);
        self.emit(HostEvent::RenderScroll);
    }

    /// Drain image probes, run a due re-render and poll the sync core.
    pub(super) fn tick(&mut self) {
        let mut relayout = false;
        for probe in self.images.drain() {
            crate::perf::log_event(
                "image.probed",
                format!("src={} dims={:?}", probe.src, probe.dimensions),
            );
            if let Some(preview) = self.preview.as_mut() {
                relayout |= preview.set_image_size(&probe.src, probe.dimensions);
            }
        }
        if relayout {
            self.reflow_preview();
        }

        if self.render_due.is_some_and(|due| due <= self.clock) {
            self.rerender();
        }

        let stored = self.sync.as_mut().is_some_and(|sync| {
            sync.tick(&mut self.source, self.preview.as_mut(), self.clock)
        });
        if stored {
            self.redraw = true;
            self.request_images();
        }
    }

    /// Whether a draw is due, clearing the flag.
    pub(super) const fn take_redraw(&mut self) -> bool {
        std::mem::replace(&mut self.redraw, false)
    }

    /// Earliest time [`Self::tick`] has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        let sync = self.sync.as_ref().and_then(ScrollSync::next_deadline);
        match (self.render_due, sync) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub(super) fn reflow_preview(&mut self) {
        let Some(preview) = self.preview.as_mut() else {
            return;
        };
        if let Err(err) = preview.reflow() {
            self.show_toast(ToastLevel::Error, format!("Layout failed: {err}"));
            return;
        }
        self.emit(HostEvent::ContentChanged);
    }

    pub(super) fn toggle_disclosure_at(&mut self, row: usize) {
        let Some(preview) = self.preview.as_mut() else {
            return;
        };
        let Some(line) = preview.line_at_row(row) else {
            return;
        };
        if let crate::document::LineType::Summary(idx) = *line.line_type()
            && preview.toggle_disclosure(idx)
        {
            self.emit(HostEvent::ContentChanged);
        }
    }

    pub(super) fn toggle_preview(&mut self) {
        if self.preview.take().is_some() {
            self.apply_layout();
            self.show_toast(ToastLevel::Info, "Preview hidden");
        } else if let Some(area) = pane_areas(
            Rect::new(0, 0, self.terminal_size.0, self.terminal_size.1),
            true,
        )
        .preview
        {
            self.preview = Some(self.new_preview(area));
            self.apply_layout();
        }
    }

    pub(super) fn resize(&mut self, width: u16, height: u16) {
        self.terminal_size = (width, height);
        self.apply_layout();
    }

    /// Fit both panes to the current terminal size; a content change.
    fn apply_layout(&mut self) {
        let areas = self.areas();
        self.source
            .resize(areas.source.width, areas.source.height);
        let resized = match (self.preview.as_mut(), areas.preview) {
            (Some(preview), Some(area)) => preview.resize(area.width, area.height),
            _ => Ok(()),
        };
        if let Err(err) = resized {
            self.show_toast(ToastLevel::Error, format!("Layout failed: {err}"));
        }
        self.emit(HostEvent::ContentChanged);
    }

    fn new_preview(&mut self, area: Rect) -> PreviewView {
        let mut preview = PreviewView::new(area.width, area.height);
        for (src, dimensions) in self.images.probed() {
            preview.set_image_size(src, dimensions);
        }
        if let Err(err) = preview.render(&self.source.buffer().text()) {
            self.show_toast(ToastLevel::Error, format!("Render failed: {err}"));
        }
        preview
    }

    /// Start probes for the images the preview wants.
    fn request_images(&mut self) {
        let Some(preview) = self.preview.as_ref() else {
            return;
        };
        let overscan = usize::from(preview.viewport().height());
        for src in preview.wanted_images(overscan) {
            if self.images.request(&src) {
                crate::perf::log_event("image.request", format!("src={src}"));
            }
        }
    }

    /// Take the text of the file on disk, unless there are unsaved edits.
    pub(super) fn reload_text(&mut self, text: &str) {
        if self.source.buffer().is_dirty() {
            self.show_toast(
                ToastLevel::Warning,
                "File changed on disk; keeping unsaved edits",
            );
            return;
        }
        if self.source.buffer().text() == text {
            return;
        }
        self.source.buffer_mut().replace(text);
        self.source.rewrap();
        self.emit(HostEvent::Input);
        self.schedule_render();
        self.show_toast(ToastLevel::Info, "Reloaded");
    }

    pub(super) fn show_toast(&mut self, level: ToastLevel, message: impl Into<String>) {
        self.toast = Some(Toast {
            level,
            message: message.into(),
            expires_at: self.clock + Duration::from_secs(4),
        });
    }

    pub(super) fn expire_toast(&mut self, now: Instant) -> bool {
        if self
            .toast
            .as_ref()
            .is_some_and(|toast| toast.expires_at <= now)
        {
            self.toast = None;
            return true;
        }
        false
    }

    pub fn active_toast(&self) -> Option<(&str, ToastLevel)> {
        self.toast
            .as_ref()
            .map(|toast| (toast.message.as_str(), toast.level))
    }
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("file_path", &self.file_path)
            .field("terminal_size", &self.terminal_size)
            .field("preview", &self.preview.is_some())
            .field("sync_mode", &self.sync_mode())
            .field("render_due", &self.render_due)
            .finish_non_exhaustive()
    }
}

// Implement Default for Model to allow std::mem::take
impl Default for Model {
    fn default() -> Self {
        Self {
            source: SourceView::new("", 80, 23),
            preview: None,
            sync: None,
            hub: EventHub::new(),
            images: ImageLoader::new(PathBuf::from(".")),
            file_path: PathBuf::new(),
            terminal_size: (80, 24),
            render_due: None,
            clock: Instant::now(),
            watch_enabled: false,
            should_quit: false,
            quit_confirmed: false,
            toast: None,
            redraw: true,
        }
    }
}
