use crate::app::{Model, ToastLevel};
use crate::editor::Direction;
use crate::sync::WheelDelta;

/// Rows one wheel notch scrolls.
pub const WHEEL_LINES: usize = 3;

/// One wheel notch. Shift turns it into a page step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelStep {
    Up,
    Down,
    PageUp,
    PageDown,
}

impl WheelStep {
    /// The wheel delta the sync core sees for this notch.
    #[allow(clippy::cast_precision_loss)]
    pub fn delta(self) -> WheelDelta {
        match self {
            Self::Up => WheelDelta::lines(-(WHEEL_LINES as f64)),
            Self::Down => WheelDelta::lines(WHEEL_LINES as f64),
            Self::PageUp => WheelDelta::pages(-1.0),
            Self::PageDown => WheelDelta::pages(1.0),
        }
    }
}

/// All possible events and actions in the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    // Editing
    /// Insert a character at the cursor
    InsertChar(char),
    InsertNewline,
    DeleteBack,
    DeleteForward,

    // Cursor
    MoveCursor(Direction),
    LineStart,
    LineEnd,
    DocumentStart,
    DocumentEnd,

    // Scrolling
    /// Scroll the source one page up
    PageUp,
    /// Scroll the source one page down
    PageDown,
    /// Wheel over the source pane
    WheelSource(WheelStep),
    /// Wheel over the preview pane
    WheelPreview(WheelStep),
    /// Left click on preview row n (pane-relative)
    ClickPreview(usize),

    // Application
    TogglePreview,
    /// Write the buffer to disk (handled as a side effect)
    Save,
    Quit,
    /// The file changed on disk (handled as a side effect)
    FileChanged,
    Resize(u16, u16),
    /// Periodic work: image probes, debounced rendering, pending sync
    Tick,
}

/// Apply `msg` to the model.
///
/// Disk IO for [`Message::Save`] and [`Message::FileChanged`] happens in
/// the event loop's side-effect step, after this returns.
pub fn update(mut model: Model, msg: Message) -> Model {
    if !matches!(msg, Message::Quit | Message::Save | Message::Tick) {
        model.quit_confirmed = false;
    }

    match msg {
        Message::InsertChar(ch) => model.edit_source(|buffer| {
            buffer.insert_char(ch);
            true
        }),
        Message::InsertNewline => model.edit_source(|buffer| {
            buffer.insert_newline();
            true
        }),
        Message::DeleteBack => model.edit_source(crate::editor::SourceBuffer::delete_back),
        Message::DeleteForward => model.edit_source(crate::editor::SourceBuffer::delete_forward),

        Message::MoveCursor(direction) => model.edit_source(|buffer| {
            buffer.move_cursor(direction);
            false
        }),
        Message::LineStart => model.edit_source(|buffer| {
            buffer.move_home();
            false
        }),
        Message::LineEnd => model.edit_source(|buffer| {
            buffer.move_end();
            false
        }),
        Message::DocumentStart => model.edit_source(|buffer| {
            buffer.move_to_start();
            false
        }),
        Message::DocumentEnd => model.edit_source(|buffer| {
            buffer.move_to_end();
            false
        }),

        Message::PageUp => {
            let page = page_rows(&model);
            model.scroll_source(-page);
        }
        Message::PageDown => {
            let page = page_rows(&model);
            model.scroll_source(page);
        }
        Message::WheelSource(step) => {
            let consumed = model.emit(crate::app::HostEvent::Wheel(step.delta()));
            if !consumed {
                let rows = match step {
                    WheelStep::Up => -signed(WHEEL_LINES),
                    WheelStep::Down => signed(WHEEL_LINES),
                    WheelStep::PageUp => -page_rows(&model),
                    WheelStep::PageDown => page_rows(&model),
                };
                model.scroll_source(rows);
            }
        }
        Message::WheelPreview(step) => {
            let page = model
                .preview
                .as_ref()
                .map_or(0, |p| signed(usize::from(p.viewport().height())));
            let rows = match step {
                WheelStep::Up => -signed(WHEEL_LINES),
                WheelStep::Down => signed(WHEEL_LINES),
                WheelStep::PageUp => -page,
                WheelStep::PageDown => page,
            };
            model.scroll_preview(rows);
        }
        Message::ClickPreview(row) => model.toggle_disclosure_at(row),

        Message::TogglePreview => model.toggle_preview(),
        Message::Quit => {
            if model.source.buffer().is_dirty() && !model.quit_confirmed {
                model.quit_confirmed = true;
                model.show_toast(
                    ToastLevel::Warning,
                    "Unsaved changes: Ctrl+S to save, Ctrl+Q again to quit",
                );
            } else {
                model.should_quit = true;
            }
        }
        Message::Resize(width, height) => model.resize(width, height),
        Message::Tick => model.tick(),
        Message::Save | Message::FileChanged => {}
    }
    model
}

fn page_rows(model: &Model) -> isize {
    signed(usize::from(model.source.viewport().height()))
}

fn signed(rows: usize) -> isize {
    isize::try_from(rows).unwrap_or(isize::MAX)
}
