use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::layout::Rect;

use crate::app::{App, Message, Model, WheelStep};
use crate::editor::Direction;

use super::event_loop::ResizeDebouncer;

impl App {
    pub(super) fn handle_event(
        event: &Event,
        model: &Model,
        now_ms: u64,
        resize_debouncer: &mut ResizeDebouncer,
    ) -> Option<Message> {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => Self::handle_key(*key),
            Event::Mouse(mouse) => Self::handle_mouse(*mouse, model),
            Event::Resize(w, h) => {
                crate::perf::log_event("event.resize.queue", format!("width={w} height={h}"));
                resize_debouncer.queue(*w, *h, now_ms);
                None
            }
            _ => None,
        }
    }

    pub(super) fn handle_key(key: KeyEvent) -> Option<Message> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('s') if ctrl => Some(Message::Save),
            KeyCode::Char('p') if ctrl => Some(Message::TogglePreview),
            KeyCode::Char('q' | 'c') if ctrl => Some(Message::Quit),
            KeyCode::Home if ctrl => Some(Message::DocumentStart),
            KeyCode::End if ctrl => Some(Message::DocumentEnd),
            KeyCode::Char(_) if ctrl || key.modifiers.contains(KeyModifiers::ALT) => None,
            KeyCode::Char(ch) => Some(Message::InsertChar(ch)),
            KeyCode::Enter => Some(Message::InsertNewline),
            KeyCode::Backspace => Some(Message::DeleteBack),
            KeyCode::Delete => Some(Message::DeleteForward),
            KeyCode::Up => Some(Message::MoveCursor(Direction::Up)),
            KeyCode::Down => Some(Message::MoveCursor(Direction::Down)),
            KeyCode::Left => Some(Message::MoveCursor(Direction::Left)),
            KeyCode::Right => Some(Message::MoveCursor(Direction::Right)),
            KeyCode::Home => Some(Message::LineStart),
            KeyCode::End => Some(Message::LineEnd),
            KeyCode::PageUp => Some(Message::PageUp),
            KeyCode::PageDown => Some(Message::PageDown),
            _ => None,
        }
    }

    pub(super) fn handle_mouse(mouse: MouseEvent, model: &Model) -> Option<Message> {
        let areas = model.areas();
        let in_source = point_in_rect(mouse.column, mouse.row, areas.source);
        let preview = areas
            .preview
            .filter(|area| point_in_rect(mouse.column, mouse.row, *area));
        let page = mouse.modifiers.contains(KeyModifiers::SHIFT);

        let step = match mouse.kind {
            MouseEventKind::ScrollUp if page => WheelStep::PageUp,
            MouseEventKind::ScrollUp => WheelStep::Up,
            MouseEventKind::ScrollDown if page => WheelStep::PageDown,
            MouseEventKind::ScrollDown => WheelStep::Down,
            MouseEventKind::Down(MouseButton::Left) => {
                let area = preview?;
                return Some(Message::ClickPreview(usize::from(mouse.row - area.y)));
            }
            _ => return None,
        };
        if in_source {
            Some(Message::WheelSource(step))
        } else if preview.is_some() {
            Some(Message::WheelPreview(step))
        } else {
            None
        }
    }
}

fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}
