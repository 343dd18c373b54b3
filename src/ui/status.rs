use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::app::{Model, SyncMode, ToastLevel};

pub fn render_status_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let filename = model
        .file_path
        .file_name()
        .map_or_else(|| "untitled".to_string(), |s| s.to_string_lossy().to_string());
    let dirty = if model.source.buffer().is_dirty() { " [+]" } else { "" };
    let mode = match model.sync_mode() {
        SyncMode::Headings => "sync: headings",
        SyncMode::Proportional => "sync: proportional",
        SyncMode::Off => "sync: off",
    };
    let preview = model.preview.as_ref().map_or_else(
        || "  preview hidden".to_string(),
        |p| format!("  preview {}%", p.viewport().scroll_percent()),
    );
    let status = format!(
        " {filename}{dirty}  [{mode}]  source {}%{preview}  ^S save  ^P preview  ^Q quit",
        model.source.viewport().scroll_percent()
    );
    let bar = Paragraph::new(status).style(Style::default().bg(Color::DarkGray).fg(Color::White));
    frame.render_widget(bar, area);
}

pub fn render_toast_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let Some((message, level)) = model.active_toast() else {
        return;
    };
    let (prefix, style) = match level {
        ToastLevel::Info => (
            "[info]",
            Style::default().bg(Color::DarkGray).fg(Color::White),
        ),
        ToastLevel::Warning => (
            "[warn]",
            Style::default().bg(Color::Yellow).fg(Color::Black),
        ),
        ToastLevel::Error => ("[error]", Style::default().bg(Color::Red).fg(Color::White)),
    };
    let toast = Paragraph::new(format!("{prefix} {message}")).style(style);
    frame.render_widget(toast, area);
}
