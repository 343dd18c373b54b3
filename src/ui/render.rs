use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::app::Model;
use crate::document::{LineType, RenderedLine};

use super::{status, style};

/// Screen areas of the two panes and the status bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaneAreas {
    pub source: Rect,
    /// `None` while the preview is hidden.
    pub preview: Option<Rect>,
    pub separator: Option<Rect>,
    pub status: Rect,
}

/// Split `area` into source | separator | preview above a status row.
pub fn pane_areas(area: Rect, preview_visible: bool) -> PaneAreas {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(area);
    if !preview_visible {
        return PaneAreas {
            source: rows[0],
            preview: None,
            separator: None,
            status: rows[1],
        };
    }
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(50),
            Constraint::Length(1),
            Constraint::Min(1),
        ])
        .split(rows[0]);
    PaneAreas {
        source: columns[0],
        preview: Some(columns[2]),
        separator: Some(columns[1]),
        status: rows[1],
    }
}

/// Render the complete UI.
pub fn render(model: &Model, frame: &mut Frame) {
    let areas = pane_areas(frame.area(), model.preview.is_some());

    render_source(model, frame, areas.source);
    if let Some(area) = areas.separator {
        let bar: Vec<Line> = (0..area.height).map(|_| Line::from("│")).collect();
        frame.render_widget(Paragraph::new(bar).style(style::separator_style()), area);
    }
    if let Some(area) = areas.preview {
        render_preview(model, frame, area);
    }
    if model.active_toast().is_some() {
        status::render_toast_bar(model, frame, areas.status);
    } else {
        status::render_status_bar(model, frame, areas.status);
    }
}

fn render_source(model: &Model, frame: &mut Frame, area: Rect) {
    let source = &model.source;
    let lines: Vec<Line> = source
        .viewport()
        .visible_range()
        .map(|row| Line::from(source.row_text(row).unwrap_or_default()))
        .collect();
    frame.render_widget(Paragraph::new(lines).style(style::source_style()), area);

    if let Some((x, y)) = source.cursor_screen_pos()
        && x < area.width
        && y < area.height
    {
        frame.set_cursor_position((area.x + x, area.y + y));
    }
}

fn render_preview(model: &Model, frame: &mut Frame, area: Rect) {
    let Some(preview) = model.preview.as_ref() else {
        return;
    };
    let lines: Vec<Line> = (0..usize::from(area.height))
        .map_while(|row| preview.line_at_row(row))
        .map(|line| preview_line(line, preview))
        .collect();
    frame.render_widget(Paragraph::new(lines), area);
}

fn preview_line<'a>(line: &'a RenderedLine, preview: &crate::app::PreviewView) -> Line<'a> {
    let base = style::style_for_line_type(line.line_type());
    if let LineType::Summary(idx) = line.line_type() {
        let marker = if preview.is_open(*idx) { "▼ " } else { "▶ " };
        return Line::from(vec![
            Span::styled(marker, base),
            Span::styled(line.content(), base),
        ]);
    }
    match line.spans() {
        Some(spans) => Line::from(
            spans
                .iter()
                .map(|span| Span::styled(span.text(), style::style_for_inline(base, span.style())))
                .collect::<Vec<_>>(),
        ),
        None => Line::styled(line.content(), base),
    }
}
