use super::*;
use crate::app::{Message, Model, ModelOptions, update};
use crate::sync::SyncConfig;
use ratatui::Terminal;
use ratatui::layout::Rect;
use ratatui::backend::TestBackend;
use std::path::PathBuf;

const WIDTH: u16 = 80;
const HEIGHT: u16 = 13;

fn model(md: &str, preview: bool, sync: bool) -> Model {
    let options = ModelOptions {
        preview,
        sync: sync.then(SyncConfig::default),
    };
    Model::new(PathBuf::from("notes.md"), md, (WIDTH, HEIGHT), options)
}

fn draw(model: &Model) -> Vec<String> {
    let mut terminal = Terminal::new(TestBackend::new(WIDTH, HEIGHT)).unwrap();
    terminal.draw(|frame| render(model, frame)).unwrap();
    let buffer = terminal.backend().buffer();
    (0..buffer.area.height)
        .map(|row| {
            (0..buffer.area.width)
                .map(|col| buffer[(col, row)].symbol())
                .collect()
        })
        .collect()
}

fn columns(row: &str, range: std::ops::Range<usize>) -> String {
    row.chars().skip(range.start).take(range.len()).collect()
}

#[test]
fn test_pane_areas_split_around_separator() {
    let areas = pane_areas(Rect::new(0, 0, WIDTH, HEIGHT), true);
    assert_eq!(areas.source, Rect::new(0, 0, 40, 12));
    assert_eq!(areas.separator, Some(Rect::new(40, 0, 1, 12)));
    assert_eq!(areas.preview, Some(Rect::new(41, 0, 39, 12)));
    assert_eq!(areas.status, Rect::new(0, 12, WIDTH, 1));
}

#[test]
fn test_hidden_preview_gives_source_full_width() {
    let areas = pane_areas(Rect::new(0, 0, WIDTH, HEIGHT), false);
    assert_eq!(areas.source, Rect::new(0, 0, WIDTH, 12));
    assert_eq!(areas.preview, None);
    assert_eq!(areas.separator, None);
}

#[test]
fn test_render_draws_source_and_preview_side_by_side() {
    let rows = draw(&model("# Title\n\nHello world\n", true, true));
    // Row 0 is the source pane's top padding.
    assert!(columns(&rows[0], 0..40).trim().is_empty());
    assert!(columns(&rows[1], 0..40).starts_with("# Title"));
    assert_eq!(columns(&rows[0], 40..41), "│");
    assert!(columns(&rows[0], 41..80).contains("Title"));
    assert!(rows.iter().any(|row| columns(row, 41..80).contains("Hello world")));
}

#[test]
fn test_status_bar_reports_file_and_sync_mode() {
    let rows = draw(&model("# Title\n", true, true));
    let status = &rows[usize::from(HEIGHT) - 1];
    assert!(status.contains("notes.md"));
    assert!(status.contains("[sync: headings]"));

    let rows = draw(&model("# Title\n", true, false));
    assert!(rows[usize::from(HEIGHT) - 1].contains("[sync: proportional]"));

    let rows = draw(&model("# Title\n", false, true));
    assert!(rows[usize::from(HEIGHT) - 1].contains("preview hidden"));
}

#[test]
fn test_collapsed_summary_shows_closed_marker() {
    let md = "<details>\n<summary>More</summary>\n\nhidden body\n\n</details>\n";
    let rows = draw(&model(md, true, false));
    assert!(columns(&rows[0], 41..80).starts_with("▶ More"));
    assert!(!rows.iter().any(|row| columns(row, 41..80).contains("hidden body")));

    let opened = update(model(md, true, false), Message::ClickPreview(0));
    let rows = draw(&opened);
    assert!(columns(&rows[0], 41..80).starts_with("▼ More"));
    assert!(rows.iter().any(|row| columns(row, 41..80).contains("hidden body")));
}

#[test]
fn test_dirty_quit_shows_warning_toast() {
    let mut model = model("# Title\n", true, true);
    model = update(model, Message::InsertChar('x'));
    model = update(model, Message::Quit);
    let rows = draw(&model);
    let status = &rows[usize::from(HEIGHT) - 1];
    assert!(status.starts_with("[warn] Unsaved changes"));
    assert!(!model.should_quit);
}
