use std::time::Duration;

use anyhow::{Context, Result};

use crate::app::{App, Message, Model, ToastLevel};
use crate::watcher::FileWatcher;

/// Quiet time after a change on disk before reloading.
const WATCH_DEBOUNCE: Duration = Duration::from_millis(200);

impl App {
    pub(super) fn make_file_watcher(model: &Model) -> Result<FileWatcher> {
        FileWatcher::new(&model.file_path, WATCH_DEBOUNCE)
    }

    /// Run the IO a message asks for, after [`crate::app::update`].
    pub(super) fn handle_message_side_effects(
        model: &mut Model,
        file_watcher: &mut Option<FileWatcher>,
        msg: &Message,
    ) {
        match msg {
            Message::Save => {
                if let Some(watcher) = file_watcher.as_mut() {
                    watcher.note_own_write();
                }
                match save_to_disk(model) {
                    Ok(bytes) => {
                        model.source.buffer_mut().mark_clean();
                        model.show_toast(ToastLevel::Info, format!("Saved {bytes} bytes"));
                    }
                    Err(err) => {
                        model.show_toast(ToastLevel::Error, format!("Save failed: {err:#}"));
                        crate::perf::log_event(
                            "save.error",
                            format!("path={} err={err:#}", model.file_path.display()),
                        );
                    }
                }
            }
            Message::FileChanged => match std::fs::read_to_string(&model.file_path) {
                Ok(text) => model.reload_text(&text),
                Err(err) => {
                    model.show_toast(ToastLevel::Error, format!("Reload failed: {err}"));
                    crate::perf::log_event(
                        "reload.error",
                        format!("path={} err={err}", model.file_path.display()),
                    );
                }
            },
            _ => {}
        }
    }
}

fn save_to_disk(model: &Model) -> Result<usize> {
    let text = model.source.buffer().text();
    std::fs::write(&model.file_path, &text)
        .with_context(|| format!("Failed to write {}", model.file_path.display()))?;
    Ok(text.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{ModelOptions, update};

    #[test]
    fn test_save_writes_buffer_and_clears_dirty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.md");
        std::fs::write(&path, "# A\n").unwrap();
        let mut model = Model::new(path.clone(), "# A\n", (80, 24), ModelOptions::default());
        model = update(model, Message::InsertChar('x'));
        assert!(model.source.buffer().is_dirty());

        App::handle_message_side_effects(&mut model, &mut None, &Message::Save);
        assert!(!model.source.buffer().is_dirty());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "x# A\n");
    }

    #[test]
    fn test_reload_keeps_unsaved_edits() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.md");
        std::fs::write(&path, "# A\n").unwrap();
        let mut model = Model::new(path.clone(), "# A\n", (80, 24), ModelOptions::default());
        model = update(model, Message::InsertChar('x'));

        std::fs::write(&path, "# B\n").unwrap();
        App::handle_message_side_effects(&mut model, &mut None, &Message::FileChanged);
        assert_eq!(model.source.buffer().text(), "x# A\n");
        assert!(model.active_toast().is_some_and(|(_, level)| level == ToastLevel::Warning));
    }

    #[test]
    fn test_reload_takes_disk_text_when_clean() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.md");
        std::fs::write(&path, "# A\n").unwrap();
        let mut model = Model::new(path.clone(), "# A\n", (80, 24), ModelOptions::default());

        std::fs::write(&path, "# B\n").unwrap();
        App::handle_message_side_effects(&mut model, &mut None, &Message::FileChanged);
        assert_eq!(model.source.buffer().text(), "# B\n");
        assert!(model.render_due.is_some());
    }
}
