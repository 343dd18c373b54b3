//! Reloading the source file when another program changes it.
//!
//! notify delivers events on its own thread; they are drained from the
//! event loop and debounced there.
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};

/// Debounce state for a stream of change notifications.
///
/// A change becomes ready once `debounce` has passed since the most recent
/// notification. Notifications inside an ignore window (our own saves) are
/// dropped.
#[derive(Debug, Clone)]
pub struct ChangeDebouncer {
    debounce: Duration,
    pending_since: Option<Instant>,
    ignore_until: Option<Instant>,
}

impl ChangeDebouncer {
    pub const fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            pending_since: None,
            ignore_until: None,
        }
    }

    pub fn record(&mut self, now: Instant) {
        if self.ignore_until.is_some_and(|until| now < until) {
            return;
        }
        self.pending_since = Some(now);
    }

    /// Drop notifications for the next `window`.
    pub fn ignore_for(&mut self, now: Instant, window: Duration) {
        self.ignore_until = Some(now + window);
        self.pending_since = None;
    }

    /// Returns true once, when a recorded change has been quiet long enough.
    pub fn take_ready(&mut self, now: Instant) -> bool {
        match self.pending_since {
            Some(since) if now.duration_since(since) >= self.debounce => {
                self.pending_since = None;
                true
            }
            _ => false,
        }
    }

    /// When [`Self::take_ready`] can next return true.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending_since.map(|since| since + self.debounce)
    }
}

/// Watches the edited file for external modifications.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
    rx: Receiver<notify::Result<Event>>,
    watch_root: PathBuf,
    target_path: PathBuf,
    target_name: Option<OsString>,
    debouncer: ChangeDebouncer,
}

impl FileWatcher {
    /// Watch `path`, reporting changes after `debounce` of quiet.
    ///
    /// # Errors
    /// Returns an error if the watcher cannot be created or the parent
    /// directory cannot be watched.
    pub fn new(path: impl AsRef<Path>, debounce: Duration) -> Result<Self> {
        // Event paths arrive canonical; compare against the canonical form.
        let target_path = path
            .as_ref()
            .canonicalize()
            .unwrap_or_else(|_| path.as_ref().to_path_buf());
        let target_name = target_path.file_name().map(std::ffi::OsStr::to_os_string);
        let watch_root = watch_root_for(&target_path);

        let (tx, rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = tx.send(res);
        })
        .context("Failed to create file watcher")?;
        watcher
            .watch(&watch_root, RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch {}", watch_root.display()))?;

        Ok(Self {
            _watcher: watcher,
            rx,
            watch_root,
            target_path,
            target_name,
            debouncer: ChangeDebouncer::new(debounce),
        })
    }

    pub fn target_path(&self) -> &Path {
        &self.target_path
    }

    /// Ignore the events caused by writing the file ourselves.
    pub fn note_own_write(&mut self) {
        self.debouncer
            .ignore_for(Instant::now(), OWN_WRITE_WINDOW);
    }

    /// Drain pending notifications; true once a debounced change is ready.
    pub fn poll_change(&mut self, now: Instant) -> bool {
        let mut relevant = 0u32;
        let mut ignored = 0u32;
        while let Ok(event) = self.rx.try_recv() {
            match event {
                Ok(ev) if self.is_relevant(&ev) => relevant += 1,
                Ok(_) => ignored += 1,
                Err(err) => tracing::debug!(%err, "watcher error"),
            }
        }
        if relevant + ignored > 0 {
            crate::perf::log_event(
                "watcher.poll",
                format!(
                    "relevant={relevant} ignored={ignored} target={}",
                    self.target_path.display()
                ),
            );
        }
        if relevant > 0 {
            self.debouncer.record(now);
        }
        self.debouncer.take_ready(now)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    fn is_relevant(&self, event: &Event) -> bool {
        event.paths.iter().any(|path| {
            path == &self.watch_root
                || path == &self.target_path
                || self
                    .target_name
                    .as_ref()
                    .is_some_and(|name| path.file_name().is_some_and(|f| f == name))
        })
    }
}

const OWN_WRITE_WINDOW: Duration = Duration::from_millis(500);

fn watch_root_for(path: &Path) -> PathBuf {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::EventKind;
    use tempfile::tempdir;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn test_debouncer_waits_for_quiet() {
        let t0 = Instant::now();
        let mut debouncer = ChangeDebouncer::new(200 * MS);
        debouncer.record(t0);
        debouncer.record(t0 + 100 * MS);
        assert!(!debouncer.take_ready(t0 + 250 * MS));
        assert_eq!(debouncer.deadline(), Some(t0 + 300 * MS));
        assert!(debouncer.take_ready(t0 + 300 * MS));
        assert!(!debouncer.take_ready(t0 + 400 * MS));
    }

    #[test]
    fn test_debouncer_ignores_own_writes() {
        let t0 = Instant::now();
        let mut debouncer = ChangeDebouncer::new(10 * MS);
        debouncer.ignore_for(t0, 500 * MS);
        debouncer.record(t0 + 100 * MS);
        assert!(!debouncer.take_ready(t0 + 200 * MS));

        debouncer.record(t0 + 600 * MS);
        assert!(debouncer.take_ready(t0 + 610 * MS));
    }

    #[test]
    fn test_directory_event_counts_for_watched_file() {
        let dir = tempdir().unwrap();
        let canonical_dir = dir.path().canonicalize().unwrap();
        let path = canonical_dir.join("doc.md");
        std::fs::write(&path, "# hi").unwrap();
        let watcher = FileWatcher::new(&path, 10 * MS).unwrap();

        let event = Event {
            kind: EventKind::Any,
            paths: vec![canonical_dir],
            attrs: notify::event::EventAttributes::new(),
        };
        assert!(watcher.is_relevant(&event));

        let other = Event {
            kind: EventKind::Any,
            paths: vec![dir.path().canonicalize().unwrap().join("other.md")],
            attrs: notify::event::EventAttributes::new(),
        };
        assert!(!watcher.is_relevant(&other));
    }

    #[test]
    fn test_watch_root_for_relative_file_is_dot() {
        assert_eq!(watch_root_for(Path::new("notes.md")), PathBuf::from("."));
    }

    #[test]
    fn test_external_write_is_detected() {
        let dir = tempdir().unwrap();
        let path = dir.path().canonicalize().unwrap().join("watched.md");
        std::fs::write(&path, "# original").unwrap();
        let mut watcher = FileWatcher::new(&path, 50 * MS).unwrap();
        std::thread::sleep(500 * MS);

        std::fs::write(&path, "# changed elsewhere").unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        let mut detected = false;
        while Instant::now() < deadline {
            if watcher.poll_change(Instant::now()) {
                detected = true;
                break;
            }
            std::thread::sleep(50 * MS);
        }
        assert!(detected, "external modification should be reported");
    }
}
