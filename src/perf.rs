//! Timing scopes and the render debug log.
//!
//! `--perf` prints scope timings to stderr once the terminal is restored;
//! `--render-debug-log PATH` appends timestamped host events (frames, sync
//! recomputations, image probes, watcher polls) to a file.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{LazyLock, Mutex, MutexGuard};
use std::time::Instant;

static ENABLED: AtomicBool = AtomicBool::new(false);
static DEBUG_LOG: LazyLock<Mutex<DebugLog>> = LazyLock::new(|| Mutex::new(DebugLog::default()));

/// Times the enclosing block; reports on drop.
#[derive(Debug)]
pub struct Scope {
    name: &'static str,
    start: Instant,
}

impl Drop for Scope {
    fn drop(&mut self) {
        let elapsed_ms = self.start.elapsed().as_secs_f64() * 1000.0;
        if is_enabled() {
            eprintln!("[perf] {}: {elapsed_ms:.2} ms", self.name);
        }
        log_event("scope", format!("{} {elapsed_ms:.3} ms", self.name));
    }
}

#[derive(Debug)]
struct DebugLog {
    start: Instant,
    writer: Option<BufWriter<File>>,
}

impl Default for DebugLog {
    fn default() -> Self {
        Self {
            start: Instant::now(),
            writer: None,
        }
    }
}

fn debug_log() -> MutexGuard<'static, DebugLog> {
    DEBUG_LOG
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}

pub fn set_enabled(enabled: bool) {
    ENABLED.store(enabled, Ordering::Relaxed);
}

pub fn is_enabled() -> bool {
    ENABLED.load(Ordering::Relaxed)
}

pub fn scope(name: &'static str) -> Scope {
    Scope {
        name,
        start: Instant::now(),
    }
}

/// Start writing the debug log to `path`, or stop with `None`.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn set_debug_log_path(path: Option<&Path>) -> std::io::Result<()> {
    let mut log = debug_log();
    let Some(path) = path else {
        log.writer = None;
        return Ok(());
    };
    let mut writer = BufWriter::new(File::create(path)?);
    writeln!(writer, "marksync render debug log start")?;
    writer.flush()?;
    log.start = Instant::now();
    log.writer = Some(writer);
    Ok(())
}

pub fn is_debug_log_enabled() -> bool {
    debug_log().writer.is_some()
}

pub fn log_event(name: &str, detail: impl AsRef<str>) {
    let mut log = debug_log();
    let elapsed_ms = log.start.elapsed().as_secs_f64() * 1000.0;
    if let Some(writer) = log.writer.as_mut() {
        let _ = writeln!(writer, "[{elapsed_ms:>10.3} ms] {name}: {}", detail.as_ref());
        let _ = writer.flush();
    }
}
