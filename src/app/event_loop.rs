use std::io::stdout;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use ratatui::DefaultTerminal;

use crate::app::{App, Message, Model, ModelOptions, ToastLevel, update};
use crate::watcher::FileWatcher;

/// Longest the loop sleeps when nothing is scheduled.
const IDLE_POLL: Duration = Duration::from_millis(250);

pub(super) struct ResizeDebouncer {
    delay_ms: u64,
    pending: Option<(u16, u16, u64)>,
}

impl ResizeDebouncer {
    pub(super) const fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            pending: None,
        }
    }

    pub(super) const fn queue(&mut self, width: u16, height: u16, now_ms: u64) {
        self.pending = Some((width, height, now_ms));
    }

    pub(super) fn take_ready(&mut self, now_ms: u64) -> Option<(u16, u16)> {
        let (width, height, queued_at) = self.pending?;
        if now_ms.saturating_sub(queued_at) >= self.delay_ms {
            self.pending = None;
            Some((width, height))
        } else {
            None
        }
    }

    pub(super) const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl App {
    /// Run the main event loop.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the terminal cannot be
    /// initialized or the event loop hits an I/O failure.
    pub fn run(&mut self) -> Result<()> {
        let _run_scope = crate::perf::scope("app.run.total");

        let text = std::fs::read_to_string(&self.file_path)
            .with_context(|| format!("Failed to read {}", self.file_path.display()))?;

        let mut terminal = ratatui::try_init()
            .context("Failed to initialize terminal; marksync requires an interactive terminal")?;
        let size = terminal.size()?;

        let activate = self.routes.matches(&self.file_path.to_string_lossy());
        crate::perf::log_event(
            "init.activation",
            format!(
                "path={} matched={activate} sync_enabled={}",
                self.file_path.display(),
                self.sync.is_some()
            ),
        );
        let options = ModelOptions {
            preview: self.preview,
            sync: self.sync.filter(|_| activate),
        };
        let init_scope = crate::perf::scope("app.model_init");
        let mut model =
            Model::new(self.file_path.clone(), &text, (size.width, size.height), options);
        model.watch_enabled = self.watch_enabled;
        drop(init_scope);

        execute!(stdout(), EnableMouseCapture)?;
        let result = Self::event_loop(&mut terminal, &mut model);

        let _ = execute!(stdout(), DisableMouseCapture);
        ratatui::restore();
        result
    }

    fn event_loop(terminal: &mut DefaultTerminal, model: &mut Model) -> Result<()> {
        let start = Instant::now();
        let mut resize_debouncer = ResizeDebouncer::new(100);
        let mut file_watcher = if model.watch_enabled {
            match Self::make_file_watcher(model) {
                Ok(watcher) => Some(watcher),
                Err(err) => {
                    model.watch_enabled = false;
                    model.show_toast(ToastLevel::Warning, format!("Watch unavailable: {err:#}"));
                    None
                }
            }
        } else {
            None
        };
        let mut frame_idx: u64 = 0;
        let mut needs_render = true;

        loop {
            let now = Instant::now();
            let now_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
            model.clock = now;

            if model.expire_toast(now) {
                needs_render = true;
            }

            if let Some((width, height)) = resize_debouncer.take_ready(now_ms) {
                crate::perf::log_event(
                    "event.resize.apply",
                    format!("frame={frame_idx} width={width} height={height}"),
                );
                *model = update(std::mem::take(model), Message::Resize(width, height));
                needs_render = true;
            }

            if file_watcher
                .as_mut()
                .is_some_and(|watcher| watcher.poll_change(now))
            {
                *model = update(std::mem::take(model), Message::FileChanged);
                Self::handle_message_side_effects(model, &mut file_watcher, &Message::FileChanged);
                needs_render = true;
            }

            *model = update(std::mem::take(model), Message::Tick);
            needs_render |= model.take_redraw();

            let poll = if needs_render {
                Duration::ZERO
            } else if resize_debouncer.is_pending() {
                Duration::from_millis(10)
            } else {
                [model.next_deadline(), file_watcher.as_ref().and_then(FileWatcher::deadline)]
                    .into_iter()
                    .flatten()
                    .min()
                    .map_or(IDLE_POLL, |deadline| {
                        deadline.saturating_duration_since(Instant::now()).min(IDLE_POLL)
                    })
            };
            if event::poll(poll)? {
                // Coalesce bursts (key repeat, wheel) into a single draw.
                loop {
                    let event_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
                    model.clock = Instant::now();
                    let msg =
                        Self::handle_event(&event::read()?, model, event_ms, &mut resize_debouncer);
                    if let Some(msg) = msg {
                        crate::perf::log_event(
                            "event.message",
                            format!("frame={frame_idx} msg={msg:?}"),
                        );
                        let side_msg = msg.clone();
                        *model = update(std::mem::take(model), msg);
                        Self::handle_message_side_effects(model, &mut file_watcher, &side_msg);
                        needs_render = true;
                    }
                    if !event::poll(Duration::ZERO)? {
                        break;
                    }
                }
            }

            if needs_render {
                frame_idx += 1;
                let draw_start = Instant::now();
                terminal.draw(|frame| crate::ui::render(model, frame))?;
                crate::perf::log_event(
                    "frame.draw",
                    format!(
                        "frame={frame_idx} draw_ms={:.3}",
                        draw_start.elapsed().as_secs_f64() * 1000.0
                    ),
                );
                needs_render = false;
            }

            if model.should_quit {
                break;
            }
        }
        Ok(())
    }
}
