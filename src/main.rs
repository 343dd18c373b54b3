//! Marksync - a side-by-side markdown editor with heading-anchored scroll sync.
//!
//! # Usage
//!
//! ```bash
//! marksync README.md
//! marksync --watch README.md
//! marksync --align positional --image-timeout-ms 0 notes.md
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use marksync::app::App;
use marksync::config::{
    ConfigFlags, clear_config_flags, global_config_path, load_config_flags, local_override_path,
    parse_flag_tokens, save_config_flags,
};
use marksync::perf;
use marksync::sync::Alignment;

/// A side-by-side markdown editor whose preview follows the source
#[derive(Parser, Debug)]
#[command(name = "marksync", version, about, long_about = None)]
struct Cli {
    /// Markdown file to edit
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Watch file for external changes and reload
    #[arg(short, long)]
    watch: bool,

    /// Disable heading sync (proportional scrolling only)
    #[arg(long)]
    no_sync: bool,

    /// Start with the preview pane hidden
    #[arg(long)]
    no_preview: bool,

    /// How source headings are paired with rendered headings
    #[arg(long, value_enum)]
    align: Option<Alignment>,

    /// Interval between checks for pending images, in milliseconds
    #[arg(long, value_name = "MS")]
    poll_interval_ms: Option<u64>,

    /// Give up waiting for images after this long (0 waits forever)
    #[arg(long, value_name = "MS")]
    image_timeout_ms: Option<u64>,

    /// Documents heading sync is activated for (repeatable)
    #[arg(long = "match", value_name = "PATTERN")]
    matches: Vec<String>,

    /// Enable startup performance logging
    #[arg(long)]
    perf: bool,

    /// Write detailed render/sync debug events to a file
    #[arg(long, value_name = "PATH")]
    render_debug_log: Option<PathBuf>,

    /// Save current command-line flags as defaults
    #[arg(long)]
    save: bool,

    /// Clear saved defaults
    #[arg(long)]
    clear: bool,
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let raw_args = std::env::args().collect::<Vec<_>>();
    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = parse_flag_tokens(&raw_args);

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let effective = file_flags.union(&cli_flags);

    perf::set_enabled(effective.perf);
    let render_debug_log_path = effective
        .render_debug_log
        .clone()
        .or_else(|| std::env::var_os("MARKSYNC_RENDER_DEBUG_LOG").map(PathBuf::from));
    if let Err(err) = perf::set_debug_log_path(render_debug_log_path.as_deref()) {
        tracing::warn!(
            path = %render_debug_log_path
                .as_ref()
                .map_or_else(|| "<unset>".to_string(), |p| p.display().to_string()),
            %err,
            "failed to initialize render debug log"
        );
    }

    // Verify file exists
    if !cli.file.exists() {
        anyhow::bail!("File not found: {}", cli.file.display());
    }

    let sync = (!effective.no_sync).then(|| effective.sync_config());
    let routes = effective.route_patterns()?;

    let mut app = App::new(cli.file)
        .with_watch(effective.watch)
        .with_preview(!effective.no_preview)
        .with_sync(sync)
        .with_routes(routes);

    app.run().context("Application error")
}
