use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};

use crate::activation::RoutePatterns;
use crate::sync::{Alignment, SettlePolicy, SyncConfig};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFlags {
    pub watch: bool,
    pub no_sync: bool,
    pub no_preview: bool,
    pub perf: bool,
    pub align: Option<Alignment>,
    pub poll_interval_ms: Option<u64>,
    /// `Some(0)` waits for images indefinitely.
    pub image_timeout_ms: Option<u64>,
    /// Activation patterns; empty means the defaults.
    pub matches: Vec<String>,
    pub render_debug_log: Option<PathBuf>,
}

impl ConfigFlags {
    /// Merge `other` over `self`: switches accumulate, valued flags from
    /// `other` win when set.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            watch: self.watch || other.watch,
            no_sync: self.no_sync || other.no_sync,
            no_preview: self.no_preview || other.no_preview,
            perf: self.perf || other.perf,
            align: other.align.or(self.align),
            poll_interval_ms: other.poll_interval_ms.or(self.poll_interval_ms),
            image_timeout_ms: other.image_timeout_ms.or(self.image_timeout_ms),
            matches: if other.matches.is_empty() {
                self.matches.clone()
            } else {
                other.matches.clone()
            },
            render_debug_log: other
                .render_debug_log
                .clone()
                .or_else(|| self.render_debug_log.clone()),
        }
    }

    /// Scroll-sync tunables these flags describe.
    pub fn sync_config(&self) -> SyncConfig {
        let defaults = SettlePolicy::default();
        let poll_interval = self
            .poll_interval_ms
            .filter(|ms| *ms > 0)
            .map_or(defaults.poll_interval, Duration::from_millis);
        let deadline = match self.image_timeout_ms {
            Some(0) => None,
            Some(ms) => Some(Duration::from_millis(ms)),
            None => defaults.deadline,
        };
        SyncConfig {
            settle: SettlePolicy {
                poll_interval,
                deadline,
            },
            alignment: self.align.unwrap_or_default(),
        }
    }

    /// Documents heading sync is activated for.
    ///
    /// # Errors
    ///
    /// Returns an error if a `--match` pattern is malformed.
    pub fn route_patterns(&self) -> Result<RoutePatterns> {
        if self.matches.is_empty() {
            return Ok(RoutePatterns::default());
        }
        RoutePatterns::new(&self.matches)
    }
}

pub fn global_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("marksync").join("config");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("marksync")
                .join("config");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("marksync").join("config");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join(".config")
                .join("marksync")
                .join("config");
        }
    }

    local_override_path()
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(".marksyncrc")
}

pub fn load_config_flags(path: &Path) -> Result<ConfigFlags> {
    if !path.exists() {
        return Ok(ConfigFlags::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let tokens = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(|line| line.split_whitespace().map(ToOwned::to_owned))
        .collect::<Vec<_>>();
    Ok(parse_flag_tokens(&tokens))
}

pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    let mut lines = vec!["# marksync defaults (saved with --save)".to_string()];
    for (enabled, flag) in [
        (flags.watch, "--watch"),
        (flags.no_sync, "--no-sync"),
        (flags.no_preview, "--no-preview"),
        (flags.perf, "--perf"),
    ] {
        if enabled {
            lines.push(flag.to_string());
        }
    }
    if let Some(align) = flags.align {
        lines.push(format!("--align {}", align_name(align)));
    }
    if let Some(ms) = flags.poll_interval_ms {
        lines.push(format!("--poll-interval-ms {ms}"));
    }
    if let Some(ms) = flags.image_timeout_ms {
        lines.push(format!("--image-timeout-ms {ms}"));
    }
    for pattern in &flags.matches {
        lines.push(format!("--match {pattern}"));
    }
    if let Some(path) = &flags.render_debug_log {
        lines.push(format!("--render-debug-log {}", path.display()));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", lines.join("\n")))
        .with_context(|| format!("Failed to write config {}", path.display()))
}

pub fn clear_config_flags(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

/// Pick the known flags out of a token list, ignoring everything else.
///
/// Accepts both `--flag value` and `--flag=value`.
pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i].as_str();
        let (name, inline) = match token.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (token, None),
        };
        let mut value = || match inline {
            Some(value) => Some(value.to_string()),
            None => {
                let next = tokens.get(i + 1).cloned();
                if next.is_some() {
                    i += 1;
                }
                next
            }
        };
        match name {
            "--watch" | "-w" => flags.watch = true,
            "--no-sync" => flags.no_sync = true,
            "--no-preview" => flags.no_preview = true,
            "--perf" => flags.perf = true,
            "--align" => flags.align = value().as_deref().and_then(parse_align),
            "--poll-interval-ms" => {
                flags.poll_interval_ms = value().and_then(|v| v.parse().ok());
            }
            "--image-timeout-ms" => {
                flags.image_timeout_ms = value().and_then(|v| v.parse().ok());
            }
            "--match" => flags.matches.extend(value()),
            "--render-debug-log" => flags.render_debug_log = value().map(PathBuf::from),
            _ => {}
        }
        i += 1;
    }
    flags
}

fn parse_align(s: &str) -> Option<Alignment> {
    match s {
        "positional" => Some(Alignment::Positional),
        "text" => Some(Alignment::Text),
        _ => None,
    }
}

const fn align_name(align: Alignment) -> &'static str {
    match align {
        Alignment::Positional => "positional",
        Alignment::Text => "text",
    }
}
