use std::path::PathBuf;
use std::time::Duration;

use marksync::config::{ConfigFlags, load_config_flags, parse_flag_tokens};
use marksync::sync::Alignment;

#[test]
fn test_config_file_parsing_ignores_comments_and_blank_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".marksyncrc");
    let content = r"
# comment
--watch

--align positional

--render-debug-log=render.log
";
    std::fs::write(&path, content).unwrap();

    let flags = load_config_flags(&path).unwrap();
    assert!(flags.watch);
    assert_eq!(flags.align, Some(Alignment::Positional));
    assert_eq!(flags.render_debug_log, Some(PathBuf::from("render.log")));
}

#[test]
fn test_cli_flags_override_file_flags() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".marksyncrc");
    let content = "--watch\n--align positional\n--render-debug-log file.log\n--match *.txt\n";
    std::fs::write(&path, content).unwrap();

    let file_flags = load_config_flags(&path).unwrap();
    let cli_args = vec![
        "marksync".to_string(),
        "--align".to_string(),
        "text".to_string(),
        "--no-preview".to_string(),
    ];
    let cli_flags = parse_flag_tokens(&cli_args);

    let effective = file_flags.union(&cli_flags);
    assert!(effective.watch, "file flags should remain enabled");
    assert!(effective.no_preview, "cli flags should be applied");
    assert_eq!(effective.align, Some(Alignment::Text), "cli should override alignment");
    assert_eq!(effective.matches, vec!["*.txt"]);
    assert_eq!(
        effective.render_debug_log,
        Some(PathBuf::from("file.log")),
        "file config should be preserved when CLI does not override"
    );
}

#[test]
fn test_cli_patterns_replace_file_patterns() {
    let file = ConfigFlags {
        matches: vec!["*.txt".to_string()],
        ..ConfigFlags::default()
    };
    let cli = parse_flag_tokens(&["--match=notes/*.md".to_string()]);
    let merged = file.union(&cli);
    assert_eq!(merged.matches, vec!["notes/*.md"]);

    let routes = merged.route_patterns().unwrap();
    assert!(routes.matches("notes/today.md"));
    assert!(!routes.matches("today.txt"));
}

#[test]
fn test_default_patterns_apply_without_match_flags() {
    let routes = ConfigFlags::default().route_patterns().unwrap();
    assert!(routes.matches("/home/user/README.md"));
    assert!(routes.matches("https://qiita.com/drafts/new"));
    assert!(!routes.matches("/home/user/main.rs"));
}

#[test]
fn test_timing_flags_reach_sync_config() {
    let args = vec![
        "marksync".to_string(),
        "--poll-interval-ms".to_string(),
        "30".to_string(),
        "--image-timeout-ms=750".to_string(),
    ];
    let config = parse_flag_tokens(&args).sync_config();
    assert_eq!(config.settle.poll_interval, Duration::from_millis(30));
    assert_eq!(config.settle.deadline, Some(Duration::from_millis(750)));
}
