use std::path::PathBuf;

use markpad::config::{ConfigFlags, load_config_flags, parse_flag_tokens};
use markpad::render::RenderEngine;
use markpad::theme::ThemePreference;

#[test]
fn test_config_file_parsing_ignores_comments_and_blank_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".markpadrc");
    let content = r#"
# comment
--engine library

--theme light

--render-debug-log=render.log
"#;
    std::fs::write(&path, content).unwrap();

    let flags = load_config_flags(&path).unwrap();
    assert_eq!(flags.engine, Some(RenderEngine::Library));
    assert_eq!(flags.theme, Some(ThemePreference::Light));
    assert_eq!(flags.render_debug_log, Some(PathBuf::from("render.log")));
}

#[test]
fn test_missing_config_file_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let flags = load_config_flags(&dir.path().join("nope")).unwrap();
    assert_eq!(flags, ConfigFlags::default());
}

#[test]
fn test_cli_flags_override_file_flags() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".markpadrc");
    let content = "--perf\n--theme light\n--storage-dir /tmp/markpad-state\n";
    std::fs::write(&path, content).unwrap();

    let file_flags = load_config_flags(&path).unwrap();
    let cli_args = vec![
        "markpad".to_string(),
        "--theme".to_string(),
        "dark".to_string(),
        "--engine=library".to_string(),
        "show".to_string(),
    ];
    let cli_flags = parse_flag_tokens(&cli_args);

    let effective = file_flags.union(&cli_flags);
    assert!(effective.perf, "file flags should remain enabled");
    assert_eq!(effective.engine, Some(RenderEngine::Library), "cli flags should be applied");
    assert_eq!(effective.theme, Some(ThemePreference::Dark), "cli should override theme");
    assert_eq!(
        effective.storage_dir,
        Some(PathBuf::from("/tmp/markpad-state")),
        "file config should be preserved when CLI does not override"
    );
}

#[test]
fn test_parse_flag_tokens_handles_equals_syntax() {
    let args = vec![
        "markpad".to_string(),
        "--theme=auto".to_string(),
        "--storage-dir=state".to_string(),
        "--render-debug-log=render.log".to_string(),
    ];
    let flags = parse_flag_tokens(&args);
    assert_eq!(flags.theme, Some(ThemePreference::FollowSystem));
    assert_eq!(flags.storage_dir, Some(PathBuf::from("state")));
    assert_eq!(flags.render_debug_log, Some(PathBuf::from("render.log")));
}

#[test]
fn test_subcommand_arguments_are_not_flags() {
    let args = vec![
        "markpad".to_string(),
        "theme".to_string(),
        "dark".to_string(),
        "format".to_string(),
        "bold".to_string(),
    ];
    assert_eq!(parse_flag_tokens(&args), ConfigFlags::default());
}

#[test]
fn test_config_union_merges_booleans() {
    let file = ConfigFlags {
        perf: true,
        ..ConfigFlags::default()
    };
    let cli = ConfigFlags {
        engine: Some(RenderEngine::Pipeline),
        ..ConfigFlags::default()
    };
    let merged = file.union(&cli);
    assert!(merged.perf);
    assert_eq!(merged.engine, Some(RenderEngine::Pipeline));
}
