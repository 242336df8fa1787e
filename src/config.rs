//! Persistent CLI defaults.
//!
//! A `.markpadrc` file holds command-line flags, one or more per line, with
//! `#` comments. The global file lives in the platform config directory and
//! a `.markpadrc` in the working directory overrides it.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::render::RenderEngine;
use crate::theme::ThemePreference;

const APP_DIR: &str = "markpad";
const LOCAL_FILE: &str = ".markpadrc";

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFlags {
    pub engine: Option<RenderEngine>,
    pub theme: Option<ThemePreference>,
    pub storage_dir: Option<PathBuf>,
    pub perf: bool,
    pub render_debug_log: Option<PathBuf>,
}

impl ConfigFlags {
    /// Merge `other` over `self`: options from `other` win, booleans OR.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            engine: other.engine.or(self.engine),
            theme: other.theme.or(self.theme),
            storage_dir: other
                .storage_dir
                .clone()
                .or_else(|| self.storage_dir.clone()),
            perf: self.perf || other.perf,
            render_debug_log: other
                .render_debug_log
                .clone()
                .or_else(|| self.render_debug_log.clone()),
        }
    }
}

fn platform_dir(kind: &str) -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        let var = if kind == "data" { "LOCALAPPDATA" } else { "APPDATA" };
        if let Some(dir) = std::env::var_os(var) {
            return Some(PathBuf::from(dir).join(APP_DIR));
        }
    }

    #[cfg(target_os = "macos")]
    {
        let _ = kind;
        if let Some(home) = std::env::var_os("HOME") {
            return Some(
                PathBuf::from(home)
                    .join("Library")
                    .join("Application Support")
                    .join(APP_DIR),
            );
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        let (xdg_var, fallback) = if kind == "data" {
            ("XDG_DATA_HOME", [".local", "share"].as_slice())
        } else {
            ("XDG_CONFIG_HOME", [".config"].as_slice())
        };
        if let Some(xdg) = std::env::var_os(xdg_var) {
            return Some(PathBuf::from(xdg).join(APP_DIR));
        }
        if let Some(home) = std::env::var_os("HOME") {
            let mut dir = PathBuf::from(home);
            dir.extend(fallback);
            return Some(dir.join(APP_DIR));
        }
    }

    None
}

pub fn global_config_path() -> PathBuf {
    platform_dir("config").map_or_else(|| PathBuf::from(LOCAL_FILE), |dir| dir.join("config"))
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(LOCAL_FILE)
}

/// Directory holding `storage.json` when `--storage-dir` is not given.
pub fn default_storage_dir() -> PathBuf {
    platform_dir("data").unwrap_or_else(|| PathBuf::from("."))
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
        .flat_map(line_tokens)
        .collect::<Vec<_>>();
    Ok(parse_flag_tokens(&tokens))
}

/// A `--flag=value` line is one token, so path values may contain spaces.
fn line_tokens(line: &str) -> Vec<String> {
    if line.starts_with("--")
        && let Some((name, _)) = line.split_once('=')
        && !name.contains(char::is_whitespace)
    {
        return vec![line.to_string()];
    }
    line.split_whitespace().map(ToOwned::to_owned).collect()
}

pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    let mut lines = Vec::new();
    lines.push("# markpad defaults (saved with --save)".to_string());
    if let Some(engine) = flags.engine {
        lines.push(format!("--engine {}", engine.as_str()));
    }
    if let Some(theme) = flags.theme {
        lines.push(format!("--theme {}", theme.as_flag()));
    }
    if let Some(dir) = &flags.storage_dir {
        lines.push(format!("--storage-dir={}", dir.display()));
    }
    if flags.perf {
        lines.push("--perf".to_string());
    }
    if let Some(path) = &flags.render_debug_log {
        lines.push(format!("--render-debug-log={}", path.display()));
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

/// Pick the flags this module knows out of a raw argument list. Unknown
/// tokens (subcommands, positional paths) are skipped.
pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i].as_str();
        let (name, inline_value) = match token.split_once('=') {
            Some((name, value)) if name.starts_with("--") => (name, Some(value)),
            _ => (token, None),
        };
        let takes_value = matches!(
            name,
            "--engine" | "--theme" | "--storage-dir" | "--render-debug-log"
        );
        let value = if takes_value && inline_value.is_none() {
            i += 1;
            tokens.get(i).map(String::as_str)
        } else {
            inline_value
        };

        match (name, value) {
            ("--perf", _) => flags.perf = true,
            ("--engine", Some(v)) => flags.engine = v.parse().ok(),
            ("--theme", Some(v)) => flags.theme = parse_theme(v),
            ("--storage-dir", Some(v)) => flags.storage_dir = Some(PathBuf::from(v)),
            ("--render-debug-log", Some(v)) => flags.render_debug_log = Some(PathBuf::from(v)),
            _ => {}
        }
        i += 1;
    }
    flags
}

fn parse_theme(s: &str) -> Option<ThemePreference> {
    match s {
        "auto" | "system" => Some(ThemePreference::FollowSystem),
        "dark" => Some(ThemePreference::Dark),
        "light" => Some(ThemePreference::Light),
        _ => None,
    }
}
