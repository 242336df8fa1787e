//! markpad - a markdown editing core with live HTML preview.
//!
//! # Usage
//!
//! ```bash
//! markpad open notes.md
//! markpad format bold --selection 0..5
//! markpad show --mode split
//! markpad export html --out dist
//! markpad --engine library render README.md
//! ```

use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use tracing::debug;

use markpad::app::{App, KeyAction, Message, ViewMode, parse_key_chord};
use markpad::config::{
    ConfigFlags, clear_config_flags, default_storage_dir, global_config_path, load_config_flags,
    local_override_path, parse_flag_tokens, save_config_flags,
};
use markpad::editor::{EditorBuffer, FormatAction, Selection, SelectionState, insert_formatting};
use markpad::export::{Export, ExportFormat, write_export};
use markpad::perf;
use markpad::render::RenderEngine;
use markpad::stats::{DocumentStats, status_line};
use markpad::storage::FileStorage;
use markpad::theme::{self, Appearance, ThemePreference};
use markpad::watcher::FileWatcher;

/// A markdown editor core: formatting, live preview and export
#[derive(Parser, Debug)]
#[command(name = "markpad", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Preview engine
    #[arg(long, value_enum, global = true)]
    engine: Option<RenderEngine>,

    /// Theme preference (stored for later sessions)
    #[arg(long, value_enum, global = true)]
    theme: Option<ThemePreference>,

    /// Directory holding the session store (storage.json)
    #[arg(long, value_name = "DIR", global = true)]
    storage_dir: Option<PathBuf>,

    /// Print timing for rendering and highlighting
    #[arg(long, global = true)]
    perf: bool,

    /// Write render debug events to a file
    #[arg(long, value_name = "PATH", global = true)]
    render_debug_log: Option<PathBuf>,

    /// Save current command-line flags as defaults in .markpadrc
    #[arg(long, global = true)]
    save: bool,

    /// Clear saved defaults in .markpadrc
    #[arg(long, global = true)]
    clear: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render markdown to HTML on stdout (FILE, `-` for stdin, or the session document)
    Render { file: Option<PathBuf> },
    /// Write the session document as document.md or document.html
    Export {
        #[arg(value_enum)]
        format: ExportFormat,
        /// Output directory
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    /// Print word and character counts
    Stats {
        file: Option<PathBuf>,
        #[arg(long, value_enum, default_value = "split")]
        mode: ViewMode,
        /// Print counts as JSON
        #[arg(long)]
        json: bool,
    },
    /// Apply a toolbar formatting action to a selection
    Format {
        #[arg(value_enum)]
        action: FormatAction,
        /// Char range `start..end`, or a caret offset
        #[arg(long, default_value = "0")]
        selection: Selection,
        /// Format this file's text and print it instead of editing the session
        file: Option<PathBuf>,
    },
    /// Apply a keyboard shortcut (e.g. `ctrl+b`) to the session document
    Key {
        chord: String,
        #[arg(long, default_value = "0")]
        selection: Selection,
    },
    /// Show, set or cycle the theme preference
    Theme {
        #[arg(value_enum)]
        preference: Option<ThemePreference>,
        /// Advance auto -> dark -> light -> auto
        #[arg(long, conflicts_with = "preference")]
        cycle: bool,
    },
    /// Describe what a view mode shows for the session document
    Mode {
        #[arg(value_enum)]
        mode: ViewMode,
    },
    /// Load a file into the session document
    Open { file: PathBuf },
    /// Print the session document and its preview
    Show {
        #[arg(long, value_enum, default_value = "split")]
        mode: ViewMode,
    },
    /// Replace the session document with the welcome template
    Reset,
    /// Re-render FILE to OUT/document.html whenever it changes
    Watch {
        file: PathBuf,
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
}

// Query the terminal background using OSC 11.
// We talk to /dev/tty so the terminal responds even when stdout is piped.
#[cfg(not(unix))]
fn query_terminal_background() -> std::io::Result<Option<(u8, u8, u8)>> {
    Ok(None)
}

#[cfg(unix)]
fn query_terminal_background() -> std::io::Result<Option<(u8, u8, u8)>> {
    use std::io::Write;
    use std::sync::mpsc;

    let (tx, rx) = mpsc::channel();

    let mut io = std::fs::OpenOptions::new()
        .read(true)
        .write(true)
        .open("/dev/tty")?;
    let reader = io.try_clone()?;

    // OSC 11 query: ESC ] 11 ; ? BEL
    io.write_all(b"\x1b]11;?\x07")?;
    io.flush()?;

    std::thread::spawn(move || {
        let mut reader = reader;
        let mut buf = [0u8; 256];
        let mut collected: Vec<u8> = Vec::new();
        loop {
            match reader.read(&mut buf) {
                Ok(0) => continue,
                Ok(n) => {
                    collected.extend_from_slice(&buf[..n]);
                    if collected.contains(&b'\x07')
                        || collected.windows(2).any(|w| w == b"\x1b\\")
                    {
                        let _ = tx.send(collected);
                        break;
                    }
                }
                Err(_) => break,
            }
        }
    });

    let Ok(collected) = rx.recv_timeout(Duration::from_millis(75)) else {
        return Ok(None);
    };
    Ok(theme::parse_osc11_reply(&String::from_utf8_lossy(&collected)))
}

/// Terminal background if it answers, otherwise `COLORFGBG`.
fn detect_system_appearance() -> Appearance {
    let _raw = enable_raw_mode();
    let result = query_terminal_background();
    let _ = disable_raw_mode();
    match result.ok().flatten() {
        Some((r, g, b)) => theme::appearance_from_rgb(r, g, b),
        None => theme::system_appearance(),
    }
}

fn read_source(file: &Path) -> Result<String> {
    if file == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))
}

fn effective_flags(cli: &Cli, raw_args: &[String]) -> Result<ConfigFlags> {
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = parse_flag_tokens(raw_args);

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
    Ok(file_flags.union(&cli_flags))
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
    let effective = effective_flags(&cli, &raw_args)?;

    perf::set_enabled(effective.perf);
    let render_debug_log_path = effective
        .render_debug_log
        .clone()
        .or_else(|| std::env::var_os("MARKPAD_RENDER_DEBUG_LOG").map(PathBuf::from));
    if let Err(err) = perf::set_debug_log_path(render_debug_log_path.as_deref()) {
        eprintln!(
            "[warn] Failed to initialize render debug log {}: {}",
            render_debug_log_path
                .as_ref()
                .map_or_else(|| "<unset>".to_string(), |p| p.display().to_string()),
            err
        );
    }

    let storage_path = effective
        .storage_dir
        .clone()
        .unwrap_or_else(default_storage_dir)
        .join("storage.json");
    let storage = FileStorage::open(&storage_path);
    let engine = effective.engine.unwrap_or_default();

    // Only ask the terminal when the preference actually follows it.
    let stored_theme = markpad::storage::load_theme(&storage);
    let follows_system = effective.theme.unwrap_or(stored_theme).follows_system();
    let system = if follows_system {
        let _scope = perf::scope("startup.detect_appearance");
        detect_system_appearance()
    } else {
        theme::system_appearance()
    };
    debug!(storage = %storage_path.display(), ?engine, ?system, "session starting");

    let mut app = App::load(storage, system, engine);
    if let Some(theme) = effective.theme {
        app.dispatch(Message::SetTheme(theme))?;
    }

    run(cli.command, app, engine)
}

fn run(command: Command, mut app: App<FileStorage>, engine: RenderEngine) -> Result<()> {
    match command {
        Command::Render { file } => {
            let html = match file {
                Some(file) => engine.render(&read_source(&file)?, app.model().appearance()),
                None => app.model().preview_html.clone(),
            };
            println!("{html}");
        }
        Command::Export { format, out } => {
            let export = Export::new(format, &app.model().text());
            let path = write_export(&export, &out)
                .with_context(|| format!("Failed to export to {}", out.display()))?;
            println!("{} ({})", path.display(), export.mime_type);
        }
        Command::Stats { file, mode, json } => {
            let stats = match file {
                Some(file) => DocumentStats::of(&read_source(&file)?),
                None => app.model().stats(),
            };
            if json {
                println!("{}", serde_json::to_string(&stats)?);
            } else {
                println!("{}", status_line(stats, mode));
            }
        }
        Command::Format {
            action,
            selection,
            file: Some(file),
        } => {
            let mut buffer = EditorBuffer::from_text(&read_source(&file)?);
            let surface = SelectionState::new(selection);
            let restored = insert_formatting(Some(&surface), &mut buffer, action);
            print!("{}", buffer.text());
            if let Some(restored) = restored {
                eprintln!("selection: {restored}");
            }
        }
        Command::Format {
            action,
            selection,
            file: None,
        } => {
            let mut app = app.with_surface(Box::new(SelectionState::new(selection)));
            let restored = app.format(action)?;
            report_selection(&app, restored);
        }
        Command::Key { chord, selection } => {
            let key = parse_key_chord(&chord).map_err(anyhow::Error::msg)?;
            let mut app = app.with_surface(Box::new(SelectionState::new(selection)));
            match app.handle_key(key)? {
                KeyAction::Format(action) => {
                    println!("{}: {}", chord, action.title());
                    report_selection(&app, app.surface().map(|s| s.selection()));
                }
                KeyAction::Suppress => println!("{chord}: suppressed"),
                KeyAction::Ignore => println!("{chord}: not a shortcut"),
            }
        }
        Command::Theme { preference, cycle } => {
            if cycle {
                app.dispatch(Message::CycleTheme)?;
            } else if let Some(preference) = preference {
                app.dispatch(Message::SetTheme(preference))?;
            }
            let model = app.model();
            println!(
                "Theme: {} ({})",
                model.theme.label(),
                model.appearance().as_str()
            );
        }
        Command::Mode { mode } => {
            app.dispatch(Message::SetViewMode(mode))?;
            let model = app.model();
            println!(
                "editor: {} | preview: {}",
                if mode.shows_editor() { "shown" } else { "hidden" },
                if mode.shows_preview() { "shown" } else { "hidden" },
            );
            println!("{}", model.status_line());
        }
        Command::Open { file } => {
            app.dispatch(Message::SetContent(read_source(&file)?))?;
            println!("{}", app.model().status_line());
        }
        Command::Show { mode } => {
            app.dispatch(Message::SetViewMode(mode))?;
            let model = app.model();
            if mode.shows_editor() {
                println!("{}", model.text());
            }
            if mode.shows_editor() && mode.shows_preview() {
                println!("\n---- preview ({}) ----\n", model.engine.as_str());
            }
            if mode.shows_preview() {
                println!("{}", model.preview_html);
            }
            println!("\n{}", model.status_line());
        }
        Command::Reset => {
            app.dispatch(Message::ResetDocument)?;
            println!("{}", app.model().status_line());
        }
        Command::Watch { file, out } => watch(&file, &out, engine, app.model().appearance())?,
    }
    Ok(())
}

fn report_selection(app: &App<FileStorage>, selection: Option<Selection>) {
    match selection {
        Some(selection) => println!("selection: {selection}"),
        None => println!("no edit surface, nothing formatted"),
    }
    println!("{}", app.model().status_line());
}

fn watch(file: &Path, out: &Path, engine: RenderEngine, appearance: Appearance) -> Result<()> {
    let write = || -> Result<()> {
        let text = read_source(file)?;
        let renderer = engine.renderer(appearance);
        let page = Export::with_renderer(ExportFormat::Html, &text, renderer.as_ref());
        let path = write_export(&page, out)?;
        println!("rendered {} -> {}", file.display(), path.display());
        Ok(())
    };

    write()?;
    let mut watcher = FileWatcher::new(file, Duration::from_millis(200))
        .with_context(|| format!("Failed to watch {}", file.display()))?;
    eprintln!("watching {} (Ctrl+C to stop)", watcher.target_path().display());
    loop {
        if watcher.wait_for_change(Duration::from_secs(1))
            && let Err(err) = write()
        {
            eprintln!("[warn] {err:#}");
        }
    }
}
