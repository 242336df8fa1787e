// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. render::RenderEngine)
    clippy::module_name_repetitions
)]

//! # markpad
//!
//! A markdown editing core with live HTML preview.
//!
//! markpad provides:
//! - Cursor-aware formatting insertion (bold, italic, headings, links, ...)
//! - Two markdown renderers: a rule-based pipeline and a comrak engine with
//!   syntax-highlighted code fences
//! - Follow-system, dark and light theme preferences
//! - Session persistence in a local key-value store
//! - Markdown and standalone HTML export
//!
//! ## Architecture
//!
//! markpad uses The Elm Architecture (TEA) pattern:
//! - **Model**: Editor state
//! - **Message**: Events and actions
//! - **Update**: Pure state transitions
//! - **App**: Persistence and edit-surface effects around `update`
//!
//! ## Modules
//!
//! - [`app`]: Model, messages, update and side effects
//! - [`editor`]: Document buffer, selections and formatting
//! - [`render`]: Markdown to HTML engines
//! - [`highlight`]: Syntax highlighting for code fences
//! - [`theme`]: Theme preference and system appearance
//! - [`storage`]: Persistent key-value store
//! - [`export`]: File export
//! - [`stats`]: Word and character counts
//! - [`config`]: Saved command-line defaults
//! - [`watcher`]: File watching

pub mod app;
pub mod config;
pub mod editor;
pub mod error;
pub mod export;
pub mod highlight;
pub mod perf;
pub mod render;
pub mod stats;
pub mod storage;
pub mod theme;
pub mod watcher;

pub use error::{Error, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::app::{App, Message, Model, ViewMode, update};
    pub use crate::editor::{EditSurface, EditorBuffer, FormatAction, Selection};
    pub use crate::render::{RenderEngine, Renderer, render};
    pub use crate::storage::{FileStorage, MemoryStorage, Storage};
    pub use crate::theme::{Appearance, ThemePreference};
}
