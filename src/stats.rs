//! Word and character counts for the status line.

use serde::Serialize;

use crate::app::ViewMode;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DocumentStats {
    pub words: usize,
    pub characters: usize,
}

impl DocumentStats {
    /// Words are whitespace-separated runs; characters are chars, newlines included.
    pub fn of(text: &str) -> Self {
        Self {
            words: text.split_whitespace().count(),
            characters: text.chars().count(),
        }
    }
}

/// `Words: N | Characters: M | Mode: split`
pub fn status_line(stats: DocumentStats, mode: ViewMode) -> String {
    format!(
        "Words: {} | Characters: {} | Mode: {}",
        stats.words,
        stats.characters,
        mode.as_str()
    )
}
