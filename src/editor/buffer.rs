use ropey::Rope;

use super::Selection;

/// A text buffer backed by a rope data structure.
///
/// Provides efficient insertion, deletion, and range replacement for the
/// document being edited. All offsets are char offsets.
pub struct EditorBuffer {
    rope: Rope,
    dirty: bool,
}

impl EditorBuffer {
    /// Create a new buffer from a string.
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            dirty: false,
        }
    }

    /// Create an empty buffer.
    pub fn empty() -> Self {
        Self::from_text("")
    }

    /// Whether the buffer has been modified since creation or the last save.
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Mark the buffer as clean (e.g., after persisting).
    pub const fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Length in chars.
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    /// The full text content of the buffer.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Clamp a selection to the buffer bounds.
    pub fn clamp(&self, selection: Selection) -> Selection {
        selection.clamp(self.len_chars())
    }

    /// Insert a string at a char offset (clamped to the end).
    pub fn insert(&mut self, char_idx: usize, s: &str) {
        if s.is_empty() {
            return;
        }
        let idx = char_idx.min(self.len_chars());
        self.rope.insert(idx, s);
        self.dirty = true;
    }

    /// Remove the selected range. Returns `true` if anything was removed.
    pub fn remove(&mut self, selection: Selection) -> bool {
        let sel = self.clamp(selection);
        if sel.is_collapsed() {
            return false;
        }
        self.rope.remove(sel.start..sel.end);
        self.dirty = true;
        true
    }

    /// Replace the selected range with `s` and return the caret after it.
    pub fn replace(&mut self, selection: Selection, s: &str) -> Selection {
        let sel = self.clamp(selection);
        self.remove(sel);
        self.insert(sel.start, s);
        Selection::caret(sel.start + s.chars().count())
    }

    /// Replace the whole content. Only marks dirty when the text changes.
    pub fn set_text(&mut self, text: &str) {
        if self.rope == text {
            return;
        }
        self.rope = Rope::from_str(text);
        self.dirty = true;
    }
}

impl Default for EditorBuffer {
    fn default() -> Self {
        Self::empty()
    }
}

impl std::fmt::Debug for EditorBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorBuffer")
            .field(
                "rope",
                &format_args!(
                    "Rope({} lines, {} chars)",
                    self.rope.len_lines(),
                    self.rope.len_chars()
                ),
            )
            .field("dirty", &self.dirty)
            .finish()
    }
}
