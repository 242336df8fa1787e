//! Cursor-aware formatting insertion.
//!
//! Wraps (or prefixes) the current selection with markup tokens and reports
//! where the originally selected text ended up, so the caller can re-select
//! it once the new content is visible.

use tracing::debug;

use super::{EditorBuffer, Selection};

/// The result of applying a formatting action to a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formatted {
    pub text: String,
    pub selection: Selection,
}

/// Wrap `selection` in `prefix`/`suffix`.
///
/// The returned selection covers the originally selected text inside the
/// new markers. A collapsed selection leaves the cursor between the markers
/// (or right after the prefix when `suffix` is empty). Out-of-range or
/// reversed selections are clamped and normalized first.
pub fn apply(document: &str, selection: Selection, prefix: &str, suffix: &str) -> Formatted {
    let len = document.chars().count();
    let sel = selection.clamp(len);
    let start_byte = byte_offset(document, sel.start);
    let end_byte = byte_offset(document, sel.end);
    let selected = &document[start_byte..end_byte];

    let mut text = String::with_capacity(document.len() + prefix.len() + suffix.len());
    text.push_str(&document[..start_byte]);
    text.push_str(prefix);
    text.push_str(selected);
    text.push_str(suffix);
    text.push_str(&document[end_byte..]);

    let new_start = sel.start + prefix.chars().count();
    Formatted {
        text,
        selection: Selection::new(new_start, new_start + sel.len_chars()),
    }
}

/// Apply the same wrapping directly to a rope buffer.
///
/// Inserts the suffix first so the start offset stays valid for the prefix.
pub fn apply_to_buffer(
    buffer: &mut EditorBuffer,
    selection: Selection,
    prefix: &str,
    suffix: &str,
) -> Selection {
    let sel = buffer.clamp(selection);
    buffer.insert(sel.end, suffix);
    buffer.insert(sel.start, prefix);
    let new_start = sel.start + prefix.chars().count();
    Selection::new(new_start, new_start + sel.len_chars())
}

fn byte_offset(s: &str, char_idx: usize) -> usize {
    s.char_indices().nth(char_idx).map_or(s.len(), |(i, _)| i)
}

/// Toolbar formatting actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum FormatAction {
    Bold,
    Italic,
    #[value(name = "h1")]
    Heading1,
    #[value(name = "h2")]
    Heading2,
    #[value(name = "h3")]
    Heading3,
    Code,
    Link,
    #[value(name = "list")]
    BulletList,
    Quote,
}

impl FormatAction {
    /// All actions in toolbar order.
    pub const ALL: [Self; 9] = [
        Self::Bold,
        Self::Italic,
        Self::Heading1,
        Self::Heading2,
        Self::Heading3,
        Self::Code,
        Self::Link,
        Self::BulletList,
        Self::Quote,
    ];

    /// The `(prefix, suffix)` markup inserted around the selection.
    pub const fn tokens(self) -> (&'static str, &'static str) {
        match self {
            Self::Bold => ("**", "**"),
            Self::Italic => ("*", "*"),
            Self::Heading1 => ("# ", ""),
            Self::Heading2 => ("## ", ""),
            Self::Heading3 => ("### ", ""),
            Self::Code => ("`", "`"),
            Self::Link => ("[", "](https://example.com)"),
            Self::BulletList => ("- ", ""),
            Self::Quote => ("> ", ""),
        }
    }

    /// Short toolbar label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Bold => "Bold",
            Self::Italic => "Italic",
            Self::Heading1 => "H1",
            Self::Heading2 => "H2",
            Self::Heading3 => "H3",
            Self::Code => "Code",
            Self::Link => "Link",
            Self::BulletList => "List",
            Self::Quote => "Quote",
        }
    }

    /// Tooltip text, including the shortcut where one exists.
    pub const fn title(self) -> &'static str {
        match self {
            Self::Bold => "Bold (Ctrl+B)",
            Self::Italic => "Italic (Ctrl+I)",
            Self::Heading1 => "Header 1",
            Self::Heading2 => "Header 2",
            Self::Heading3 => "Header 3",
            Self::Code => "Code",
            Self::Link => "Link",
            Self::BulletList => "Bullet List",
            Self::Quote => "Blockquote",
        }
    }

    /// Apply this action to a string.
    pub fn apply(self, document: &str, selection: Selection) -> Formatted {
        let (prefix, suffix) = self.tokens();
        apply(document, selection, prefix, suffix)
    }
}

/// The capability a UI binding exposes for its editable surface.
///
/// Formatting only needs to read the current selection and, once the new
/// content has been rendered, move focus back and re-apply a selection.
pub trait EditSurface {
    fn selection(&self) -> Selection;
    fn set_selection(&mut self, selection: Selection);
    fn focus(&mut self);
}

/// In-memory surface used by the CLI binding and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    pub selection: Selection,
    pub focused: bool,
}

impl SelectionState {
    pub const fn new(selection: Selection) -> Self {
        Self {
            selection,
            focused: false,
        }
    }
}

impl EditSurface for SelectionState {
    fn selection(&self) -> Selection {
        self.selection
    }

    fn set_selection(&mut self, selection: Selection) {
        self.selection = selection;
    }

    fn focus(&mut self) {
        self.focused = true;
    }
}

/// Read the selection from `surface` and format `buffer` with `action`.
///
/// Returns the selection to restore once the surrounding UI has re-rendered,
/// or `None` when there is no surface to read from.
pub fn insert_formatting<S: EditSurface + ?Sized>(
    surface: Option<&S>,
    buffer: &mut EditorBuffer,
    action: FormatAction,
) -> Option<Selection> {
    let Some(surface) = surface else {
        debug!(?action, "no edit surface, formatting skipped");
        return None;
    };
    let (prefix, suffix) = action.tokens();
    Some(apply_to_buffer(buffer, surface.selection(), prefix, suffix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_collapsed_selection_inserts_both_markers() {
        let out = apply("hello", Selection::caret(5), "**", "**");
        assert_eq!(out.text, "hello****");
        assert_eq!(out.selection, Selection::new(7, 7));
    }

    #[test]
    fn test_selected_word_is_wrapped_and_stays_selected() {
        let out = apply("hello world", Selection::new(0, 5), "*", "*");
        assert_eq!(out.text, "*hello* world");
        assert_eq!(out.selection, Selection::new(1, 6));
    }

    #[test]
    fn test_line_prefix_leaves_cursor_after_prefix() {
        let out = FormatAction::Heading2.apply("Title", Selection::caret(0));
        assert_eq!(out.text, "## Title");
        assert_eq!(out.selection, Selection::caret(3));
    }

    #[test]
    fn test_link_wraps_label() {
        let out = FormatAction::Link.apply("see docs", Selection::new(4, 8));
        assert_eq!(out.text, "see [docs](https://example.com)");
        assert_eq!(out.selection, Selection::new(5, 9));
    }

    #[test]
    fn test_offsets_are_chars_not_bytes() {
        let out = apply("héllo wörld", Selection::new(6, 11), "`", "`");
        assert_eq!(out.text, "héllo `wörld`");
        assert_eq!(out.selection, Selection::new(7, 12));
    }

    #[test]
    fn test_out_of_range_selection_is_clamped() {
        let out = apply("abc", Selection::new(10, 2), "**", "**");
        assert_eq!(out.text, "ab**c**");
        assert_eq!(out.selection, Selection::new(4, 5));
    }

    #[test]
    fn test_missing_surface_is_noop() {
        let mut buf = EditorBuffer::from_text("hello");
        let restored = insert_formatting::<SelectionState>(None, &mut buf, FormatAction::Bold);
        assert_eq!(restored, None);
        assert_eq!(buf.text(), "hello");
        assert!(!buf.is_dirty());
    }

    #[test]
    fn test_insert_formatting_reads_surface_selection() {
        let mut buf = EditorBuffer::from_text("make this bold");
        let surface = SelectionState::new(Selection::new(10, 14));
        let restored = insert_formatting(Some(&surface), &mut buf, FormatAction::Bold);
        assert_eq!(buf.text(), "make this **bold**");
        assert_eq!(restored, Some(Selection::new(12, 16)));
    }

    #[test]
    fn test_toolbar_labels_are_unique() {
        let mut labels: Vec<_> = FormatAction::ALL.iter().map(|a| a.label()).collect();
        labels.sort_unstable();
        labels.dedup();
        assert_eq!(labels.len(), FormatAction::ALL.len());
    }

    proptest! {
        #[test]
        fn prop_removing_markers_restores_original(
            doc in "[a-zé \n*]{0,40}",
            a in 0usize..50,
            b in 0usize..50,
        ) {
            let out = apply(&doc, Selection::new(a, b), "**", "**");
            let sel = out.selection;
            let chars: Vec<char> = out.text.chars().collect();
            let restored: String = chars[..sel.start - 2]
                .iter()
                .chain(&chars[sel.start..sel.end])
                .chain(&chars[sel.end + 2..])
                .collect();
            prop_assert_eq!(restored, doc);
        }

        #[test]
        fn prop_buffer_matches_string_formatting(
            doc in "[a-zé \n]{0,40}",
            a in 0usize..50,
            b in 0usize..50,
            action in proptest::sample::select(FormatAction::ALL.to_vec()),
        ) {
            let (prefix, suffix) = action.tokens();
            let expected = apply(&doc, Selection::new(a, b), prefix, suffix);
            let mut buf = EditorBuffer::from_text(&doc);
            let sel = apply_to_buffer(&mut buf, Selection::new(a, b), prefix, suffix);
            prop_assert_eq!(buf.text(), expected.text);
            prop_assert_eq!(sel, expected.selection);
        }

        #[test]
        fn prop_selection_stays_within_document(
            doc in "[a-z \n]{0,30}",
            a in 0usize..40,
            b in 0usize..40,
        ) {
            let out = apply(&doc, Selection::new(a, b), "[", "](url)");
            let len = out.text.chars().count();
            prop_assert!(out.selection.start <= out.selection.end);
            prop_assert!(out.selection.end <= len);
        }
    }
}
