use crate::editor::{EditorBuffer, Selection};
use crate::render::RenderEngine;
use crate::stats::{self, DocumentStats};
use crate::theme::{Appearance, ThemePreference};

/// Which panes the editor shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ViewMode {
    Write,
    #[default]
    Split,
    Preview,
}

impl ViewMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Write => "write",
            Self::Split => "split",
            Self::Preview => "preview",
        }
    }

    pub const fn shows_editor(self) -> bool {
        matches!(self, Self::Write | Self::Split)
    }

    pub const fn shows_preview(self) -> bool {
        matches!(self, Self::Split | Self::Preview)
    }
}

/// The complete editor state.
///
/// All state lives here; persistence and the edit surface are handled by
/// [`crate::app::App`] around calls to [`crate::app::update`].
#[derive(Debug, Default)]
pub struct Model {
    pub buffer: EditorBuffer,
    /// Always clamped to the buffer and normalized.
    pub selection: Selection,
    pub theme: ThemePreference,
    /// Last known system light/dark signal.
    pub system_appearance: Appearance,
    pub view_mode: ViewMode,
    pub engine: RenderEngine,
    /// Rendered preview of `buffer`, refreshed on every content change.
    pub preview_html: String,
    pub(super) pending_selection: Option<Selection>,
    /// Set when `theme` changes, cleared once the store has it.
    pub(super) theme_dirty: bool,
}

impl Model {
    pub fn new(
        text: &str,
        theme: ThemePreference,
        system_appearance: Appearance,
        engine: RenderEngine,
    ) -> Self {
        let mut model = Self {
            buffer: EditorBuffer::from_text(text),
            selection: Selection::default(),
            theme,
            system_appearance,
            view_mode: ViewMode::default(),
            engine,
            preview_html: String::new(),
            pending_selection: None,
            theme_dirty: false,
        };
        model.refresh_preview();
        model
    }

    pub fn text(&self) -> String {
        self.buffer.text()
    }

    /// Resolved light/dark appearance.
    pub const fn appearance(&self) -> Appearance {
        self.theme.resolve(self.system_appearance)
    }

    pub fn stats(&self) -> DocumentStats {
        DocumentStats::of(&self.buffer.text())
    }

    pub fn status_line(&self) -> String {
        stats::status_line(self.stats(), self.view_mode)
    }

    /// Selection waiting to be applied to the edit surface.
    pub fn take_pending_selection(&mut self) -> Option<Selection> {
        self.pending_selection.take()
    }

    pub(super) fn refresh_preview(&mut self) {
        let _scope = crate::perf::scope("app.refresh_preview");
        self.preview_html = self.engine.render(&self.buffer.text(), self.appearance());
    }

    pub(super) fn clamp_selection(&mut self) {
        self.selection = self.buffer.clamp(self.selection);
    }
}
