use crate::app::{Model, ViewMode};
use crate::editor::format::{self, FormatAction};
use crate::editor::{Selection, SelectionState};
use crate::render::RenderEngine;
use crate::storage::DEFAULT_DOCUMENT;
use crate::theme::{Appearance, ThemePreference};

/// All events and actions the editor reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    // Content
    /// Replace the whole document
    SetContent(String),
    /// Replace the selection with typed text
    InsertText(String),
    /// Restore the welcome document
    ResetDocument,

    // Selection and formatting
    /// Move the selection (clamped to the document)
    Select(Selection),
    /// Wrap or prefix the selection with a toolbar action's markers
    Format(FormatAction),
    /// The buffer was formatted in place; select the formatted text and
    /// restore it on the edit surface
    Formatted(Selection),

    // View
    SetViewMode(ViewMode),
    SetEngine(RenderEngine),

    // Theme
    /// Follow system, then dark, then light
    CycleTheme,
    SetTheme(ThemePreference),
    /// The environment's light/dark signal changed
    SystemAppearanceChanged(Appearance),
}

/// Apply `msg` to `model`.
///
/// Pure: no I/O. The preview is re-rendered whenever the content or the
/// resolved appearance changes. Formatting leaves a pending selection for
/// the caller to apply once this returns.
pub fn update(mut model: Model, msg: Message) -> Model {
    let appearance_before = model.appearance();
    let theme_before = model.theme;
    let mut content_changed = false;

    match msg {
        Message::SetContent(text) => {
            model.buffer.set_text(&text);
            model.clamp_selection();
            content_changed = true;
        }
        Message::InsertText(text) => {
            model.selection = model.buffer.replace(model.selection, &text);
            content_changed = true;
        }
        Message::ResetDocument => {
            model.buffer.set_text(DEFAULT_DOCUMENT);
            model.selection = Selection::default();
            content_changed = true;
        }
        Message::Select(selection) => {
            model.selection = model.buffer.clamp(selection);
        }
        Message::Format(action) => {
            let surface = SelectionState::new(model.selection);
            if let Some(selection) =
                format::insert_formatting(Some(&surface), &mut model.buffer, action)
            {
                model.selection = selection;
                model.pending_selection = Some(selection);
                content_changed = true;
            }
        }
        Message::Formatted(selection) => {
            model.selection = model.buffer.clamp(selection);
            model.pending_selection = Some(model.selection);
            content_changed = true;
        }
        Message::SetViewMode(mode) => {
            model.view_mode = mode;
        }
        Message::SetEngine(engine) => {
            if model.engine != engine {
                model.engine = engine;
                content_changed = true;
            }
        }
        Message::CycleTheme => {
            model.theme = model.theme.cycle();
        }
        Message::SetTheme(theme) => {
            model.theme = theme;
        }
        Message::SystemAppearanceChanged(appearance) => {
            model.system_appearance = appearance;
        }
    }

    if model.theme != theme_before {
        model.theme_dirty = true;
    }

    // Highlighting colors depend on the appearance, so only the library
    // engine needs a refresh when it flips.
    let appearance_changed = model.appearance() != appearance_before;
    if content_changed || (appearance_changed && model.engine == RenderEngine::Library) {
        model.refresh_preview();
    }
    model
}
