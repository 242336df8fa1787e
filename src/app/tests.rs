use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::editor::{EditSurface, FormatAction, Selection, SelectionState};
use crate::error::{Error, Result};
use crate::render::RenderEngine;
use crate::storage::{
    CONTENT_KEY, DEFAULT_DOCUMENT, LEGACY_DARK_MODE_KEY, MemoryStorage, Storage, THEME_KEY,
};
use crate::theme::{Appearance, ThemePreference};

use super::{App, KeyAction, Message, Model, ViewMode, parse_key_chord, update};

fn create_test_model(text: &str) -> Model {
    Model::new(
        text,
        ThemePreference::FollowSystem,
        Appearance::Dark,
        RenderEngine::Pipeline,
    )
}

fn create_test_app(text: &str) -> App<MemoryStorage> {
    let mut storage = MemoryStorage::new();
    storage.set(CONTENT_KEY, text).unwrap();
    App::load(storage, Appearance::Dark, RenderEngine::Pipeline)
}

/// Records surface calls so tests can check ordering.
#[derive(Clone, Default)]
struct RecordingSurface {
    selection: Selection,
    calls: Rc<RefCell<Vec<String>>>,
}

impl EditSurface for RecordingSurface {
    fn selection(&self) -> Selection {
        self.selection
    }

    fn set_selection(&mut self, selection: Selection) {
        self.selection = selection;
        self.calls.borrow_mut().push(format!("select {selection}"));
    }

    fn focus(&mut self) {
        self.calls.borrow_mut().push("focus".to_string());
    }
}

/// Store whose writes fail while `offline` is set.
#[derive(Default)]
struct FlakyStorage {
    inner: MemoryStorage,
    offline: Rc<Cell<bool>>,
}

impl Storage for FlakyStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        if self.offline.get() {
            return Err(Error::Storage("offline".to_string()));
        }
        self.inner.set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if self.offline.get() {
            return Err(Error::Storage("offline".to_string()));
        }
        self.inner.remove(key)
    }
}

#[test]
fn test_new_model_renders_preview() {
    let model = create_test_model("# Hi");
    assert_eq!(model.preview_html, "<h1>Hi</h1>");
}

#[test]
fn test_set_content_rerenders_preview() {
    let model = create_test_model("# Hi");
    let model = update(model, Message::SetContent("**b**".to_string()));
    assert_eq!(model.preview_html, "<p><strong>b</strong></p>");
    assert!(model.buffer.is_dirty());
}

#[test]
fn test_set_content_clamps_selection() {
    let model = create_test_model("hello world");
    let model = update(model, Message::Select(Selection::new(6, 11)));
    let model = update(model, Message::SetContent("hi".to_string()));
    assert_eq!(model.selection, Selection::new(2, 2));
}

#[test]
fn test_select_clamps_and_normalizes() {
    let model = create_test_model("hello");
    let model = update(model, Message::Select(Selection::new(40, 2)));
    assert_eq!(model.selection, Selection::new(2, 5));
}

#[test]
fn test_insert_text_replaces_selection() {
    let model = create_test_model("hello world");
    let model = update(model, Message::Select(Selection::new(6, 11)));
    let model = update(model, Message::InsertText("there".to_string()));
    assert_eq!(model.text(), "hello there");
    assert_eq!(model.selection, Selection::caret(11));
}

#[test]
fn test_format_sets_pending_selection() {
    let model = create_test_model("hello world");
    let model = update(model, Message::Select(Selection::new(0, 5)));
    let mut model = update(model, Message::Format(FormatAction::Italic));
    assert_eq!(model.text(), "*hello* world");
    assert_eq!(model.selection, Selection::new(1, 6));
    assert_eq!(model.preview_html, "<p><em>hello</em> world</p>");
    assert_eq!(model.take_pending_selection(), Some(Selection::new(1, 6)));
    assert_eq!(model.take_pending_selection(), None);
}

#[test]
fn test_format_collapsed_caret_at_end() {
    let model = create_test_model("hello");
    let model = update(model, Message::Select(Selection::caret(5)));
    let model = update(model, Message::Format(FormatAction::Bold));
    assert_eq!(model.text(), "hello****");
    assert_eq!(model.selection, Selection::new(7, 7));
}

#[test]
fn test_reset_document_restores_template() {
    let model = create_test_model("scratch");
    let model = update(model, Message::ResetDocument);
    assert_eq!(model.text(), DEFAULT_DOCUMENT);
    assert!(model.preview_html.contains("<h1>Welcome to Markdown Editor</h1>"));
}

#[test]
fn test_cycle_theme_order() {
    let model = create_test_model("");
    let model = update(model, Message::CycleTheme);
    assert_eq!(model.theme, ThemePreference::Dark);
    let model = update(model, Message::CycleTheme);
    assert_eq!(model.theme, ThemePreference::Light);
    let model = update(model, Message::CycleTheme);
    assert_eq!(model.theme, ThemePreference::FollowSystem);
}

#[test]
fn test_system_signal_only_matters_when_following() {
    let model = create_test_model("");
    let model = update(model, Message::SystemAppearanceChanged(Appearance::Light));
    assert_eq!(model.appearance(), Appearance::Light);

    let model = update(model, Message::SetTheme(ThemePreference::Dark));
    let model = update(model, Message::SystemAppearanceChanged(Appearance::Light));
    assert_eq!(model.appearance(), Appearance::Dark);
}

#[test]
fn test_set_engine_rerenders_with_library() {
    let model = create_test_model("~~gone~~");
    assert!(!model.preview_html.contains("<del>"));
    let model = update(model, Message::SetEngine(RenderEngine::Library));
    assert!(model.preview_html.contains("<del>gone</del>"));
}

#[test]
fn test_view_mode_and_status_line() {
    let model = create_test_model("a b  c");
    assert_eq!(model.status_line(), "Words: 3 | Characters: 6 | Mode: split");
    let model = update(model, Message::SetViewMode(ViewMode::Preview));
    assert_eq!(model.status_line(), "Words: 3 | Characters: 6 | Mode: preview");
    assert!(!model.view_mode.shows_editor());
    assert!(model.view_mode.shows_preview());
}

#[test]
fn test_app_load_falls_back_to_template() {
    let app = App::load(MemoryStorage::new(), Appearance::Dark, RenderEngine::Pipeline);
    assert_eq!(app.model().text(), DEFAULT_DOCUMENT);
    assert_eq!(app.model().theme, ThemePreference::FollowSystem);
}

#[test]
fn test_app_persists_content_on_every_change() {
    let mut app = create_test_app("start");
    app.dispatch(Message::SetContent("next".to_string())).unwrap();
    assert_eq!(app.storage().get(CONTENT_KEY), Some("next".to_string()));
    assert!(!app.model().buffer.is_dirty());
}

#[test]
fn test_app_persists_theme_and_migrates_legacy_key() {
    let mut storage = MemoryStorage::new();
    storage.set(LEGACY_DARK_MODE_KEY, "true").unwrap();
    let mut app = App::load(storage, Appearance::Light, RenderEngine::Pipeline);
    assert_eq!(app.model().theme, ThemePreference::Dark);

    app.dispatch(Message::CycleTheme).unwrap();
    assert_eq!(app.storage().get(THEME_KEY), Some("false".to_string()));
    assert_eq!(app.storage().get(LEGACY_DARK_MODE_KEY), None);
}

#[test]
fn test_view_mode_is_not_persisted() {
    let mut app = create_test_app("x");
    app.dispatch(Message::SetViewMode(ViewMode::Write)).unwrap();
    assert_eq!(app.storage().get(THEME_KEY), None);
}

#[test]
fn test_format_without_surface_is_noop() {
    let mut app = create_test_app("hello");
    assert_eq!(app.format(FormatAction::Bold).unwrap(), None);
    assert_eq!(app.model().text(), "hello");
}

#[test]
fn test_format_reads_surface_and_restores_selection_after_render() {
    let surface = RecordingSurface {
        selection: Selection::new(0, 5),
        ..RecordingSurface::default()
    };
    let calls = Rc::clone(&surface.calls);
    let mut app = create_test_app("hello world").with_surface(Box::new(surface));

    let restored = app.format(FormatAction::Bold).unwrap();
    assert_eq!(restored, Some(Selection::new(2, 7)));
    assert_eq!(app.model().text(), "**hello** world");
    assert_eq!(app.model().preview_html, "<p><strong>hello</strong> world</p>");
    assert_eq!(*calls.borrow(), vec!["focus".to_string(), "select 2..7".to_string()]);
    assert_eq!(app.surface().map(|s| s.selection()), Some(Selection::new(2, 7)));
    assert_eq!(app.storage().get(CONTENT_KEY), Some("**hello** world".to_string()));
}

#[test]
fn test_heading_prefix_leaves_cursor_after_marker() {
    let surface = SelectionState::new(Selection::caret(0));
    let mut app = create_test_app("Title").with_surface(Box::new(surface));
    app.format(FormatAction::Heading2).unwrap();
    assert_eq!(app.model().text(), "## Title");
    assert_eq!(app.model().selection, Selection::caret(3));
}

#[test]
fn test_handle_key_formats_and_suppresses() {
    let surface = SelectionState::new(Selection::new(0, 2));
    let mut app = create_test_app("hi").with_surface(Box::new(surface));

    let action = app.handle_key(parse_key_chord("ctrl+i").unwrap()).unwrap();
    assert_eq!(action, KeyAction::Format(FormatAction::Italic));
    assert_eq!(app.model().text(), "*hi*");

    let action = app.handle_key(parse_key_chord("ctrl+s").unwrap()).unwrap();
    assert_eq!(action, KeyAction::Suppress);
    assert_eq!(app.model().text(), "*hi*");
}

#[test]
fn test_detach_surface_disables_formatting() {
    let mut app =
        create_test_app("hi").with_surface(Box::new(SelectionState::new(Selection::new(0, 2))));
    assert!(app.detach_surface().is_some());
    assert_eq!(app.format(FormatAction::Code).unwrap(), None);
    assert_eq!(app.model().text(), "hi");
}

#[test]
fn test_failed_writes_are_retried_on_next_dispatch() {
    let storage = FlakyStorage::default();
    let offline = Rc::clone(&storage.offline);
    let mut app = App::load(storage, Appearance::Dark, RenderEngine::Pipeline);

    offline.set(true);
    assert!(app.dispatch(Message::SetContent("draft".to_string())).is_err());
    assert!(app.dispatch(Message::CycleTheme).is_err());
    assert_eq!(app.storage().get(THEME_KEY), None);

    offline.set(false);
    app.dispatch(Message::SetViewMode(ViewMode::Write)).unwrap();
    assert_eq!(app.storage().get(CONTENT_KEY), Some("draft".to_string()));
    assert_eq!(app.storage().get(THEME_KEY), Some("true".to_string()));
}

#[test]
fn test_theme_is_written_even_when_content_write_fails() {
    let storage = FlakyStorage::default();
    let offline = Rc::clone(&storage.offline);
    let mut app = App::load(storage, Appearance::Dark, RenderEngine::Pipeline);

    offline.set(true);
    assert!(app.dispatch(Message::SetContent("draft".to_string())).is_err());
    offline.set(false);
    app.dispatch(Message::SetTheme(ThemePreference::Light)).unwrap();
    assert_eq!(app.storage().get(THEME_KEY), Some("false".to_string()));
    assert_eq!(app.storage().get(CONTENT_KEY), Some("draft".to_string()));
}

#[test]
fn test_content_change_keeps_legacy_key_until_theme_saved() {
    let mut storage = MemoryStorage::new();
    storage.set(LEGACY_DARK_MODE_KEY, "false").unwrap();
    let mut app = App::load(storage, Appearance::Dark, RenderEngine::Pipeline);

    app.dispatch(Message::SetContent("x".to_string())).unwrap();
    assert_eq!(app.storage().get(LEGACY_DARK_MODE_KEY), Some("false".to_string()));
    assert_eq!(app.storage().get(THEME_KEY), None);
}

#[test]
fn test_formatted_message_selects_and_defers_restore() {
    let model = create_test_model("hello");
    let mut model = update(model, Message::Formatted(Selection::new(2, 40)));
    assert_eq!(model.selection, Selection::new(2, 5));
    assert_eq!(model.take_pending_selection(), Some(Selection::new(2, 5)));
}
