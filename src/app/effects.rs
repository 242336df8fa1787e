use tracing::{debug, warn};

use crate::app::{App, KeyAction, Message, map_key};
use crate::editor::{FormatAction, Selection, insert_formatting};
use crate::error::Result;
use crate::storage::{CONTENT_KEY, LEGACY_DARK_MODE_KEY, Storage, THEME_KEY};

impl<S: Storage> App<S> {
    /// Run `msg` through [`crate::app::update`], persist what changed, then
    /// apply any deferred selection to the edit surface.
    ///
    /// # Errors
    /// Returns an error if the store cannot be written. The in-memory model
    /// is updated either way.
    pub fn dispatch(&mut self, msg: Message) -> Result<()> {
        if crate::perf::is_debug_log_enabled() {
            crate::perf::log_event("app.dispatch", format!("{msg:?}"));
        }

        let model = std::mem::take(&mut self.model);
        self.model = crate::app::update(model, msg);

        let persisted = self.persist();
        self.flush_deferred();
        persisted
    }

    /// Format the surface's current selection with `action`.
    ///
    /// Without an edit surface there is no selection to read, so nothing
    /// happens and `Ok(None)` is returned.
    ///
    /// # Errors
    /// Returns an error if the new content cannot be persisted.
    pub fn format(&mut self, action: FormatAction) -> Result<Option<Selection>> {
        let Some(selection) =
            insert_formatting(self.surface.as_deref(), &mut self.model.buffer, action)
        else {
            return Ok(None);
        };
        self.dispatch(Message::Formatted(selection))?;
        Ok(Some(self.model.selection))
    }

    /// Handle a key chord from the edit surface.
    ///
    /// # Errors
    /// Returns an error if a formatting shortcut cannot persist its result.
    pub fn handle_key(&mut self, key: crossterm::event::KeyEvent) -> Result<KeyAction> {
        let action = map_key(key);
        match action {
            KeyAction::Format(format) => {
                self.format(format)?;
            }
            KeyAction::Suppress => debug!(?key, "shortcut suppressed"),
            KeyAction::Ignore => {}
        }
        Ok(action)
    }

    /// Write every dirty value. A failed write leaves its flag set, so the
    /// next dispatch retries it; the first error is returned.
    fn persist(&mut self) -> Result<()> {
        let content = if self.model.buffer.is_dirty() {
            self.storage
                .set(CONTENT_KEY, &self.model.text())
                .map(|()| self.model.buffer.mark_clean())
        } else {
            Ok(())
        };

        let theme = if self.model.theme_dirty {
            let written = self.storage.set(THEME_KEY, self.model.theme.as_stored());
            if written.is_ok() {
                self.model.theme_dirty = false;
                self.drop_legacy_theme_key();
            }
            written
        } else {
            Ok(())
        };

        if let Err(err) = &content {
            warn!(%err, "could not persist document");
        }
        if let Err(err) = &theme {
            warn!(%err, "could not persist theme preference");
        }
        content.and(theme)
    }

    /// The theme key now holds the preference.
    fn drop_legacy_theme_key(&mut self) {
        if self.storage.get(LEGACY_DARK_MODE_KEY).is_some()
            && let Err(err) = self.storage.remove(LEGACY_DARK_MODE_KEY)
        {
            warn!(%err, "could not remove legacy dark mode key");
        }
    }

    /// Apply the pending selection once the update and re-render are done.
    fn flush_deferred(&mut self) {
        let Some(selection) = self.model.take_pending_selection() else {
            return;
        };
        if let Some(surface) = self.surface.as_mut() {
            surface.focus();
            surface.set_selection(selection);
        }
    }
}
