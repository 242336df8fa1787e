//! Application state and side effects.
//!
//! This module implements The Elm Architecture (TEA):
//! - [`Model`]: The complete editor state
//! - [`Message`]: All possible events and actions
//! - [`update`]: Pure function for state transitions
//! - [`App`]: Owns storage and the edit surface, runs effects around `update`

mod effects;
mod input;
mod model;
mod update;

pub use input::{KeyAction, map_key, parse_key_chord};
pub use model::{Model, ViewMode};
pub use update::{Message, update};

use crate::editor::EditSurface;
use crate::render::RenderEngine;
use crate::storage::{self, Storage};
use crate::theme::Appearance;

/// Owns the model, the key-value store and the (optional) edit surface.
pub struct App<S: Storage> {
    model: Model,
    storage: S,
    surface: Option<Box<dyn EditSurface>>,
}

impl<S: Storage> App<S> {
    /// Load the stored document and theme preference from `storage`.
    pub fn load(storage: S, system_appearance: Appearance, engine: RenderEngine) -> Self {
        let text = storage::load_document(&storage);
        let theme = storage::load_theme(&storage);
        Self {
            model: Model::new(&text, theme, system_appearance, engine),
            storage,
            surface: None,
        }
    }

    /// Attach the component that owns the visible cursor.
    pub fn with_surface(mut self, surface: Box<dyn EditSurface>) -> Self {
        self.surface = Some(surface);
        self
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn surface(&self) -> Option<&dyn EditSurface> {
        self.surface.as_deref()
    }

    pub fn detach_surface(&mut self) -> Option<Box<dyn EditSurface>> {
        self.surface.take()
    }
}

impl<S: Storage> std::fmt::Debug for App<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("model", &self.model)
            .field("has_surface", &self.surface.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests;
