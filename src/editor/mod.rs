//! Document editing: a rope-backed buffer, char-offset selections and
//! cursor-aware formatting insertion.

mod buffer;
pub mod format;
mod selection;

pub use buffer::EditorBuffer;
pub use format::{EditSurface, FormatAction, Formatted, SelectionState, insert_formatting};
pub use selection::Selection;
