/// Document model subsystem - Core data structures and text operations
///
/// This module contains the line buffer, reversible edit commands and their
/// undo history, the selection model, and the `Document` that ties them to
/// a cursor and a file.

pub mod document;
pub mod edit_commands;
pub mod movement;
pub mod selection;
pub mod text_buffer;
pub mod undo;

// Re-export main types for convenience
pub use document::{Document, LineEnding};
pub use edit_commands::EditCommand;
pub use movement::WordBoundary;
pub use selection::Selection;
pub use text_buffer::{Position, Range, TextBuffer};
pub use undo::{UndoGroup, UndoManager};
