use super::text_buffer::{Position, Range, TextBuffer};

/// A reversible change to a `TextBuffer`.
///
/// Each variant carries everything needed to apply and invert itself, so a
/// command never holds a reference to the document it was made for. Both
/// directions return the cursor position the edit leaves behind. Commands
/// are only valid when applied and inverted in history order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditCommand {
    InsertChar {
        at: Position,
        ch: char,
    },
    /// A tab typed as `width` spaces.
    InsertTab {
        at: Position,
        width: usize,
    },
    /// Pasted text, possibly spanning several lines.
    InsertText {
        at: Position,
        text: String,
    },
    /// Line split with auto-indent. `suffix` is the text that moved to the
    /// new line, `indent` the number of spaces put in front of it.
    NewLine {
        at: Position,
        indent: usize,
        suffix: String,
    },
    /// Removal of the character at `at` (the one before the old cursor).
    DeleteChar {
        at: Position,
        ch: char,
    },
    /// Backspace at column 0: line `line` is appended to the previous line,
    /// whose length was `join_at`.
    MergeLines {
        line: usize,
        join_at: usize,
    },
    DeleteRange {
        range: Range,
        text: String,
    },
    /// Whole-buffer replacement, used when a remote snapshot overwrites the
    /// local text.
    ReplaceAll {
        before: Vec<String>,
        after: Vec<String>,
    },
}

impl EditCommand {
    pub fn apply(&self, buffer: &mut TextBuffer) -> Position {
        match self {
            EditCommand::InsertChar { at, ch } => {
                let mut encoded = [0u8; 4];
                buffer.insert_str(*at, ch.encode_utf8(&mut encoded));
                Position::new(at.line, at.column + 1)
            }
            EditCommand::InsertTab { at, width } => {
                buffer.insert_str(*at, &" ".repeat(*width));
                Position::new(at.line, at.column + width)
            }
            EditCommand::InsertText { at, text } => buffer.insert_text(*at, text),
            EditCommand::NewLine { at, indent, suffix } => {
                let line_end = Position::new(at.line, buffer.line_len(at.line));
                debug_assert_eq!(buffer.text_in(Range::new(*at, line_end)), *suffix);
                buffer.split_line(*at, &" ".repeat(*indent));
                Position::new(at.line + 1, *indent)
            }
            EditCommand::DeleteChar { at, .. } => {
                buffer.remove_chars(*at, 1);
                *at
            }
            EditCommand::MergeLines { line, join_at } => {
                buffer.join_with_next(line - 1);
                Position::new(line - 1, *join_at)
            }
            EditCommand::DeleteRange { range, .. } => {
                buffer.delete_range(*range);
                range.start
            }
            EditCommand::ReplaceAll { after, .. } => {
                buffer.replace_lines(after.clone());
                buffer.end_position()
            }
        }
    }

    pub fn invert(&self, buffer: &mut TextBuffer) -> Position {
        match self {
            EditCommand::InsertChar { at, .. } => {
                buffer.remove_chars(*at, 1);
                *at
            }
            EditCommand::InsertTab { at, width } => {
                buffer.remove_chars(*at, *width);
                *at
            }
            EditCommand::InsertText { at, text } => {
                let end = end_of_inserted(*at, text);
                buffer.delete_range(Range::new(*at, end));
                *at
            }
            EditCommand::NewLine { at, indent, suffix } => {
                // Drop the created line and put the exact suffix back.
                buffer.join_with_next(at.line);
                buffer.remove_chars(*at, indent + suffix.chars().count());
                buffer.insert_str(*at, suffix);
                *at
            }
            EditCommand::DeleteChar { at, ch } => {
                let mut encoded = [0u8; 4];
                buffer.insert_str(*at, ch.encode_utf8(&mut encoded));
                Position::new(at.line, at.column + 1)
            }
            EditCommand::MergeLines { line, join_at } => {
                buffer.split_line(Position::new(line - 1, *join_at), "");
                Position::new(*line, 0)
            }
            EditCommand::DeleteRange { range, text } => {
                // Rebuild the removed lines from the captured text.
                let end = buffer.insert_text(range.start, text);
                debug_assert_eq!(end, range.end);
                range.end
            }
            EditCommand::ReplaceAll { before, .. } => {
                buffer.replace_lines(before.clone());
                buffer.end_position()
            }
        }
    }

    /// Short name used in log output.
    pub fn kind(&self) -> &'static str {
        match self {
            EditCommand::InsertChar { .. } => "insert-char",
            EditCommand::InsertTab { .. } => "insert-tab",
            EditCommand::InsertText { .. } => "insert-text",
            EditCommand::NewLine { .. } => "new-line",
            EditCommand::DeleteChar { .. } => "delete-char",
            EditCommand::MergeLines { .. } => "merge-lines",
            EditCommand::DeleteRange { .. } => "delete-range",
            EditCommand::ReplaceAll { .. } => "replace-all",
        }
    }
}

/// Position just after `text` once it has been inserted at `at`.
fn end_of_inserted(at: Position, text: &str) -> Position {
    match text.rfind('\n') {
        Some(last_newline) => Position::new(
            at.line + text.matches('\n').count(),
            text[last_newline + 1..].chars().count(),
        ),
        None => Position::new(at.line, at.column + text.chars().count()),
    }
}
