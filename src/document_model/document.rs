use super::edit_commands::EditCommand;
use super::movement::WordBoundary;
use super::selection::Selection;
use super::text_buffer::{Position, Range, TextBuffer};
use super::undo::{UndoGroup, UndoManager};
use crate::config::RcConfig;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use unicode_width::UnicodeWidthChar;

const BACKSPACE: char = '\u{8}';
const DELETE: char = '\u{7f}';

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LineEnding {
    Unix,    // \n (LF)
    Windows, // \r\n (CRLF)
    Mac,     // \r (CR)
}

impl LineEnding {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Unix => "\n",
            LineEnding::Windows => "\r\n",
            LineEnding::Mac => "\r",
        }
    }

    pub fn detect(content: &str) -> Self {
        if content.contains("\r\n") {
            LineEnding::Windows
        } else if content.contains('\r') {
            LineEnding::Mac
        } else {
            LineEnding::Unix
        }
    }

    /// Converts `\r\n` and lone `\r` line breaks to `\n`.
    pub fn normalize(text: &str) -> String {
        text.replace("\r\n", "\n").replace('\r', "\n")
    }

    /// Splits file content into lines. A trailing terminator does not
    /// produce an extra empty line; empty content yields one empty line.
    pub fn split_lines(content: &str) -> Vec<String> {
        let normalized = Self::normalize(content);
        let body = normalized.strip_suffix('\n').unwrap_or(&normalized);
        body.split('\n').map(str::to_string).collect()
    }
}

/// An open text file: lines, cursor, selection and edit history.
///
/// Every mutation goes through an `EditCommand` recorded in the undo
/// history. Index parameters given as `None` default to the cursor.
/// Out-of-range indices are programming errors and panic.
#[derive(Debug, Clone)]
pub struct Document {
    buffer: TextBuffer,
    cursor: Position,
    pub(super) selection: Selection,
    undo_manager: UndoManager,
    filename: Option<PathBuf>,
    opened: bool,
    modified: bool,
    revision: u64,
    line_ending: LineEnding,
    tab_size: usize,
    word_boundary: WordBoundary,
}

impl Document {
    pub fn new(config: &RcConfig) -> Self {
        Self {
            buffer: TextBuffer::new(),
            cursor: Position::default(),
            selection: Selection::new(),
            undo_manager: UndoManager::with_capacity(config.undo_history_size),
            filename: None,
            opened: false,
            modified: false,
            revision: 0,
            line_ending: LineEnding::Unix,
            tab_size: config.tab_size,
            word_boundary: config.word_boundary,
        }
    }

    /// In-memory document holding `text`. Any line break style is accepted.
    pub fn from_text(text: &str, config: &RcConfig) -> Self {
        let mut document = Self::new(config);
        document.buffer = TextBuffer::from_text(&LineEnding::normalize(text));
        document
    }

    /// Loads a file. An unreadable file leaves a single empty line and an
    /// unopened document whose `write` does nothing.
    pub fn open(path: impl Into<PathBuf>, config: &RcConfig) -> Self {
        let path = path.into();
        let mut document = Self::new(config);
        match fs::read_to_string(&path) {
            Ok(content) => {
                document.line_ending = LineEnding::detect(&content);
                document.buffer = TextBuffer::from_lines(LineEnding::split_lines(&content));
                document.opened = true;
                log::info!(
                    "opened {} ({} lines)",
                    path.display(),
                    document.buffer.line_count()
                );
            }
            Err(e) => {
                log::warn!("could not open {}: {e}", path.display());
            }
        }
        document.filename = Some(path);
        document
    }

    pub fn is_open(&self) -> bool {
        self.opened
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Counter bumped by every change to the text, including undo and redo.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn filename(&self) -> Option<&Path> {
        self.filename.as_deref()
    }

    pub fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    pub fn word_boundary(&self) -> WordBoundary {
        self.word_boundary
    }

    /// Writes every line followed by the line terminator. Returns false for
    /// unopened documents and on I/O errors.
    pub fn write(&mut self) -> bool {
        match self.try_write() {
            Ok(bytes) => {
                log::info!("wrote {bytes} bytes to {}", self.display_name());
                true
            }
            Err(e) => {
                log::warn!("could not write {}: {e}", self.display_name());
                false
            }
        }
    }

    pub fn try_write(&mut self) -> Result<usize, io::Error> {
        let filename = match (&self.filename, self.opened) {
            (Some(filename), true) => filename.clone(),
            _ => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "document was not opened from a file",
                ));
            }
        };
        let content = self.file_content();
        fs::write(&filename, &content)?;
        self.modified = false;
        Ok(content.len())
    }

    /// Binds the document to `path` and writes it there.
    pub fn save_as(&mut self, path: impl Into<PathBuf>) -> Result<usize, io::Error> {
        self.filename = Some(path.into());
        self.opened = true;
        self.try_write()
    }

    fn file_content(&self) -> String {
        let ending = self.line_ending.as_str();
        let mut content = String::new();
        for line in self.buffer.lines() {
            content.push_str(line);
            content.push_str(ending);
        }
        content
    }

    pub fn display_name(&self) -> String {
        self.filename
            .as_ref()
            .map_or_else(|| "[No Name]".to_string(), |p| p.display().to_string())
    }

    // Text access

    pub fn lines(&self) -> &[String] {
        self.buffer.lines()
    }

    pub fn line(&self, line: usize) -> &str {
        self.buffer.line(line)
    }

    pub fn line_count(&self) -> usize {
        self.buffer.line_count()
    }

    pub fn line_len(&self, line: usize) -> usize {
        self.buffer.line_len(line)
    }

    /// Whole text, lines joined with `\n`.
    pub fn text(&self) -> String {
        self.buffer.text()
    }

    pub fn cursor(&self) -> Position {
        self.cursor
    }

    /// Places the cursor. Panics when `pos` is outside the text.
    pub fn set_cursor(&mut self, pos: Position) {
        assert!(
            self.buffer.is_valid(pos),
            "cursor {pos} out of bounds (line count {})",
            self.buffer.line_count()
        );
        self.cursor = pos;
    }

    /// Terminal column of `pos`, counting wide characters as two cells.
    pub fn display_column(&self, pos: Position) -> usize {
        self.buffer
            .line(pos.line)
            .chars()
            .take(pos.column)
            .map(|c| if c == '\t' { self.tab_size } else { c.width().unwrap_or(0) })
            .sum()
    }

    // Selection view

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn has_selection(&self) -> bool {
        self.selection.normalized_range().is_some()
    }

    pub fn normalized_selection(&self) -> Option<Range> {
        self.selection.normalized_range()
    }

    pub fn selected_text(&self) -> Option<String> {
        self.normalized_selection()
            .map(|range| self.buffer.text_in(range))
    }

    pub fn start_selection(&mut self, pos: Position) {
        assert!(self.buffer.is_valid(pos), "selection start {pos} out of bounds");
        self.selection.start_selection(pos);
    }

    /// Moves the active end of the selection and the cursor to `pos`.
    pub fn update_selection(&mut self, pos: Position) {
        self.set_cursor(pos);
        self.selection.update_selection(pos);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear_selection();
    }

    pub fn select_all(&mut self) {
        let end = self.buffer.end_position();
        self.selection.start_selection(Position::default());
        self.selection.update_selection(end);
        self.cursor = end;
    }

    // Editing

    /// Inserts a character. A tab becomes `tab_size` spaces, a line break
    /// splits the line and a backspace deletes. An active selection is
    /// replaced.
    pub fn insert_character(&mut self, ch: char, line: Option<usize>, pos: Option<usize>) -> bool {
        match ch {
            '\n' | '\r' => return self.new_line(line, pos),
            BACKSPACE | DELETE => return self.delete_character(line, pos),
            _ => {}
        }

        let mut group = UndoGroup::new(self.cursor);
        let at = match self.delete_selection_into(&mut group) {
            Some(after_delete) => after_delete,
            None => self.target(line, pos),
        };

        let command = if ch == '\t' {
            EditCommand::InsertTab {
                at,
                width: self.tab_size,
            }
        } else {
            EditCommand::InsertChar { at, ch }
        };
        group.apply(command, &mut self.buffer);
        self.commit(group)
    }

    /// Splits the line at `pos`. The new line starts with as many spaces as
    /// the original line is indented, wherever the split falls.
    pub fn new_line(&mut self, line: Option<usize>, pos: Option<usize>) -> bool {
        let mut group = UndoGroup::new(self.cursor);
        let at = match self.delete_selection_into(&mut group) {
            Some(after_delete) => after_delete,
            None => self.target(line, pos),
        };

        let indent = self.buffer.leading_spaces(at.line);
        let line_end = Position::new(at.line, self.buffer.line_len(at.line));
        let suffix = self.buffer.text_in(Range::new(at, line_end));
        group.apply(EditCommand::NewLine { at, indent, suffix }, &mut self.buffer);
        self.commit(group)
    }

    /// Backspace: deletes the character before `pos`, merging with the
    /// previous line at column 0. Returns false at the start of the file.
    pub fn delete_character(&mut self, line: Option<usize>, pos: Option<usize>) -> bool {
        let mut group = UndoGroup::new(self.cursor);
        if self.delete_selection_into(&mut group).is_some() {
            return self.commit(group);
        }

        let at = self.target(line, pos);
        let command = if at.column > 0 {
            let deleted = Position::new(at.line, at.column - 1);
            let Some(ch) = self.buffer.char_at(deleted) else {
                return false;
            };
            EditCommand::DeleteChar { at: deleted, ch }
        } else if at.line > 0 {
            EditCommand::MergeLines {
                line: at.line,
                join_at: self.buffer.line_len(at.line - 1),
            }
        } else {
            // Can't delete before the start of the file
            return false;
        };
        group.apply(command, &mut self.buffer);
        self.commit(group)
    }

    /// Deletes the half-open range between two positions, given in either
    /// order. Returns false for an empty range.
    pub fn delete_range(
        &mut self,
        start_line: usize,
        start_char: usize,
        end_line: usize,
        end_char: usize,
    ) -> bool {
        let a = Position::new(start_line, start_char);
        let b = Position::new(end_line, end_char);
        assert!(
            self.buffer.is_valid(a) && self.buffer.is_valid(b),
            "range {a}..{b} out of bounds"
        );
        let range = Range::new(a, b);
        if range.is_empty() {
            return false;
        }

        let mut group = UndoGroup::new(self.cursor);
        let text = self.buffer.text_in(range);
        group.apply(EditCommand::DeleteRange { range, text }, &mut self.buffer);
        self.commit(group)
    }

    /// Deletes the word before the cursor together with any boundary
    /// characters between it and the cursor.
    pub fn delete_group(&mut self) -> bool {
        if self.has_selection() {
            return self.delete_character(None, None);
        }
        let cursor = self.cursor;
        if cursor.column == 0 {
            // Line merge, or nothing at the start of the file
            return self.delete_character(None, None);
        }

        let chars: Vec<char> = self.buffer.line(cursor.line).chars().collect();
        let start = self.word_boundary.word_start_before(&chars, cursor.column);
        self.delete_range(cursor.line, start, cursor.line, cursor.column)
    }

    /// Returns the selected text and deletes it.
    pub fn cut_selection(&mut self) -> Option<String> {
        let text = self.selected_text()?;
        self.delete_character(None, None);
        Some(text)
    }

    /// Inserts text at the cursor, replacing any selection. Line breaks in
    /// `text` split lines without auto-indent.
    pub fn paste(&mut self, text: &str) -> bool {
        let text = LineEnding::normalize(text);
        let mut group = UndoGroup::new(self.cursor);
        let at = self
            .delete_selection_into(&mut group)
            .unwrap_or(self.cursor);
        if !text.is_empty() {
            group.apply(EditCommand::InsertText { at, text }, &mut self.buffer);
        }
        self.commit(group)
    }

    /// Replaces the whole text, keeping the cursor where it was as far as
    /// the new text allows. Undoable. Returns false if nothing changed.
    pub fn replace_all_text(&mut self, text: &str) -> bool {
        let after = TextBuffer::from_text(&LineEnding::normalize(text))
            .lines()
            .to_vec();
        if after.as_slice() == self.buffer.lines() {
            return false;
        }

        let mut group = UndoGroup::new(self.cursor);
        let before = self.buffer.lines().to_vec();
        group.apply(EditCommand::ReplaceAll { before, after }, &mut self.buffer);
        group.cursor_after = self.buffer.clamp(self.cursor);
        self.commit(group)
    }

    pub fn undo(&mut self) -> bool {
        match self.undo_manager.undo(&mut self.buffer) {
            Some(cursor) => {
                self.after_history_step(cursor);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.undo_manager.redo(&mut self.buffer) {
            Some(cursor) => {
                self.after_history_step(cursor);
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.undo_manager.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.undo_manager.can_redo()
    }

    fn after_history_step(&mut self, cursor: Position) {
        self.cursor = cursor;
        self.selection.clear_selection();
        self.modified = true;
        self.revision += 1;
    }

    /// Resolves optional line/column arguments against the cursor.
    fn target(&self, line: Option<usize>, pos: Option<usize>) -> Position {
        let target = Position::new(
            line.unwrap_or(self.cursor.line),
            pos.unwrap_or(self.cursor.column),
        );
        assert!(
            self.buffer.is_valid(target),
            "position {target} out of bounds (line count {})",
            self.buffer.line_count()
        );
        target
    }

    /// Deletes the active selection as part of `group`. Returns the position
    /// the deletion left the cursor at, or None when nothing was selected.
    fn delete_selection_into(&mut self, group: &mut UndoGroup) -> Option<Position> {
        let range = self.selection.normalized_range();
        self.selection.clear_selection();
        let range = range?;
        let text = self.buffer.text_in(range);
        Some(group.apply(EditCommand::DeleteRange { range, text }, &mut self.buffer))
    }

    fn commit(&mut self, group: UndoGroup) -> bool {
        if group.is_empty() {
            return false;
        }
        self.cursor = group.cursor_after;
        self.selection.clear_selection();
        self.modified = true;
        self.revision += 1;
        self.undo_manager.push(group);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(text: &str) -> Document {
        Document::from_text(text, &RcConfig::default())
    }

    fn snapshot(doc: &Document) -> (Vec<String>, Position) {
        (doc.lines().to_vec(), doc.cursor())
    }

    #[test]
    fn test_typing_then_undo_each_character() {
        let mut doc = document("");
        for ch in ['A', 'B', 'C'] {
            assert!(doc.insert_character(ch, None, None));
        }
        assert_eq!(doc.line(0), "ABC");
        assert_eq!(doc.cursor(), Position::new(0, 3));

        assert!(doc.undo());
        assert_eq!(doc.line(0), "AB");
        assert_eq!(doc.cursor(), Position::new(0, 2));
        assert!(doc.undo());
        assert!(doc.undo());
        assert_eq!(doc.line(0), "");
        assert_eq!(doc.cursor(), Position::new(0, 0));

        assert!(!doc.undo());
        assert_eq!(doc.line(0), "");
        assert_eq!(doc.cursor(), Position::new(0, 0));
    }

    #[test]
    fn test_tab_inserts_spaces_as_one_step() {
        let config = RcConfig {
            tab_size: 3,
            ..RcConfig::default()
        };
        let mut doc = Document::from_text("x", &config);
        assert!(doc.insert_character('\t', Some(0), Some(0)));
        assert_eq!(doc.line(0), "   x");
        assert_eq!(doc.cursor(), Position::new(0, 3));
        assert!(doc.undo());
        assert_eq!(doc.line(0), "x");
    }

    #[test]
    fn test_new_line_auto_indents() {
        let mut doc = document("  foo");
        assert!(doc.new_line(Some(0), Some(2)));
        assert_eq!(doc.lines(), &["  ", "  foo"]);
        assert_eq!(doc.cursor(), Position::new(1, 2));

        assert!(doc.undo());
        assert_eq!(doc.lines(), &["  foo"]);
    }

    #[test]
    fn test_new_line_inside_indentation_keeps_full_indent() {
        let mut doc = document("    x");
        doc.new_line(Some(0), Some(1));
        assert_eq!(doc.lines(), &[" ", "       x"]);
        assert_eq!(doc.cursor(), Position::new(1, 4));
        doc.undo();
        assert_eq!(doc.lines(), &["    x"]);
    }

    #[test]
    fn test_delete_at_origin_is_noop() {
        let mut doc = document("abc\ndef");
        let before = snapshot(&doc);
        for _ in 0..3 {
            assert!(!doc.delete_character(None, None));
            assert!(!doc.delete_character(Some(0), Some(0)));
        }
        assert_eq!(snapshot(&doc), before);
        assert!(!doc.can_undo());
    }

    #[test]
    fn test_backspace_merges_lines() {
        let mut doc = document("abc\ndef");
        doc.set_cursor(Position::new(1, 0));
        assert!(doc.delete_character(None, None));
        assert_eq!(doc.lines(), &["abcdef"]);
        assert_eq!(doc.cursor(), Position::new(0, 3));

        assert!(doc.undo());
        assert_eq!(doc.lines(), &["abc", "def"]);
        assert_eq!(doc.cursor(), Position::new(1, 0));
    }

    #[test]
    fn test_delete_range_single_line() {
        let mut doc = document("Hello World");
        doc.set_cursor(Position::new(0, 7));
        assert!(doc.delete_range(0, 2, 0, 5));
        assert_eq!(doc.line(0), "He World");
        assert_eq!(doc.cursor(), Position::new(0, 2));

        assert!(doc.undo());
        assert_eq!(doc.line(0), "Hello World");
        assert_eq!(doc.cursor(), Position::new(0, 7));
    }

    #[test]
    fn test_delete_range_reversed_multiline() {
        let mut doc = document("one\ntwo\nthree\nfour");
        assert!(doc.delete_range(2, 2, 0, 1));
        assert_eq!(doc.lines(), &["oree", "four"]);
        assert!(doc.undo());
        assert_eq!(doc.lines(), &["one", "two", "three", "four"]);
        assert!(!doc.delete_range(1, 1, 1, 1));
    }

    #[test]
    fn test_delete_group_removes_word_then_spaces_and_word() {
        let mut doc = document("foo   bar");
        doc.set_cursor(Position::new(0, 9));
        assert!(doc.delete_group());
        assert_eq!(doc.line(0), "foo   ");
        assert!(doc.delete_group());
        assert_eq!(doc.line(0), "");
        assert!(!doc.delete_group());
    }

    #[test]
    fn test_delete_group_at_line_start_merges() {
        let mut doc = document("foo\nbar");
        doc.set_cursor(Position::new(1, 0));
        assert!(doc.delete_group());
        assert_eq!(doc.lines(), &["foobar"]);
    }

    #[test]
    fn test_typing_replaces_selection_in_one_step() {
        let mut doc = document("hello world");
        doc.set_cursor(Position::new(0, 0));
        doc.start_selection(Position::new(0, 0));
        doc.update_selection(Position::new(0, 5));
        assert!(doc.insert_character('J', None, None));
        assert_eq!(doc.line(0), "J world");
        assert_eq!(doc.cursor(), Position::new(0, 1));
        assert!(!doc.has_selection());

        assert!(doc.undo());
        assert_eq!(doc.line(0), "hello world");
        assert_eq!(doc.cursor(), Position::new(0, 5));
    }

    #[test]
    fn test_backspace_deletes_selection() {
        let mut doc = document("ab\ncd\nef");
        doc.start_selection(Position::new(0, 1));
        doc.update_selection(Position::new(2, 1));
        assert_eq!(doc.selected_text().as_deref(), Some("b\ncd\ne"));
        assert!(doc.delete_character(None, None));
        assert_eq!(doc.lines(), &["af"]);
        assert_eq!(doc.cursor(), Position::new(0, 1));
    }

    #[test]
    fn test_cut_and_paste() {
        let mut doc = document("alpha beta");
        doc.set_cursor(Position::new(0, 0));
        doc.move_to_line_end(true);
        assert_eq!(doc.cut_selection().as_deref(), Some("alpha beta"));
        assert_eq!(doc.text(), "");

        assert!(doc.paste("one\ntwo"));
        assert_eq!(doc.lines(), &["one", "two"]);
        assert_eq!(doc.cursor(), Position::new(1, 3));
        assert!(doc.undo());
        assert_eq!(doc.text(), "");
    }

    #[test]
    fn test_redo_after_undo_and_fork() {
        let mut doc = document("");
        doc.insert_character('a', None, None);
        doc.insert_character('b', None, None);
        doc.undo();
        assert!(doc.redo());
        assert_eq!(doc.line(0), "ab");
        assert!(!doc.redo());

        doc.undo();
        doc.insert_character('z', None, None);
        assert_eq!(doc.line(0), "az");
        assert!(!doc.redo());
    }

    #[test]
    fn test_undo_redo_inverse_law() {
        let mut doc = document("  fn main() {\n}\n");
        doc.set_cursor(Position::new(0, 13));
        let initial = snapshot(&doc);

        doc.new_line(None, None);
        for ch in "let x = 1;".chars() {
            doc.insert_character(ch, None, None);
        }
        doc.insert_character('\t', None, None);
        doc.delete_group();
        doc.delete_character(None, None);
        doc.delete_range(0, 2, 1, 4);
        doc.set_cursor(Position::new(0, 0));
        doc.delete_character(Some(1), Some(0));
        doc.paste("x\ny");
        doc.replace_all_text("remote\ntext");
        let final_state = snapshot(&doc);

        let mut steps = 0;
        while doc.undo() {
            steps += 1;
        }
        assert_eq!(snapshot(&doc), initial);

        for _ in 0..steps {
            assert!(doc.redo());
        }
        assert_eq!(snapshot(&doc), final_state);
    }

    #[test]
    fn test_replace_all_normalizes_line_breaks() {
        let mut doc = document("local");
        assert!(doc.replace_all_text("a\r\nb\rc\r\n"));
        assert_eq!(doc.lines(), &["a", "b", "c", ""]);
        assert!(doc.lines().iter().all(|line| !line.contains('\r')));

        let doc = document("x\r\ny");
        assert_eq!(doc.lines(), &["x", "y"]);
    }

    #[test]
    fn test_replace_all_clamps_cursor() {
        let mut doc = document("hello there\nsecond");
        doc.set_cursor(Position::new(1, 6));
        assert!(doc.replace_all_text("hello world"));
        assert_eq!(doc.text(), "hello world");
        assert_eq!(doc.cursor(), Position::new(0, 6));
        assert!(!doc.replace_all_text("hello world"));
    }

    #[test]
    fn test_revision_tracks_changes() {
        let mut doc = document("");
        assert_eq!(doc.revision(), 0);
        doc.insert_character('a', None, None);
        doc.undo();
        doc.redo();
        assert_eq!(doc.revision(), 3);
        doc.move_left(false);
        doc.delete_character(Some(0), Some(0));
        assert_eq!(doc.revision(), 3);
    }

    #[test]
    fn test_display_column_counts_wide_characters() {
        let doc = document("a日本b");
        assert_eq!(doc.display_column(Position::new(0, 1)), 1);
        assert_eq!(doc.display_column(Position::new(0, 3)), 5);
        assert_eq!(doc.display_column(Position::new(0, 4)), 6);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_out_of_range_insert_panics() {
        let mut doc = document("abc");
        doc.insert_character('x', Some(3), Some(0));
    }

    #[test]
    fn test_open_and_write_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, "first\n  second\nthird\n").unwrap();

        let mut doc = Document::open(&path, &RcConfig::default());
        assert!(doc.is_open());
        assert_eq!(doc.lines(), &["first", "  second", "third"]);

        assert!(doc.write());
        assert_eq!(fs::read_to_string(&path).unwrap(), "first\n  second\nthird\n");

        doc.set_cursor(Position::new(2, 5));
        doc.insert_character('!', None, None);
        assert!(doc.write());
        assert!(!doc.is_modified());
        assert_eq!(fs::read_to_string(&path).unwrap(), "first\n  second\nthird!\n");
    }

    #[test]
    fn test_open_keeps_windows_line_endings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dos.txt");
        fs::write(&path, "a\r\nb\r\n").unwrap();

        let mut doc = Document::open(&path, &RcConfig::default());
        assert_eq!(doc.lines(), &["a", "b"]);
        assert_eq!(doc.line_ending(), LineEnding::Windows);
        assert!(doc.write());
        assert_eq!(fs::read_to_string(&path).unwrap(), "a\r\nb\r\n");
    }

    #[test]
    fn test_empty_file_has_one_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.txt");
        fs::write(&path, "").unwrap();

        let doc = Document::open(&path, &RcConfig::default());
        assert!(doc.is_open());
        assert_eq!(doc.lines(), &[""]);
    }

    #[test]
    fn test_unreadable_file_is_not_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.txt");

        let mut doc = Document::open(&path, &RcConfig::default());
        assert!(!doc.is_open());
        assert_eq!(doc.lines(), &[""]);
        doc.insert_character('x', None, None);
        assert!(!doc.write());
        assert!(!path.exists());

        assert_eq!(doc.save_as(&path).unwrap(), 2);
        assert_eq!(fs::read_to_string(&path).unwrap(), "x\n");
    }
}
