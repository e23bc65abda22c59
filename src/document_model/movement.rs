use super::document::Document;
use super::text_buffer::Position;

/// Which characters count as part of a word for jumps and word deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WordBoundary {
    /// Any non-whitespace character is a word character.
    #[default]
    Whitespace,
    /// Only alphanumerics and `_` are word characters.
    Alphanumeric,
}

impl WordBoundary {
    pub fn is_word_char(self, ch: char) -> bool {
        match self {
            WordBoundary::Whitespace => !ch.is_whitespace(),
            WordBoundary::Alphanumeric => ch.is_alphanumeric() || ch == '_',
        }
    }

    /// Column where the word ending at `column` starts: boundary characters
    /// directly left of `column` are skipped first, then the word run.
    pub fn word_start_before(self, chars: &[char], column: usize) -> usize {
        let mut start = column;
        while start > 0 && !self.is_word_char(chars[start - 1]) {
            start -= 1;
        }
        while start > 0 && self.is_word_char(chars[start - 1]) {
            start -= 1;
        }
        start
    }

    /// Column just past the word following `column`.
    pub fn word_end_after(self, chars: &[char], column: usize) -> usize {
        let mut end = column;
        while end < chars.len() && !self.is_word_char(chars[end]) {
            end += 1;
        }
        while end < chars.len() && self.is_word_char(chars[end]) {
            end += 1;
        }
        end
    }
}

impl Document {
    pub fn move_left(&mut self, extend_selection: bool) {
        let cursor = self.cursor();
        let target = if cursor.column > 0 {
            Position::new(cursor.line, cursor.column - 1)
        } else if cursor.line > 0 {
            // Wrap to end of previous line
            Position::new(cursor.line - 1, self.line_len(cursor.line - 1))
        } else {
            cursor
        };
        self.relocate_cursor(target, extend_selection);
    }

    pub fn move_right(&mut self, extend_selection: bool) {
        let cursor = self.cursor();
        let target = if cursor.column < self.line_len(cursor.line) {
            Position::new(cursor.line, cursor.column + 1)
        } else if cursor.line + 1 < self.line_count() {
            // Wrap to start of next line
            Position::new(cursor.line + 1, 0)
        } else {
            cursor
        };
        self.relocate_cursor(target, extend_selection);
    }

    pub fn move_up(&mut self, extend_selection: bool) {
        let cursor = self.cursor();
        let target = if cursor.line > 0 {
            let line = cursor.line - 1;
            Position::new(line, cursor.column.min(self.line_len(line)))
        } else {
            // Already on the first line: go to its first character
            Position::new(0, 0)
        };
        self.relocate_cursor(target, extend_selection);
    }

    pub fn move_down(&mut self, extend_selection: bool) {
        let cursor = self.cursor();
        let target = if cursor.line + 1 < self.line_count() {
            let line = cursor.line + 1;
            Position::new(line, cursor.column.min(self.line_len(line)))
        } else {
            // Already on the last line: go to its last character
            Position::new(cursor.line, self.line_len(cursor.line))
        };
        self.relocate_cursor(target, extend_selection);
    }

    pub fn jump_left(&mut self, extend_selection: bool) {
        let cursor = self.cursor();
        if cursor.column == 0 {
            self.move_left(extend_selection);
            return;
        }
        let chars: Vec<char> = self.line(cursor.line).chars().collect();
        let column = self.word_boundary().word_start_before(&chars, cursor.column);
        self.relocate_cursor(Position::new(cursor.line, column), extend_selection);
    }

    pub fn jump_right(&mut self, extend_selection: bool) {
        let cursor = self.cursor();
        let chars: Vec<char> = self.line(cursor.line).chars().collect();
        if cursor.column >= chars.len() {
            self.move_right(extend_selection);
            return;
        }
        let column = self.word_boundary().word_end_after(&chars, cursor.column);
        self.relocate_cursor(Position::new(cursor.line, column), extend_selection);
    }

    pub fn move_to_line_start(&mut self, extend_selection: bool) {
        let line = self.cursor().line;
        self.relocate_cursor(Position::new(line, 0), extend_selection);
    }

    pub fn move_to_line_end(&mut self, extend_selection: bool) {
        let line = self.cursor().line;
        self.relocate_cursor(Position::new(line, self.line_len(line)), extend_selection);
    }

    /// Moves the cursor, extending the selection from the old cursor when
    /// `extend_selection` is set and clearing it otherwise.
    fn relocate_cursor(&mut self, target: Position, extend_selection: bool) {
        if extend_selection {
            if !self.selection.has_selection() {
                self.selection.start_selection(self.cursor());
            }
            self.selection.update_selection(target);
        } else {
            self.selection.clear_selection();
        }
        self.set_cursor(target);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RcConfig;

    fn document(text: &str) -> Document {
        Document::from_text(text, &RcConfig::default())
    }

    #[test]
    fn test_horizontal_moves_wrap_lines() {
        let mut doc = document("ab\ncd");
        doc.set_cursor(Position::new(0, 2));
        doc.move_right(false);
        assert_eq!(doc.cursor(), Position::new(1, 0));
        doc.move_left(false);
        assert_eq!(doc.cursor(), Position::new(0, 2));

        doc.set_cursor(Position::new(0, 0));
        doc.move_left(false);
        assert_eq!(doc.cursor(), Position::new(0, 0));
        doc.set_cursor(Position::new(1, 2));
        doc.move_right(false);
        assert_eq!(doc.cursor(), Position::new(1, 2));
    }

    #[test]
    fn test_vertical_moves_clamp_column() {
        let mut doc = document("a long line\nab\nanother long line");
        doc.set_cursor(Position::new(0, 8));
        doc.move_down(false);
        assert_eq!(doc.cursor(), Position::new(1, 2));
        doc.move_down(false);
        assert_eq!(doc.cursor(), Position::new(2, 2));
        doc.move_down(false);
        assert_eq!(doc.cursor(), Position::new(2, 17));

        doc.set_cursor(Position::new(0, 5));
        doc.move_up(false);
        assert_eq!(doc.cursor(), Position::new(0, 0));
    }

    #[test]
    fn test_jumps_skip_words() {
        let mut doc = document("foo   bar baz");
        doc.set_cursor(Position::new(0, 13));
        doc.jump_left(false);
        assert_eq!(doc.cursor(), Position::new(0, 10));
        doc.jump_left(false);
        assert_eq!(doc.cursor(), Position::new(0, 6));
        doc.jump_left(false);
        assert_eq!(doc.cursor(), Position::new(0, 0));

        doc.jump_right(false);
        assert_eq!(doc.cursor(), Position::new(0, 3));
        doc.jump_right(false);
        assert_eq!(doc.cursor(), Position::new(0, 9));
    }

    #[test]
    fn test_alphanumeric_word_boundary() {
        let config = RcConfig {
            word_boundary: WordBoundary::Alphanumeric,
            ..RcConfig::default()
        };
        let mut doc = Document::from_text("call(my_arg)", &config);
        doc.set_cursor(Position::new(0, 12));
        doc.jump_left(false);
        assert_eq!(doc.cursor(), Position::new(0, 5));
        doc.jump_left(false);
        assert_eq!(doc.cursor(), Position::new(0, 0));
    }

    #[test]
    fn test_extend_selection_and_clear() {
        let mut doc = document("hello\nworld");
        doc.set_cursor(Position::new(0, 1));
        doc.move_right(true);
        doc.move_down(true);
        assert_eq!(doc.selected_text().as_deref(), Some("ello\nwo"));

        doc.move_left(false);
        assert!(!doc.has_selection());
    }

    #[test]
    fn test_jump_wraps_at_line_boundary() {
        let mut doc = document("one\ntwo");
        doc.set_cursor(Position::new(1, 0));
        doc.jump_left(false);
        assert_eq!(doc.cursor(), Position::new(0, 3));
        doc.jump_right(false);
        assert_eq!(doc.cursor(), Position::new(1, 0));
    }
}
