use std::cmp::Ordering;
use std::fmt;

/// A (line, character) coordinate. Characters are counted in Unicode scalar
/// values, never bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.line, self.column).cmp(&(other.line, other.column))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Ordered pair of positions, `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    /// Builds a range from two positions in either order.
    pub fn new(a: Position, b: Position) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Half-open membership test: `start <= pos < end`.
    pub fn contains(&self, pos: Position) -> bool {
        self.start <= pos && pos < self.end
    }
}

/// Line storage. Always holds at least one line; lines never contain a
/// line terminator. Every index passed in must be in range, out-of-range
/// access panics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBuffer {
    lines: Vec<String>,
}

impl TextBuffer {
    pub fn new() -> Self {
        Self {
            lines: vec![String::new()],
        }
    }

    pub fn from_lines(lines: Vec<String>) -> Self {
        if lines.is_empty() {
            return Self::new();
        }
        debug_assert!(lines.iter().all(|l| !l.contains('\n')));
        Self { lines }
    }

    /// Splits on `\n` only. A trailing `\n` yields a trailing empty line,
    /// so `from_text(t).text() == t` for every `t`.
    pub fn from_text(text: &str) -> Self {
        Self {
            lines: text.split('\n').map(str::to_string).collect(),
        }
    }

    /// Lines joined with `\n`.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn line(&self, line: usize) -> &str {
        self.check_line(line);
        &self.lines[line]
    }

    /// Length of a line in characters.
    pub fn line_len(&self, line: usize) -> usize {
        self.line(line).chars().count()
    }

    pub fn char_at(&self, pos: Position) -> Option<char> {
        self.line(pos.line).chars().nth(pos.column)
    }

    /// Number of leading ASCII spaces on a line.
    pub fn leading_spaces(&self, line: usize) -> usize {
        self.line(line).chars().take_while(|&c| c == ' ').count()
    }

    pub fn end_position(&self) -> Position {
        let last = self.lines.len() - 1;
        Position::new(last, self.line_len(last))
    }

    pub fn is_valid(&self, pos: Position) -> bool {
        pos.line < self.lines.len() && pos.column <= self.line_len(pos.line)
    }

    /// Clamps a position into the buffer.
    pub fn clamp(&self, pos: Position) -> Position {
        let line = pos.line.min(self.lines.len() - 1);
        Position::new(line, pos.column.min(self.line_len(line)))
    }

    /// Inserts single-line text at `pos`.
    pub fn insert_str(&mut self, pos: Position, text: &str) {
        debug_assert!(!text.contains('\n'));
        let offset = self.byte_offset(pos);
        self.lines[pos.line].insert_str(offset, text);
    }

    /// Inserts text that may span several lines; returns the position just
    /// after the inserted text.
    pub fn insert_text(&mut self, pos: Position, text: &str) -> Position {
        let offset = self.byte_offset(pos);
        let mut pieces = text.split('\n');
        let first = pieces.next().unwrap_or_default();
        let rest: Vec<&str> = pieces.collect();

        if rest.is_empty() {
            self.lines[pos.line].insert_str(offset, first);
            return Position::new(pos.line, pos.column + first.chars().count());
        }

        let suffix = self.lines[pos.line].split_off(offset);
        self.lines[pos.line].push_str(first);

        let last_index = rest.len() - 1;
        let end_column = rest[last_index].chars().count();
        for (i, piece) in rest.iter().enumerate() {
            let mut line = piece.to_string();
            if i == last_index {
                line.push_str(&suffix);
            }
            self.lines.insert(pos.line + 1 + i, line);
        }

        Position::new(pos.line + rest.len(), end_column)
    }

    /// Removes `count` characters starting at `pos` on a single line and
    /// returns them.
    pub fn remove_chars(&mut self, pos: Position, count: usize) -> String {
        let start = self.byte_offset(pos);
        let end = self.byte_offset(Position::new(pos.line, pos.column + count));
        self.lines[pos.line].drain(start..end).collect()
    }

    /// Splits a line at `pos`. The new line is `prefix` followed by the
    /// text that was after `pos`.
    pub fn split_line(&mut self, pos: Position, prefix: &str) {
        let offset = self.byte_offset(pos);
        let suffix = self.lines[pos.line].split_off(offset);
        let mut new_line = String::with_capacity(prefix.len() + suffix.len());
        new_line.push_str(prefix);
        new_line.push_str(&suffix);
        self.lines.insert(pos.line + 1, new_line);
    }

    /// Appends line `line + 1` onto `line` and removes it.
    pub fn join_with_next(&mut self, line: usize) {
        assert!(
            line + 1 < self.lines.len(),
            "cannot join line {line}: no following line"
        );
        let next = self.lines.remove(line + 1);
        self.lines[line].push_str(&next);
    }

    /// Text in `[range.start, range.end)`, lines separated by `\n`.
    pub fn text_in(&self, range: Range) -> String {
        let (start, end) = (range.start, range.end);
        let start_offset = self.byte_offset(start);
        let end_offset = self.byte_offset(end);

        if start.line == end.line {
            return self.lines[start.line][start_offset..end_offset].to_string();
        }

        let mut result = String::new();
        result.push_str(&self.lines[start.line][start_offset..]);
        for line in &self.lines[start.line + 1..end.line] {
            result.push('\n');
            result.push_str(line);
        }
        result.push('\n');
        result.push_str(&self.lines[end.line][..end_offset]);
        result
    }

    /// Deletes `[range.start, range.end)` and returns the removed text.
    pub fn delete_range(&mut self, range: Range) -> String {
        let removed = self.text_in(range);
        let (start, end) = (range.start, range.end);
        let start_offset = self.byte_offset(start);
        let end_offset = self.byte_offset(end);

        if start.line == end.line {
            self.lines[start.line].drain(start_offset..end_offset);
        } else {
            let tail = self.lines[end.line][end_offset..].to_string();
            self.lines[start.line].truncate(start_offset);
            self.lines[start.line].push_str(&tail);
            self.lines.drain(start.line + 1..=end.line);
        }
        removed
    }

    pub fn replace_lines(&mut self, lines: Vec<String>) -> Vec<String> {
        let replacement = Self::from_lines(lines).lines;
        std::mem::replace(&mut self.lines, replacement)
    }

    fn check_line(&self, line: usize) {
        assert!(
            line < self.lines.len(),
            "line {line} out of bounds (line count {})",
            self.lines.len()
        );
    }

    /// Byte offset of a character position. Panics when the position is
    /// outside the buffer.
    fn byte_offset(&self, pos: Position) -> usize {
        self.check_line(pos.line);
        let line = &self.lines[pos.line];
        if pos.column == 0 {
            return 0;
        }
        match line.char_indices().nth(pos.column) {
            Some((offset, _)) => offset,
            None => {
                let len = line.chars().count();
                assert!(
                    pos.column == len,
                    "column {} out of bounds on line {} (length {len})",
                    pos.column,
                    pos.line
                );
                line.len()
            }
        }
    }
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(lines: &[&str]) -> TextBuffer {
        TextBuffer::from_lines(lines.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_new_buffer_has_one_empty_line() {
        let buffer = TextBuffer::new();
        assert_eq!(buffer.line_count(), 1);
        assert_eq!(buffer.line(0), "");
        assert_eq!(TextBuffer::from_lines(Vec::new()).line_count(), 1);
    }

    #[test]
    fn test_from_text_round_trip() {
        for text in ["", "a", "a\nb", "a\n", "\n\n", "héllo\nwörld"] {
            assert_eq!(TextBuffer::from_text(text).text(), text);
        }
    }

    #[test]
    fn test_insert_uses_character_indices() {
        let mut buffer = buffer(&["héllo"]);
        buffer.insert_str(Position::new(0, 2), "X");
        assert_eq!(buffer.line(0), "héXllo");
        assert_eq!(buffer.line_len(0), 6);
    }

    #[test]
    fn test_insert_multiline_text() {
        let mut buffer = buffer(&["Hello World"]);
        let end = buffer.insert_text(Position::new(0, 5), ",\nbig\nnew");
        assert_eq!(buffer.lines(), &["Hello,", "big", "new World"]);
        assert_eq!(end, Position::new(2, 3));
    }

    #[test]
    fn test_delete_single_line_range() {
        let mut buffer = buffer(&["Hello World"]);
        let removed = buffer.delete_range(Range::new(Position::new(0, 2), Position::new(0, 5)));
        assert_eq!(removed, "llo");
        assert_eq!(buffer.line(0), "He World");
    }

    #[test]
    fn test_delete_multiline_range() {
        let mut buffer = buffer(&["first", "middle", "last line"]);
        let removed = buffer.delete_range(Range::new(Position::new(0, 3), Position::new(2, 4)));
        assert_eq!(removed, "st\nmiddle\nlast");
        assert_eq!(buffer.lines(), &["fir line"]);
    }

    #[test]
    fn test_split_and_join() {
        let mut buffer = buffer(&["  foo"]);
        buffer.split_line(Position::new(0, 2), "  ");
        assert_eq!(buffer.lines(), &["  ", "  foo"]);
        buffer.join_with_next(0);
        assert_eq!(buffer.lines(), &["    foo"]);
    }

    #[test]
    fn test_range_normalizes_order() {
        let a = Position::new(2, 1);
        let b = Position::new(0, 7);
        assert_eq!(Range::new(a, b), Range::new(b, a));
        assert!(Range::new(a, b).contains(b));
        assert!(!Range::new(a, b).contains(a));
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_out_of_range_column_panics() {
        let mut buffer = buffer(&["abc"]);
        buffer.insert_str(Position::new(0, 4), "x");
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_out_of_range_line_panics() {
        let buffer = buffer(&["abc"]);
        buffer.line(1);
    }
}
