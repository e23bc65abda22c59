use super::edit_commands::EditCommand;
use super::text_buffer::{Position, TextBuffer};
use std::collections::VecDeque;

/// One undoable step: the commands an editing operation produced, plus the
/// cursor on either side of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoGroup {
    pub commands: Vec<EditCommand>,
    pub cursor_before: Position,
    pub cursor_after: Position,
}

impl UndoGroup {
    pub fn new(cursor_pos: Position) -> Self {
        Self {
            commands: Vec::new(),
            cursor_before: cursor_pos,
            cursor_after: cursor_pos,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Applies a command to the buffer and records it in this group.
    pub fn apply(&mut self, command: EditCommand, buffer: &mut TextBuffer) -> Position {
        self.cursor_after = command.apply(buffer);
        self.commands.push(command);
        self.cursor_after
    }

    /// Re-applies the group in forward order (redo). Returns the cursor.
    pub fn apply_to_buffer(&self, buffer: &mut TextBuffer) -> Position {
        for command in &self.commands {
            command.apply(buffer);
        }
        self.cursor_after
    }

    /// Inverts the group in reverse order (undo). Returns the cursor.
    pub fn apply_reverse_to_buffer(&self, buffer: &mut TextBuffer) -> Position {
        for command in self.commands.iter().rev() {
            command.invert(buffer);
        }
        self.cursor_before
    }
}

/// Bounded undo and redo histories.
#[derive(Debug, Clone)]
pub struct UndoManager {
    undo_stack: VecDeque<UndoGroup>,
    redo_stack: Vec<UndoGroup>,
    max_undo_levels: usize,
}

impl UndoManager {
    pub const DEFAULT_LEVELS: usize = 50;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_LEVELS)
    }

    pub fn with_capacity(max_undo_levels: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            max_undo_levels,
        }
    }

    /// Records a freshly applied group. Forks history: the redo stack is
    /// cleared, and the oldest group is released when over capacity.
    pub fn push(&mut self, group: UndoGroup) {
        if group.is_empty() {
            return;
        }
        self.redo_stack.clear();
        self.undo_stack.push_back(group);

        while self.undo_stack.len() > self.max_undo_levels {
            if let Some(evicted) = self.undo_stack.pop_front() {
                Self::release(evicted);
            }
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    /// Inverts the most recent group and moves it to the redo stack.
    pub fn undo(&mut self, buffer: &mut TextBuffer) -> Option<Position> {
        let group = self.undo_stack.pop_back()?;
        let cursor = group.apply_reverse_to_buffer(buffer);
        self.redo_stack.push(group);
        Some(cursor)
    }

    /// Re-applies the most recently undone group.
    pub fn redo(&mut self, buffer: &mut TextBuffer) -> Option<Position> {
        let group = self.redo_stack.pop()?;
        let cursor = group.apply_to_buffer(buffer);
        self.undo_stack.push_back(group);
        Some(cursor)
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    fn release(group: UndoGroup) {
        log::trace!(
            "evicting undo group ({} command(s), first: {})",
            group.commands.len(),
            group.commands.first().map_or("none", EditCommand::kind)
        );
    }
}

impl Default for UndoManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(buffer: &mut TextBuffer, manager: &mut UndoManager, column: usize, ch: char) {
        let mut group = UndoGroup::new(Position::new(0, column));
        group.apply(
            EditCommand::InsertChar {
                at: Position::new(0, column),
                ch,
            },
            buffer,
        );
        manager.push(group);
    }

    #[test]
    fn test_undo_redo_round_trip() {
        let mut buffer = TextBuffer::new();
        let mut manager = UndoManager::new();
        typed(&mut buffer, &mut manager, 0, 'a');
        typed(&mut buffer, &mut manager, 1, 'b');
        assert_eq!(buffer.line(0), "ab");

        assert_eq!(manager.undo(&mut buffer), Some(Position::new(0, 1)));
        assert_eq!(manager.undo(&mut buffer), Some(Position::new(0, 0)));
        assert_eq!(manager.undo(&mut buffer), None);
        assert_eq!(buffer.line(0), "");

        assert_eq!(manager.redo(&mut buffer), Some(Position::new(0, 1)));
        assert_eq!(manager.redo(&mut buffer), Some(Position::new(0, 2)));
        assert_eq!(manager.redo(&mut buffer), None);
        assert_eq!(buffer.line(0), "ab");
    }

    #[test]
    fn test_new_edit_clears_redo() {
        let mut buffer = TextBuffer::new();
        let mut manager = UndoManager::new();
        typed(&mut buffer, &mut manager, 0, 'a');
        manager.undo(&mut buffer);
        assert!(manager.can_redo());

        typed(&mut buffer, &mut manager, 0, 'z');
        assert!(!manager.can_redo());
        assert_eq!(manager.redo(&mut buffer), None);
    }

    #[test]
    fn test_history_is_bounded() {
        let mut buffer = TextBuffer::new();
        let mut manager = UndoManager::with_capacity(3);
        for (i, ch) in "abcde".chars().enumerate() {
            typed(&mut buffer, &mut manager, i, ch);
        }
        assert_eq!(manager.undo_len(), 3);

        while manager.undo(&mut buffer).is_some() {}
        // The two oldest edits were evicted and stay applied.
        assert_eq!(buffer.line(0), "ab");
    }

    #[test]
    fn test_empty_group_is_not_recorded() {
        let mut manager = UndoManager::new();
        manager.push(UndoGroup::new(Position::default()));
        assert!(!manager.can_undo());
    }
}
