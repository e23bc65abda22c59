use super::text_buffer::{Position, Range};

/// Anchor/active selection. The anchor stays where the selection began, the
/// active end follows the cursor. When inactive both ends are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    anchor: Position,
    active: Position,
    is_active: bool,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_selection(&mut self, pos: Position) {
        self.anchor = pos;
        self.active = pos;
        self.is_active = true;
    }

    /// Moves the active end, starting a selection if none exists.
    pub fn update_selection(&mut self, pos: Position) {
        if !self.is_active {
            self.start_selection(pos);
            return;
        }
        self.active = pos;
    }

    pub fn clear_selection(&mut self) {
        self.is_active = false;
    }

    pub fn has_selection(&self) -> bool {
        self.is_active
    }

    pub fn anchor(&self) -> Position {
        self.anchor
    }

    pub fn active(&self) -> Position {
        self.active
    }

    /// Anchor and active end ordered so that `start <= end`, whether or not
    /// the selection is active.
    pub fn get_normalized_range(&self) -> (Position, Position) {
        let range = Range::new(self.anchor, self.active);
        (range.start, range.end)
    }

    /// The selected range, if any. An active selection whose ends coincide
    /// selects nothing.
    pub fn normalized_range(&self) -> Option<Range> {
        if !self.is_active {
            return None;
        }
        let range = Range::new(self.anchor, self.active);
        (!range.is_empty()).then_some(range)
    }

    pub fn is_position_selected(&self, line: usize, column: usize) -> bool {
        self.normalized_range()
            .is_some_and(|range| range.contains(Position::new(line, column)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_without_start_begins_selection() {
        let mut selection = Selection::new();
        selection.update_selection(Position::new(1, 2));
        assert!(selection.has_selection());
        assert_eq!(selection.anchor(), Position::new(1, 2));
        assert_eq!(selection.active(), Position::new(1, 2));
        assert_eq!(selection.normalized_range(), None);
    }

    #[test]
    fn test_normalization_ignores_direction() {
        let pairs = [
            (Position::new(0, 5), Position::new(0, 1)),
            (Position::new(3, 0), Position::new(1, 9)),
            (Position::new(2, 2), Position::new(2, 2)),
        ];
        for (a, b) in pairs {
            let mut forward = Selection::new();
            forward.start_selection(a);
            forward.update_selection(b);

            let mut backward = Selection::new();
            backward.start_selection(b);
            backward.update_selection(a);

            let (start, end) = forward.get_normalized_range();
            assert!(start <= end);
            assert_eq!(forward.get_normalized_range(), backward.get_normalized_range());
        }
    }

    #[test]
    fn test_multiline_membership_is_half_open() {
        let mut selection = Selection::new();
        selection.start_selection(Position::new(2, 3));
        selection.update_selection(Position::new(0, 4));

        assert!(!selection.is_position_selected(0, 3));
        assert!(selection.is_position_selected(0, 4));
        assert!(selection.is_position_selected(0, 100));
        assert!(selection.is_position_selected(1, 0));
        assert!(selection.is_position_selected(2, 2));
        assert!(!selection.is_position_selected(2, 3));
        assert!(!selection.is_position_selected(3, 0));
    }

    #[test]
    fn test_cleared_selection_selects_nothing() {
        let mut selection = Selection::new();
        selection.start_selection(Position::new(0, 0));
        selection.update_selection(Position::new(0, 3));
        assert!(selection.is_position_selected(0, 1));

        selection.clear_selection();
        assert!(!selection.has_selection());
        assert!(!selection.is_position_selected(0, 1));
    }
}
