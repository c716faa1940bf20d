/// Undo log: per-entity stacks of plain snapshot records.
///
/// The turn controller pushes one snapshot per participant when the
/// player declares a move and pops one per participant on undo.
/// Popping an empty stack yields `None` and changes nothing.

use super::entity::EntityId;
use super::position::Position;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct PlayerSnapshot {
    pub pos: Position,
}

/// Position plus the goal the block was covering.
/// For Ice this is the rest state, not a mid-slide position.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct BlockSnapshot {
    pub pos: Position,
    pub covering: Option<EntityId>,
}

#[derive(Clone, PartialEq, Debug)]
pub struct SaveStack<T> {
    saves: Vec<T>,
}

impl<T> SaveStack<T> {
    pub fn new() -> Self {
        SaveStack { saves: Vec::new() }
    }

    pub fn push(&mut self, snapshot: T) {
        self.saves.push(snapshot);
    }

    /// Most recent snapshot; it is discarded once handed out.
    pub fn pop(&mut self) -> Option<T> {
        self.saves.pop()
    }
}

impl<T> Default for SaveStack<T> {
    fn default() -> Self {
        SaveStack::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pop_is_lifo_and_single_use() {
        let mut s = SaveStack::new();
        s.push(1);
        s.push(2);
        assert_eq!(s.pop(), Some(2));
        assert_eq!(s.pop(), Some(1));
        assert_eq!(s.pop(), None);
    }

    #[test]
    fn pop_on_empty_is_noop() {
        let mut s: SaveStack<PlayerSnapshot> = SaveStack::default();
        assert_eq!(s.pop(), None);
        assert_eq!(s, SaveStack::new());
    }
}
