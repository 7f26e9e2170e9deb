//! Rollback-able working memory for one sentence, and the chunk cursor.

use crate::chunk::ChunkId;
use crate::element::ElementId;

bitflags::bitflags! {
    /// Boundary markers seen since the last attachment target was set.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub(crate) struct StateFlags: u8 {
        /// A comma, coordinator, end of line or end of subclause was crossed.
        const CLAUSE_BOUNDARY  = 1 << 0;
        /// The previous top-level chunk could not be classified.
        const UNASSIGNED_CHUNK = 1 << 1;
    }
}

/// Staged data and attachment targets. Cloning copies every staging list,
/// so a snapshot never aliases the live state.
#[derive(Debug, Clone, Default)]
pub(crate) struct ProcessingContextState {
    pub subjects: Vec<ElementId>,
    pub last_elements: Vec<ElementId>,
    pub flags: StateFlags,
    pub unassigned_modifiers: Vec<ChunkId>,
    pub unassigned_characters: Vec<ElementId>,
    pub unassigned_constraints: Vec<ChunkId>,
    /// Text of an organ-less PP that scopes the next Character or Relation.
    pub clause_constraint: Option<String>,
    pub clause_constraint_id: Option<String>,
    /// Character name waiting for its value ("relief" in "relief high").
    pub unassigned_character: Option<String>,
}

impl ProcessingContextState {
    pub fn boundary_crossed(&self) -> bool {
        self.flags.contains(StateFlags::CLAUSE_BOUNDARY)
    }

    pub fn set_boundary(&mut self, crossed: bool) {
        self.flags.set(StateFlags::CLAUSE_BOUNDARY, crossed);
    }

    pub fn unassigned_chunk_preceded(&self) -> bool {
        self.flags.contains(StateFlags::UNASSIGNED_CHUNK)
    }

    pub fn set_unassigned_chunk(&mut self, preceded: bool) {
        self.flags.set(StateFlags::UNASSIGNED_CHUNK, preceded);
    }

    pub fn last_element(&self) -> Option<ElementId> {
        self.last_elements.last().copied()
    }

    pub fn stage_character(&mut self, character: ElementId) {
        if !self.unassigned_characters.contains(&character) {
            self.unassigned_characters.push(character);
        }
    }
}

// --- Cursor ------------------------------------------------------------------

/// Index-based cursor over the top-level chunk sequence.
///
/// `position` is the index of the next chunk [`Cursor::advance`] returns; the
/// chunk being processed sits at `position - 1`. Peeking never moves it.
#[derive(Debug, Clone)]
pub(crate) struct Cursor {
    sequence: Vec<ChunkId>,
    position: usize,
}

impl Cursor {
    pub fn new(sequence: Vec<ChunkId>) -> Self {
        Self { sequence, position: 0 }
    }

    pub fn advance(&mut self) -> Option<ChunkId> {
        let chunk = self.sequence.get(self.position).copied()?;
        self.position += 1;
        Some(chunk)
    }

    pub fn peek_next(&self) -> Option<ChunkId> {
        self.sequence.get(self.position).copied()
    }

    /// The chunk before the current one.
    pub fn peek_prev(&self) -> Option<ChunkId> {
        self.position.checked_sub(2).and_then(|i| self.sequence.get(i).copied())
    }

    /// Chunks before the current one, nearest first.
    pub fn behind(&self) -> impl Iterator<Item = ChunkId> + '_ {
        let end = self.position.saturating_sub(1).min(self.sequence.len());
        self.sequence[..end].iter().rev().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_peeks_without_moving() {
        let mut cursor = Cursor::new(vec![ChunkId(0), ChunkId(1), ChunkId(2)]);
        assert_eq!(cursor.peek_prev(), None);
        assert_eq!(cursor.peek_next(), Some(ChunkId(0)));

        assert_eq!(cursor.advance(), Some(ChunkId(0)));
        assert_eq!(cursor.advance(), Some(ChunkId(1)));
        assert_eq!(cursor.peek_prev(), Some(ChunkId(0)));
        assert_eq!(cursor.peek_next(), Some(ChunkId(2)));
        assert_eq!(cursor.behind().collect::<Vec<_>>(), vec![ChunkId(0)]);
        assert_eq!(cursor.peek_next(), Some(ChunkId(2)));

        assert_eq!(cursor.advance(), Some(ChunkId(2)));
        assert_eq!(cursor.advance(), None);
        assert_eq!(cursor.peek_next(), None);
    }

    #[test]
    fn snapshot_is_independent() {
        let mut state = ProcessingContextState::default();
        state.unassigned_modifiers.push(ChunkId(4));
        state.set_boundary(true);

        let snapshot = state.clone();
        state.unassigned_modifiers.clear();
        state.set_boundary(false);
        state.set_unassigned_chunk(true);

        assert_eq!(snapshot.unassigned_modifiers, vec![ChunkId(4)]);
        assert!(snapshot.boundary_crossed());
        assert!(!snapshot.unassigned_chunk_preceded());
        assert!(!state.boundary_crossed());
    }
}
