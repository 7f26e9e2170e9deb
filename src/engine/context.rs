//! Per-sentence processing context.
//!
//! Owns everything one sentence needs while its chunks are dispatched: a
//! private copy of the chunk tree, the cursor, the element arena, the result
//! list and the current [`ProcessingContextState`]. Nothing in here outlives
//! the sentence, so one sentence can never leak staged data into the next.

use super::state::{Cursor, ProcessingContextState};
use crate::chunk::{ChunkCollector, ChunkId};
use crate::element::{ElementId, ElementKind, Elements, Statement};
use crate::knowledge::Knowledge;
use crate::lexicon::Lexicon;
use crate::numeric::NumericParser;
use std::collections::HashMap;

pub(crate) struct ProcessingContext<'a> {
    pub collector: ChunkCollector,
    pub cursor: Cursor,
    pub state: ProcessingContextState,
    pub elements: Elements,
    pub knowledge: Knowledge<'a>,
    pub lexicon: &'a Lexicon,
    pub numeric: &'a NumericParser,
    /// Current re-dispatch nesting.
    pub depth: usize,
    /// Chunks dispatched so far, nested ones included.
    pub dispatched: usize,
    result: Vec<ElementId>,
    history: HashMap<ChunkId, ProcessingContextState>,
    structures_issued: usize,
    relations_issued: usize,
}

impl<'a> ProcessingContext<'a> {
    pub fn new(collector: ChunkCollector, knowledge: Knowledge<'a>, lexicon: &'a Lexicon, numeric: &'a NumericParser) -> Self {
        let cursor = Cursor::new(collector.chunks().to_vec());
        Self {
            collector,
            cursor,
            state: ProcessingContextState::default(),
            elements: Elements::default(),
            knowledge,
            lexicon,
            numeric,
            depth: 0,
            dispatched: 0,
            result: Vec::new(),
            history: HashMap::new(),
            structures_issued: 0,
            relations_issued: 0,
        }
    }

    // --- State history ---

    /// Remember the state as it was when `chunk` started processing.
    pub fn record_state(&mut self, chunk: ChunkId) {
        self.history.insert(chunk, self.state.clone());
    }

    pub fn state_at(&self, chunk: ChunkId) -> Option<&ProcessingContextState> {
        self.history.get(&chunk)
    }

    /// Run `f` against the state recorded for `chunk`, then restore the live
    /// state. Characters staged during the replay carry over.
    pub fn replay_at<T, E>(&mut self, chunk: ChunkId, f: impl FnOnce(&mut Self) -> Result<T, E>) -> Result<T, E> {
        let Some(recorded) = self.state_at(chunk).cloned() else {
            return f(self);
        };
        let staged_before = recorded.unassigned_characters.len();
        let live = std::mem::replace(&mut self.state, recorded);
        let outcome = f(self);
        let replayed = std::mem::replace(&mut self.state, live);
        for &character in replayed.unassigned_characters.iter().skip(staged_before) {
            self.state.stage_character(character);
        }
        outcome
    }

    // --- Elements ---

    pub fn next_structure_id(&mut self) -> String {
        self.structures_issued += 1;
        format!("o{}", self.structures_issued)
    }

    pub fn next_relation_id(&mut self) -> String {
        self.relations_issued += 1;
        format!("r{}", self.relations_issued)
    }

    pub fn new_structure(&mut self, name: &str) -> ElementId {
        let id = self.next_structure_id();
        let structure = self.elements.create(ElementKind::Structure);
        self.elements.set(structure, "id", id);
        self.elements.set(structure, "name", name);
        structure
    }

    pub fn is_structure(&self, id: ElementId) -> bool {
        self.elements.is(id, ElementKind::Structure)
    }

    pub fn is_character(&self, id: ElementId) -> bool {
        self.elements.is(id, ElementKind::Character)
    }

    pub fn is_relation(&self, id: ElementId) -> bool {
        self.elements.is(id, ElementKind::Relation)
    }

    /// Structures a Character produced now should attach to.
    pub fn last_structures(&self) -> Vec<ElementId> {
        let last_is_structure = self.state.last_element().is_some_and(|e| self.is_structure(e));
        if !self.state.boundary_crossed() && last_is_structure {
            self.state.last_elements.iter().copied().filter(|&e| self.is_structure(e)).collect()
        } else {
            self.state.subjects.clone()
        }
    }

    /// Attach `child` to every parent, or stage it while no parent is known.
    pub fn attach(&mut self, parents: &[ElementId], child: ElementId) {
        if parents.is_empty() {
            self.state.stage_character(child);
            return;
        }
        for &parent in parents {
            self.elements.add_child(parent, child);
        }
    }

    /// Consume the clause-level constraint, if any, onto `element`.
    pub fn apply_clause_constraint(&mut self, element: ElementId) {
        if let Some(constraint) = self.state.clause_constraint.take() {
            self.elements.set(element, "constraint", constraint);
        }
        if let Some(id) = self.state.clause_constraint_id.take() {
            self.elements.set(element, "constraintid", id);
        }
    }

    pub fn ids_of(&self, elements: &[ElementId]) -> Vec<String> {
        elements.iter().filter_map(|&e| self.elements.attr(e, "id")).map(str::to_string).collect()
    }

    // --- Chunk helpers ---

    pub fn text(&self, chunk: ChunkId) -> String {
        self.collector.text(chunk)
    }

    pub fn texts(&self, chunks: &[ChunkId]) -> Vec<String> {
        chunks.iter().map(|&c| self.collector.text(c)).filter(|t| !t.is_empty()).collect()
    }

    pub fn singular(&self, word: &str) -> String {
        self.knowledge.inflector.singular(word)
    }

    /// Take the staged modifier chunks as text.
    pub fn take_modifiers(&mut self) -> Vec<String> {
        let staged = std::mem::take(&mut self.state.unassigned_modifiers);
        self.texts(&staged)
    }

    // --- Result ---

    /// Keep Structures and Relations from `produced`, skipping duplicates.
    pub fn add_to_result(&mut self, produced: &[ElementId]) {
        for &element in produced {
            let kind = self.elements.kind(element);
            let kept = matches!(kind, ElementKind::Structure | ElementKind::Relation);
            if kept && !self.result.contains(&element) {
                self.result.push(element);
            }
        }
    }

    pub fn result(&self) -> &[ElementId] {
        &self.result
    }

    pub fn result_mut(&mut self) -> &mut Vec<ElementId> {
        &mut self.result
    }

    pub fn into_statement(self) -> Statement {
        let elements = self.result.iter().map(|&e| self.elements.materialize(e)).collect();
        Statement { text: self.collector.sentence().to_string(), source: self.collector.source().to_string(), elements }
    }
}
