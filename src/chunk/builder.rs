//! Incremental construction of a [`ChunkCollector`].
//!
//! Chunks are created bottom-up: terminals first, then the nodes grouping
//! them. Only chunks passed to [`ChunkCollectorBuilder::push`] become part of
//! the top-level sequence.

use super::{CHARACTER_NAME, ChunkCollector, ChunkId, ChunkKinds, ChunkNode, ChunkType};
use std::collections::BTreeMap;

pub struct ChunkCollectorBuilder {
    nodes: Vec<ChunkNode>,
    chunks: Vec<ChunkId>,
    sentence: Option<String>,
    source: String,
}

pub(super) fn group_node(nodes: &[ChunkNode], kind: ChunkType, children: &[ChunkId], properties: &[(&str, &str)]) -> ChunkNode {
    let mut unique: Vec<ChunkId> = Vec::with_capacity(children.len());
    for &child in children {
        if !unique.contains(&child) {
            unique.push(child);
        }
    }

    let kinds = unique.iter().filter_map(|c| nodes.get(c.0)).fold(kind.flag(), |acc, n| acc | n.kinds);
    let properties = properties.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();

    ChunkNode { kind, terminal: None, children: unique, properties, kinds }
}

impl ChunkCollectorBuilder {
    pub(super) fn new(source: &str) -> Self {
        Self { nodes: Vec::new(), chunks: Vec::new(), sentence: None, source: source.to_string() }
    }

    /// Override the sentence text (defaults to the joined terminals).
    pub fn sentence(&mut self, text: &str) -> &mut Self {
        self.sentence = Some(text.to_string());
        self
    }

    pub fn terminal(&mut self, text: &str) -> ChunkId {
        self.nodes.push(ChunkNode {
            kind: ChunkType::Unassigned,
            terminal: Some(text.to_string()),
            children: Vec::new(),
            properties: BTreeMap::new(),
            kinds: ChunkKinds::empty(),
        });
        ChunkId(self.nodes.len() - 1)
    }

    /// Group existing chunks under a new node of `kind`.
    pub fn node(&mut self, kind: ChunkType, children: &[ChunkId]) -> ChunkId {
        let node = group_node(&self.nodes, kind, children, &[]);
        self.nodes.push(node);
        ChunkId(self.nodes.len() - 1)
    }

    /// A node of `kind` over one terminal per whitespace-separated word of `text`.
    pub fn leaf(&mut self, kind: ChunkType, text: &str) -> ChunkId {
        let terminals: Vec<ChunkId> = text.split_whitespace().map(|w| self.terminal(w)).collect();
        self.node(kind, &terminals)
    }

    pub fn set_property(&mut self, chunk: ChunkId, key: &str, value: &str) -> &mut Self {
        if let Some(node) = self.nodes.get_mut(chunk.0) {
            node.properties.insert(key.to_string(), value.to_string());
        }
        self
    }

    /// Append `chunk` to the top-level sequence.
    pub fn push(&mut self, chunk: ChunkId) -> &mut Self {
        self.chunks.push(chunk);
        self
    }

    // --- Shorthands ---

    pub fn organ(&mut self, text: &str) -> ChunkId {
        self.leaf(ChunkType::Organ, text)
    }

    /// `CHARACTER_STATE[STATE[text]]` tagged with `character`.
    pub fn character_state(&mut self, character: &str, text: &str) -> ChunkId {
        let chunk = self.bare_state(text);
        self.set_property(chunk, CHARACTER_NAME, character);
        chunk
    }

    /// `CHARACTER_STATE[STATE[text]]` with no character name.
    pub fn bare_state(&mut self, text: &str) -> ChunkId {
        let state = self.leaf(ChunkType::State, text);
        self.node(ChunkType::CharacterState, &[state])
    }

    pub fn modifier(&mut self, text: &str) -> ChunkId {
        self.leaf(ChunkType::Modifier, text)
    }

    pub fn constraint(&mut self, text: &str) -> ChunkId {
        self.leaf(ChunkType::Constraint, text)
    }

    pub fn count(&mut self, text: &str) -> ChunkId {
        self.leaf(ChunkType::Count, text)
    }

    pub fn numericals(&mut self, text: &str) -> ChunkId {
        self.leaf(ChunkType::Numericals, text)
    }

    pub fn object(&mut self, children: &[ChunkId]) -> ChunkId {
        self.node(ChunkType::Object, children)
    }

    /// `PP[PREPOSITION[preposition] OBJECT[object..]]`.
    pub fn pp(&mut self, preposition: &str, object: &[ChunkId]) -> ChunkId {
        let preposition = self.leaf(ChunkType::Preposition, preposition);
        let object = self.object(object);
        self.node(ChunkType::Pp, &[preposition, object])
    }

    /// `VP[VERB[verb] OBJECT[object..]]`.
    pub fn vp(&mut self, verb: &str, object: &[ChunkId]) -> ChunkId {
        let verb = self.leaf(ChunkType::Verb, verb);
        let object = self.object(object);
        self.node(ChunkType::Vp, &[verb, object])
    }

    pub fn to_phrase(&mut self, character: Option<&str>, text: &str) -> ChunkId {
        let chunk = self.leaf(ChunkType::ToPhrase, text);
        if let Some(character) = character {
            self.set_property(chunk, CHARACTER_NAME, character);
        }
        chunk
    }

    pub fn comma(&mut self) -> ChunkId {
        self.leaf(ChunkType::Comma, ",")
    }

    pub fn and(&mut self) -> ChunkId {
        self.leaf(ChunkType::And, "and")
    }

    pub fn or(&mut self) -> ChunkId {
        self.leaf(ChunkType::Or, "or")
    }

    pub fn end_of_line(&mut self) -> ChunkId {
        self.leaf(ChunkType::EndOfLine, ".")
    }

    pub fn end_of_subclause(&mut self) -> ChunkId {
        self.leaf(ChunkType::EndOfSubclause, ";")
    }

    pub fn build(self) -> ChunkCollector {
        ChunkCollector::from_parts(self.nodes, self.chunks, self.sentence, self.source)
    }
}
