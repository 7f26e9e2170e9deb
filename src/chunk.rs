//! Typed chunk trees, one collector per sentence.
//!
//! The upstream chunker hands the engine a sentence that has already been cut
//! into typed spans. Every span is a node in an arena owned by the sentence's
//! [`ChunkCollector`]; nodes point at their children by index and never at their
//! parents.
//!
//! ```text
//!  top-level sequence:   [ORGAN]   [CHARACTER_STATE]        [PP]
//!                           │              │                 │
//!                        "leaves"       [STATE]      [PREPOSITION] [OBJECT]
//!                                          │               │           │
//!                                       "ovate"          "with"     [ORGAN]
//!                                                                      │
//!                                                                   "hairs"
//! ```
//!
//! A node is either a terminal (one word of the sentence) or an ordered set of
//! child nodes. Text is always derived from terminals, so a chunk's text is the
//! concatenation of its children's text in sentence order.
//!
//! Each node caches a [`ChunkKinds`] set of every type found in its subtree
//! (itself included). Containment-by-type queries are a single mask test.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::fmt;

#[path = "chunk/builder.rs"]
mod builder;

pub use builder::ChunkCollectorBuilder;

/// Property key the chunker uses to tag a chunk with its character name.
pub const CHARACTER_NAME: &str = "characterName";

// --- Chunk types -------------------------------------------------------------

/// Closed set of chunk tags produced by the chunker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChunkType {
    Unassigned,
    Organ,
    NonSubjectOrgan,
    MainSubjectOrgan,
    NpList,
    State,
    CharacterState,
    Modifier,
    Constraint,
    Pp,
    SpecificPp,
    Preposition,
    Object,
    Vp,
    Verb,
    Count,
    Numericals,
    Chrom,
    ToPhrase,
    Comma,
    And,
    Or,
    EndOfLine,
    EndOfSubclause,
}

impl ChunkType {
    pub fn flag(self) -> ChunkKinds {
        match self {
            ChunkType::Unassigned => ChunkKinds::UNASSIGNED,
            ChunkType::Organ => ChunkKinds::ORGAN,
            ChunkType::NonSubjectOrgan => ChunkKinds::NON_SUBJECT_ORGAN,
            ChunkType::MainSubjectOrgan => ChunkKinds::MAIN_SUBJECT_ORGAN,
            ChunkType::NpList => ChunkKinds::NP_LIST,
            ChunkType::State => ChunkKinds::STATE,
            ChunkType::CharacterState => ChunkKinds::CHARACTER_STATE,
            ChunkType::Modifier => ChunkKinds::MODIFIER,
            ChunkType::Constraint => ChunkKinds::CONSTRAINT,
            ChunkType::Pp => ChunkKinds::PP,
            ChunkType::SpecificPp => ChunkKinds::SPECIFIC_PP,
            ChunkType::Preposition => ChunkKinds::PREPOSITION,
            ChunkType::Object => ChunkKinds::OBJECT,
            ChunkType::Vp => ChunkKinds::VP,
            ChunkType::Verb => ChunkKinds::VERB,
            ChunkType::Count => ChunkKinds::COUNT,
            ChunkType::Numericals => ChunkKinds::NUMERICALS,
            ChunkType::Chrom => ChunkKinds::CHROM,
            ChunkType::ToPhrase => ChunkKinds::TO_PHRASE,
            ChunkType::Comma => ChunkKinds::COMMA,
            ChunkType::And => ChunkKinds::AND,
            ChunkType::Or => ChunkKinds::OR,
            ChunkType::EndOfLine => ChunkKinds::END_OF_LINE,
            ChunkType::EndOfSubclause => ChunkKinds::END_OF_SUBCLAUSE,
        }
    }

    pub fn is_organ(self) -> bool {
        ChunkKinds::ORGANS.contains(self.flag())
    }

    pub fn is_connector(self) -> bool {
        matches!(self, ChunkType::Comma | ChunkType::And | ChunkType::Or)
    }

    pub fn is_prepositional(self) -> bool {
        matches!(self, ChunkType::Pp | ChunkType::SpecificPp)
    }
}

impl fmt::Display for ChunkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChunkType::Unassigned => "UNASSIGNED",
            ChunkType::Organ => "ORGAN",
            ChunkType::NonSubjectOrgan => "NON_SUBJECT_ORGAN",
            ChunkType::MainSubjectOrgan => "MAIN_SUBJECT_ORGAN",
            ChunkType::NpList => "NP_LIST",
            ChunkType::State => "STATE",
            ChunkType::CharacterState => "CHARACTER_STATE",
            ChunkType::Modifier => "MODIFIER",
            ChunkType::Constraint => "CONSTRAINT",
            ChunkType::Pp => "PP",
            ChunkType::SpecificPp => "SPECIFIC_PP",
            ChunkType::Preposition => "PREPOSITION",
            ChunkType::Object => "OBJECT",
            ChunkType::Vp => "VP",
            ChunkType::Verb => "VERB",
            ChunkType::Count => "COUNT",
            ChunkType::Numericals => "NUMERICALS",
            ChunkType::Chrom => "CHROM",
            ChunkType::ToPhrase => "TO_PHRASE",
            ChunkType::Comma => "COMMA",
            ChunkType::And => "AND",
            ChunkType::Or => "OR",
            ChunkType::EndOfLine => "END_OF_LINE",
            ChunkType::EndOfSubclause => "END_OF_SUBCLAUSE",
        };
        f.write_str(name)
    }
}

bitflags::bitflags! {
    /// Set of chunk types present in a subtree.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ChunkKinds: u32 {
        const UNASSIGNED         = 1 << 0;
        const ORGAN              = 1 << 1;
        const NON_SUBJECT_ORGAN  = 1 << 2;
        const MAIN_SUBJECT_ORGAN = 1 << 3;
        const NP_LIST            = 1 << 4;
        const STATE              = 1 << 5;
        const CHARACTER_STATE    = 1 << 6;
        const MODIFIER           = 1 << 7;
        const CONSTRAINT         = 1 << 8;
        const PP                 = 1 << 9;
        const SPECIFIC_PP        = 1 << 10;
        const PREPOSITION        = 1 << 11;
        const OBJECT             = 1 << 12;
        const VP                 = 1 << 13;
        const VERB               = 1 << 14;
        const COUNT              = 1 << 15;
        const NUMERICALS         = 1 << 16;
        const CHROM              = 1 << 17;
        const TO_PHRASE          = 1 << 18;
        const COMMA              = 1 << 19;
        const AND                = 1 << 20;
        const OR                 = 1 << 21;
        const END_OF_LINE        = 1 << 22;
        const END_OF_SUBCLAUSE   = 1 << 23;

        const ORGANS = Self::ORGAN.bits() | Self::NON_SUBJECT_ORGAN.bits() | Self::MAIN_SUBJECT_ORGAN.bits();
    }
}

// --- Nodes -------------------------------------------------------------------

/// Index of a chunk inside its sentence's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkId(pub(crate) usize);

impl ChunkId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
pub struct ChunkNode {
    kind: ChunkType,
    terminal: Option<String>,
    children: Vec<ChunkId>,
    properties: BTreeMap<String, String>,
    kinds: ChunkKinds,
}

impl ChunkNode {
    pub fn kind(&self) -> ChunkType {
        self.kind
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal.is_some()
    }

    pub fn children(&self) -> &[ChunkId] {
        &self.children
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }
}

// --- Collector ---------------------------------------------------------------

/// One sentence worth of chunks plus its source metadata.
#[derive(Debug, Clone)]
pub struct ChunkCollector {
    nodes: Vec<ChunkNode>,
    chunks: Vec<ChunkId>,
    terminals: Vec<ChunkId>,
    owners: HashMap<ChunkId, ChunkId>,
    sentence: String,
    source: String,
}

impl ChunkCollector {
    /// Start building a collector for a sentence coming from `source`.
    pub fn builder(source: &str) -> ChunkCollectorBuilder {
        ChunkCollectorBuilder::new(source)
    }

    pub(crate) fn from_parts(nodes: Vec<ChunkNode>, chunks: Vec<ChunkId>, sentence: Option<String>, source: String) -> Self {
        let mut collector =
            ChunkCollector { nodes, chunks, terminals: Vec::new(), owners: HashMap::new(), sentence: String::new(), source };

        let tops = collector.chunks.clone();
        for top in tops {
            for terminal in collector.terminals_of(top) {
                collector.terminals.push(terminal);
                collector.owners.insert(terminal, top);
            }
        }

        collector.sentence = sentence.unwrap_or_else(|| collector.text_of(&collector.chunks));
        collector
    }

    pub fn sentence(&self) -> &str {
        &self.sentence
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Top-level chunk sequence in sentence order.
    pub fn chunks(&self) -> &[ChunkId] {
        &self.chunks
    }

    /// Every terminal of the sentence in order.
    pub fn terminals(&self) -> &[ChunkId] {
        &self.terminals
    }

    pub fn node(&self, id: ChunkId) -> Option<&ChunkNode> {
        self.nodes.get(id.0)
    }

    // Ids are only handed out by this collector's builder.
    fn get(&self, id: ChunkId) -> &ChunkNode {
        &self.nodes[id.0]
    }

    pub fn kind(&self, id: ChunkId) -> ChunkType {
        self.get(id).kind
    }

    pub fn is_terminal(&self, id: ChunkId) -> bool {
        self.get(id).is_terminal()
    }

    pub fn children(&self, id: ChunkId) -> &[ChunkId] {
        &self.get(id).children
    }

    /// Property set directly on `id`.
    pub fn property(&self, id: ChunkId, key: &str) -> Option<&str> {
        self.get(id).property(key)
    }

    /// First value of `key` found breadth-first in the subtree of `id`.
    pub fn property_bfs(&self, id: ChunkId, key: &str) -> Option<&str> {
        let mut queue = VecDeque::from([id]);
        while let Some(current) = queue.pop_front() {
            let node = self.get(current);
            if let Some(value) = node.property(key) {
                return Some(value);
            }
            queue.extend(node.children.iter().copied());
        }
        None
    }

    /// Terminals under `id`, in order. A terminal yields itself.
    pub fn terminals_of(&self, id: ChunkId) -> Vec<ChunkId> {
        let mut out = Vec::new();
        self.collect_terminals(id, &mut out);
        out
    }

    fn collect_terminals(&self, id: ChunkId, out: &mut Vec<ChunkId>) {
        let node = self.get(id);
        if node.is_terminal() {
            out.push(id);
        } else {
            for &child in &node.children {
                self.collect_terminals(child, out);
            }
        }
    }

    pub fn terminal_text(&self, id: ChunkId) -> &str {
        self.get(id).terminal.as_deref().unwrap_or("")
    }

    pub fn words(&self, id: ChunkId) -> Vec<&str> {
        self.terminals_of(id).into_iter().map(|t| self.terminal_text(t)).filter(|w| !w.is_empty()).collect()
    }

    /// Space-joined terminal text of `id`.
    pub fn text(&self, id: ChunkId) -> String {
        self.words(id).join(" ")
    }

    pub fn text_of(&self, ids: &[ChunkId]) -> String {
        ids.iter().map(|&id| self.text(id)).filter(|t| !t.is_empty()).collect::<Vec<_>>().join(" ")
    }

    /// Whether `id` or any descendant has type `kind`.
    pub fn contains_kind(&self, id: ChunkId, kind: ChunkType) -> bool {
        self.get(id).kinds.contains(kind.flag())
    }

    pub fn contains_any(&self, id: ChunkId, kinds: ChunkKinds) -> bool {
        self.get(id).kinds.intersects(kinds)
    }

    pub fn has_child_of_kind(&self, id: ChunkId, kind: ChunkType) -> bool {
        self.child_of_kind(id, kind).is_some()
    }

    pub fn child_of_kind(&self, id: ChunkId, kind: ChunkType) -> Option<ChunkId> {
        self.get(id).children.iter().copied().find(|&c| self.kind(c) == kind && !self.is_terminal(c))
    }

    /// First chunk of `kind` in pre-order, `id` included.
    pub fn first_dfs(&self, id: ChunkId, kind: ChunkType) -> Option<ChunkId> {
        let node = self.get(id);
        if !node.kinds.contains(kind.flag()) {
            return None;
        }
        if node.kind == kind && !node.is_terminal() {
            return Some(id);
        }
        node.children.iter().find_map(|&child| self.first_dfs(child, kind))
    }

    /// First chunk of `kind` in breadth-first order, `id` included.
    pub fn first_bfs(&self, id: ChunkId, kind: ChunkType) -> Option<ChunkId> {
        let mut queue = VecDeque::from([id]);
        while let Some(current) = queue.pop_front() {
            let node = self.get(current);
            if !node.kinds.contains(kind.flag()) {
                continue;
            }
            if node.kind == kind && !node.is_terminal() {
                return Some(current);
            }
            queue.extend(node.children.iter().copied());
        }
        None
    }

    /// Outermost chunks of `kind` in the subtree of `id` (matches are not descended into).
    pub fn descendants_of_kind(&self, id: ChunkId, kind: ChunkType) -> Vec<ChunkId> {
        let mut out = Vec::new();
        self.collect_kind(id, kind.flag(), &mut out);
        out
    }

    /// Outermost chunks whose type is any of `kinds`.
    pub fn descendants_of_any(&self, id: ChunkId, kinds: ChunkKinds) -> Vec<ChunkId> {
        let mut out = Vec::new();
        self.collect_kind(id, kinds, &mut out);
        out
    }

    fn collect_kind(&self, id: ChunkId, kinds: ChunkKinds, out: &mut Vec<ChunkId>) {
        let node = self.get(id);
        if !node.kinds.intersects(kinds) {
            return;
        }
        if kinds.contains(node.kind.flag()) && !node.is_terminal() {
            out.push(id);
            return;
        }
        for &child in &node.children {
            self.collect_kind(child, kinds, out);
        }
    }

    /// Whether `terminal` is `id` itself or lies in its subtree.
    pub fn contains_terminal(&self, id: ChunkId, terminal: ChunkId) -> bool {
        id == terminal || self.get(id).children.iter().any(|&child| self.contains_terminal(child, terminal))
    }

    /// Outermost chunk of `kind` within `scope` whose span covers `terminal`.
    pub fn covering(&self, scope: &[ChunkId], kind: ChunkType, terminal: ChunkId) -> Option<ChunkId> {
        scope.iter().find_map(|&root| {
            self.descendants_of_kind(root, kind).into_iter().find(|&c| self.contains_terminal(c, terminal))
        })
    }

    /// Top-level chunk that owns `terminal`.
    pub fn owner_of(&self, terminal: ChunkId) -> Option<ChunkId> {
        self.owners.get(&terminal).copied()
    }

    /// Rewrite one terminal. Used when a hyphenated fragment is completed.
    pub(crate) fn set_terminal_text(&mut self, terminal: ChunkId, text: String) {
        if let Some(node) = self.nodes.get_mut(terminal.0) {
            if node.is_terminal() {
                node.terminal = Some(text);
            }
        }
    }

    /// Add a detached grouping chunk over existing nodes. The top-level
    /// sequence is left untouched.
    pub(crate) fn add_synthetic(&mut self, kind: ChunkType, children: &[ChunkId], properties: &[(&str, &str)]) -> ChunkId {
        let node = builder::group_node(&self.nodes, kind, children, properties);
        self.nodes.push(node);
        ChunkId(self.nodes.len() - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (ChunkCollector, ChunkId, ChunkId) {
        let mut b = ChunkCollector::builder("doc-1");
        let leaves = b.organ("leaves");
        let shape = b.character_state("shape", "broadly ovate");
        let hairs = b.organ("glandular hairs");
        let pp = b.pp("with", &[hairs]);
        b.push(leaves).push(shape).push(pp);
        (b.build(), shape, pp)
    }

    #[test]
    fn text_is_concatenation_of_children() {
        let (collector, _, pp) = sample();
        for &top in collector.chunks() {
            let joined = collector.text_of(collector.children(top));
            let own = collector.text(top);
            if collector.is_terminal(top) {
                continue;
            }
            assert_eq!(own, joined);
        }
        assert_eq!(collector.text(pp), "with glandular hairs");
        assert_eq!(collector.sentence(), "leaves broadly ovate with glandular hairs");
        assert_eq!(collector.terminals().len(), 6);
    }

    #[test]
    fn kind_queries_cover_subtree() {
        let (collector, shape, pp) = sample();
        assert!(collector.contains_kind(pp, ChunkType::Organ));
        assert!(collector.contains_any(pp, ChunkKinds::ORGANS));
        assert!(!collector.contains_kind(shape, ChunkType::Organ));
        assert!(collector.has_child_of_kind(pp, ChunkType::Object));
        assert!(!collector.has_child_of_kind(pp, ChunkType::Organ));

        let state = collector.first_dfs(shape, ChunkType::State).unwrap();
        assert_eq!(collector.text(state), "broadly ovate");
        assert_eq!(collector.first_dfs(shape, ChunkType::CharacterState), Some(shape));
        assert_eq!(collector.property_bfs(shape, CHARACTER_NAME), Some("shape"));
    }

    #[test]
    fn covering_finds_governing_chunk() {
        let (collector, _, pp) = sample();
        let hairs_terminal = *collector.terminals().last().unwrap();
        let organ = collector.covering(&[pp], ChunkType::Organ, hairs_terminal).unwrap();
        assert_eq!(collector.text(organ), "glandular hairs");
        assert_eq!(collector.owner_of(hairs_terminal), Some(pp));
    }

    #[test]
    fn terminal_patch_is_visible_through_ancestors() {
        let (mut collector, shape, _) = sample();
        let last = *collector.terminals_of(shape).last().unwrap();
        collector.set_terminal_text(last, "ovate-shaped".to_string());
        assert_eq!(collector.text(shape), "broadly ovate-shaped");

        let group = collector.add_synthetic(ChunkType::CharacterState, &[shape], &[(CHARACTER_NAME, "form")]);
        assert_eq!(collector.text(group), "broadly ovate-shaped");
        assert_eq!(collector.property(group, CHARACTER_NAME), Some("form"));
        assert_eq!(collector.chunks().len(), 3);
    }
}
