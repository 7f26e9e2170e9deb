//! Turns chunked taxonomic descriptions into Structures, Characters and
//! Relations.
//!
//! A description arrives as a sequence of [`ChunkCollector`]s, one per
//! sentence, produced by an upstream chunker. Each sentence becomes one
//! [`Statement`]; see [`extract`] for the entry point and [`numeric`] for the
//! standalone numeric expression parser.

#[macro_use]
mod macros;
mod api;
mod chunk;
mod element;
mod engine;
mod error;
mod knowledge;
mod lexicon;
pub mod numeric;

#[cfg(test)]
mod test_support;

pub use api::{Description, DescriptionVerbose, ExtractionDetails, Options, extract, extract_verbose_with, extract_with};
pub use chunk::{CHARACTER_NAME, ChunkCollector, ChunkCollectorBuilder, ChunkId, ChunkKinds, ChunkNode, ChunkType};
pub use element::{Attributes, Element, ElementKind, Statement};
pub use engine::{RunMetrics, RunResult, StatementMetrics};
pub use error::ExtractError;
pub use knowledge::{
    AdverbPredicate, CharacterDictionary, CorpusSentences, Glossary, Inflector, Knowledge, MemoryGlossary, SimpleInflector,
    SuffixAdverbs,
};
pub use lexicon::{DEFAULT_NUMBER_PATTERN, Lexicon};
