//! Extraction engine.
//!
//! This module is the entry point for turning chunked sentences into
//! Structures, Characters and Relations. The work is split into focused
//! submodules under `src/engine/`; only the extractor, its passes switch and
//! the metrics types are visible outside.
//!
//! ## How the parts work together
//!
//! ```text
//! ChunkCollector (one sentence)
//!        │
//!        │  DescriptionExtractor::run_with_metrics   (extractor.rs)
//!        │    - fresh ProcessingContext per sentence (context.rs)
//!        │    - panics and errors stop only that sentence
//!        v
//!  Cursor over top-level chunks ──► dispatch::process (dispatch.rs)
//!        │                            - record state for the chunk
//!        │                            - closed match on ChunkType
//!        │                                  │
//!        │        ┌──────────────┬──────────┼─────────────┬──────────────┐
//!        │     organs.rs    characters.rs  numbers.rs  prepositions.rs  relations.rs
//!        │        └──────────────┴─── may re-dispatch sub-chunks ───────┘
//!        v
//!  finishing passes (finishing.rs)
//!    - adopt orphan Characters
//!    - whole-organism merge
//!    - may-be-same Relations
//!        │
//!        v
//!    Statement
//! ```
//!
//! Processors share one rule: they read and update the context's current
//! [`ProcessingContextState`](state::ProcessingContextState) (subjects, last
//! elements, staged modifiers/constraints/characters, boundary flags) and
//! return the elements they produced. Only Structures and Relations reach the
//! statement's top level; Characters hang off their Structures.
//!
//! ## Responsibilities by module
//!
//! - `state.rs`: the rollback-able working state and the chunk cursor.
//! - `context.rs`: per-sentence arena, result list, id counters, state history.
//! - `dispatch.rs`: type-to-processor table and the re-dispatch depth guard.
//! - `organs.rs`: structure formation, subjects, object splitting.
//! - `characters.rs`: character states, TO-phrases, modifiers, character text.
//! - `numbers.rs`: counts, measurements, chromosome counts.
//! - `prepositions.rs`: PP handling, object linking, range connection.
//! - `relations.rs`: relation labels, negation, VP.
//! - `finishing.rs`: end-of-sentence passes.
//! - `metrics.rs`: per-statement counts and timings.
//!
//! ## Debugging
//!
//! Every dispatch emits a `trace!` event with the chunk type and text;
//! structure formation, renames and the finishing passes log at `debug!`.

#[path = "engine/characters.rs"]
mod characters;
#[path = "engine/context.rs"]
mod context;
#[path = "engine/dispatch.rs"]
mod dispatch;
#[path = "engine/extractor.rs"]
mod extractor;
#[path = "engine/finishing.rs"]
mod finishing;
#[path = "engine/metrics.rs"]
mod metrics;
#[path = "engine/numbers.rs"]
mod numbers;
#[path = "engine/organs.rs"]
mod organs;
#[path = "engine/prepositions.rs"]
mod prepositions;
#[path = "engine/relations.rs"]
mod relations;
#[path = "engine/state.rs"]
mod state;

#[cfg(test)]
#[path = "engine/tests.rs"]
mod tests;

pub(crate) use extractor::{DescriptionExtractor, Passes};
pub use metrics::{RunMetrics, RunResult, StatementMetrics};
