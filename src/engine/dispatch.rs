//! Chunk-type dispatch.
//!
//! Every chunk, top-level or re-dispatched from inside another processor,
//! goes through [`process`]: the current state is recorded for the chunk,
//! then the processor for its type runs. The table is a closed `match`, so
//! a new chunk type cannot be added without deciding how it is handled.

use super::context::ProcessingContext;
use super::{characters, numbers, organs, prepositions, relations};
use crate::chunk::{ChunkId, ChunkType};
use crate::element::ElementId;
use crate::error::ExtractError;
use tracing::{trace, warn};

/// Nesting limit for processors that re-dispatch sub-chunks.
pub(crate) const MAX_DEPTH: usize = 64;

pub(crate) fn process(cx: &mut ProcessingContext<'_>, chunk: ChunkId) -> Result<Vec<ElementId>, ExtractError> {
    if cx.depth >= MAX_DEPTH {
        return Err(ExtractError::RecursionLimit { depth: cx.depth });
    }
    let kind = cx.collector.node(chunk).ok_or(ExtractError::UnknownChunk(chunk.index()))?.kind();

    cx.record_state(chunk);
    cx.dispatched += 1;
    trace!(chunk = %kind, text = %cx.text(chunk), depth = cx.depth, "dispatch");

    cx.depth += 1;
    let outcome = route(cx, chunk, kind);
    cx.depth -= 1;

    match outcome {
        Err(ExtractError::MalformedChunk { chunk: text, reason }) => {
            warn!(chunk = %kind, text = %text, reason, "skipping malformed chunk");
            Ok(Vec::new())
        }
        other => other,
    }
}

fn route(cx: &mut ProcessingContext<'_>, chunk: ChunkId, kind: ChunkType) -> Result<Vec<ElementId>, ExtractError> {
    match kind {
        ChunkType::Organ | ChunkType::NonSubjectOrgan | ChunkType::MainSubjectOrgan => organs::organ(cx, chunk, kind),
        ChunkType::NpList => organs::np_list(cx, chunk),
        ChunkType::Object => organs::object(cx, chunk),
        ChunkType::CharacterState | ChunkType::State => characters::character_state(cx, chunk),
        ChunkType::ToPhrase => characters::to_phrase(cx, chunk),
        ChunkType::Modifier => characters::modifier(cx, chunk),
        ChunkType::Constraint => {
            cx.state.unassigned_constraints.push(chunk);
            Ok(Vec::new())
        }
        ChunkType::Pp | ChunkType::SpecificPp => prepositions::pp(cx, chunk),
        ChunkType::Vp => relations::vp(cx, chunk),
        ChunkType::Count => numbers::count(cx, chunk),
        ChunkType::Numericals => numbers::numericals(cx, chunk),
        ChunkType::Chrom => numbers::chrom(cx, chunk),
        ChunkType::Comma | ChunkType::And | ChunkType::Or | ChunkType::EndOfLine => {
            cx.state.set_boundary(true);
            Ok(Vec::new())
        }
        ChunkType::EndOfSubclause => {
            cx.state.set_boundary(true);
            cx.state.last_elements = cx.state.subjects.clone();
            Ok(Vec::new())
        }
        // Bare words and stray heads carry nothing on their own.
        ChunkType::Unassigned | ChunkType::Preposition | ChunkType::Verb => Ok(Vec::new()),
    }
}
