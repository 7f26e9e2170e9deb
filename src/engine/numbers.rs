//! COUNT, NUMERICALS and CHROM chunks.

use super::context::ProcessingContext;
use crate::chunk::{CHARACTER_NAME, ChunkId};
use crate::element::{ElementId, ElementKind};
use crate::error::ExtractError;

/// Parse `text` into Characters of `parents`, each carrying `modifiers` and
/// the pending clause constraint.
pub(crate) fn annotate_numericals(
    cx: &mut ProcessingContext<'_>,
    text: &str,
    default_name: &str,
    modifiers: &[String],
    parents: &[ElementId],
) -> Vec<ElementId> {
    let facts = cx.numeric.parse(text, default_name);
    let mut characters = Vec::with_capacity(facts.len());
    for fact in facts {
        let character = cx.elements.create(ElementKind::Character);
        for (key, value) in fact.to_attributes().iter() {
            cx.elements.set(character, key, value);
        }
        for modifier in modifiers {
            cx.elements.append(character, "modifier", modifier);
        }
        cx.apply_clause_constraint(character);
        cx.attach(parents, character);
        characters.push(character);
    }
    characters
}

pub(crate) fn count(cx: &mut ProcessingContext<'_>, chunk: ChunkId) -> Result<Vec<ElementId>, ExtractError> {
    numeric_chunk(cx, chunk, "count")
}

pub(crate) fn numericals(cx: &mut ProcessingContext<'_>, chunk: ChunkId) -> Result<Vec<ElementId>, ExtractError> {
    numeric_chunk(cx, chunk, "size")
}

fn numeric_chunk(cx: &mut ProcessingContext<'_>, chunk: ChunkId, default_name: &str) -> Result<Vec<ElementId>, ExtractError> {
    let text = cx.text(chunk);
    if text.is_empty() {
        return Err(ExtractError::malformed(text, "numeric chunk without words"));
    }
    let name = cx.collector.property_bfs(chunk, CHARACTER_NAME).unwrap_or(default_name).to_string();
    let parents = cx.last_structures();
    let modifiers = cx.take_modifiers();

    let characters = annotate_numericals(cx, &text, &name, &modifiers, &parents);
    cx.state.last_elements = characters.clone();
    cx.state.set_boundary(false);
    Ok(characters)
}

/// `2n = 18`: a chromosome Structure with the count on the right of `=`.
pub(crate) fn chrom(cx: &mut ProcessingContext<'_>, chunk: ChunkId) -> Result<Vec<ElementId>, ExtractError> {
    let text = cx.text(chunk);
    let parts: Vec<&str> = text.split('=').collect();
    let [_, count] = parts.as_slice() else {
        return Err(ExtractError::malformed(text.clone(), "chromosome count without a single '='"));
    };

    let chromosome = cx.new_structure("chromosome");
    annotate_numericals(cx, count.trim(), "count", &[], &[chromosome]);
    cx.apply_clause_constraint(chromosome);
    cx.state.set_boundary(false);
    Ok(vec![chromosome])
}
