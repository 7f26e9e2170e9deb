//! Relations between Structures and the VP processor.

use super::context::ProcessingContext;
use super::{characters, organs};
use crate::chunk::{CHARACTER_NAME, ChunkId, ChunkKinds, ChunkType};
use crate::element::{ElementId, ElementKind};
use crate::error::ExtractError;
use regex::Regex;
use tracing::debug;

pub(crate) const PART_OF: &str = "part_of";
pub(crate) const CONSIST_OF: &str = "consist_of";
pub(crate) const MAY_BE_THE_SAME: &str = "may_be_the_same";

pub(crate) fn vp(cx: &mut ProcessingContext<'_>, chunk: ChunkId) -> Result<Vec<ElementId>, ExtractError> {
    let Some(verb) = cx.collector.first_dfs(chunk, ChunkType::Verb) else {
        return Err(ExtractError::malformed(cx.text(chunk), "verb phrase without verb"));
    };
    let Some(object) = cx.collector.first_dfs(chunk, ChunkType::Object) else {
        return Err(ExtractError::malformed(cx.text(chunk), "verb phrase without object"));
    };
    let verb = cx.text(verb);
    let subjects = cx.last_structures();
    let mut modifiers = cx.take_modifiers();
    for modifier in cx.collector.descendants_of_kind(chunk, ChunkType::Modifier) {
        modifiers.push(cx.text(modifier));
    }

    if !cx.collector.contains_any(object, ChunkKinds::ORGANS) {
        // "becoming glabrous": the object only describes the subjects.
        let tokens = cx.collector.children(object).to_vec();
        let produced = characters::process_character_text(cx, &tokens, &subjects, None)?;
        cx.state.set_boundary(false);
        return Ok(produced);
    }

    let structures = organs::extract_structures_from_object(cx, object)?;
    let mut produced = structures.clone();
    produced.extend(create_relations(cx, &verb, &subjects, &structures, modifiers));
    cx.state.last_elements = structures;
    cx.state.set_boundary(false);
    Ok(produced)
}

/// Label for a PP relation; only "of" needs disambiguation.
pub(crate) fn relation_label(
    cx: &ProcessingContext<'_>,
    preposition: &str,
    subjects: &[ElementId],
    objects: &[ElementId],
    object: ChunkId,
) -> Result<String, ExtractError> {
    if !preposition.eq_ignore_ascii_case("of") {
        return Ok(preposition.to_string());
    }

    let top_level = cx.collector.chunks();
    let owner = cx.collector.terminals_of(object).first().and_then(|&t| cx.collector.owner_of(t));
    if let Some(index) = owner.and_then(|o| top_level.iter().position(|&c| c == o)) {
        let before = index.checked_sub(1).map(|i| top_level[i]);
        if before.is_some_and(|c| cx.collector.kind(c).is_prepositional()) {
            return Ok(PART_OF.to_string());
        }
        let after = top_level.get(index + 1).copied();
        if after.is_some_and(|c| is_count_marker(cx, c)) {
            return Ok(CONSIST_OF.to_string());
        }
    }

    let counted = cx.collector.children(object).iter().any(|&c| {
        cx.collector.kind(c) == ChunkType::Count || (cx.collector.kind(c) == ChunkType::CharacterState && is_count_state(cx, c))
    });
    if counted {
        return Ok(CONSIST_OF.to_string());
    }
    differentiate_of(cx, subjects, objects)
}

fn is_count_state(cx: &ProcessingContext<'_>, chunk: ChunkId) -> bool {
    cx.collector.property_bfs(chunk, CHARACTER_NAME).is_some_and(|name| name.contains("count"))
}

/// Chunks after an "of" object that mark its organs as counted members.
fn is_count_marker(cx: &ProcessingContext<'_>, chunk: ChunkId) -> bool {
    match cx.collector.kind(chunk) {
        ChunkType::EndOfLine | ChunkType::EndOfSubclause | ChunkType::Count => true,
        ChunkType::CharacterState => is_count_state(cx, chunk),
        _ => false,
    }
}

/// Clusters always consist of their members; otherwise look for
/// "<before> of <number> ... <after>" somewhere in the corpus.
fn differentiate_of(cx: &ProcessingContext<'_>, subjects: &[ElementId], objects: &[ElementId]) -> Result<String, ExtractError> {
    let inflector = cx.knowledge.inflector;
    for &subject in subjects {
        let before = cx.elements.name(subject);
        if before.is_empty() {
            continue;
        }
        if cx.lexicon.is_cluster(before) {
            return Ok(CONSIST_OF.to_string());
        }
        for &object in objects {
            let after = cx.elements.name(object);
            if after.is_empty() {
                continue;
            }
            let pattern = format!(
                r"\b(?:{}|{}) +of +[0-9]+.*\b(?:{}|{}) ?(?:,|;|\.|and|or|plus)",
                regex::escape(before),
                regex::escape(&inflector.plural(before)),
                regex::escape(after),
                regex::escape(&inflector.plural(after)),
            );
            let pattern = Regex::new(&pattern)?;
            if cx.knowledge.corpus.sentences().iter().any(|s| pattern.is_match(s)) {
                debug!(before, after, "corpus attests counted membership");
                return Ok(CONSIST_OF.to_string());
            }
        }
    }
    Ok(PART_OF.to_string())
}

/// One Relation per (from, to) pair. A "not" modifier or a "not" in the
/// label becomes `negation="true"`.
pub(crate) fn create_relations(
    cx: &mut ProcessingContext<'_>,
    label: &str,
    from: &[ElementId],
    to: &[ElementId],
    mut modifiers: Vec<String>,
) -> Vec<ElementId> {
    let mut negation = false;
    modifiers.retain(|m| {
        let not = m.eq_ignore_ascii_case("not");
        negation |= not;
        !not
    });
    let mut label = label.to_string();
    if regex!(r"\bnot\b").is_match(&label) {
        negation = true;
        label = regex!(r"\s+").replace_all(&regex!(r"\bnot\b").replace_all(&label, ""), " ").trim().to_string();
    }

    let from_ids = cx.ids_of(from);
    let to_ids = cx.ids_of(to);
    let mut relations = Vec::with_capacity(from_ids.len() * to_ids.len());
    for from_id in &from_ids {
        for to_id in &to_ids {
            let relation = add_relation(cx, &label, from_id, to_id, negation);
            for modifier in &modifiers {
                cx.elements.append(relation, "modifier", modifier);
            }
            cx.apply_clause_constraint(relation);
            relations.push(relation);
        }
    }
    relations
}

pub(crate) fn add_relation(cx: &mut ProcessingContext<'_>, label: &str, from: &str, to: &str, negation: bool) -> ElementId {
    let id = cx.next_relation_id();
    let relation = cx.elements.create(ElementKind::Relation);
    cx.elements.set(relation, "id", id);
    cx.elements.set(relation, "name", label);
    cx.elements.set(relation, "from", from);
    cx.elements.set(relation, "to", to);
    cx.elements.set(relation, "negation", negation.to_string());
    relation
}
