//! Prepositional phrases.
//!
//! A PP either scopes the clause ("at maturity" before a state), names a
//! character ("in outline"), counts ("with 5"), constrains the preceding
//! Character or Structure, or links it to the Structures of its object:
//!
//! ```text
//!   PP ──┬─ no organ, state follows ──► clause constraint
//!        ├─ "<prep> <character word>" ──► character name / value
//!        ├─ numeric object ──► count on last Structures
//!        └─ per object:  [before] [organs] [after]
//!                           │        │        └─► re-dispatched under the new Structures
//!                           │        └─► link_objects (Relation or Character constraint)
//!                           └─► "to": range with the preceding state
//! ```

use super::context::ProcessingContext;
use super::{characters, numbers, organs, relations};
use crate::chunk::{CHARACTER_NAME, ChunkId, ChunkKinds, ChunkType};
use crate::element::ElementId;
use crate::error::ExtractError;
use tracing::debug;

pub(crate) fn pp(cx: &mut ProcessingContext<'_>, chunk: ChunkId) -> Result<Vec<ElementId>, ExtractError> {
    let next_is_state =
        cx.cursor.peek_next().is_some_and(|next| cx.collector.kind(next) == ChunkType::CharacterState);
    if !cx.collector.contains_any(chunk, ChunkKinds::ORGANS) && next_is_state {
        cx.state.clause_constraint = Some(cx.text(chunk));
        return Ok(Vec::new());
    }

    let Some(preposition) = cx.collector.first_dfs(chunk, ChunkType::Preposition) else {
        return Err(ExtractError::malformed(cx.text(chunk), "prepositional phrase without preposition"));
    };
    let Some(object) = cx.collector.first_dfs(chunk, ChunkType::Object) else {
        return Err(ExtractError::malformed(cx.text(chunk), "prepositional phrase without object"));
    };
    if cx.collector.terminals_of(object).is_empty() {
        return Err(ExtractError::malformed(cx.text(chunk), "prepositional phrase with an empty object"));
    }
    let preposition = cx.text(preposition);

    if character_preposition(cx, chunk, &preposition, object) {
        return Ok(Vec::new());
    }
    let Some(last) = cx.state.last_element() else {
        cx.state.unassigned_modifiers.push(chunk);
        return Ok(Vec::new());
    };
    let last_is_structure = cx.is_structure(last);
    let last_is_character = cx.is_character(last);

    let object_text = cx.text(object);
    if last_is_structure && cx.lexicon.is_numeric(&object_text) {
        let parents = cx.state.last_elements.clone();
        let produced = numbers::annotate_numericals(cx, &object_text, "count", &[], &parents);
        cx.state.set_boundary(false);
        return Ok(produced);
    }

    let objects = if [ChunkType::And, ChunkType::Or, ChunkType::NpList].iter().any(|&k| cx.collector.has_child_of_kind(object, k)) {
        split_object(cx, object)
    } else {
        vec![object]
    };
    let subjects = if !last_is_structure || cx.state.boundary_crossed() {
        cx.state.subjects.clone()
    } else {
        cx.state.last_elements.clone()
    };

    let mut produced = Vec::new();
    let mut relation: Option<String> = None;
    for object in objects {
        let (before, organs, after) = organ_runs(cx, object);
        let has_before_state = before.iter().any(|&c| cx.collector.contains_kind(c, ChunkType::CharacterState));

        let mut introduced: Vec<ElementId> = Vec::new();
        if preposition.eq_ignore_ascii_case("to") && organs.is_empty() && has_before_state {
            produced.extend(connect_characters(cx, &subjects, &preposition, &before)?);
        } else if !organs.is_empty() {
            let target = if after.is_empty() {
                object
            } else {
                let span: Vec<ChunkId> = before.iter().chain(&organs).copied().collect();
                cx.collector.add_synthetic(ChunkType::Object, &span, &[])
            };
            let link = Link { subjects: &subjects, preposition: &preposition, last_is_character, relation: relation.clone() };
            let (linked, label) = link_objects(cx, &link, target)?;
            relation = label.or(relation);
            introduced = linked.iter().copied().filter(|&e| cx.is_structure(e)).collect();
            produced.extend(linked);
        } else {
            constrain_last(cx, chunk, &preposition, last);
        }

        if after.is_empty() {
            continue;
        }
        // Trailing chunks describe only this object's Structures.
        let backup = cx.state.last_elements.clone();
        let boundary = cx.state.boundary_crossed();
        for trailing in after {
            produced.extend(organs::process_under(cx, trailing, &introduced)?);
        }
        cx.state.last_elements = backup;
        cx.state.set_boundary(boundary);
    }

    cx.state.set_boundary(false);
    Ok(produced)
}

/// A PP without organs that refines the last element.
fn constrain_last(cx: &mut ProcessingContext<'_>, chunk: ChunkId, preposition: &str, last: ElementId) {
    if cx.is_character(last) && is_located_size(cx, last, preposition) {
        characters::rename_characters(cx, &[last], "location");
        return;
    }
    if cx.is_structure(last) || cx.is_character(last) {
        let text = cx.text(chunk);
        cx.elements.append(last, "constraint", &text);
    }
}

/// A numeric size placed by a locational preposition ("3 mm from base").
fn is_located_size(cx: &ProcessingContext<'_>, character: ElementId, preposition: &str) -> bool {
    let numeric = ["value", "from", "to"]
        .iter()
        .any(|key| cx.elements.attr(character, key).is_some_and(|v| v.chars().any(|c| c.is_ascii_digit())));
    cx.elements.name(character) == "size" && numeric && cx.lexicon.is_location_preposition(preposition)
}

/// "leaves in outline": the final object word is itself a character name.
fn character_preposition(cx: &mut ProcessingContext<'_>, chunk: ChunkId, preposition: &str, object: ChunkId) -> bool {
    let words: Vec<String> = cx.collector.words(chunk).into_iter().map(str::to_lowercase).collect();
    let Some(character) = words.last().filter(|_| words.len() >= 2).cloned() else {
        return false;
    };
    if !cx.knowledge.glossary.words_in_category("character").contains(&character) {
        return false;
    }
    let Some(last) = cx.state.last_element() else {
        return false;
    };

    if cx.is_character(last) {
        let last_elements = cx.state.last_elements.clone();
        characters::rename_characters(cx, &last_elements, &character);
        debug!(character = %character, preposition, "character named by preposition");
        return true;
    }
    if cx.is_structure(last) {
        let object_words = cx.collector.words(object);
        let value = object_words[..object_words.len().saturating_sub(1)].join(" ");
        if value.is_empty() {
            return false;
        }
        let parents = cx.state.last_elements.clone();
        let modifiers = cx.take_modifiers();
        if let Some(created) = characters::create_character(cx, &parents, &modifiers, &value, &character) {
            cx.state.last_elements = vec![created];
        }
        return true;
    }
    false
}

/// Split a coordinated object at each `and`/`or` that follows an organ.
fn split_object(cx: &mut ProcessingContext<'_>, object: ChunkId) -> Vec<ChunkId> {
    let list = cx.collector.child_of_kind(object, ChunkType::NpList).unwrap_or(object);
    let children = cx.collector.children(list).to_vec();

    let mut objects = Vec::new();
    let mut group: Vec<ChunkId> = Vec::new();
    let mut seen_organ = false;
    for child in children {
        let kind = cx.collector.kind(child);
        let text = cx.text(child);
        let coordinator = matches!(kind, ChunkType::And | ChunkType::Or) || text == "and" || text == "or";
        if coordinator && seen_organ {
            if !group.is_empty() {
                objects.push(cx.collector.add_synthetic(ChunkType::Object, &group, &[]));
                group.clear();
            }
            continue;
        }
        group.push(child);
        seen_organ |= cx.collector.contains_any(child, ChunkKinds::ORGANS);
    }
    if !group.is_empty() {
        objects.push(cx.collector.add_synthetic(ChunkType::Object, &group, &[]));
    }
    objects
}

/// Split `chunk` into the leading non-organ run, the organ run and the
/// trailing run. Non-organ chunks between two organs stay with the organs.
pub(crate) fn organ_runs(cx: &ProcessingContext<'_>, chunk: ChunkId) -> (Vec<ChunkId>, Vec<ChunkId>, Vec<ChunkId>) {
    let mut runs = OrganRuns::default();
    runs.walk(cx, chunk);
    (runs.before, runs.organs, runs.pending)
}

#[derive(Default)]
struct OrganRuns {
    before: Vec<ChunkId>,
    organs: Vec<ChunkId>,
    pending: Vec<ChunkId>,
}

impl OrganRuns {
    fn walk(&mut self, cx: &ProcessingContext<'_>, chunk: ChunkId) {
        if cx.collector.kind(chunk).is_organ() && !cx.collector.is_terminal(chunk) {
            self.organs.append(&mut self.pending);
            self.organs.push(chunk);
        } else if !cx.collector.contains_any(chunk, ChunkKinds::ORGANS) {
            if self.organs.is_empty() { self.before.push(chunk) } else { self.pending.push(chunk) }
        } else {
            for &child in cx.collector.children(chunk) {
                self.walk(cx, child);
            }
        }
    }
}

/// "ovate to lanceolate" split across a PP: a range from the chunk before.
fn connect_characters(
    cx: &mut ProcessingContext<'_>,
    subjects: &[ElementId],
    preposition: &str,
    before: &[ChunkId],
) -> Result<Vec<ElementId>, ExtractError> {
    let Some(state_chunk) = before.iter().find_map(|&c| cx.collector.first_dfs(c, ChunkType::CharacterState)) else {
        return Ok(Vec::new());
    };
    let Some(previous) = cx.cursor.peek_prev() else {
        return Ok(Vec::new());
    };
    let state = cx.text(state_chunk);
    let mut from = cx.text(previous);

    let hyphenated = regex!(r"^\w+-(\w+)$");
    if let Some(suffix) = hyphenated.captures(&state).map(|caps| caps[1].to_string()) {
        if !hyphenated.is_match(&from) {
            from = if from.ends_with('-') { format!("{from}{suffix}") } else { format!("{from}-{suffix}") };
        }
    }

    let name = match cx.collector.property_bfs(state_chunk, CHARACTER_NAME) {
        Some(name) => name.to_string(),
        None => characters::dictionary_name(cx, &state).unwrap_or_else(|| characters::PLACEHOLDER.to_string()),
    };
    let modifiers = cx.take_modifiers();
    let text = format!("{from} {preposition} {state}");
    characters::create_range_character(cx, subjects, &modifiers, &text, &name)
}

pub(crate) struct Link<'s> {
    pub subjects: &'s [ElementId],
    pub preposition: &'s str,
    pub last_is_character: bool,
    /// Label chosen for an earlier object of the same PP.
    pub relation: Option<String>,
}

/// Link the Structures of `object` to the subjects, or constrain the
/// Character just produced. Returns the produced elements and the label used.
pub(crate) fn link_objects(
    cx: &mut ProcessingContext<'_>,
    link: &Link<'_>,
    object: ChunkId,
) -> Result<(Vec<ElementId>, Option<String>), ExtractError> {
    let modifiers = cx.take_modifiers();
    let structures = organs::extract_structures_from_object(cx, object)?;
    let mut produced = structures.clone();

    let base_count = cx.collector.words(object).first().is_some_and(|w| cx.lexicon.is_base_count_word(w))
        || cx.lexicon.is_base_count_word(link.preposition);
    let constrains_character = link.last_is_character
        && !cx.state.last_elements.is_empty()
        && (!cx.state.boundary_crossed() || base_count);

    if constrains_character {
        let Some(last) = cx.state.last_element() else {
            return Ok((produced, None));
        };
        if is_located_size(cx, last, link.preposition) {
            characters::rename_characters(cx, &[last], "location");
        }
        let mut constraint: Vec<String> = modifiers;
        constraint.push(link.preposition.to_string());
        constraint.push(list_structure_names(cx, object));
        cx.elements.set(last, "constraint", constraint.join(" "));
        let ids = cx.ids_of(&structures);
        if !ids.is_empty() {
            cx.elements.set(last, "constraintid", ids.join(", "));
        }
        cx.state.last_elements = structures;
        return Ok((produced, None));
    }

    let label = match link.relation.clone() {
        Some(label) => label,
        None => relations::relation_label(cx, link.preposition, link.subjects, &structures, object)?,
    };
    produced.extend(relations::create_relations(cx, &label, link.subjects, &structures, modifiers));
    cx.state.last_elements = if label == relations::PART_OF { link.subjects.to_vec() } else { structures };
    Ok((produced, Some(label)))
}

/// Constraint and organ words of `object`: "basal leaves, bracts".
fn list_structure_names(cx: &ProcessingContext<'_>, object: ChunkId) -> String {
    let mut names = String::new();
    for chunk in cx.collector.descendants_of_any(object, ChunkKinds::ORGANS | ChunkKinds::CONSTRAINT) {
        names.push_str(&cx.text(chunk));
        names.push_str(if cx.collector.kind(chunk) == ChunkType::Constraint { " " } else { ", " });
    }
    names.trim_end().trim_end_matches(',').to_string()
}
