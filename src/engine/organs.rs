//! Structure formation and the organ processors.
//!
//! A span of chunks (a subject, an NP list, the organ part of a PP object)
//! becomes one Structure per organ chunk in it:
//!
//! ```text
//!   a  [CONSTRAINT basal] and [CONSTRAINT cauline] [CHARACTER_STATE green] [ORGAN leaves]
//!   │                  └─────────────┬──────────┘          │                   │
//!   count=1                    constraint            character           name=leaf, id=oN
//! ```
//!
//! Only the last organ of a span receives the constraint words; every organ
//! receives the character states seen before it, and the last one receives
//! all of them.

use super::context::ProcessingContext;
use super::{characters, dispatch};
use crate::chunk::{CHARACTER_NAME, ChunkId, ChunkKinds, ChunkType};
use crate::element::ElementId;
use crate::error::ExtractError;
use tracing::debug;

// --- Processors --------------------------------------------------------------

pub(crate) fn organ(cx: &mut ProcessingContext<'_>, chunk: ChunkId, kind: ChunkType) -> Result<Vec<ElementId>, ExtractError> {
    let establishes = match kind {
        ChunkType::MainSubjectOrgan => true,
        ChunkType::Organ => cx.state.subjects.is_empty() || cx.state.boundary_crossed(),
        _ => false,
    };

    let structures = if establishes {
        establish_subject(cx, chunk)?
    } else {
        let mut span = std::mem::take(&mut cx.state.unassigned_constraints);
        span.push(chunk);
        let structures = create_structures(cx, &span)?;
        cx.state.last_elements = structures.clone();
        structures
    };
    cx.state.set_boundary(false);
    Ok(structures)
}

pub(crate) fn np_list(cx: &mut ProcessingContext<'_>, chunk: ChunkId) -> Result<Vec<ElementId>, ExtractError> {
    let structures = establish_subject(cx, chunk)?;
    cx.state.set_boundary(false);
    Ok(structures)
}

/// A bare OBJECT at the top level.
pub(crate) fn object(cx: &mut ProcessingContext<'_>, chunk: ChunkId) -> Result<Vec<ElementId>, ExtractError> {
    if cx.collector.terminals_of(chunk).is_empty() {
        return Err(ExtractError::malformed(cx.text(chunk), "object without words"));
    }
    let structures = extract_structures_from_object(cx, chunk)?;
    if !structures.is_empty() {
        cx.state.last_elements = structures.clone();
        cx.state.set_boundary(false);
    }
    Ok(structures)
}

/// Make the Structures of `chunk` (plus any staged constraints) the subjects.
pub(crate) fn establish_subject(cx: &mut ProcessingContext<'_>, chunk: ChunkId) -> Result<Vec<ElementId>, ExtractError> {
    let mut span = std::mem::take(&mut cx.state.unassigned_constraints);
    span.push(chunk);
    let structures = create_structures(cx, &span)?;
    cx.state.subjects = structures.clone();
    cx.state.last_elements = structures.clone();
    debug!(subjects = ?cx.ids_of(&structures), "subject established");
    Ok(structures)
}

// --- Structure formation -----------------------------------------------------

pub(crate) fn create_structures(cx: &mut ProcessingContext<'_>, span: &[ChunkId]) -> Result<Vec<ElementId>, ExtractError> {
    let terminals: Vec<ChunkId> = span.iter().flat_map(|&c| cx.collector.terminals_of(c)).collect();
    let organs: Vec<ChunkId> = span.iter().flat_map(|&c| cx.collector.descendants_of_any(c, ChunkKinds::ORGANS)).collect();

    let mut structures = Vec::with_capacity(organs.len());
    for (i, &organ) in organs.iter().enumerate() {
        let is_last = i + 1 == organs.len();
        let name = cx.singular(&cx.text(organ));
        if name.is_empty() {
            return Err(ExtractError::malformed(cx.text(organ), "organ without words"));
        }
        let structure = cx.new_structure(&name);

        if is_last {
            if let Some(constraint) = constraint_before(cx, span, &terminals, organ) {
                cx.elements.set(structure, "constraint", constraint);
            }
        }
        if preceded_by_article(cx, &terminals, organ) {
            characters::create_character(cx, &[structure], &[], "1", "count");
        }
        for state in states_for(cx, span, &terminals, organ, is_last) {
            let value = match cx.collector.first_dfs(state, ChunkType::State) {
                Some(inner) => cx.text(inner),
                None => cx.text(state),
            };
            let character = match cx.collector.property_bfs(state, CHARACTER_NAME) {
                Some(name) => name.to_string(),
                None => characters::dictionary_name(cx, &value).unwrap_or_else(|| characters::PLACEHOLDER.to_string()),
            };
            let modifiers = modifiers_for(cx, span, &terminals, state);
            characters::create_character(cx, &[structure], &modifiers, &value, &character);
        }
        for staged in std::mem::take(&mut cx.state.unassigned_characters) {
            cx.elements.add_child(structure, staged);
        }
        structures.push(structure);
    }

    if !structures.is_empty() {
        debug!(structures = ?cx.ids_of(&structures), "structures formed");
    }
    Ok(structures)
}

/// CONSTRAINT words and coordinators ahead of `organ`, minus dangling
/// coordinators and function words.
fn constraint_before(cx: &ProcessingContext<'_>, span: &[ChunkId], terminals: &[ChunkId], organ: ChunkId) -> Option<String> {
    let mut words: Vec<&str> = Vec::new();
    for &terminal in terminals {
        if cx.collector.contains_terminal(organ, terminal) {
            break;
        }
        let word = cx.collector.terminal_text(terminal);
        let in_constraint = cx.collector.covering(span, ChunkType::Constraint, terminal).is_some();
        if in_constraint || is_coordinator(word) {
            words.push(word);
        }
    }

    let dangling = |w: &&str| is_coordinator(w) || cx.lexicon.is_stop_word(w) || cx.lexicon.is_preposition(w);
    while words.first().is_some_and(dangling) {
        words.remove(0);
    }
    while words.last().is_some_and(dangling) {
        words.pop();
    }
    (!words.is_empty()).then(|| words.join(" "))
}

fn is_coordinator(word: &str) -> bool {
    word.eq_ignore_ascii_case("and") || word.eq_ignore_ascii_case("or")
}

fn preceded_by_article(cx: &ProcessingContext<'_>, terminals: &[ChunkId], organ: ChunkId) -> bool {
    let Some(first) = terminals.iter().position(|&t| cx.collector.contains_terminal(organ, t)) else {
        return false;
    };
    first > 0 && matches!(cx.collector.terminal_text(terminals[first - 1]).to_lowercase().as_str(), "a" | "an")
}

/// CHARACTER_STATE chunks of the span that describe `organ`.
fn states_for(cx: &ProcessingContext<'_>, span: &[ChunkId], terminals: &[ChunkId], organ: ChunkId, is_last: bool) -> Vec<ChunkId> {
    let mut states = Vec::new();
    for &terminal in terminals {
        if !is_last && cx.collector.contains_terminal(organ, terminal) {
            break;
        }
        if let Some(state) = cx.collector.covering(span, ChunkType::CharacterState, terminal) {
            if !states.contains(&state) {
                states.push(state);
            }
        }
    }
    states
}

/// MODIFIER chunks directly ahead of `state`, plus those inside it.
fn modifiers_for(cx: &ProcessingContext<'_>, span: &[ChunkId], terminals: &[ChunkId], state: ChunkId) -> Vec<String> {
    let mut modifiers: Vec<ChunkId> = Vec::new();
    for &terminal in terminals {
        if cx.collector.contains_terminal(state, terminal) {
            for inner in cx.collector.descendants_of_kind(state, ChunkType::Modifier) {
                if !modifiers.contains(&inner) {
                    modifiers.push(inner);
                }
            }
            break;
        }
        match cx.collector.covering(span, ChunkType::Modifier, terminal) {
            Some(modifier) if !modifiers.contains(&modifier) => modifiers.push(modifier),
            Some(_) => {}
            None => modifiers.clear(),
        }
    }
    cx.texts(&modifiers)
}

// --- Objects -----------------------------------------------------------------

/// Split an object's children into the character part and the organ part.
///
/// Constraint words and coordinators stay with whichever side follows them.
/// A trailing indefinite article moves to the front of the organ part, where
/// structure formation turns it into `count=1`.
pub(crate) fn separate(cx: &ProcessingContext<'_>, object: ChunkId) -> (Vec<ChunkId>, Vec<ChunkId>) {
    if cx.collector.kind(object).is_organ() {
        return (Vec::new(), vec![object]);
    }
    if cx.collector.is_terminal(object) {
        return (vec![object], Vec::new());
    }

    let mut non_organ = Vec::new();
    let mut organ = Vec::new();
    let mut pending = Vec::new();
    let mut found_organ = false;
    for &child in cx.collector.children(object) {
        let kind = cx.collector.kind(child);
        let is_candidate = kind == ChunkType::Constraint || kind == ChunkType::Comma || is_coordinator(&cx.text(child));
        if is_candidate {
            pending.push(child);
        } else if found_organ || cx.collector.contains_any(child, ChunkKinds::ORGANS) {
            organ.append(&mut pending);
            organ.push(child);
            found_organ = true;
        } else {
            non_organ.append(&mut pending);
            non_organ.push(child);
        }
    }
    if found_organ {
        organ.append(&mut pending);
    } else {
        non_organ.append(&mut pending);
    }

    if let Some(&last) = non_organ.last() {
        if matches!(cx.text(last).to_lowercase().as_str(), "a" | "an") && !organ.is_empty() {
            non_organ.pop();
            organ.insert(0, last);
        }
    }
    (non_organ, organ)
}

/// Structures named in `object`; its non-organ words become their Characters.
pub(crate) fn extract_structures_from_object(cx: &mut ProcessingContext<'_>, object: ChunkId) -> Result<Vec<ElementId>, ExtractError> {
    let (non_organ, organ) = separate(cx, object);
    let structures = create_structures(cx, &organ)?;

    if !non_organ.is_empty() {
        let mut targets = structures.clone();
        if let Some(last_organ) = plus_follows_organ(cx, &organ) {
            let name = cx.singular(&cx.text(last_organ));
            targets.retain(|&s| cx.elements.name(s) == name);
        }
        let produced = characters::process_character_text(cx, &non_organ, &targets, None)?;
        cx.add_to_result(&produced);
    }
    Ok(structures)
}

/// Last organ chunk of `span` when "plus" follows an organ word in it.
fn plus_follows_organ(cx: &ProcessingContext<'_>, span: &[ChunkId]) -> Option<ChunkId> {
    let terminals: Vec<ChunkId> = span.iter().flat_map(|&c| cx.collector.terminals_of(c)).collect();
    let organs: Vec<ChunkId> = span.iter().flat_map(|&c| cx.collector.descendants_of_any(c, ChunkKinds::ORGANS)).collect();
    let plus_after_organ = terminals.windows(2).any(|pair| {
        cx.collector.terminal_text(pair[1]).eq_ignore_ascii_case("plus")
            && organs.iter().any(|&o| cx.collector.contains_terminal(o, pair[0]))
    });
    if plus_after_organ { organs.last().copied() } else { None }
}

/// Re-dispatch `chunk` with `parents` as the attachment target.
pub(crate) fn process_under(cx: &mut ProcessingContext<'_>, chunk: ChunkId, parents: &[ElementId]) -> Result<Vec<ElementId>, ExtractError> {
    cx.state.last_elements = parents.to_vec();
    cx.state.set_boundary(false);
    dispatch::process(cx, chunk)
}
