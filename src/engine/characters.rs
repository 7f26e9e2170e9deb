//! Character states, TO-phrases, modifiers and character text.
//!
//! A state's character name is resolved in order: the chunker's
//! `characterName` tag, a pending name staged by an earlier word ("relief"
//! waiting for "high"), the dimension alias ("wide" -> "width"), the
//! dictionary, and finally the `character` placeholder. A placeholder with no
//! modifiers renames whatever was produced just before instead of creating a
//! new Character.

use super::context::ProcessingContext;
use super::{dispatch, numbers, organs};
use crate::chunk::{CHARACTER_NAME, ChunkId, ChunkType};
use crate::element::{ElementId, ElementKind};
use crate::error::ExtractError;
use tracing::debug;

/// Character name used when nothing better is known.
pub(crate) const PLACEHOLDER: &str = "character";

// --- Processors --------------------------------------------------------------

pub(crate) fn character_state(cx: &mut ProcessingContext<'_>, chunk: ChunkId) -> Result<Vec<ElementId>, ExtractError> {
    let parents = cx.last_structures();
    let produced = describe_state(cx, chunk, &parents)?;
    cx.state.last_elements = produced.clone();
    cx.state.set_boundary(false);
    Ok(produced)
}

fn describe_state(cx: &mut ProcessingContext<'_>, chunk: ChunkId, parents: &[ElementId]) -> Result<Vec<ElementId>, ExtractError> {
    let state = cx.collector.first_dfs(chunk, ChunkType::State).unwrap_or(chunk);
    let mut value = cx.text(state);
    if value.is_empty() {
        return Err(ExtractError::malformed(cx.text(chunk), "character state without words"));
    }
    let tagged = cx.collector.property_bfs(chunk, CHARACTER_NAME).map(str::to_string);

    let mut produced = Vec::new();
    if let Some(caps) = regex!(r"^\w+-(\w+)$").captures(&value) {
        produced.extend(continue_hyphenated(cx, tagged.as_deref(), &caps[1])?);
    }

    let name = match tagged {
        Some(name) => name,
        None => {
            let terminals = cx.collector.terminals_of(state);
            if terminals.len() > 1 {
                produced.extend(process_character_text(cx, &terminals, parents, None)?);
                return Ok(produced);
            }
            if let Some(pending) = cx.state.unassigned_character.take() {
                pending
            } else {
                if let Some(alias) = cx.lexicon.equal_character(&value) {
                    value = alias.to_string();
                }
                dictionary_name(cx, &value).unwrap_or_else(|| PLACEHOLDER.to_string())
            }
        }
    };

    let mut modifiers = cx.take_modifiers();
    modifiers.extend(cx.texts(&cx.collector.descendants_of_kind(chunk, ChunkType::Modifier)));

    if name == PLACEHOLDER && modifiers.is_empty() {
        produced.extend(rename_previous(cx, &value));
    } else if value.contains(" to ") {
        produced.extend(create_range_character(cx, parents, &modifiers, &value, &name)?);
    } else if let Some(character) = create_character(cx, parents, &modifiers, &value, &name) {
        produced.push(character);
    }
    Ok(produced)
}

/// `TO_PHRASE`: "ovate to lanceolate" as a single range Character.
pub(crate) fn to_phrase(cx: &mut ProcessingContext<'_>, chunk: ChunkId) -> Result<Vec<ElementId>, ExtractError> {
    let text = cx.text(chunk);
    if text.is_empty() {
        return Err(ExtractError::malformed(text, "empty to-phrase"));
    }
    let parents = cx.last_structures();
    let mut modifiers = cx.take_modifiers();
    modifiers.extend(cx.texts(&cx.collector.descendants_of_kind(chunk, ChunkType::Modifier)));

    let name = match cx.collector.property_bfs(chunk, CHARACTER_NAME) {
        Some(name) => name.to_string(),
        None => text
            .split_whitespace()
            .find_map(|word| dictionary_name(cx, word))
            .unwrap_or_else(|| PLACEHOLDER.to_string()),
    };

    let produced = if regex!(r"\s+to\s+").is_match(&text) {
        create_range_character(cx, &parents, &modifiers, &text, &name)?
    } else {
        create_character(cx, &parents, &modifiers, &text, &name).into_iter().collect()
    };
    cx.state.last_elements = produced.clone();
    cx.state.set_boundary(false);
    Ok(produced)
}

/// Attach to the element just produced when nothing intervened, else stage.
pub(crate) fn modifier(cx: &mut ProcessingContext<'_>, chunk: ChunkId) -> Result<Vec<ElementId>, ExtractError> {
    let next_is_pp = cx.cursor.peek_next().is_some_and(|next| cx.collector.kind(next).is_prepositional());
    let target = cx.state.last_element().filter(|&last| {
        !cx.state.boundary_crossed()
            && !cx.state.unassigned_chunk_preceded()
            && !next_is_pp
            && (cx.is_character(last) || cx.is_relation(last))
    });

    match target {
        Some(last) => {
            let text = cx.text(chunk);
            cx.elements.append(last, "modifier", &text);
        }
        None => cx.state.unassigned_modifiers.push(chunk),
    }
    Ok(Vec::new())
}

// --- Character text ----------------------------------------------------------

/// Turn loose tokens into Characters of `parents`.
///
/// Adverbs accumulate as modifiers for the next state; bare numbers become
/// counts; anything else with a known character name becomes one Character
/// per `and`/`or` alternative. Tokens that are none of these are dispatched
/// with `parents` as the attachment target.
pub(crate) fn process_character_text(
    cx: &mut ProcessingContext<'_>,
    tokens: &[ChunkId],
    parents: &[ElementId],
    character: Option<&str>,
) -> Result<Vec<ElementId>, ExtractError> {
    let mut produced = Vec::new();
    let mut modifiers: Vec<ChunkId> = Vec::new();

    for &token in tokens {
        if cx.collector.kind(token) == ChunkType::ToPhrase {
            produced.extend(organs::process_under(cx, token, parents)?);
            continue;
        }

        for inner in cx.collector.descendants_of_kind(token, ChunkType::Modifier) {
            if !modifiers.contains(&inner) {
                modifiers.push(inner);
            }
        }
        let word = match cx.collector.first_bfs(token, ChunkType::State) {
            Some(state) => cx.text(state),
            None => cx.text(token),
        };
        let mut name = cx.collector.property_bfs(token, CHARACTER_NAME).map(str::to_string);
        if name.is_none() {
            name = dictionary_name(cx, &word);
        }
        if name.is_none() && word.eq_ignore_ascii_case("no") {
            name = Some("presence".to_string());
        }

        if name.is_none() && cx.knowledge.adverbs.is_adverb(&word) {
            if !modifiers.contains(&token) {
                modifiers.push(token);
            }
        } else if word.chars().any(|c| c.is_ascii_digit()) && !word.chars().any(|c| c.is_alphabetic()) {
            let texts = cx.texts(&modifiers);
            produced.extend(numbers::annotate_numericals(cx, &word, "count", &texts, parents));
            modifiers.clear();
        } else if let Some(name) = name {
            let name = character.map(str::to_string).unwrap_or(name);
            let texts = cx.texts(&modifiers);
            if name == PLACEHOLDER && texts.is_empty() {
                produced.extend(rename_previous(cx, &word));
            } else {
                for part in regex!(r"\bor\b|\band\b").split(&word) {
                    let part = part.trim();
                    if part.is_empty() {
                        continue;
                    }
                    if let Some(created) = create_character(cx, parents, &texts, part, &name) {
                        produced.push(created);
                    }
                }
            }
            modifiers.clear();
        } else {
            produced.extend(organs::process_under(cx, token, parents)?);
        }
    }
    Ok(produced)
}

/// Rename the Characters just produced to `name`; if the last element is a
/// Structure, keep `name` for the next state instead.
fn rename_previous(cx: &mut ProcessingContext<'_>, name: &str) -> Vec<ElementId> {
    let Some(last) = cx.state.last_element() else {
        return Vec::new();
    };
    if cx.is_character(last) {
        for &element in &cx.state.last_elements.clone() {
            if cx.is_character(element) {
                cx.elements.set(element, "name", name);
            }
        }
        debug!(name, "renamed preceding characters");
    } else if cx.is_structure(last) {
        cx.state.unassigned_character = Some(name.to_string());
    }
    cx.state.last_elements.clone()
}

/// Rename every Character in `elements` to `name`.
pub(crate) fn rename_characters(cx: &mut ProcessingContext<'_>, elements: &[ElementId], name: &str) {
    for &element in elements {
        if cx.is_character(element) {
            cx.elements.set(element, "name", name);
        }
    }
}

/// Complete a dangling `ovate-` from `bell-shaped` and replay it as a state.
fn continue_hyphenated(cx: &mut ProcessingContext<'_>, name: Option<&str>, suffix: &str) -> Result<Vec<ElementId>, ExtractError> {
    let behind: Vec<ChunkId> = cx.cursor.behind().collect();
    for previous in behind {
        if cx.collector.kind(previous).is_connector() {
            continue;
        }
        let terminals = cx.collector.terminals_of(previous);
        let Some(&fragment) = terminals.last() else {
            return Ok(Vec::new());
        };
        let text = cx.collector.terminal_text(fragment).to_string();
        if text.len() < 2 || !text.ends_with('-') {
            return Ok(Vec::new());
        }

        cx.collector.set_terminal_text(fragment, format!("{text}{suffix}"));
        let state = cx.collector.add_synthetic(ChunkType::State, &terminals, &[]);
        let properties: Vec<(&str, &str)> = name.map(|n| (CHARACTER_NAME, n)).into_iter().collect();
        let synthetic = cx.collector.add_synthetic(ChunkType::CharacterState, &[state], &properties);
        debug!(fragment = %text, suffix, "completing hyphenated state");
        return cx.replay_at(previous, |cx| dispatch::process(cx, synthetic));
    }
    Ok(Vec::new())
}

// --- Element construction ----------------------------------------------------

pub(crate) fn dictionary_name(cx: &ProcessingContext<'_>, word: &str) -> Option<String> {
    cx.knowledge.characters.character_name_of(word)
}

/// Dictionary-known words of `text`, or `text` itself when there are none.
fn known_states(cx: &ProcessingContext<'_>, text: &str) -> String {
    let known: Vec<&str> = text.split_whitespace().filter(|w| cx.knowledge.characters.is_known_state(w)).collect();
    if known.is_empty() { text.trim().to_string() } else { known.join(" ") }
}

pub(crate) fn create_range_character(
    cx: &mut ProcessingContext<'_>,
    parents: &[ElementId],
    modifiers: &[String],
    text: &str,
    name: &str,
) -> Result<Vec<ElementId>, ExtractError> {
    let parts: Vec<&str> = regex!(r"\s+to\s+").splitn(text, 2).collect();
    let [left, right] = parts.as_slice() else {
        return Ok(create_character(cx, parents, modifiers, text, name).into_iter().collect());
    };

    let left = regex!(r"\W$").replace(left.trim(), "");
    let left = regex!(r"^.*?\s+or\s+").replace(&left, "");
    let from = left.rsplit(',').next().unwrap_or_default().trim().to_string();
    let to = right.split(',').next().unwrap_or_default().trim().to_string();
    if from.is_empty() || to.is_empty() {
        return Err(ExtractError::malformed(text, "range without both ends"));
    }

    let character = cx.elements.create(ElementKind::Character);
    cx.elements.set(character, "char_type", "range_value");
    cx.elements.set(character, "name", name);
    cx.elements.set(character, "from", known_states(cx, &from));
    cx.elements.set(character, "to", known_states(cx, &to));
    for modifier in modifiers {
        cx.elements.append(character, "modifier", modifier);
    }
    cx.attach(parents, character);
    cx.apply_clause_constraint(character);
    Ok(vec![character])
}

/// Build one Character and attach it to `parents` (or stage it).
pub(crate) fn create_character(
    cx: &mut ProcessingContext<'_>,
    parents: &[ElementId],
    modifiers: &[String],
    value: &str,
    name: &str,
) -> Option<ElementId> {
    let value = match value.find("( ") {
        Some(start) => value[..start].trim(),
        None => value.trim(),
    };
    if value.is_empty() {
        return None;
    }

    let character = cx.elements.create(ElementKind::Character);
    cx.elements.set(character, "name", name);
    let bounds: Vec<&str> = value.split('-').collect();
    match (name, bounds.as_slice()) {
        ("count", [from, to]) if !from.trim().is_empty() && !to.trim().is_empty() => {
            let to = to.trim();
            cx.elements.set(character, "char_type", "range_value");
            cx.elements.set(character, "from", from.trim());
            match to.strip_suffix('+') {
                Some(open) => {
                    cx.elements.set(character, "to", open.trim());
                    cx.elements.set(character, "upper_restricted", "false");
                }
                None => cx.elements.set(character, "to", to),
            }
        }
        ("size", _) => {
            let (number, unit) = cx.numeric.split_unit(value);
            cx.elements.set(character, "value", number);
            if let Some(unit) = unit {
                cx.elements.set(character, "unit", unit);
            }
        }
        _ => cx.elements.set(character, "value", value),
    }
    if !modifiers.is_empty() {
        cx.elements.set(character, "modifier", modifiers.join("; "));
    }

    cx.attach(parents, character);
    cx.apply_clause_constraint(character);
    Some(character)
}
