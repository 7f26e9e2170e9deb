//! Passes that run once a sentence's chunks are all dispatched.
//!
//! Order matters: orphans are adopted first so the whole-organism merge sees
//! them, and may-be-same runs last over the merged Structures.

use super::context::ProcessingContext;
use super::relations::{self, MAY_BE_THE_SAME};
use crate::element::{ElementId, ElementKind};
use std::collections::HashSet;
use tracing::debug;

pub(crate) const WHOLE_ORGANISM: &str = "whole_organism";

/// Characters still staged at the end of the sentence belong to the plant.
pub(crate) fn adopt_orphans(cx: &mut ProcessingContext<'_>) {
    let orphans = std::mem::take(&mut cx.state.unassigned_characters);
    if orphans.is_empty() {
        return;
    }
    let organism = match find_whole_organism(cx) {
        Some(existing) => existing,
        None => {
            let created = cx.new_structure(WHOLE_ORGANISM);
            cx.add_to_result(&[created]);
            created
        }
    };
    for orphan in &orphans {
        cx.elements.add_child(organism, *orphan);
    }
    debug!(orphans = orphans.len(), "orphan characters adopted by whole organism");
}

fn find_whole_organism(cx: &ProcessingContext<'_>) -> Option<ElementId> {
    cx.result().iter().copied().find(|&e| cx.is_structure(e) && cx.elements.name(e) == WHOLE_ORGANISM)
}

/// Fold Structures named by a life-style word ("herbs", "aquatic") into one
/// `whole_organism` Structure carrying a `life_style` Character per name.
pub(crate) fn merge_whole_organism(cx: &mut ProcessingContext<'_>) {
    let life_styles = cx.knowledge.glossary.words_in_category("life_style");
    let absorbed: Vec<ElementId> = cx
        .result()
        .iter()
        .copied()
        .filter(|&e| cx.is_structure(e))
        .filter(|&e| {
            let name = cx.elements.name(e);
            name != WHOLE_ORGANISM && life_styles.contains(name)
        })
        .collect();
    if absorbed.is_empty() {
        return;
    }

    let existing = find_whole_organism(cx);
    let organism = existing.unwrap_or_else(|| cx.elements.create(ElementKind::Structure));
    let mut replaced: HashSet<String> = HashSet::new();

    for &structure in &absorbed {
        let attributes: Vec<(String, String)> =
            cx.elements.attributes(structure).iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        let qualified = qualified_name(cx, structure);

        for (key, value) in attributes {
            match key.as_str() {
                "id" => {
                    if cx.elements.attr(organism, "id").is_none() {
                        cx.elements.set(organism, "id", value);
                    } else {
                        replaced.insert(value);
                    }
                }
                "name" => {}
                _ => cx.elements.set(organism, &key, value),
            }
        }
        for child in cx.elements.take_children(structure) {
            cx.elements.add_child(organism, child);
        }

        let life_style = cx.elements.create(ElementKind::Character);
        cx.elements.set(life_style, "name", "life_style");
        cx.elements.set(life_style, "value", qualified);
        cx.elements.add_child(organism, life_style);
    }
    cx.elements.set(organism, "name", WHOLE_ORGANISM);

    let Some(canonical_id) = cx.elements.attr(organism, "id").map(str::to_string) else {
        return;
    };
    let relation_ids: Vec<ElementId> = cx.result().iter().copied().filter(|&e| cx.is_relation(e)).collect();
    for relation in relation_ids {
        for end in ["from", "to"] {
            let points_at_absorbed = cx.elements.attr(relation, end).is_some_and(|id| replaced.contains(id));
            if points_at_absorbed {
                cx.elements.set(relation, end, canonical_id.clone());
            }
        }
    }

    let result = cx.result_mut();
    result.retain(|e| !absorbed.contains(e));
    if existing.is_none() {
        result.push(organism);
    }
    debug!(absorbed = absorbed.len(), id = %canonical_id, "merged life-style structures");
}

/// Absorbed name with its constraint in front ("perennial herb").
fn qualified_name(cx: &ProcessingContext<'_>, structure: ElementId) -> String {
    ["constraint", "name"]
        .iter()
        .filter_map(|key| cx.elements.attr(structure, key))
        .filter(|v| !v.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Relate Structures that share a name and every constraint qualifier: each
/// earlier one points at every later one.
pub(crate) fn infer_may_be_same(cx: &mut ProcessingContext<'_>) {
    let mut groups: Vec<(String, Vec<String>)> = Vec::new();
    for &structure in cx.result() {
        if !cx.is_structure(structure) {
            continue;
        }
        let Some(id) = cx.elements.attr(structure, "id") else {
            continue;
        };
        let key = ["constraint", "constraint_parent_organ", "constraint_type", "name"]
            .iter()
            .map(|k| cx.elements.attr(structure, k).unwrap_or(""))
            .collect::<Vec<_>>()
            .join("|");
        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, ids)) => ids.push(id.to_string()),
            None => groups.push((key, vec![id.to_string()])),
        }
    }

    let mut created = Vec::new();
    for (_, ids) in groups.iter().filter(|(_, ids)| ids.len() > 1) {
        for (i, from) in ids.iter().enumerate() {
            for to in &ids[i + 1..] {
                created.push(relations::add_relation(cx, MAY_BE_THE_SAME, from, to, false));
            }
        }
    }
    if !created.is_empty() {
        debug!(relations = created.len(), "may-be-same relations inferred");
    }
    cx.add_to_result(&created);
}
