//! Output elements.
//!
//! While a sentence is processed, elements live in an [`Elements`] arena and
//! are referenced by [`ElementId`]. A Character can be a child of several
//! Structures at once, and staging lists hold ids rather than owned nodes.
//! Once the sentence is done the arena is materialized into an owned
//! [`Statement`] tree.

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Statement,
    Structure,
    Character,
    Relation,
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElementKind::Statement => "statement",
            ElementKind::Structure => "structure",
            ElementKind::Character => "character",
            ElementKind::Relation => "relation",
        };
        f.write_str(name)
    }
}

// --- Attributes --------------------------------------------------------------

/// Insertion-ordered string attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes(Vec<(String, String)>);

impl Attributes {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Set `key`, replacing any previous value in place.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| k == key) {
            Some(slot) => slot.1 = value,
            None => self.0.push((key.to_string(), value)),
        }
    }

    /// Set `key`, or extend an existing value with `"; "`.
    pub fn append(&mut self, key: &str, value: &str) {
        if value.is_empty() {
            return;
        }
        match self.0.iter_mut().find(|(k, _)| k == key) {
            Some(slot) if !slot.1.is_empty() => {
                slot.1.push_str("; ");
                slot.1.push_str(value);
            }
            Some(slot) => slot.1 = value.to_string(),
            None => self.0.push((key.to_string(), value.to_string())),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        let pos = self.0.iter().position(|(k, _)| k == key)?;
        Some(self.0.remove(pos).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for Attributes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

// --- Arena -------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct ElementId(usize);

#[derive(Debug, Clone)]
struct ElementNode {
    kind: ElementKind,
    attributes: Attributes,
    children: Vec<ElementId>,
}

#[derive(Debug, Default)]
pub(crate) struct Elements {
    nodes: Vec<ElementNode>,
}

impl Elements {
    pub fn create(&mut self, kind: ElementKind) -> ElementId {
        self.nodes.push(ElementNode { kind, attributes: Attributes::default(), children: Vec::new() });
        ElementId(self.nodes.len() - 1)
    }

    pub fn kind(&self, id: ElementId) -> ElementKind {
        self.nodes[id.0].kind
    }

    pub fn is(&self, id: ElementId, kind: ElementKind) -> bool {
        self.kind(id) == kind
    }

    pub fn attr(&self, id: ElementId, key: &str) -> Option<&str> {
        self.nodes[id.0].attributes.get(key)
    }

    pub fn attributes(&self, id: ElementId) -> &Attributes {
        &self.nodes[id.0].attributes
    }

    pub fn set(&mut self, id: ElementId, key: &str, value: impl Into<String>) {
        self.nodes[id.0].attributes.set(key, value);
    }

    pub fn append(&mut self, id: ElementId, key: &str, value: &str) {
        self.nodes[id.0].attributes.append(key, value);
    }

    pub fn children(&self, id: ElementId) -> &[ElementId] {
        &self.nodes[id.0].children
    }

    pub fn add_child(&mut self, parent: ElementId, child: ElementId) {
        let children = &mut self.nodes[parent.0].children;
        if parent != child && !children.contains(&child) {
            children.push(child);
        }
    }

    pub fn take_children(&mut self, id: ElementId) -> Vec<ElementId> {
        std::mem::take(&mut self.nodes[id.0].children)
    }

    pub fn name(&self, id: ElementId) -> &str {
        self.attr(id, "name").unwrap_or("")
    }

    /// Owned copy of the subtree rooted at `id`.
    pub fn materialize(&self, id: ElementId) -> Element {
        self.materialize_bounded(id, 0)
    }

    fn materialize_bounded(&self, id: ElementId, depth: usize) -> Element {
        let node = &self.nodes[id.0];
        // Characters are leaves; anything deeper than this is a cycle.
        let children = if depth > 16 {
            Vec::new()
        } else {
            node.children.iter().map(|&c| self.materialize_bounded(c, depth + 1)).collect()
        };
        Element { kind: node.kind, attributes: node.attributes.clone(), children }
    }
}

// --- Owned output ------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Element {
    pub kind: ElementKind,
    pub attributes: Attributes,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Element>,
}

impl Element {
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes.get(key)
    }

    pub fn name(&self) -> Option<&str> {
        self.attr("name")
    }

    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }

    pub fn characters(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter(|c| c.kind == ElementKind::Character)
    }

    /// First child Character named `name`.
    pub fn character(&self, name: &str) -> Option<&Element> {
        self.characters().find(|c| c.name() == Some(name))
    }

    fn write_tree(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        write!(f, "{:indent$}{}", "", self.kind, indent = indent)?;
        for (key, value) in self.attributes.iter() {
            write!(f, " {key}=\"{value}\"")?;
        }
        writeln!(f)?;
        for child in &self.children {
            child.write_tree(f, indent + 2)?;
        }
        Ok(())
    }
}

/// Result of one sentence: its Structures and Relations, Characters nested.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Statement {
    pub text: String,
    pub source: String,
    pub elements: Vec<Element>,
}

impl Statement {
    pub fn structures(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter().filter(|e| e.kind == ElementKind::Structure)
    }

    pub fn relations(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter().filter(|e| e.kind == ElementKind::Relation)
    }

    pub fn structure_named(&self, name: &str) -> Option<&Element> {
        self.structures().find(|s| s.name() == Some(name))
    }

    pub fn structure_by_id(&self, id: &str) -> Option<&Element> {
        self.structures().find(|s| s.id() == Some(id))
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "statement text=\"{}\" source=\"{}\"", self.text, self.source)?;
        for element in &self.elements {
            element.write_tree(f, 2)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_joins_with_semicolon() {
        let mut attrs = Attributes::default();
        attrs.append("modifier", "often");
        attrs.append("modifier", "");
        attrs.append("modifier", "distally");
        assert_eq!(attrs.get("modifier"), Some("often; distally"));

        attrs.set("name", "shape");
        attrs.set("modifier", "rarely");
        let keys: Vec<&str> = attrs.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["modifier", "name"]);
        assert_eq!(attrs.remove("modifier").as_deref(), Some("rarely"));
        assert_eq!(attrs.len(), 1);
    }

    #[test]
    fn shared_character_materializes_under_each_parent() {
        let mut elements = Elements::default();
        let leaf = elements.create(ElementKind::Structure);
        let stem = elements.create(ElementKind::Structure);
        let color = elements.create(ElementKind::Character);
        elements.set(color, "name", "coloration");
        elements.add_child(leaf, color);
        elements.add_child(leaf, color);
        elements.add_child(stem, color);

        assert_eq!(elements.children(leaf), &[color]);
        let stem = elements.materialize(stem);
        assert_eq!(stem.character("coloration").and_then(|c| c.name()), Some("coloration"));
    }

    #[test]
    fn display_renders_indented_tree() {
        let mut elements = Elements::default();
        let leaf = elements.create(ElementKind::Structure);
        elements.set(leaf, "id", "o1");
        elements.set(leaf, "name", "leaf");
        let shape = elements.create(ElementKind::Character);
        elements.set(shape, "name", "shape");
        elements.set(shape, "value", "ovate");
        elements.add_child(leaf, shape);

        let statement =
            Statement { text: "leaves ovate".into(), source: "d1".into(), elements: vec![elements.materialize(leaf)] };
        let rendered = statement.to_string();
        assert!(rendered.contains("  structure id=\"o1\" name=\"leaf\""));
        assert!(rendered.contains("    character name=\"shape\" value=\"ovate\""));
    }
}
