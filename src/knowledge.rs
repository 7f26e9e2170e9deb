//! Read-only lookup services consulted during extraction.
//!
//! The engine never loads glossaries or corpora itself; callers hand it a
//! [`Knowledge`] bundle of trait objects. In-memory implementations are
//! provided for callers that already hold the data, and for tests.

use once_cell::sync::Lazy;
use std::collections::{BTreeSet, HashMap, HashSet};

// --- Traits ------------------------------------------------------------------

/// Word/category glossary.
pub trait Glossary {
    fn words_in_category(&self, category: &str) -> HashSet<String>;
    fn categories_of(&self, word: &str) -> HashSet<String>;

    fn is_in_category(&self, word: &str, category: &str) -> bool {
        self.categories_of(word).contains(category)
    }
}

/// Maps a state word ("ovate") to the character it describes ("shape").
pub trait CharacterDictionary {
    fn character_name_of(&self, state: &str) -> Option<String>;

    fn is_known_state(&self, word: &str) -> bool {
        self.character_name_of(word).is_some()
    }
}

pub trait Inflector {
    fn singular(&self, word: &str) -> String;
    fn plural(&self, word: &str) -> String;
}

pub trait AdverbPredicate {
    fn is_adverb(&self, word: &str) -> bool;
}

/// Sentences seen earlier in the corpus.
pub trait CorpusSentences {
    fn sentences(&self) -> &[String];
}

impl CorpusSentences for Vec<String> {
    fn sentences(&self) -> &[String] {
        self
    }
}

/// Everything the engine may look up while extracting.
#[derive(Clone, Copy)]
pub struct Knowledge<'a> {
    pub glossary: &'a dyn Glossary,
    pub characters: &'a dyn CharacterDictionary,
    pub inflector: &'a dyn Inflector,
    pub adverbs: &'a dyn AdverbPredicate,
    pub corpus: &'a dyn CorpusSentences,
}

impl<'a> Knowledge<'a> {
    pub fn new(
        glossary: &'a dyn Glossary,
        characters: &'a dyn CharacterDictionary,
        inflector: &'a dyn Inflector,
        adverbs: &'a dyn AdverbPredicate,
        corpus: &'a dyn CorpusSentences,
    ) -> Self {
        Self { glossary, characters, inflector, adverbs, corpus }
    }
}

// --- In-memory glossary -----------------------------------------------------

/// Categories that name things rather than characters.
const NON_CHARACTER_CATEGORIES: &[&str] = &["structure", "life_style", "taxon_name"];

/// Glossary held in memory. Also serves as a [`CharacterDictionary`]: a state's
/// character is the set of its non-structural categories, joined with `_or_`.
#[derive(Debug, Clone, Default)]
pub struct MemoryGlossary {
    by_word: HashMap<String, BTreeSet<String>>,
    by_category: HashMap<String, BTreeSet<String>>,
}

impl MemoryGlossary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, word: &str, category: &str) -> &mut Self {
        let word = word.trim().to_lowercase();
        let category = category.trim().to_lowercase();
        self.by_word.entry(word.clone()).or_default().insert(category.clone());
        self.by_category.entry(category).or_default().insert(word);
        self
    }

    pub fn len(&self) -> usize {
        self.by_word.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_word.is_empty()
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for MemoryGlossary {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        let mut glossary = MemoryGlossary::new();
        for (word, category) in iter {
            glossary.insert(word, category);
        }
        glossary
    }
}

impl Glossary for MemoryGlossary {
    fn words_in_category(&self, category: &str) -> HashSet<String> {
        self.by_category.get(&category.to_lowercase()).map(|w| w.iter().cloned().collect()).unwrap_or_default()
    }

    fn categories_of(&self, word: &str) -> HashSet<String> {
        self.by_word.get(&word.to_lowercase()).map(|c| c.iter().cloned().collect()).unwrap_or_default()
    }
}

impl CharacterDictionary for MemoryGlossary {
    fn character_name_of(&self, state: &str) -> Option<String> {
        let categories = self.by_word.get(&state.trim().to_lowercase())?;
        let names: Vec<&str> =
            categories.iter().map(String::as_str).filter(|c| !NON_CHARACTER_CATEGORIES.contains(c)).collect();
        (!names.is_empty()).then(|| names.join("_or_"))
    }
}

// --- Inflector ---------------------------------------------------------------

static SINGULAR_EXCEPTIONS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("leaves", "leaf"),
        ("axes", "axis"),
        ("bases", "base"),
        ("teeth", "tooth"),
        ("feet", "foot"),
        ("series", "series"),
        ("species", "species"),
        ("valves", "valve"),
        ("calyces", "calyx"),
        ("apices", "apex"),
        ("genera", "genus"),
        ("stomata", "stoma"),
        ("corpora", "corpus"),
        ("glochidia", "glochidium"),
        ("sori", "sorus"),
    ])
});

static PLURAL_EXCEPTIONS: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| SINGULAR_EXCEPTIONS.iter().filter(|(p, s)| p != s).map(|(p, s)| (*s, *p)).collect());

/// Rule-based English inflector tuned for morphological vocabulary.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleInflector;

impl Inflector for SimpleInflector {
    fn singular(&self, word: &str) -> String {
        let word = word.trim().to_lowercase();
        if let Some(singular) = SINGULAR_EXCEPTIONS.get(word.as_str()) {
            return singular.to_string();
        }
        if regex!(r"^[a-z]{3,}ly$").is_match(&word) {
            return word;
        }

        let rules: [(&regex::Regex, &str); 7] = [
            (regex!(r"([^aeiou])ies$"), "${1}y"),
            (regex!(r"ia$"), "ium"),
            (regex!(r"(x|ch|sh|ss)es$"), "${1}"),
            (regex!(r"ves$"), "f"),
            (regex!(r"ices$"), "ex"),
            (regex!(r"ae$"), "a"),
            (regex!(r"([^aeiou])i$"), "${1}us"),
        ];
        for (pattern, replacement) in rules {
            if pattern.is_match(&word) {
                return pattern.replace(&word, replacement).into_owned();
            }
        }

        if word.ends_with("us") || word.ends_with("ss") || word.ends_with("is") {
            return word;
        }
        match word.strip_suffix('s') {
            Some(stem) if stem.len() > 1 => stem.to_string(),
            _ => word,
        }
    }

    fn plural(&self, word: &str) -> String {
        let word = word.trim().to_lowercase();
        if let Some(plural) = PLURAL_EXCEPTIONS.get(word.as_str()) {
            return plural.to_string();
        }
        if regex!(r"[^aeiou]y$").is_match(&word) {
            return format!("{}ies", &word[..word.len() - 1]);
        }
        if regex!(r"(s|x|ch|sh)$").is_match(&word) {
            return format!("{word}es");
        }
        format!("{word}s")
    }
}

// --- Adverbs -----------------------------------------------------------------

const DEFAULT_ADVERBS: &[&str] = &[
    "not", "often", "usually", "sometimes", "rarely", "mostly", "very", "slightly", "somewhat", "almost", "nearly",
    "always", "never", "more", "less", "most", "least", "occasionally", "generally", "frequently", "commonly",
];

/// `-ly` words that are states, not adverbs.
const LY_ADJECTIVES: &[&str] = &["scaly", "woolly", "prickly", "curly", "early", "hilly", "wrinkly", "bristly"];

/// Adverb test from a word list plus the `-ly` suffix.
#[derive(Debug, Clone)]
pub struct SuffixAdverbs {
    words: HashSet<String>,
}

impl SuffixAdverbs {
    pub fn new<I: IntoIterator<Item = S>, S: Into<String>>(words: I) -> Self {
        Self { words: words.into_iter().map(Into::into).collect() }
    }
}

impl Default for SuffixAdverbs {
    fn default() -> Self {
        Self::new(DEFAULT_ADVERBS.iter().copied())
    }
}

impl AdverbPredicate for SuffixAdverbs {
    fn is_adverb(&self, word: &str) -> bool {
        let word = word.trim().to_lowercase();
        if self.words.contains(&word) {
            return true;
        }
        regex!(r"^[a-z]{3,}ly$").is_match(&word) && !LY_ADJECTIVES.contains(&word.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn singular_cases() {
        // (expected, input)
        let cases: Vec<(&str, &str)> = vec![
            ("leaf", "leaves"),
            ("ovary", "ovaries"),
            ("hypanthium", "hypanthia"),
            ("sinus", "sinus"),
            ("branch", "branches"),
            ("apex", "apices"),
            ("lamina", "laminae"),
            ("fungus", "fungi"),
            ("petal", "petals"),
            ("petal", "petal"),
            ("tooth", "teeth"),
            ("axis", "axes"),
            ("densely", "densely"),
            ("glass", "glass"),
        ];
        for (expected, input) in cases {
            assert_eq!(SimpleInflector.singular(input), expected, "input: {input}");
        }
    }

    #[test]
    fn plural_cases() {
        let cases: Vec<(&str, &str)> =
            vec![("hairs", "hair"),("ovaries", "ovary"), ("branches", "branch"), ("teeth", "tooth"), ("sepals", "sepal")];
        for (expected, input) in cases {
            assert_eq!(SimpleInflector.plural(input), expected, "input: {input}");
        }
    }

    #[test]
    fn glossary_doubles_as_character_dictionary() {
        let glossary: MemoryGlossary =
            [("ovate", "shape"), ("red", "coloration"), ("orange", "coloration"), ("orange", "shape"), ("leaf", "structure")]
                .into_iter()
                .collect();
        assert_eq!(glossary.character_name_of("ovate").as_deref(), Some("shape"));
        assert_eq!(glossary.character_name_of("Orange").as_deref(), Some("coloration_or_shape"));
        assert_eq!(glossary.character_name_of("leaf"), None);
        assert!(glossary.is_in_category("leaf", "structure"));
        assert_eq!(glossary.words_in_category("coloration").len(), 2);
    }

    #[test]
    fn adverbs() {
        let adverbs = SuffixAdverbs::default();
        assert!(adverbs.is_adverb("often"));
        assert!(adverbs.is_adverb("densely"));
        assert!(!adverbs.is_adverb("scaly"));
        assert!(!adverbs.is_adverb("ly"));
        assert!(!adverbs.is_adverb("ovate"));
    }
}
