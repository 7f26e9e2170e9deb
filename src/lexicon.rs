//! Static word sets the engine is configured with.
//!
//! Everything here is plain data prepared before extraction begins. The
//! defaults carry a small botanical vocabulary; callers with a richer
//! glossary replace the sets wholesale.

use crate::error::ExtractError;
use crate::numeric::{DEFAULT_UNITS, NumericParser};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};

/// A numeric mention: digits with ranges, brackets, signs and fractions, no letters.
pub const DEFAULT_NUMBER_PATTERN: &str = r"^[±\[\]()+\-–./\s]*\d[\d±\[\]()+\-–./\s]*$";

static DEFAULT_LEXICON: Lazy<Lexicon> = Lazy::new(Lexicon::botanical);

#[derive(Debug, Clone)]
pub struct Lexicon {
    pub stop_words: HashSet<String>,
    pub prepositions: HashSet<String>,
    /// Prepositions that place a measurement ("3 mm from base").
    pub location_prepositions: HashSet<String>,
    /// Words that make an object distributive ("per", "each").
    pub base_count_words: HashSet<String>,
    /// Organ names that always consist of other organs ("clusters of flowers").
    pub clusters: HashSet<String>,
    pub units: Vec<String>,
    pub number_pattern: Regex,
    /// Dimension adjectives standing in for their character ("wide" -> "width").
    pub equal_characters: HashMap<String, String>,
}

impl Default for Lexicon {
    fn default() -> Self {
        DEFAULT_LEXICON.clone()
    }
}

impl Lexicon {
    fn botanical() -> Self {
        let equal_characters = [("wide", "width"), ("long", "length"), ("broad", "width"), ("diam", "diameter")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        Lexicon {
            stop_words: word_set![
                "a", "about", "above", "across", "after", "along", "also", "although", "amp", "an", "and", "are", "as",
                "at", "be", "been", "being", "but", "by", "can", "could", "do", "for", "from", "had", "has", "have", "in",
                "into", "is", "it", "its", "may", "might", "of", "on", "onto", "or", "over", "so", "that", "the", "then",
                "there", "these", "this", "those", "throughout", "to", "toward", "towards", "up", "upward", "was",
                "were", "what", "when", "where", "which", "why", "with", "within", "without", "would",
            ],
            prepositions: word_set![
                "above", "across", "after", "along", "among", "amongst", "around", "as", "at", "before", "below",
                "beneath", "beside", "between", "beyond", "by", "during", "for", "from", "in", "into", "near", "of",
                "off", "on", "onto", "out", "outside", "over", "per", "than", "through", "throughout", "to", "toward",
                "towards", "under", "up", "upward", "via", "with", "within", "without",
            ],
            location_prepositions: word_set![
                "above", "across", "along", "around", "at", "below", "beneath", "beside", "between", "beyond", "from",
                "in", "near", "on", "over", "under", "within",
            ],
            base_count_words: word_set!["each", "every", "per"],
            clusters: word_set![
                "clusters", "cluster", "arrays", "array", "series", "fascicles", "fascicle", "pairs", "pair", "rows",
                "number", "numbers", "whorls", "whorl", "spikes", "spike", "umbels", "umbel",
            ],
            units: DEFAULT_UNITS.iter().map(|u| u.to_string()).collect(),
            number_pattern: regex!(r"^[±\[\]()+\-–./\s]*\d[\d±\[\]()+\-–./\s]*$").clone(),
            equal_characters,
        }
    }

    /// Replace the number pattern, compiling `pattern` first.
    pub fn with_number_pattern(mut self, pattern: &str) -> Result<Self, ExtractError> {
        self.number_pattern = Regex::new(pattern)?;
        Ok(self)
    }

    pub fn with_clusters<I: IntoIterator<Item = S>, S: Into<String>>(mut self, clusters: I) -> Self {
        self.clusters = clusters.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_units<I: IntoIterator<Item = S>, S: Into<String>>(mut self, units: I) -> Self {
        self.units = units.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_stop_word(&self, word: &str) -> bool {
        self.stop_words.contains(&word.to_lowercase())
    }

    pub fn is_preposition(&self, word: &str) -> bool {
        self.prepositions.contains(&word.to_lowercase())
    }

    pub fn is_location_preposition(&self, word: &str) -> bool {
        self.location_prepositions.contains(&word.to_lowercase())
    }

    pub fn is_base_count_word(&self, word: &str) -> bool {
        self.base_count_words.contains(&word.to_lowercase())
    }

    pub fn is_cluster(&self, organ: &str) -> bool {
        self.clusters.contains(&organ.to_lowercase())
    }

    pub fn is_numeric(&self, text: &str) -> bool {
        self.number_pattern.is_match(text.trim())
    }

    pub fn equal_character(&self, state: &str) -> Option<&str> {
        self.equal_characters.get(&state.to_lowercase()).map(String::as_str)
    }

    /// Numeric parser for this lexicon's unit list.
    pub fn numeric_parser(&self) -> Result<NumericParser, ExtractError> {
        NumericParser::new(&self.units)
    }
}
