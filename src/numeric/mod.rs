//! Numeric expression parser.
//!
//! Turns free text such as `"[5-]10-15[-20] cm"`, `"2 x 3 mm"`,
//! `"l/w = 2-3"` or `"1/2-2/3 times length of blade"` into typed
//! [`CharacterFact`]s.
//!
//! ```text
//!  text ── normalize ──► dimensional product ─► ratio ─► unit-bearing size
//!                                                               │
//!        facts ◄── fallback value ◄── bare count ◄── relative phrase
//! ```
//!
//! Every rule in the cascade claims its span before the next one runs (see
//! `rules.rs`). Bracketed extremes are handled by one shared sub-rule
//! (`bracket.rs`). When nothing matches, the trimmed text becomes a single
//! plain value so that no numeric mention is ever dropped.

mod bracket;
mod fact;
mod helpers;
mod rules;

#[cfg(test)]
mod tests;

pub use fact::{CharacterFact, FactKind};

use crate::error::ExtractError;
use helpers::{SPAN, normalize, unit_alternation};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

/// Length units recognized when no other list is configured.
pub const DEFAULT_UNITS: &[&str] = &["mm", "cm", "dm", "m", "km", "µm", "μm", "um"];

static DEFAULT_PARSER: Lazy<NumericParser> = Lazy::new(|| {
    let units: Vec<String> = DEFAULT_UNITS.iter().map(|u| u.to_string()).collect();
    NumericParser::new(&units).expect("default unit list compiles")
});

/// Numeric cascade compiled for one set of unit names.
#[derive(Debug, Clone)]
pub struct NumericParser {
    units: Vec<String>,
    pub(crate) dimension: Regex,
    pub(crate) size: Regex,
    unit_tail: Regex,
}

impl NumericParser {
    pub fn new(units: &[String]) -> Result<Self, ExtractError> {
        let alternation = unit_alternation(units);
        let dimension = Regex::new(&format!(
            r"(?P<l>{SPAN})\s*(?P<lu>{alternation})?\s*[×x]\s*(?P<w>{SPAN})\s*(?P<wu>{alternation})?(?:\s*[×x]\s*(?P<h>{SPAN})\s*(?P<hu>{alternation})?)?"
        ))?;
        let size = Regex::new(&format!(r"(?P<span>{SPAN})\s*(?P<unit>{alternation})\b(?:\s+(?P<dim>diam|wide|long)\b)?"))?;
        let unit_tail = Regex::new(&format!(r"^(?P<value>.*[\d\]+])\s*(?P<unit>{alternation})\s*$"))?;

        Ok(Self { units: units.to_vec(), dimension, size, unit_tail })
    }

    /// The parser built from [`DEFAULT_UNITS`].
    pub fn shared() -> &'static NumericParser {
        &DEFAULT_PARSER
    }

    pub fn units(&self) -> &[String] {
        &self.units
    }

    /// Run the cascade over `text`; unlabeled numbers are named `default_name`.
    pub fn parse(&self, text: &str, default_name: &str) -> Vec<CharacterFact> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Vec::new();
        }

        let mut expression = normalize(trimmed);
        let mut facts = Vec::new();
        for rule in rules::CASCADE {
            let produced = (rule.apply)(self, &mut expression, default_name);
            if !produced.is_empty() {
                trace!(rule = rule.name, produced = produced.len(), "numeric rule matched");
            }
            facts.extend(produced);
        }

        if facts.is_empty() {
            trace!(text = trimmed, "no numeric rule matched, keeping plain value");
            facts.push(CharacterFact::value(default_name, trimmed));
        }
        facts
    }

    /// Split a trailing unit off a size value: `"3-5 mm"` -> `("3-5", Some("mm"))`.
    pub fn split_unit(&self, value: &str) -> (String, Option<String>) {
        match self.unit_tail.captures(value.trim()) {
            Some(caps) => (caps["value"].to_string(), Some(caps["unit"].to_string())),
            _ => (value.trim().to_string(), None),
        }
    }
}

/// Parse `text` with the default unit list.
///
/// # Example
/// ```
/// let facts = taxomark::numeric::parse("5-10 cm", "size");
/// assert_eq!(facts.len(), 1);
/// assert_eq!(facts[0].from.as_deref(), Some("5"));
/// assert_eq!(facts[0].to_unit.as_deref(), Some("cm"));
/// ```
pub fn parse(text: &str, default_name: &str) -> Vec<CharacterFact> {
    DEFAULT_PARSER.parse(text, default_name)
}

/// Parse `text` with a custom unit list.
pub fn parse_with(text: &str, default_name: &str, units: &[String]) -> Result<Vec<CharacterFact>, ExtractError> {
    Ok(NumericParser::new(units)?.parse(text, default_name))
}
