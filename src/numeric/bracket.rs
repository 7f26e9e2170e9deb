//! Bracket-range sub-rule.
//!
//! Handles spans of the shape `[low-]from-to[-high][+]`:
//!
//! ```text
//!   [5-]10-15[-20]
//!   └┬─┘└─┬─┘└─┬─┘
//!  leading core trailing
//! ```
//!
//! The core is the typical value or range. Bracketed groups are atypical
//! extremes; a one-sided group borrows its missing bound from the near bound
//! of the core and marks that bound exclusive.

use super::fact::CharacterFact;

/// A parsed bound group, before it is turned into a fact.
#[derive(Debug, Clone, PartialEq)]
enum Bound {
    Point { value: String, open: bool },
    Range { from: Option<String>, to: Option<String>, open: bool },
}

impl Bound {
    fn parse(text: &str) -> Option<Bound> {
        let text = text.trim();
        let open = text.ends_with('+');
        let text = text.trim_end_matches('+').trim();
        if text.is_empty() {
            return None;
        }

        // A hyphen in first position is a missing lower bound, not a separator.
        let split = text.char_indices().skip(1).find(|&(_, c)| c == '-').map(|(i, _)| i);
        let bound = match split {
            Some(i) => Bound::Range { from: non_empty(&text[..i]), to: non_empty(&text[i + 1..]), open },
            None if text.starts_with('-') => Bound::Range { from: None, to: non_empty(&text[1..]), open },
            None => Bound::Point { value: text.to_string(), open },
        };
        Some(bound)
    }

    /// Lower end of the bound, used to close an atypical low extreme.
    fn near_low(&self) -> Option<String> {
        match self {
            Bound::Point { value, .. } => Some(value.clone()),
            Bound::Range { from, to, .. } => from.clone().or_else(|| to.clone()),
        }
    }

    /// Upper end of the bound, used to open an atypical high extreme.
    fn near_high(&self) -> Option<String> {
        match self {
            Bound::Point { value, .. } => Some(value.clone()),
            Bound::Range { from, to, .. } => to.clone().or_else(|| from.clone()),
        }
    }

    fn into_fact(self, name: &str) -> CharacterFact {
        match self {
            Bound::Point { value, open: false } => CharacterFact::value(name, &value),
            Bound::Point { value, open: true } => {
                let mut fact = CharacterFact::range(name, Some(value), None);
                fact.upper_restricted = Some(false);
                fact
            }
            Bound::Range { from, to, open } => {
                let mut fact = CharacterFact::range(name, from, to);
                if open {
                    fact.upper_restricted = Some(false);
                }
                fact
            }
        }
    }
}

fn non_empty(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Split a span into its leading bracket, core and trailing bracket.
fn segments(span: &str) -> (Option<&str>, Option<&str>, Option<&str>) {
    let mut rest = span.trim();
    let mut leading = None;

    if let Some(after) = rest.strip_prefix('[') {
        let end = after.find(']').unwrap_or(after.len());
        leading = Some(&after[..end]);
        rest = after.get(end + 1..).unwrap_or("");
    }

    let (core, trailing) = match rest.find('[') {
        Some(i) => {
            let after = &rest[i + 1..];
            let end = after.find(']').unwrap_or(after.len());
            (&rest[..i], Some(&after[..end]))
        }
        None => (rest, None),
    };

    let core = core.trim();
    (leading, (!core.is_empty()).then_some(core), trailing)
}

/// Parse one numeric span into typical and atypical facts named after `name`.
pub(crate) fn parse_extremes(span: &str, name: &str, unit: Option<&str>) -> Vec<CharacterFact> {
    let (leading, core, trailing) = segments(span);
    let core = core.and_then(Bound::parse);
    let atypical = format!("atypical_{name}");
    let mut facts = Vec::new();

    if let Some(bound) = leading.and_then(Bound::parse) {
        let fact = match bound {
            // "[5-]": low extreme closed by the start of the typical range.
            Bound::Range { from: Some(from), to: None, open } => {
                let mut fact = CharacterFact::range(&atypical, Some(from), None);
                if let Some(to) = core.as_ref().and_then(Bound::near_low) {
                    fact.to = Some(to);
                    fact.to_inclusive = Some(false);
                }
                if open {
                    fact.upper_restricted = Some(false);
                }
                fact
            }
            other => other.into_fact(&atypical),
        };
        facts.push(fact);
    }

    if let Some(bound) = core.clone() {
        facts.push(bound.into_fact(name));
    }

    if let Some(bound) = trailing.and_then(Bound::parse) {
        let fact = match bound {
            // "[-20]": high extreme opened by the end of the typical range.
            Bound::Range { from: None, to: Some(to), open } => {
                let mut fact = CharacterFact::range(&atypical, None, Some(to));
                if let Some(from) = core.as_ref().and_then(Bound::near_high) {
                    fact.from = Some(from);
                    fact.from_inclusive = Some(false);
                }
                if open {
                    fact.upper_restricted = Some(false);
                }
                fact
            }
            other => other.into_fact(&atypical),
        };
        facts.push(fact);
    }

    facts.into_iter().map(|f| f.with_unit(unit)).collect()
}
