//! The numeric cascade.
//!
//! Rules run in order over one shared expression. A rule that matches turns
//! its span into facts and overwrites the span with [`PLACEHOLDER`], so later
//! rules never see text an earlier rule already claimed.

use super::NumericParser;
use super::bracket::parse_extremes;
use super::fact::CharacterFact;
use super::helpers::{PLACEHOLDER, follows_slash};
use regex::Captures;

pub(crate) type RuleFn = fn(&NumericParser, &mut String, &str) -> Vec<CharacterFact>;

pub(crate) struct NumericRule {
    pub name: &'static str,
    pub apply: RuleFn,
}

pub(crate) const CASCADE: &[NumericRule] = &[
    NumericRule { name: "dimensional product", apply: dimensional_product },
    NumericRule { name: "ratio", apply: ratio },
    NumericRule { name: "unit-bearing size", apply: unit_bearing_size },
    NumericRule { name: "relative phrase", apply: relative_phrase },
    NumericRule { name: "hyphenated word", apply: hyphenated_word },
    NumericRule { name: "bare count", apply: bare_count },
];

/// Sizes and relative phrases are never counts, whatever the caller asked for.
fn measure_name(default_name: &str) -> &str {
    if default_name == "count" { "size" } else { default_name }
}

// --- Rules -------------------------------------------------------------------

/// `L x W [x H] unit`: the rightmost unit propagates left to operands without one.
fn dimensional_product(parser: &NumericParser, text: &mut String, _default_name: &str) -> Vec<CharacterFact> {
    let mut facts = Vec::new();
    let replaced = parser.dimension.replace_all(text.as_str(), |caps: &Captures| {
        let operands = [("length", "l", "lu"), ("width", "w", "wu"), ("height", "h", "hu")];
        let present: Vec<(&str, &str, Option<&str>)> = operands
            .iter()
            .filter_map(|&(name, span, unit)| caps.name(span).map(|m| (name, m.as_str(), caps.name(unit).map(|u| u.as_str()))))
            .collect();

        let Some(&(_, _, Some(_))) = present.last() else {
            return caps[0].to_string();
        };

        let mut carried: Option<&str> = None;
        let mut produced: Vec<Vec<CharacterFact>> = Vec::with_capacity(present.len());
        for &(name, span, unit) in present.iter().rev() {
            carried = unit.or(carried);
            produced.push(parse_extremes(span, name, carried));
        }
        facts.extend(produced.into_iter().rev().flatten());
        PLACEHOLDER.to_string()
    });
    *text = replaced.into_owned();
    facts
}

/// `l/w = 2-3[+]`.
fn ratio(_parser: &NumericParser, text: &mut String, _default_name: &str) -> Vec<CharacterFact> {
    let mut facts = Vec::new();
    let replaced = regex!(r"l\s*/\s*w\s*=\s*(?P<span>[\d.\[\]+\-]*\d[\d.\[\]+\-]*)").replace_all(text.as_str(), |caps: &Captures| {
        facts.extend(parse_extremes(&caps["span"], "l_w_ratio", None));
        PLACEHOLDER.to_string()
    });
    *text = replaced.into_owned();
    facts
}

/// Any span followed by a known length unit.
fn unit_bearing_size(parser: &NumericParser, text: &mut String, default_name: &str) -> Vec<CharacterFact> {
    let mut facts = Vec::new();
    let base = measure_name(default_name);
    let replaced = parser.size.replace_all(text.as_str(), |caps: &Captures| {
        let name = match (base, caps.name("dim").map(|m| m.as_str())) {
            ("size", Some("diam")) => "diameter",
            ("size", Some("wide")) => "width",
            ("size", Some("long")) => "length",
            (base, _) => base,
        };
        facts.extend(parse_extremes(&caps["span"], name, Some(&caps["unit"])));
        PLACEHOLDER.to_string()
    });
    *text = replaced.into_owned();
    facts
}

/// Spans measured against another organ: "1/2-2/3 times length of blade".
fn relative_phrase(_parser: &NumericParser, text: &mut String, default_name: &str) -> Vec<CharacterFact> {
    let mut facts = Vec::new();
    let name = measure_name(default_name);
    let pattern = regex!(
        r"(?P<span>[±\[]*\d[\d.\[\]+±/%\-]*)\s*-?\s*(?P<rel>% of \w+ length|height of \w+|times as \w+ as \w+|total length|their length|(?:times\s+)?length of \w+|times\b)"
    );
    let replaced = pattern.replace_all(text.as_str(), |caps: &Captures| {
        let relation = caps["rel"].trim().to_string();
        for mut fact in parse_extremes(&caps["span"], name, None) {
            fact.kind = fact.kind.relative();
            fact.relative_constraint = Some(relation.clone());
            facts.push(fact);
        }
        PLACEHOLDER.to_string()
    });
    *text = replaced.into_owned();
    facts
}

/// Numbers fused to a word ("3-lobed", "2-merous") describe shape, not count.
fn hyphenated_word(_parser: &NumericParser, text: &mut String, _default_name: &str) -> Vec<CharacterFact> {
    let replaced = regex!(r"[\d.\[\]+\-]*\d-[A-Za-z]+").replace_all(text.as_str(), PLACEHOLDER);
    *text = replaced.into_owned();
    Vec::new()
}

/// Whatever digit spans are left.
fn bare_count(_parser: &NumericParser, text: &mut String, default_name: &str) -> Vec<CharacterFact> {
    let mut facts = Vec::new();
    let source = text.clone();
    let replaced = regex!(r"(?P<span>[±\[]*\d[\d.\[\]+±\-]*)(?P<tail>n\b|/)?").replace_all(&source, |caps: &Captures| {
        let whole = &caps[0];
        let start = caps.get(0).map(|m| m.start()).unwrap_or(0);
        if caps.name("tail").is_some() || follows_slash(&source, start) {
            return whole.to_string();
        }
        facts.extend(parse_extremes(&caps["span"], default_name, None));
        PLACEHOLDER.to_string()
    });
    *text = replaced.into_owned();
    facts
}
