use crate::numeric::{self, CharacterFact, FactKind};
use pretty_assertions::assert_eq;

fn find<'a>(facts: &'a [CharacterFact], name: &str) -> &'a CharacterFact {
    facts.iter().find(|f| f.name == name).unwrap_or_else(|| panic!("no fact named {name} in {facts:?}"))
}

#[test]
fn unit_bearing_range() {
    let facts = numeric::parse("5-10 cm", "size");
    assert_eq!(
        facts,
        vec![CharacterFact {
            name: "size".into(),
            kind: FactKind::Range,
            from: Some("5".into()),
            to: Some("10".into()),
            from_unit: Some("cm".into()),
            to_unit: Some("cm".into()),
            ..CharacterFact::default()
        }]
    );
}

#[test]
fn atypical_extremes_borrow_near_bounds() {
    let facts = numeric::parse("[5-]10-15[-20] cm", "size");
    assert_eq!(facts.len(), 3);

    let low = &facts[0];
    assert_eq!(low.name, "atypical_size");
    assert_eq!(low.from.as_deref(), Some("5"));
    assert_eq!(low.to.as_deref(), Some("10"));
    assert_eq!(low.to_inclusive, Some(false));
    assert_eq!(low.from_inclusive, None);

    let typical = &facts[1];
    assert_eq!(typical.name, "size");
    assert_eq!((typical.from.as_deref(), typical.to.as_deref()), (Some("10"), Some("15")));

    let high = &facts[2];
    assert_eq!(high.name, "atypical_size");
    assert_eq!(high.from.as_deref(), Some("15"));
    assert_eq!(high.to.as_deref(), Some("20"));
    assert_eq!(high.from_inclusive, Some(false));

    for fact in &facts {
        assert_eq!(fact.from_unit.as_deref(), Some("cm"));
        assert_eq!(fact.to_unit.as_deref(), Some("cm"));
    }
}

#[test]
fn parenthesized_extremes_match_bracketed() {
    assert_eq!(numeric::parse("(5–)10–15(–20) cm", "size"), numeric::parse("[5-]10-15[-20] cm", "size"));
}

#[test]
fn relative_phrase_is_stripped_into_constraint() {
    let facts = numeric::parse("1/2 to 2/3 times length of blade", "size");
    assert_eq!(facts.len(), 1);
    let fact = &facts[0];
    assert_eq!(fact.kind, FactKind::RelativeRange);
    assert_eq!(fact.kind.char_type(), Some("relative_range_value"));
    assert_eq!(fact.from.as_deref(), Some("1/2"));
    assert_eq!(fact.to.as_deref(), Some("2/3"));
    assert!(fact.relative_constraint.as_deref().unwrap().contains("times length of blade"));
}

#[test]
fn relative_value_cases() {
    // (expected value, expected constraint, input)
    let cases: Vec<(&str, &str, &str)> = vec![
        ("2", "times as long as wide", "2 times as long as wide"),
        ("50", "% of blade length", "50% of blade length"),
        ("3", "total length", "3 total length"),
    ];
    for (value, constraint, input) in cases {
        let facts = numeric::parse(input, "size");
        assert_eq!(facts.len(), 1, "input: {input}");
        assert_eq!(facts[0].kind, FactKind::RelativeValue, "input: {input}");
        assert_eq!(facts[0].value.as_deref(), Some(value), "input: {input}");
        assert_eq!(facts[0].relative_constraint.as_deref(), Some(constraint), "input: {input}");
    }
}

#[test]
fn dimensional_product_propagates_unit() {
    let facts = numeric::parse("2-3 x 1-1.5 mm", "size");
    let length = find(&facts, "length");
    let width = find(&facts, "width");
    assert_eq!((length.from.as_deref(), length.to.as_deref()), (Some("2"), Some("3")));
    assert_eq!(length.from_unit.as_deref(), Some("mm"));
    assert_eq!((width.from.as_deref(), width.to.as_deref()), (Some("1"), Some("1.5")));
    assert_eq!(width.to_unit.as_deref(), Some("mm"));
    assert!(facts.iter().all(|f| f.name != "size"));

    let facts = numeric::parse("4 cm × 2 × 1 mm", "size");
    assert_eq!(find(&facts, "length").unit.as_deref(), Some("cm"));
    assert_eq!(find(&facts, "width").unit.as_deref(), Some("mm"));
    assert_eq!(find(&facts, "height").value.as_deref(), Some("1"));
}

#[test]
fn dimension_without_unit_is_not_a_product() {
    let facts = numeric::parse("3 x 4", "count");
    assert!(facts.iter().all(|f| f.name == "count"));
    assert_eq!(facts.len(), 2);
}

#[test]
fn ratio_with_open_upper_bound() {
    let facts = numeric::parse("l/w = 2-3+", "size");
    let ratio = find(&facts, "l_w_ratio");
    assert_eq!(ratio.kind, FactKind::Range);
    assert_eq!((ratio.from.as_deref(), ratio.to.as_deref()), (Some("2"), Some("3")));
    assert_eq!(ratio.upper_restricted, Some(false));
}

#[test]
fn count_cases() {
    // (expected facts as (name, from, to, value), input)
    let cases: Vec<(Vec<(&str, Option<&str>, Option<&str>, Option<&str>)>, &str)> = vec![
        (vec![("count", None, None, Some("5"))], "5"),
        (vec![("count", Some("3"), Some("5"), None)], "3-5"),
        (vec![("count", Some("10"), None, None)], "10+"),
        (vec![("atypical_count", None, None, Some("2")), ("count", Some("3"), Some("5"), None)], "(2)3-5"),
        (vec![("count", Some("4"), Some("5"), None), ("atypical_count", Some("5"), Some("5"), None)], "4-5(+)"),
    ];
    for (expected, input) in cases {
        let facts = numeric::parse(input, "count");
        let got: Vec<_> =
            facts.iter().map(|f| (f.name.as_str(), f.from.as_deref(), f.to.as_deref(), f.value.as_deref())).collect();
        assert_eq!(got, expected, "input: {input}");
    }
}

#[test]
fn unit_bearing_size_inside_count_request() {
    let facts = numeric::parse("3-5 mm", "count");
    assert_eq!(facts.len(), 1);
    assert_eq!(facts[0].name, "size");
}

#[test]
fn hyphenated_words_are_not_counts() {
    let facts = numeric::parse("3-lobed", "count");
    assert_eq!(facts, vec![CharacterFact::value("count", "3-lobed")]);
}

#[test]
fn unmatched_text_falls_back_to_plain_value() {
    assert_eq!(numeric::parse("  many  ", "count"), vec![CharacterFact::value("count", "many")]);
    assert_eq!(numeric::parse("1/2", "size"), vec![CharacterFact::value("size", "1/2")]);
}

#[test]
fn empty_input_yields_nothing() {
    assert!(numeric::parse("", "size").is_empty());
    assert!(numeric::parse("   ", "count").is_empty());
}

#[test]
fn custom_units() {
    let units = vec!["in".to_string(), "ft".to_string()];
    let facts = numeric::parse_with("2-3 ft", "size", &units).unwrap();
    assert_eq!(facts[0].from_unit.as_deref(), Some("ft"));

    let facts = numeric::parse_with("2-3 cm", "size", &units).unwrap();
    assert!(facts.iter().all(|f| f.from_unit.is_none()));
}

#[test]
fn split_unit_only_after_numbers() {
    let parser = numeric::NumericParser::shared();
    assert_eq!(parser.split_unit("3-5 mm"), ("3-5".to_string(), Some("mm".to_string())));
    assert_eq!(parser.split_unit("medium"), ("medium".to_string(), None));
}

#[test]
fn attributes_follow_fact_shape() {
    let facts = numeric::parse("[5-]10-15 cm", "size");
    let attrs = facts[0].to_attributes();
    assert_eq!(attrs.get("name"), Some("atypical_size"));
    assert_eq!(attrs.get("char_type"), Some("range_value"));
    assert_eq!(attrs.get("to_inclusive"), Some("false"));
    assert_eq!(attrs.get("from_unit"), Some("cm"));
}
