use super::{DescriptionExtractor, Passes};
use crate::chunk::{ChunkCollector, ChunkCollectorBuilder, ChunkType};
use crate::element::{Element, Statement};
use crate::knowledge::{CharacterDictionary, Knowledge};
use crate::lexicon::Lexicon;
use crate::numeric::NumericParser;
use crate::test_support::Fixture;
use pretty_assertions::assert_eq;

const ALL_PASSES: Passes = Passes { whole_organism: true, may_be_same: true };

fn run(knowledge: Knowledge<'_>, collectors: &[ChunkCollector]) -> super::RunResult {
    let lexicon = Lexicon::default();
    DescriptionExtractor::new(knowledge, &lexicon, NumericParser::shared(), ALL_PASSES).run_with_metrics(collectors)
}

fn extract_one(fx: &Fixture, build: impl FnOnce(&mut ChunkCollectorBuilder)) -> Statement {
    let mut b = ChunkCollector::builder("test");
    build(&mut b);
    let mut out = run(fx.knowledge(), &[b.build()]);
    assert_eq!(out.metrics.faults(), 0, "unexpected fault: {:?}", out.metrics.statements[0].fault);
    out.statements.remove(0)
}

fn structure<'s>(statement: &'s Statement, name: &str) -> &'s Element {
    statement.structure_named(name).unwrap_or_else(|| panic!("no structure {name} in\n{statement}"))
}

fn character<'s>(structure: &'s Element, name: &str) -> &'s Element {
    structure.character(name).unwrap_or_else(|| panic!("no character {name} under {:?}", structure.attributes))
}

fn relation_tuples(statement: &Statement) -> Vec<(&str, &str, &str, &str)> {
    statement
        .relations()
        .map(|r| {
            (r.id().unwrap_or(""), r.name().unwrap_or(""), r.attr("from").unwrap_or(""), r.attr("to").unwrap_or(""))
        })
        .collect()
}

// --- Structures and characters ------------------------------------------------

#[test]
fn subject_with_tagged_state() {
    let fx = Fixture::new();
    let st = extract_one(&fx, |b| {
        let leaves = b.organ("leaves");
        let shape = b.character_state("shape", "ovate");
        let end = b.end_of_line();
        b.push(leaves).push(shape).push(end);
    });

    assert_eq!(st.elements.len(), 1);
    let leaf = structure(&st, "leaf");
    assert_eq!(leaf.id(), Some("o1"));
    assert_eq!(character(leaf, "shape").attr("value"), Some("ovate"));
    assert_eq!(st.text, "leaves ovate .");
}

#[test]
fn untagged_state_uses_dictionary() {
    let fx = Fixture::new();
    let st = extract_one(&fx, |b| {
        let leaves = b.organ("leaves");
        let color = b.bare_state("green");
        b.push(leaves).push(color);
    });
    assert_eq!(character(structure(&st, "leaf"), "coloration").attr("value"), Some("green"));
}

#[test]
fn range_states() {
    // (expected from, expected to, character, text)
    let cases: Vec<(&str, &str, &str, &str)> = vec![
        ("red", "purple", "coloration", "pale red to dark purple"),
        ("ovate", "lanceolate", "shape", "usually elliptic or ovate to lanceolate"),
        ("elliptic", "linear", "shape", "elliptic to linear"),
    ];
    let fx = Fixture::new();
    for (from, to, name, text) in cases {
        let st = extract_one(&fx, |b| {
            let leaves = b.organ("leaves");
            let state = b.character_state(name, text);
            b.push(leaves).push(state);
        });
        let range = character(structure(&st, "leaf"), name);
        assert_eq!(range.attr("char_type"), Some("range_value"), "input: {text}");
        assert_eq!((range.attr("from"), range.attr("to")), (Some(from), Some(to)), "input: {text}");
    }
}

#[test]
fn to_phrase_becomes_range() {
    let fx = Fixture::new();
    let st = extract_one(&fx, |b| {
        let leaves = b.organ("leaves");
        let phrase = b.to_phrase(None, "ovate to lanceolate");
        b.push(leaves).push(phrase);
    });
    let shape = character(structure(&st, "leaf"), "shape");
    assert_eq!((shape.attr("from"), shape.attr("to")), (Some("ovate"), Some("lanceolate")));
}

#[test]
fn dimension_word_renames_preceding_measurement() {
    let fx = Fixture::new();
    let st = extract_one(&fx, |b| {
        let leaves = b.organ("leaves");
        let size = b.numericals("3-5 mm");
        let wide = b.bare_state("wide");
        b.push(leaves).push(size).push(wide);
    });

    let leaf = structure(&st, "leaf");
    assert!(leaf.character("size").is_none());
    let width = character(leaf, "width");
    assert_eq!((width.attr("from"), width.attr("to")), (Some("3"), Some("5")));
    assert_eq!(width.attr("from_unit"), Some("mm"));
}

#[test]
fn pending_character_name_waits_for_value() {
    let fx = Fixture::new();
    let st = extract_one(&fx, |b| {
        let leaves = b.organ("leaves");
        let relief = b.bare_state("relief");
        let high = b.bare_state("high");
        b.push(leaves).push(relief).push(high);
    });
    let leaf = structure(&st, "leaf");
    assert_eq!(character(leaf, "relief").attr("value"), Some("high"));
    assert_eq!(leaf.characters().count(), 1);
}

#[test]
fn hyphenated_fragment_is_completed() {
    let fx = Fixture::new();
    let st = extract_one(&fx, |b| {
        let leaves = b.organ("leaves");
        let fragment = b.bare_state("ovate-");
        let or = b.or();
        let shape = b.character_state("shape", "bell-shaped");
        b.push(leaves).push(fragment).push(or).push(shape);
    });

    let values: Vec<&str> = structure(&st, "leaf").characters().filter_map(|c| c.attr("value")).collect();
    assert_eq!(values, vec!["ovate-shaped", "bell-shaped"]);
}

#[test]
fn count_state_ranges() {
    // (expected from, expected to, upper_restricted, text)
    let cases: Vec<(&str, &str, Option<&str>, &str)> = vec![("3", "5", None, "3-5"), ("3", "5", Some("false"), "3-5+")];
    let fx = Fixture::new();
    for (from, to, open, text) in cases {
        let st = extract_one(&fx, |b| {
            let petals = b.organ("petals");
            let count = b.character_state("count", text);
            b.push(petals).push(count);
        });
        let count = character(structure(&st, "petal"), "count");
        assert_eq!(count.attr("char_type"), Some("range_value"), "input: {text}");
        assert_eq!((count.attr("from"), count.attr("to")), (Some(from), Some(to)), "input: {text}");
        assert_eq!(count.attr("upper_restricted"), open, "input: {text}");
    }
}

#[test]
fn tagged_size_splits_unit() {
    let fx = Fixture::new();
    let st = extract_one(&fx, |b| {
        let leaves = b.organ("leaves");
        let size = b.character_state("size", "5 mm");
        b.push(leaves).push(size);
    });
    let size = character(structure(&st, "leaf"), "size");
    assert_eq!((size.attr("value"), size.attr("unit")), (Some("5"), Some("mm")));
}

#[test]
fn count_chunk_on_subject() {
    let fx = Fixture::new();
    let st = extract_one(&fx, |b| {
        let petals = b.organ("petals");
        let count = b.count("5");
        b.push(petals).push(count);
    });
    assert_eq!(character(structure(&st, "petal"), "count").attr("value"), Some("5"));
}

#[test]
fn chromosome_count() {
    let fx = Fixture::new();
    let st = extract_one(&fx, |b| {
        let chrom = b.leaf(ChunkType::Chrom, "2n = 18");
        b.push(chrom);
    });
    let chromosome = structure(&st, "chromosome");
    assert_eq!(chromosome.id(), Some("o1"));
    assert_eq!(character(chromosome, "count").attr("value"), Some("18"));
}

// --- Modifiers, staging and boundaries -----------------------------------------

#[test]
fn modifier_after_state_attaches() {
    let fx = Fixture::new();
    let st = extract_one(&fx, |b| {
        let leaves = b.organ("leaves");
        let shape = b.character_state("shape", "ovate");
        let sometimes = b.modifier("sometimes");
        b.push(leaves).push(shape).push(sometimes);
    });
    assert_eq!(character(structure(&st, "leaf"), "shape").attr("modifier"), Some("sometimes"));
}

#[test]
fn modifier_before_state_is_staged() {
    let fx = Fixture::new();
    let st = extract_one(&fx, |b| {
        let leaves = b.organ("leaves");
        let often = b.modifier("often");
        let color = b.character_state("coloration", "red");
        b.push(leaves).push(often).push(color);
    });
    let color = character(structure(&st, "leaf"), "coloration");
    assert_eq!((color.attr("value"), color.attr("modifier")), (Some("red"), Some("often")));
}

#[test]
fn characters_before_any_structure_wait_for_it() {
    let fx = Fixture::new();
    let st = extract_one(&fx, |b| {
        let color = b.character_state("coloration", "red");
        let leaves = b.organ("leaves");
        b.push(color).push(leaves);
    });
    assert_eq!(character(structure(&st, "leaf"), "coloration").attr("value"), Some("red"));
    assert!(st.structure_named("whole_organism").is_none());
}

#[test]
fn orphan_characters_go_to_whole_organism() {
    let fx = Fixture::new();
    let st = extract_one(&fx, |b| {
        let habit = b.character_state("growth_form", "erect");
        b.push(habit);
    });
    let organism = structure(&st, "whole_organism");
    assert_eq!(character(organism, "growth_form").attr("value"), Some("erect"));
}

#[test]
fn end_of_subclause_returns_to_subjects() {
    let build = |b: &mut ChunkCollectorBuilder, subclause: bool| {
        let leaves = b.organ("leaves");
        let hairs = b.organ("hairs");
        let pp = b.pp("with", &[hairs]);
        let color = b.character_state("coloration", "green");
        b.push(leaves).push(pp);
        if subclause {
            let end = b.end_of_subclause();
            b.push(end);
        }
        b.push(color);
    };

    let fx = Fixture::new();
    let st = extract_one(&fx, |b| build(b, true));
    assert!(structure(&st, "leaf").character("coloration").is_some());
    assert!(structure(&st, "hair").character("coloration").is_none());

    let st = extract_one(&fx, |b| build(b, false));
    assert!(structure(&st, "leaf").character("coloration").is_none());
    assert!(structure(&st, "hair").character("coloration").is_some());
}

// --- Structure formation ------------------------------------------------------

#[test]
fn np_list_constraint_goes_to_last_organ() {
    let fx = Fixture::new();
    let st = extract_one(&fx, |b| {
        let basal = b.constraint("basal");
        let and = b.and();
        let cauline = b.constraint("cauline");
        let leaves = b.organ("leaves");
        let list = b.node(ChunkType::NpList, &[basal, and, cauline, leaves]);
        b.push(list);
    });
    assert_eq!(structure(&st, "leaf").attr("constraint"), Some("basal and cauline"));
}

#[test]
fn constraint_edges_drop_function_words() {
    let fx = Fixture::new();
    let st = extract_one(&fx, |b| {
        let constraint = b.constraint("the inner and outer of");
        let leaves = b.organ("leaves");
        b.push(constraint).push(leaves);
    });
    assert_eq!(structure(&st, "leaf").attr("constraint"), Some("inner and outer"));
}

#[test]
fn np_list_subjects_share_following_state() {
    let fx = Fixture::new();
    let st = extract_one(&fx, |b| {
        let stems = b.organ("stems");
        let and = b.and();
        let leaves = b.organ("leaves");
        let list = b.node(ChunkType::NpList, &[stems, and, leaves]);
        let color = b.character_state("coloration", "green");
        b.push(list).push(color);
    });

    let stem = structure(&st, "stem");
    let leaf = structure(&st, "leaf");
    assert_eq!((stem.id(), leaf.id()), (Some("o1"), Some("o2")));
    assert_eq!(leaf.attr("constraint"), None);
    assert_eq!(character(stem, "coloration"), character(leaf, "coloration"));
}

#[test]
fn indefinite_article_counts_one() {
    let fx = Fixture::new();
    let st = extract_one(&fx, |b| {
        let fruits = b.organ("fruits");
        let a = b.terminal("a");
        let beak = b.organ("beak");
        let pp = b.pp("with", &[a, beak]);
        b.push(fruits).push(pp);
    });
    assert_eq!(character(structure(&st, "beak"), "count").attr("value"), Some("1"));
    assert_eq!(relation_tuples(&st), vec![("r1", "with", "o1", "o2")]);
}

#[test]
fn object_states_describe_object_structures() {
    let fx = Fixture::new();
    let st = extract_one(&fx, |b| {
        let leaves = b.organ("leaves");
        let white = b.character_state("coloration", "white");
        let hairs = b.organ("hairs");
        let pp = b.pp("with", &[white, hairs]);
        b.push(leaves).push(pp);
    });
    assert_eq!(character(structure(&st, "hair"), "coloration").attr("value"), Some("white"));
    assert!(structure(&st, "leaf").character("coloration").is_none());
}

#[test]
fn trailing_object_chunks_describe_new_structures() {
    let fx = Fixture::new();
    let st = extract_one(&fx, |b| {
        let leaves = b.organ("leaves");
        let hairs = b.organ("hairs");
        let white = b.character_state("coloration", "white");
        let pp = b.pp("with", &[hairs, white]);
        b.push(leaves).push(pp);
    });
    assert_eq!(character(structure(&st, "hair"), "coloration").attr("value"), Some("white"));
    assert_eq!(relation_tuples(&st), vec![("r1", "with", "o1", "o2")]);
}

#[test]
fn trailing_object_chunks_after_a_boundary() {
    let fx = Fixture::new();
    let st = extract_one(&fx, |b| {
        let leaves = b.organ("leaves");
        let comma = b.comma();
        let hairs = b.organ("hairs");
        let white = b.character_state("coloration", "white");
        let pp = b.pp("with", &[hairs, white]);
        b.push(leaves).push(comma).push(pp);
    });
    assert!(structure(&st, "leaf").character("coloration").is_none(), "input:\n{st}");
    assert_eq!(character(structure(&st, "hair"), "coloration").attr("value"), Some("white"));
}

#[test]
fn trailing_chunks_stay_with_their_own_object() {
    let fx = Fixture::new();
    let st = extract_one(&fx, |b| {
        let leaves = b.organ("leaves");
        let hairs = b.organ("hairs");
        let and = b.and();
        let glands = b.organ("glands");
        let white = b.character_state("coloration", "white");
        let pp = b.pp("with", &[hairs, and, glands, white]);
        b.push(leaves).push(pp);
    });
    assert!(structure(&st, "hair").character("coloration").is_none(), "input:\n{st}");
    assert_eq!(character(structure(&st, "gland"), "coloration").attr("value"), Some("white"));
    assert!(structure(&st, "leaf").character("coloration").is_none());
}

#[test]
fn plus_limits_object_characters_to_last_organ() {
    let fx = Fixture::new();
    let st = extract_one(&fx, |b| {
        let margins = b.organ("margins");
        let white = b.character_state("coloration", "white");
        let teeth = b.organ("teeth");
        let plus = b.terminal("plus");
        let bristles = b.organ("bristles");
        let pp = b.pp("with", &[white, teeth, plus, bristles]);
        b.push(margins).push(pp);
    });
    assert!(structure(&st, "tooth").character("coloration").is_none());
    assert_eq!(character(structure(&st, "bristle"), "coloration").attr("value"), Some("white"));
}

// --- Prepositional phrases ------------------------------------------------------

#[test]
fn pp_relates_subject_to_object() {
    let fx = Fixture::new();
    let st = extract_one(&fx, |b| {
        let leaves = b.organ("leaves");
        let hairs = b.organ("hairs");
        let pp = b.pp("with", &[hairs]);
        b.push(leaves).push(pp);
    });

    assert_eq!(st.elements.len(), 3);
    assert_eq!(relation_tuples(&st), vec![("r1", "with", "o1", "o2")]);
    let relation = st.relations().next().unwrap();
    assert_eq!(relation.attr("negation"), Some("false"));
}

#[test]
fn of_relation_labels() {
    // (expected label, subject, object, what follows the PP, corpus)
    let cases: Vec<(&str, &str, &str, Option<ChunkType>, Vec<&str>)> = vec![
        ("part_of", "tips", "petals", Some(ChunkType::Comma), vec![]),
        ("consist_of", "heads", "flowers", Some(ChunkType::EndOfLine), vec![]),
        ("consist_of", "clusters", "flowers", Some(ChunkType::Comma), vec![]),
        ("consist_of", "petioles", "leaflets", Some(ChunkType::Comma), vec!["petioles of 3 leaflets, each ovate."]),
        ("part_of", "petioles", "leaflets", Some(ChunkType::Comma), vec!["petioles of leaflets, each ovate."]),
    ];
    for (label, subject, object, after, corpus) in cases {
        let fx = Fixture::with_corpus(&corpus);
        let st = extract_one(&fx, |b| {
            let subject = b.organ(subject);
            let object = b.organ(object);
            let pp = b.pp("of", &[object]);
            b.push(subject).push(pp);
            if let Some(kind) = after {
                let text = if kind == ChunkType::Comma { "," } else { "." };
                let tail = b.leaf(kind, text);
                b.push(tail);
            }
        });
        let relations = relation_tuples(&st);
        assert_eq!(relations, vec![("r1", label, "o1", "o2")], "input: {subject} of {object}");
    }
}

#[test]
fn counted_of_object_consists() {
    let fx = Fixture::new();
    let st = extract_one(&fx, |b| {
        let heads = b.organ("heads");
        let count = b.count("5");
        let flowers = b.organ("flowers");
        let pp = b.pp("of", &[count, flowers]);
        let comma = b.comma();
        b.push(heads).push(pp).push(comma);
    });
    assert_eq!(relation_tuples(&st), vec![("r1", "consist_of", "o1", "o2")]);
}

#[test]
fn not_modifier_negates_relation() {
    let fx = Fixture::new();
    let st = extract_one(&fx, |b| {
        let leaves = b.organ("leaves");
        let not = b.modifier("not");
        let hairs = b.organ("hairs");
        let pp = b.pp("with", &[hairs]);
        b.push(leaves).push(not).push(pp);
    });
    let relation = st.relations().next().unwrap();
    assert_eq!(relation.attr("negation"), Some("true"));
    assert_eq!(relation.attr("modifier"), None);
}

#[test]
fn numeric_object_counts_last_structure() {
    let fx = Fixture::new();
    let st = extract_one(&fx, |b| {
        let stamens = b.organ("stamens");
        let ten = b.terminal("10");
        let pp = b.pp("about", &[ten]);
        b.push(stamens).push(pp);
    });
    assert_eq!(character(structure(&st, "stamen"), "count").attr("value"), Some("10"));
    assert_eq!(st.relations().count(), 0);
}

#[test]
fn located_size_becomes_location() {
    let fx = Fixture::new();
    let st = extract_one(&fx, |b| {
        let glands = b.organ("glands");
        let size = b.numericals("3 mm");
        let base = b.terminal("base");
        let pp = b.pp("from", &[base]);
        b.push(glands).push(size).push(pp);
    });
    let location = character(structure(&st, "gland"), "location");
    assert_eq!((location.attr("value"), location.attr("unit")), (Some("3"), Some("mm")));
}

#[test]
fn organless_pp_constrains_last_character() {
    let fx = Fixture::new();
    let st = extract_one(&fx, |b| {
        let leaves = b.organ("leaves");
        let green = b.character_state("coloration", "green");
        let age = b.terminal("age");
        let pp = b.pp("in", &[age]);
        b.push(leaves).push(green).push(pp);
    });
    assert_eq!(character(structure(&st, "leaf"), "coloration").attr("constraint"), Some("in age"));
}

#[test]
fn organless_pp_before_state_scopes_it() {
    let fx = Fixture::new();
    let st = extract_one(&fx, |b| {
        let fruits = b.organ("fruits");
        let maturity = b.terminal("maturity");
        let pp = b.pp("at", &[maturity]);
        let purple = b.character_state("coloration", "purple");
        b.push(fruits).push(pp).push(purple);
    });
    assert_eq!(character(structure(&st, "fruit"), "coloration").attr("constraint"), Some("at maturity"));
}

#[test]
fn character_word_in_pp_names_last_character() {
    let fx = Fixture::new();
    let st = extract_one(&fx, |b| {
        let leaves = b.organ("leaves");
        let shape = b.character_state("shape", "ovate");
        let outline = b.terminal("outline");
        let pp = b.pp("in", &[outline]);
        b.push(leaves).push(shape).push(pp);
    });
    let leaf = structure(&st, "leaf");
    assert_eq!(character(leaf, "outline").attr("value"), Some("ovate"));
    assert!(leaf.character("shape").is_none());
}

#[test]
fn to_pp_connects_range() {
    let fx = Fixture::new();
    let st = extract_one(&fx, |b| {
        let leaves = b.organ("leaves");
        let ovate = b.bare_state("ovate");
        let lanceolate = b.character_state("shape", "lanceolate");
        let pp = b.pp("to", &[lanceolate]);
        b.push(leaves).push(ovate).push(pp);
    });
    let leaf = structure(&st, "leaf");
    let range = leaf.characters().find(|c| c.attr("char_type") == Some("range_value")).unwrap();
    assert_eq!((range.attr("from"), range.attr("to")), (Some("ovate"), Some("lanceolate")));
}

#[test]
fn verb_phrase_relates_structures() {
    let fx = Fixture::new();
    let st = extract_one(&fx, |b| {
        let stems = b.organ("stems");
        let spines = b.organ("spines");
        let vp = b.vp("bearing", &[spines]);
        b.push(stems).push(vp);
    });
    assert_eq!(relation_tuples(&st), vec![("r1", "bearing", "o1", "o2")]);
}

#[test]
fn verb_phrase_without_organ_describes_subject() {
    let fx = Fixture::new();
    let st = extract_one(&fx, |b| {
        let stems = b.organ("stems");
        let glabrous = b.bare_state("glabrous");
        let vp = b.vp("becoming", &[glabrous]);
        b.push(stems).push(vp);
    });
    assert_eq!(character(structure(&st, "stem"), "pubescence").attr("value"), Some("glabrous"));
    assert_eq!(st.elements.len(), 1);
}

// --- Finishing passes ---------------------------------------------------------

#[test]
fn life_style_subject_becomes_whole_organism() {
    let fx = Fixture::new();
    let st = extract_one(&fx, |b| {
        let perennial = b.character_state("duration", "perennial");
        let herbs = b.organ("herbs");
        b.push(perennial).push(herbs);
    });

    assert_eq!(st.structures().count(), 1);
    let organism = structure(&st, "whole_organism");
    assert_eq!(organism.id(), Some("o1"));
    assert_eq!(character(organism, "duration").attr("value"), Some("perennial"));
    assert_eq!(character(organism, "life_style").attr("value"), Some("herb"));
}

#[test]
fn same_structures_may_be_the_same() {
    let fx = Fixture::new();
    let st = extract_one(&fx, |b| {
        for i in 0..3 {
            if i > 0 {
                let comma = b.comma();
                b.push(comma);
            }
            let leaves = b.organ("leaves");
            b.push(leaves);
        }
    });
    assert_eq!(
        relation_tuples(&st),
        vec![
            ("r1", "may_be_the_same", "o1", "o2"),
            ("r2", "may_be_the_same", "o1", "o3"),
            ("r3", "may_be_the_same", "o2", "o3"),
        ]
    );
}

#[test]
fn constrained_structures_are_kept_apart() {
    let fx = Fixture::new();
    let st = extract_one(&fx, |b| {
        let leaves = b.organ("leaves");
        let comma = b.comma();
        let inner = b.constraint("inner");
        let inner_leaves = b.organ("leaves");
        let and = b.and();
        let other = b.organ("leaves");
        b.push(leaves).push(comma).push(inner).push(inner_leaves).push(and).push(other);
    });
    assert_eq!(relation_tuples(&st), vec![("r1", "may_be_the_same", "o1", "o3")]);
}

#[test]
fn merged_ids_are_not_reused() {
    let fx = Fixture::new();
    let st = extract_one(&fx, |b| {
        for (i, organ) in ["herbs", "aquatic", "leaves", "leaves"].into_iter().enumerate() {
            if i > 0 {
                let comma = b.comma();
                b.push(comma);
            }
            let organ = b.organ(organ);
            b.push(organ);
        }
    });

    let ids: Vec<&str> = st.structures().filter_map(Element::id).collect();
    assert_eq!(ids, vec!["o3", "o4", "o1"]);
    let organism = structure(&st, "whole_organism");
    let styles: Vec<&str> = organism.characters().filter_map(|c| c.attr("value")).collect();
    assert_eq!(styles, vec!["herb", "aquatic"]);
    assert_eq!(relation_tuples(&st), vec![("r1", "may_be_the_same", "o3", "o4")]);
}

#[test]
fn passes_can_be_switched_off() {
    let fx = Fixture::new();
    let mut b = ChunkCollector::builder("test");
    for organ in ["herbs", "leaves", "leaves"] {
        let comma = b.comma();
        let organ = b.organ(organ);
        b.push(organ).push(comma);
    }
    let lexicon = Lexicon::default();
    let passes = Passes { whole_organism: false, may_be_same: false };
    let out = DescriptionExtractor::new(fx.knowledge(), &lexicon, NumericParser::shared(), passes).run_with_metrics(&[b.build()]);

    let st = &out.statements[0];
    assert!(st.structure_named("herb").is_some());
    assert!(st.structure_named("whole_organism").is_none());
    assert_eq!(st.relations().count(), 0);
}

// --- Faults -------------------------------------------------------------------

struct ExplodingDictionary;

impl CharacterDictionary for ExplodingDictionary {
    fn character_name_of(&self, state: &str) -> Option<String> {
        panic!("dictionary unavailable for {state}");
    }
}

#[test]
fn panic_stops_only_its_sentence() {
    let fx = Fixture::new();
    let knowledge = Knowledge { characters: &ExplodingDictionary, ..fx.knowledge() };

    let mut first = ChunkCollector::builder("first");
    let leaves = first.organ("leaves");
    let ovate = first.bare_state("ovate");
    first.push(leaves).push(ovate);

    let mut second = ChunkCollector::builder("second");
    let leaves = second.organ("leaves");
    let shape = second.character_state("shape", "ovate");
    second.push(leaves).push(shape);

    let out = run(knowledge, &[first.build(), second.build()]);
    assert_eq!(out.metrics.faults(), 1);
    assert!(out.metrics.statements[0].fault.as_deref().is_some_and(|f| f.contains("dictionary unavailable")));
    assert_eq!(out.metrics.statements[1].fault, None);

    // Partial output survives.
    assert!(out.statements[0].structure_named("leaf").is_some());
    assert_eq!(character(structure(&out.statements[1], "leaf"), "shape").attr("value"), Some("ovate"));
}

#[test]
fn malformed_chunk_is_skipped() {
    let fx = Fixture::new();
    let mut b = ChunkCollector::builder("test");
    let leaves = b.organ("leaves");
    let empty = b.pp("with", &[]);
    let comma = b.comma();
    let shape = b.character_state("shape", "ovate");
    b.push(leaves).push(empty).push(comma).push(shape);

    let out = run(fx.knowledge(), &[b.build()]);
    assert_eq!(out.metrics.faults(), 0);
    let st = &out.statements[0];
    assert_eq!(st.elements.len(), 1);
    assert_eq!(character(structure(st, "leaf"), "shape").attr("value"), Some("ovate"));
}

#[test]
fn statement_serializes_as_tree() {
    let fx = Fixture::new();
    let st = extract_one(&fx, |b| {
        let leaves = b.organ("leaves");
        let shape = b.character_state("shape", "ovate");
        b.push(leaves).push(shape);
    });

    let json = serde_json::to_value(&st).unwrap();
    assert_eq!(json["source"], "test");
    let leaf = &json["elements"][0];
    assert_eq!(leaf["kind"], "structure");
    assert_eq!(leaf["attributes"]["id"], "o1");
    assert_eq!(leaf["children"][0]["attributes"]["value"], "ovate");
    assert!(leaf["children"][0].get("children").is_none());
}
