//! Shared knowledge fixture for unit tests.

use crate::knowledge::{Knowledge, MemoryGlossary, SimpleInflector, SuffixAdverbs};

pub(crate) struct Fixture {
    pub glossary: MemoryGlossary,
    pub inflector: SimpleInflector,
    pub adverbs: SuffixAdverbs,
    pub corpus: Vec<String>,
}

impl Fixture {
    pub fn new() -> Self {
        let glossary: MemoryGlossary = [
            ("ovate", "shape"),
            ("lanceolate", "shape"),
            ("elliptic", "shape"),
            ("linear", "shape"),
            ("red", "coloration"),
            ("green", "coloration"),
            ("white", "coloration"),
            ("purple", "coloration"),
            ("yellow", "coloration"),
            ("glabrous", "pubescence"),
            ("hairy", "pubescence"),
            ("high", "prominence"),
            ("relief", "character"),
            ("outline", "character"),
            ("herb", "life_style"),
            ("herbs", "life_style"),
            ("aquatic", "life_style"),
            ("perennial", "duration"),
            ("erect", "growth_form"),
            ("leaf", "structure"),
            ("petal", "structure"),
            ("stem", "structure"),
            ("hair", "structure"),
        ]
        .into_iter()
        .collect();
        Self { glossary, inflector: SimpleInflector, adverbs: SuffixAdverbs::default(), corpus: Vec::new() }
    }

    pub fn with_corpus(sentences: &[&str]) -> Self {
        Self { corpus: sentences.iter().map(|s| s.to_string()).collect(), ..Self::new() }
    }

    pub fn knowledge(&self) -> Knowledge<'_> {
        Knowledge::new(&self.glossary, &self.glossary, &self.inflector, &self.adverbs, &self.corpus)
    }
}
