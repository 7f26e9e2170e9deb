use crate::chunk::ChunkCollector;
use crate::element::Statement;
use crate::engine::{self, DescriptionExtractor, Passes, StatementMetrics};
use crate::knowledge::Knowledge;
use crate::lexicon::Lexicon;
use crate::numeric::NumericParser;
use serde::Serialize;
use std::time::Duration;
use tracing::warn;

/// Options that affect extraction.
#[derive(Debug, Clone)]
pub struct Options {
    /// Word sets, unit names and the number pattern.
    pub lexicon: Lexicon,
    /// Relate same-named Structures with `may_be_the_same`.
    pub may_be_same: bool,
    /// Fold life-style Structures into one `whole_organism`.
    pub whole_organism: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self { lexicon: Lexicon::default(), may_be_same: true, whole_organism: true }
    }
}

/// Result from [`extract`] and [`extract_with`].
#[derive(Debug, Clone, Serialize)]
pub struct Description {
    /// One statement per input sentence, in input order.
    pub statements: Vec<Statement>,
    /// Total elapsed time spent extracting.
    #[serde(skip)]
    pub elapsed: Duration,
}

/// Additional details returned by [`extract_verbose_with`].
#[derive(Debug, Clone)]
pub struct ExtractionDetails {
    pub total: Duration,
    pub statements: Vec<StatementMetrics>,
    /// Sentences whose processing stopped early.
    pub faults: usize,
}

/// Result from [`extract_verbose_with`].
#[derive(Debug, Clone)]
pub struct DescriptionVerbose {
    pub statements: Vec<Statement>,
    pub elapsed: Duration,
    pub details: ExtractionDetails,
}

/// Extract every sentence of a description with default [`Options`].
///
/// # Example
/// ```
/// use taxomark::{ChunkCollector, Knowledge, MemoryGlossary, SimpleInflector, SuffixAdverbs, extract};
///
/// let glossary: MemoryGlossary = [("ovate", "shape")].into_iter().collect();
/// let corpus: Vec<String> = Vec::new();
/// let adverbs = SuffixAdverbs::default();
/// let knowledge = Knowledge::new(&glossary, &glossary, &SimpleInflector, &adverbs, &corpus);
///
/// let mut b = ChunkCollector::builder("treatment-1");
/// let leaves = b.organ("leaves");
/// let shape = b.bare_state("ovate");
/// b.push(leaves).push(shape);
///
/// let out = extract(&[b.build()], knowledge);
/// let leaf = out.statements[0].structure_named("leaf").unwrap();
/// assert_eq!(leaf.character("shape").and_then(|c| c.attr("value")), Some("ovate"));
/// ```
pub fn extract(collectors: &[ChunkCollector], knowledge: Knowledge<'_>) -> Description {
    extract_with(collectors, knowledge, &Options::default())
}

/// Extract every sentence of a description with the provided `options`.
pub fn extract_with(collectors: &[ChunkCollector], knowledge: Knowledge<'_>, options: &Options) -> Description {
    let run = run(collectors, knowledge, options);
    Description { statements: run.statements, elapsed: run.metrics.total }
}

/// Extract with `options` and return per-statement counts and timings.
///
/// The default [`extract_with`] path drops these.
pub fn extract_verbose_with(collectors: &[ChunkCollector], knowledge: Knowledge<'_>, options: &Options) -> DescriptionVerbose {
    let run = run(collectors, knowledge, options);
    let faults = run.metrics.faults();
    let details = ExtractionDetails { total: run.metrics.total, statements: run.metrics.statements, faults };
    DescriptionVerbose { statements: run.statements, elapsed: details.total, details }
}

fn run(collectors: &[ChunkCollector], knowledge: Knowledge<'_>, options: &Options) -> engine::RunResult {
    let built;
    let numeric: &NumericParser = match options.lexicon.numeric_parser() {
        Ok(parser) => {
            built = parser;
            &built
        }
        Err(err) => {
            warn!(error = %err, "unit list rejected, falling back to default units");
            NumericParser::shared()
        }
    };
    let passes = Passes { whole_organism: options.whole_organism, may_be_same: options.may_be_same };
    DescriptionExtractor::new(knowledge, &options.lexicon, numeric, passes).run_with_metrics(collectors)
}
