//! Description-level driver: one isolated context per sentence.

use super::context::ProcessingContext;
use super::dispatch;
use super::finishing;
use super::metrics::{RunMetrics, RunResult, StatementMetrics};
use crate::chunk::{ChunkCollector, ChunkType};
use crate::element::Statement;
use crate::error::ExtractError;
use crate::knowledge::Knowledge;
use crate::lexicon::Lexicon;
use crate::numeric::NumericParser;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;
use tracing::{debug, error};

/// Finishing passes that can be switched off.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Passes {
    pub whole_organism: bool,
    pub may_be_same: bool,
}

pub(crate) struct DescriptionExtractor<'a> {
    knowledge: Knowledge<'a>,
    lexicon: &'a Lexicon,
    numeric: &'a NumericParser,
    passes: Passes,
}

impl<'a> DescriptionExtractor<'a> {
    pub fn new(knowledge: Knowledge<'a>, lexicon: &'a Lexicon, numeric: &'a NumericParser, passes: Passes) -> Self {
        Self { knowledge, lexicon, numeric, passes }
    }

    /// One statement per collector, in input order, with timings.
    pub fn run_with_metrics(&self, collectors: &[ChunkCollector]) -> RunResult {
        let start = Instant::now();
        let (statements, per_statement): (Vec<Statement>, Vec<StatementMetrics>) =
            collectors.iter().map(|collector| self.extract_sentence(collector)).unzip();
        let metrics = RunMetrics { total: start.elapsed(), statements: per_statement };
        RunResult { statements, metrics }
    }

    fn extract_sentence(&self, collector: &ChunkCollector) -> (Statement, StatementMetrics) {
        let start = Instant::now();
        let mut cx = ProcessingContext::new(collector.clone(), self.knowledge, self.lexicon, self.numeric);

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.run(&mut cx)));
        let fault = match outcome {
            Ok(Ok(())) => None,
            Ok(Err(err)) => Some(err),
            Err(payload) => Some(ExtractError::Fault(panic_message(payload.as_ref()))),
        };
        if let Some(err) = &fault {
            error!(sentence = collector.sentence(), source = collector.source(), error = %err, "problem extracting elements from sentence");
        }

        let chunks = cx.dispatched;
        let statement = cx.into_statement();
        let metrics = StatementMetrics {
            elapsed: start.elapsed(),
            chunks,
            fault: fault.map(|err| err.to_string()),
            ..StatementMetrics::count(&statement)
        };
        debug!(source = %statement.source, structures = metrics.structures, relations = metrics.relations, "statement extracted");
        (statement, metrics)
    }

    fn run(&self, cx: &mut ProcessingContext<'_>) -> Result<(), ExtractError> {
        while let Some(chunk) = cx.cursor.advance() {
            let kind = cx.collector.node(chunk).ok_or(ExtractError::UnknownChunk(chunk.index()))?.kind();
            let produced = dispatch::process(cx, chunk)?;
            cx.add_to_result(&produced);
            cx.state.set_unassigned_chunk(kind == ChunkType::Unassigned);
        }

        finishing::adopt_orphans(cx);
        if self.passes.whole_organism {
            finishing::merge_whole_organism(cx);
        }
        if self.passes.may_be_same {
            finishing::infer_may_be_same(cx);
        }
        Ok(())
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic with a non-string payload".to_string()
    }
}
