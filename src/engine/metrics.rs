//! Extraction run metrics.
//!
//! Collected per statement by the extractor and returned only from the
//! verbose API; the plain entry points drop them.
//!
//! ## Design notes
//!
//! - `chunks` counts every dispatch, nested re-dispatches included, so it can
//!   exceed the sentence's top-level chunk count.
//! - A statement with `fault` set still carries whatever was produced before
//!   the fault.

use crate::element::{Element, ElementKind, Statement};
use std::time::Duration;

// --- Metrics -----------------------------------------------------------------

#[derive(Debug, Default, Clone)]
pub struct RunMetrics {
    /// Total elapsed time for the whole description.
    pub total: Duration,
    pub statements: Vec<StatementMetrics>,
}

impl RunMetrics {
    /// Statements that were cut short by an error.
    pub fn faults(&self) -> usize {
        self.statements.iter().filter(|s| s.fault.is_some()).count()
    }
}

/// Counts and timing for one sentence.
#[derive(Debug, Default, Clone)]
pub struct StatementMetrics {
    pub source: String,
    pub elapsed: Duration,
    /// Chunks dispatched, nested ones included.
    pub chunks: usize,
    pub structures: usize,
    pub relations: usize,
    /// Characters under the statement's Structures; a shared one counts once per parent.
    pub characters: usize,
    /// Rendered error when processing stopped early.
    pub fault: Option<String>,
}

impl StatementMetrics {
    pub(crate) fn count(statement: &Statement) -> Self {
        let structures = statement.structures().count();
        let relations = statement.relations().count();
        let characters = statement.structures().map(count_characters).sum();
        Self { source: statement.source.clone(), structures, relations, characters, ..Self::default() }
    }
}

fn count_characters(element: &Element) -> usize {
    element
        .children
        .iter()
        .map(|child| usize::from(child.kind == ElementKind::Character) + count_characters(child))
        .sum()
}

/// Extractor output bundled with timing information.
#[derive(Debug, Clone)]
pub struct RunResult {
    pub statements: Vec<Statement>,
    /// Timing measurements for the run.
    pub metrics: RunMetrics,
}
