use itertools::Itertools;
use thiserror::Error;

use crate::schema::Violation;

/// Exit code for validation failures and general errors.
pub const EXIT_FAILURE: i32 = 1;
/// Exit code for a quality gate rejection, distinct from validation failure.
pub const EXIT_GATE_FAILURE: i32 = 2;

/// The failure modes the pipeline reports as structured outcomes rather than
/// plain error strings. Everything else (I/O, decoding, malformed files)
/// travels as `anyhow::Error` with context and exits with the general code.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A column the pipeline contract requires is absent from the table.
    #[error("required column '{0}' is missing from the table")]
    MissingColumn(String),
    /// The table violated the declared schema; every violation found across
    /// the whole table is listed, not just the first.
    #[error("schema validation failed with {} violation(s):\n{}", .0.len(), format_items(.0))]
    SchemaViolations(Vec<Violation>),
    /// Quality metrics exceeded the caller-supplied thresholds. A policy
    /// outcome, not a data error.
    #[error("quality gate failed:\n{}", format_items(.0))]
    GateFailure(Vec<String>),
}

impl PipelineError {
    pub fn exit_code(&self) -> i32 {
        match self {
            PipelineError::GateFailure(_) => EXIT_GATE_FAILURE,
            PipelineError::MissingColumn(_) | PipelineError::SchemaViolations(_) => EXIT_FAILURE,
        }
    }
}

fn format_items<T: std::fmt::Display>(items: &[T]) -> String {
    items.iter().map(|item| format!("  - {item}")).join("\n")
}
