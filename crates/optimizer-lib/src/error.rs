//! Engine error taxonomy
//!
//! Collection failures are recovered locally inside report modules and
//! never surface here; these variants cover the failures that must abort
//! loudly: programming defects (schema mismatch) and bad configuration
//! caught before any collection starts.

use thiserror::Error;

/// Errors surfaced by the engine to its caller
#[derive(Debug, Error)]
pub enum EngineError {
    /// A module produced a table that does not match its declared columns.
    /// This is a programming defect and is never silently coerced.
    #[error("report `{report}` produced columns {actual:?}, declared {expected:?}")]
    SchemaMismatch {
        report: String,
        expected: Vec<String>,
        actual: Vec<String>,
    },

    /// A module produced a row whose width differs from its column count
    #[error("report `{report}` produced a row of width {actual}, expected {expected}")]
    RowShapeMismatch {
        report: String,
        expected: usize,
        actual: usize,
    },

    /// A tunable parameter failed validation before collection began
    #[error("invalid value `{value}` for parameter `{name}` (allowed: {allowed:?})")]
    Configuration {
        name: String,
        value: String,
        allowed: Vec<String>,
    },

    /// A report task was cancelled or panicked before returning a table
    #[error("report `{report}` did not complete: {reason}")]
    TaskFailed { report: String, reason: String },
}

/// Failures from external provider collaborators.
///
/// All of these are recoverable per resource or per module: the affected
/// module logs and degrades to its placeholder row.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("endpoint unreachable: {0}")]
    Unreachable(String),

    #[error("request throttled: {0}")]
    Throttled(String),

    #[error("access denied: {0}")]
    AccessDenied(String),

    #[error("request timed out after {0} ms")]
    Timeout(u64),

    #[error("malformed provider response: {0}")]
    Malformed(String),
}
