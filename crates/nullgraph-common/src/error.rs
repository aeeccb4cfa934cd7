//! Fatal error kinds for the inference engine.
//!
//! Per the error-handling design: invariant violations and cancellation are
//! the only two outcomes that abort `analyze` outright. Everything else
//! (diagnostic edges, semantic-model failures) is collected and surfaced in
//! the result instead — see [`crate::diagnostics::Diagnostic`].

use std::fmt;

/// Fatal outcomes of `analyze`. An `Err` here means no partial output: the
/// caller must discard the engine and retry on a fresh instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    /// The label propagator found `n.null_type != n.replaced_with.null_type`,
    /// or an `Oblivious` node was reached by inference. Both indicate a
    /// builder bug, not a problem with the input program.
    InvariantViolation { node: String, detail: String },
    /// The caller's cancellation token fired at one of the checkpoints in
    /// §5: before a translation unit in C2/C3, or between the two phases
    /// of C5.
    Cancelled,
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisError::InvariantViolation { node, detail } => {
                write!(f, "nullability invariant violated at {node}: {detail}")
            }
            AnalysisError::Cancelled => write!(f, "analysis cancelled"),
        }
    }
}

impl std::error::Error for AnalysisError {}
