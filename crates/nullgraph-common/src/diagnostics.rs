//! Diagnostics surfaced by the inference engine.
//!
//! Unlike a type checker's diagnostics, these are never fatal: a
//! [`Diagnostic`] here corresponds to a "diagnostic edge" (see
//! `NullabilityEdge::is_error`) whose nonzero residual flow after max-flow
//! indicates a place the solver could not reconcile with the user's
//! asserted non-null context. See `nullgraph-common::error` for the
//! separate, fatal `AnalysisError` kind.

use crate::span::Location;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DiagnosticCategory {
    Warning,
    Suggestion,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DiagnosticMessage {
    pub code: u32,
    pub category: DiagnosticCategory,
    pub message: &'static str,
}

/// Messages for the small, fixed set of situations the engine itself
/// surfaces. Analogous in shape to a checker's diagnostic message table,
/// but with exactly the handful of codes this domain needs.
pub mod messages {
    use super::{DiagnosticCategory, DiagnosticMessage};

    pub const POSSIBLE_NULL_DEREFERENCE: DiagnosticMessage = DiagnosticMessage {
        code: 9001,
        category: DiagnosticCategory::Warning,
        message: "'{0}' is possibly 'null' or 'undefined' at this non-null context.",
    };

    pub const NULLABLE_ARGUMENT_FOR_NON_NULL_PARAMETER: DiagnosticMessage = DiagnosticMessage {
        code: 9002,
        category: DiagnosticCategory::Warning,
        message: "Argument '{0}' is nullable but parameter '{1}' was inferred non-null.",
    };

    pub const OVERRIDE_FORCED_NULLABLE: DiagnosticMessage = DiagnosticMessage {
        code: 9003,
        category: DiagnosticCategory::Suggestion,
        message: "'{0}' was inferred non-null but is forced nullable by its override of '{1}'.",
    };
}

/// A diagnostic emitted by the engine: a warning or suggestion attached to
/// one syntactic position. `code`/`message` come from a [`DiagnosticMessage`]
/// in [`messages`]; `location` is `None` only for synthetic positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub category: DiagnosticCategory,
    pub code: u32,
    pub location: Option<Location>,
    pub message_text: String,
}

impl Diagnostic {
    pub fn new(
        template: DiagnosticMessage,
        location: Option<Location>,
        args: &[&str],
    ) -> Self {
        Diagnostic {
            category: template.category,
            code: template.code,
            location,
            message_text: format_message(template.message, args),
        }
    }
}

fn format_message(message: &str, args: &[&str]) -> String {
    let mut result = message.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{i}}}"), arg);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_positional_args() {
        let d = Diagnostic::new(messages::POSSIBLE_NULL_DEREFERENCE, None, &["s.Length"]);
        assert_eq!(
            d.message_text,
            "'s.Length' is possibly 'null' or 'undefined' at this non-null context."
        );
        assert_eq!(d.code, 9001);
        assert_eq!(d.category, DiagnosticCategory::Warning);
    }
}
