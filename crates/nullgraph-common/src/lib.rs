//! Common types and utilities for the nullgraph inference engine.
//!
//! This crate provides foundational types used across all nullgraph crates:
//! - Source spans and locations (`Span`, `Location`)
//! - Diagnostics (`Diagnostic`, `DiagnosticCategory`)
//! - Analysis options (`AnalysisOptions`)
//! - Error types (`AnalysisError`)
//! - Centralized limits
//! - Cooperative cancellation (`CancellationToken`)

pub mod cancellation;
pub mod diagnostics;
pub mod error;
pub mod limits;
pub mod options;
pub mod span;

pub use cancellation::CancellationToken;
pub use diagnostics::{Diagnostic, DiagnosticCategory};
pub use error::AnalysisError;
pub use options::AnalysisOptions;
pub use span::{Location, Span};
