//! Analysis options for the inference engine.
//!
//! Threaded explicitly through the driver rather than read from global
//! state, in the same flag-struct-with-defaults shape a host checker would
//! use for its own compiler options.

/// Options controlling the inference pipeline's calibration choices.
///
/// These are tuning knobs for the tie-break and safety-valve behaviour
/// described in §4.5 and §9; they never change the meaning of an edge rule.
#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    /// Bias unresolved parameter nodes toward `Nullable` during the C5
    /// parameter tie-break (§4.5 step 4). `true` matches how most libraries
    /// are written: permissive parameters, non-null-by-default returns.
    /// Disabling it folds parameter nodes into the final sweep's `NonNull`
    /// default instead.
    pub parameter_bias_nullable: bool,

    /// Safety valve on the number of augmenting paths the max-flow solver
    /// will search before giving up and treating the current flow as
    /// maximal. `None` means no limit (the graphs this engine deals with
    /// are small relative to the parsing cost that produced them).
    pub max_augmenting_paths: Option<usize>,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        AnalysisOptions {
            parameter_bias_nullable: true,
            max_augmenting_paths: None,
        }
    }
}
