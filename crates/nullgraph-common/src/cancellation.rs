//! Cooperative cancellation for `analyze`.
//!
//! A [`CancellationToken`] is checked, never awaited: the driver (and the
//! max-flow solver's inner loop) poll it at the checkpoints §5 names and
//! bail out with `AnalysisError::Cancelled` rather than reacting to a
//! callback or signal.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared, cloneable cancellation flag. Cloning shares the same underlying
/// flag — cancelling one handle cancels every clone.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        CancellationToken(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_flag() {
        let token = CancellationToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }
}
