use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative abort flag for long Monte-Carlo runs.
///
/// Clones share the same flag, so a host can keep one handle and pass
/// another into an optimizer or VaR configuration. Workers poll it between
/// chunks of trials.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}
