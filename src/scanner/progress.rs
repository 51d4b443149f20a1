//! Cancellation and progress reporting for long scans.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cooperative cancellation flag shared between the caller and the scan.
///
/// Checked before each file is started; a file already being processed
/// always completes.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressEvent {
    pub files_examined: usize,
    pub files_total: usize,
    pub documents_found: usize,
}

/// Receives progress events from the scan coordinator. Advisory only.
pub trait ProgressSink: Send + Sync {
    fn on_progress(&self, event: ProgressEvent);

    fn on_finish(&self) {}
}

impl<F> ProgressSink for F
where
    F: Fn(ProgressEvent) + Send + Sync,
{
    fn on_progress(&self, event: ProgressEvent) {
        self(event)
    }
}
