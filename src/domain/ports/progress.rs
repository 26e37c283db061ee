//! Progress side channel for dispatches.

/// Receives `(label, completed, total)` after each completed oracle call.
///
/// Called from worker tasks: notifications for one dispatch may arrive out
/// of order.
pub trait ProgressSink: Send + Sync {
    fn on_progress(&self, label: &str, completed: usize, total: usize);
}

/// Discards progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgress;

impl ProgressSink for NoopProgress {
    fn on_progress(&self, _label: &str, _completed: usize, _total: usize) {}
}

/// Emits progress as debug events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingProgress;

impl ProgressSink for TracingProgress {
    fn on_progress(&self, label: &str, completed: usize, total: usize) {
        tracing::debug!(label, completed, total, "Dispatch progress");
    }
}
