//! Progress reporting callbacks for migration runs.
//!
//! The engine reports through a [`ProgressSink`]; sinks are best-effort and
//! must not block the run. [`FanoutProgress`] mirrors the usual setup where
//! both the operator's console and the server log want the same stream.

use std::sync::Arc;

use tracing::info;

/// Best-effort sink for migration progress.
pub trait ProgressSink: Send + Sync {
    /// Free-form status message.
    fn on_message(&self, text: &str);

    /// Running count of migrated holders in the current phase.
    fn on_progress(&self, count: u64);
}

/// Sink that logs through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingProgress;

impl ProgressSink for TracingProgress {
    fn on_message(&self, text: &str) {
        info!("{text}");
    }

    fn on_progress(&self, count: u64) {
        info!(count, "migration progress");
    }
}

/// Fans every callback out to a list of listeners.
#[derive(Default)]
pub struct FanoutProgress {
    listeners: Vec<Arc<dyn ProgressSink>>,
}

impl FanoutProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a listener, builder-style.
    pub fn with_listener(mut self, listener: Arc<dyn ProgressSink>) -> Self {
        self.listeners.push(listener);
        self
    }
}

impl ProgressSink for FanoutProgress {
    fn on_message(&self, text: &str) {
        for listener in &self.listeners {
            listener.on_message(text);
        }
    }

    fn on_progress(&self, count: u64) {
        for listener in &self.listeners {
            listener.on_progress(count);
        }
    }
}
