//! Evaluation context configuration

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Collector settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GcConfig {
    /// Time between background sweeps
    pub interval: Duration,

    /// Most objects freed per pass (`None` for no limit)
    pub sweep_limit: Option<usize>,

    /// Whether to run the sweeper thread. Without it objects are only
    /// reclaimed by explicit `collect` calls.
    pub background: bool,
}

impl Default for GcConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            sweep_limit: None,
            background: true,
        }
    }
}

impl GcConfig {
    /// Set the sweep interval.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Set the per-pass limit.
    pub fn with_sweep_limit(mut self, limit: Option<usize>) -> Self {
        self.sweep_limit = limit;
        self
    }

    /// Enable or disable the sweeper thread.
    pub fn with_background(mut self, background: bool) -> Self {
        self.background = background;
        self
    }
}

/// Configuration and state for evaluation.
///
/// This is passed to the evaluator at construction and controls
/// behavior like recursion limits, interruption and collection.
#[derive(Debug, Clone)]
pub struct EvalContext {
    /// Maximum call depth (stack overflow protection)
    pub max_call_depth: usize,

    /// Interrupt flag - set to true to abort evaluation
    pub interrupt: Arc<AtomicBool>,

    /// Whether to trace evaluation (logged at `trace` level)
    pub trace: bool,

    /// Collector settings
    pub gc: GcConfig,
}

impl Default for EvalContext {
    fn default() -> Self {
        Self {
            max_call_depth: 1000,
            interrupt: Arc::new(AtomicBool::new(false)),
            trace: false,
            gc: GcConfig::default(),
        }
    }
}

impl EvalContext {
    /// Create a new context with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context with a custom call depth limit.
    pub fn with_max_call_depth(max_depth: usize) -> Self {
        Self {
            max_call_depth: max_depth,
            ..Default::default()
        }
    }

    /// Replace the collector settings.
    pub fn with_gc(mut self, gc: GcConfig) -> Self {
        self.gc = gc;
        self
    }

    /// Turn node tracing on or off.
    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    /// Check if evaluation has been interrupted.
    pub fn is_interrupted(&self) -> bool {
        self.interrupt.load(Ordering::Relaxed)
    }

    /// Request interruption of evaluation.
    pub fn interrupt(&self) {
        self.interrupt.store(true, Ordering::Relaxed);
    }

    /// Reset the interrupt flag.
    pub fn reset_interrupt(&self) {
        self.interrupt.store(false, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let ctx = EvalContext::new();
        assert_eq!(ctx.max_call_depth, 1000);
        assert!(!ctx.trace);
        assert_eq!(ctx.gc.interval, Duration::from_secs(1));
        assert_eq!(ctx.gc.sweep_limit, None);
        assert!(ctx.gc.background);
    }

    #[test]
    fn test_interrupt_is_shared_between_clones() {
        let ctx = EvalContext::new();
        let handle = ctx.clone();
        handle.interrupt();
        assert!(ctx.is_interrupted());
        ctx.reset_interrupt();
        assert!(!handle.is_interrupted());
    }
}
