//! Concurrent garbage collector
//!
//! The collector owns an object table shared with the evaluator through
//! [`Heap`] handles. A background thread sweeps it on a fixed interval,
//! freeing objects no scope binds and nothing else holds.
//!
//! # Example
//!
//! ```
//! use metro::{Collector, GcConfig, Value};
//!
//! let collector = Collector::start(&GcConfig::default().with_background(false));
//! let heap = collector.heap();
//!
//! let kept = heap.alloc(Value::Int(1));
//! heap.alloc(Value::Int(2)); // dropped immediately
//!
//! let stats = collector.collect();
//! assert_eq!(stats.freed, 1);
//! assert!(heap.contains(&kept));
//! ```

mod table;

pub use table::{Heap, SweepStats};

use std::thread::{self, JoinHandle};

use crossbeam::channel::{self, RecvTimeoutError, Sender};

use crate::context::GcConfig;

enum Command {
    Sweep,
    Stop,
}

/// Owner of the object table and its sweeper thread.
///
/// Dropping the collector stops the thread and unregisters every object.
pub struct Collector {
    heap: Heap,
    commands: Option<Sender<Command>>,
    worker: Option<JoinHandle<()>>,
}

impl Collector {
    /// Create the table and, unless disabled, spawn the sweeper thread.
    pub fn start(config: &GcConfig) -> Self {
        let heap = Heap::new(config.sweep_limit);

        if !config.background {
            tracing::debug!("collector started without background thread");
            return Self {
                heap,
                commands: None,
                worker: None,
            };
        }

        let (tx, rx) = channel::unbounded();
        let interval = config.interval;
        let sweeper = heap.clone();

        let spawned = thread::Builder::new()
            .name("metro-gc".to_string())
            .spawn(move || {
                loop {
                    match rx.recv_timeout(interval) {
                        Ok(Command::Sweep) | Err(RecvTimeoutError::Timeout) => {
                            let stats = sweeper.sweep();
                            if stats.freed > 0 {
                                tracing::debug!(
                                    scanned = stats.scanned,
                                    freed = stats.freed,
                                    "background sweep"
                                );
                            } else {
                                tracing::trace!(scanned = stats.scanned, "background sweep");
                            }
                        }
                        Ok(Command::Stop) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
            });

        match spawned {
            Ok(worker) => {
                tracing::debug!(interval_ms = interval.as_millis() as u64, "collector started");
                Self {
                    heap,
                    commands: Some(tx),
                    worker: Some(worker),
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not spawn collector thread, sweeping on demand only");
                Self {
                    heap,
                    commands: None,
                    worker: None,
                }
            }
        }
    }

    /// Allocation handle onto this collector's table.
    pub fn heap(&self) -> Heap {
        self.heap.clone()
    }

    /// Whether a sweeper thread is running.
    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    /// Suspend sweeping. Pauses nest; each needs a matching [`resume`](Self::resume).
    pub fn pause(&self) {
        self.heap.pause();
    }

    /// Undo one [`pause`](Self::pause).
    pub fn resume(&self) {
        self.heap.resume();
    }

    /// Whether sweeping is suspended.
    pub fn is_paused(&self) -> bool {
        self.heap.is_paused()
    }

    /// Pause until the returned guard is dropped.
    pub fn pause_guard(&self) -> PauseGuard {
        PauseGuard::new(self.heap.clone())
    }

    /// Run one sweep pass on the calling thread.
    pub fn collect(&self) -> SweepStats {
        let stats = self.heap.sweep();
        tracing::debug!(scanned = stats.scanned, freed = stats.freed, "forced sweep");
        stats
    }

    /// Ask the sweeper thread for a pass without waiting for the interval.
    pub fn request_sweep(&self) {
        if let Some(tx) = &self.commands {
            let _ = tx.send(Command::Sweep);
        }
    }

    /// Stop the sweeper thread, wait for it, then unregister every object.
    /// Calling it again does nothing more.
    pub fn stop(&mut self) {
        if let Some(tx) = self.commands.take() {
            let _ = tx.send(Command::Stop);
        }

        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::warn!("collector thread panicked");
            }
        }

        let released = self.heap.clear();
        if released > 0 {
            tracing::debug!(released, "collector stopped");
        }
    }
}

impl Drop for Collector {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Keeps the collector paused while alive.
pub struct PauseGuard {
    heap: Heap,
}

impl PauseGuard {
    fn new(heap: Heap) -> Self {
        heap.pause();
        Self { heap }
    }
}

impl Drop for PauseGuard {
    fn drop(&mut self) {
        self.heap.resume();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;
    use std::time::{Duration, Instant};

    fn manual() -> Collector {
        Collector::start(&GcConfig::default().with_background(false))
    }

    #[test]
    fn test_pause_guard_nests() {
        let gc = manual();
        {
            let _outer = gc.pause_guard();
            {
                let _inner = gc.pause_guard();
                assert!(gc.is_paused());
            }
            assert!(gc.is_paused());
        }
        assert!(!gc.is_paused());
    }

    #[test]
    fn test_collect_respects_pause() {
        let gc = manual();
        gc.heap().alloc(Value::Int(1));
        let guard = gc.pause_guard();
        assert_eq!(gc.collect().freed, 0);
        drop(guard);
        assert_eq!(gc.collect().freed, 1);
    }

    #[test]
    fn test_stop_is_idempotent_and_clears() {
        let mut gc = Collector::start(&GcConfig::default());
        let heap = gc.heap();
        let kept = heap.alloc(Value::Int(1));
        assert!(gc.is_running());

        gc.stop();
        gc.stop();
        assert!(!gc.is_running());
        assert_eq!(heap.live_objects(), 0);
        assert_eq!(kept, Value::Int(1));
    }

    #[test]
    fn test_stop_does_not_wait_for_interval() {
        let mut gc = Collector::start(&GcConfig::default().with_interval(Duration::from_secs(60)));
        let started = Instant::now();
        gc.stop();
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn test_background_thread_sweeps() {
        let gc = Collector::start(
            &GcConfig::default().with_interval(Duration::from_millis(5)),
        );
        let heap = gc.heap();
        heap.alloc(Value::Int(1));

        let deadline = Instant::now() + Duration::from_secs(5);
        while heap.live_objects() > 0 && Instant::now() < deadline {
            gc.request_sweep();
            thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(heap.live_objects(), 0);
    }
}
