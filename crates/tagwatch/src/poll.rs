//! Polling engine and periodic poller.

#![allow(missing_docs)]

use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::Sender;
use tracing::debug;

use crate::registry::TagRegistry;
use crate::source::SharedSource;
use crate::tag::Quality;

/// Best-effort value sweep over all tags in automatic mode.
pub struct PollingEngine {
    registry: Arc<TagRegistry>,
    source: SharedSource,
    stats: Mutex<PollStats>,
}

impl PollingEngine {
    #[must_use]
    pub fn new(registry: Arc<TagRegistry>, source: SharedSource) -> Self {
        Self {
            registry,
            source,
            stats: Mutex::new(PollStats::default()),
        }
    }

    /// Registry this engine feeds.
    #[must_use]
    pub fn registry(&self) -> Arc<TagRegistry> {
        Arc::clone(&self.registry)
    }

    /// Refresh every tag currently in automatic mode, once.
    ///
    /// Iterates over a snapshot, so no registry lock is held across the
    /// adapter calls. Failures are per-tag: the failing tag drops to `Bad`
    /// quality with value and history untouched, and the sweep continues.
    /// Overridden tags are never read. No internal retries; the caller
    /// owns the cadence.
    pub fn refresh(&self) {
        let started = Instant::now();
        let mut failures = 0u64;
        for tag in self.registry.list_all() {
            if tag.written {
                continue;
            }
            let result = {
                let mut source = self.source.lock().expect("source lock poisoned");
                source.read_value(&tag.node_id)
            };
            match result {
                Ok(value) => self.registry.update(&tag.name, value, false),
                Err(err) => {
                    debug!("read of '{}' ({}) failed: {err}", tag.name, tag.node_id);
                    self.registry.set_quality(&tag.name, Quality::Bad);
                    failures += 1;
                }
            }
        }
        let mut stats = self.stats.lock().expect("poll stats lock poisoned");
        stats.record(started.elapsed(), failures);
    }

    /// Copy of the accumulated sweep statistics.
    #[must_use]
    pub fn stats(&self) -> PollStats {
        *self.stats.lock().expect("poll stats lock poisoned")
    }
}

/// Sweep timing and failure statistics.
#[derive(Debug, Clone, Copy)]
pub struct PollStats {
    pub min_ms: f64,
    pub max_ms: f64,
    pub avg_ms: f64,
    pub last_ms: f64,
    pub read_failures: u64,
    samples: u64,
}

impl PollStats {
    pub fn record(&mut self, duration: Duration, failures: u64) {
        let ms = duration.as_secs_f64() * 1000.0;
        self.last_ms = ms;
        if self.samples == 0 {
            self.min_ms = ms;
            self.max_ms = ms;
            self.avg_ms = ms;
        } else {
            if ms < self.min_ms {
                self.min_ms = ms;
            }
            if ms > self.max_ms {
                self.max_ms = ms;
            }
            let total = self.avg_ms * self.samples as f64 + ms;
            self.avg_ms = total / (self.samples as f64 + 1.0);
        }
        self.samples = self.samples.saturating_add(1);
        self.read_failures = self.read_failures.saturating_add(failures);
    }

    /// Number of completed sweeps.
    #[must_use]
    pub fn sweeps(&self) -> u64 {
        self.samples
    }
}

impl Default for PollStats {
    fn default() -> Self {
        Self {
            min_ms: 0.0,
            max_ms: 0.0,
            avg_ms: 0.0,
            last_ms: 0.0,
            read_failures: 0,
            samples: 0,
        }
    }
}

#[derive(Debug, Default)]
struct GateState {
    stopped: bool,
    paused: bool,
}

/// Condvar-backed gate so the poll loop sleeps without busy-waiting and
/// stop requests take effect mid-interval.
#[derive(Debug, Default)]
struct PollGate {
    state: Mutex<GateState>,
    wake: Condvar,
}

impl PollGate {
    /// Wait out one interval; returns `false` once stop was requested.
    fn sleep(&self, interval: Duration) -> bool {
        let deadline = Instant::now() + interval;
        let mut state = self.state.lock().expect("poll gate lock poisoned");
        while !state.stopped {
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            let (guard, _) = self
                .wake
                .wait_timeout(state, deadline - now)
                .expect("poll gate wait poisoned");
            state = guard;
        }
        false
    }

    fn stop(&self) {
        self.state.lock().expect("poll gate lock poisoned").stopped = true;
        self.wake.notify_all();
    }

    fn set_paused(&self, paused: bool) {
        self.state.lock().expect("poll gate lock poisoned").paused = paused;
    }

    fn is_paused(&self) -> bool {
        self.state.lock().expect("poll gate lock poisoned").paused
    }
}

/// Handle to the scheduler-owned periodic polling task.
///
/// The task calls [`PollingEngine::refresh`] at a fixed interval and sends
/// a unit on the change channel only when a sweep actually changed registry
/// state, so renderers are decoupled from the poll cadence.
pub struct Poller {
    gate: Arc<PollGate>,
    handle: Option<thread::JoinHandle<()>>,
}

impl Poller {
    /// Spawn the periodic task.
    ///
    /// The task exits when [`Self::stop`] is called (or the handle is
    /// dropped) or when the change receiver goes away.
    #[must_use]
    pub fn spawn(engine: Arc<PollingEngine>, interval: Duration, changes: Sender<()>) -> Self {
        let gate = Arc::new(PollGate::default());
        let task_gate = Arc::clone(&gate);
        let handle = thread::spawn(move || {
            let registry = engine.registry();
            let mut last = registry.fingerprint();
            loop {
                if !task_gate.sleep(interval) {
                    break;
                }
                if task_gate.is_paused() {
                    continue;
                }
                engine.refresh();
                let current = registry.fingerprint();
                if current != last {
                    last = current;
                    if changes.send(()).is_err() {
                        break;
                    }
                }
            }
        });
        Self {
            gate,
            handle: Some(handle),
        }
    }

    /// Suspend sweeping; the task keeps ticking but reads nothing.
    pub fn pause(&self) {
        self.gate.set_paused(true);
    }

    /// Resume sweeping after [`Self::pause`].
    pub fn resume(&self) {
        self.gate.set_paused(false);
    }

    /// Whether sweeping is currently suspended.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.gate.is_paused()
    }

    /// Request stop and join the task. Dropping the handle does the same.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.gate.stop();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.shutdown();
    }
}
