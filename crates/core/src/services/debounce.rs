use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Timer-gated coalescing of a repeated action.
///
/// Every `call` starts a fresh timer and supersedes all earlier timers that
/// have not fired yet; only the most recent call's job runs, once `window`
/// has passed without another call. A job that already started is never
/// cancelled by a later call.
///
/// Timers use `tokio::time`, so tests can drive them with a paused clock.
/// Jobs are spawned on the runtime that was current when the debouncer was
/// created, so `call` also works from threads outside that runtime.
#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    generation: Arc<AtomicU64>,
    runtime: Option<Handle>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self::with_runtime(window, Handle::try_current().ok())
    }

    /// Debouncer bound to `runtime`; `None` spawns on whatever runtime is
    /// current at each `call`.
    pub fn with_runtime(window: Duration, runtime: Option<Handle>) -> Self {
        Self {
            window,
            generation: Arc::new(AtomicU64::new(0)),
            runtime,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Schedule `job` to run after the quiet window, superseding any pending
    /// call.
    ///
    /// # Panics
    ///
    /// Panics if the debouncer has no bound runtime and is called outside
    /// a tokio runtime.
    pub fn call<F, Fut>(&self, job: F) -> JoinHandle<()>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let generation = Arc::clone(&self.generation);
        let window = self.window;

        let task = async move {
            tokio::time::sleep(window).await;
            if generation.load(Ordering::SeqCst) != ticket {
                tracing::trace!(ticket, "debounced call superseded");
                return;
            }
            job().await;
        };
        match &self.runtime {
            Some(runtime) => runtime.spawn(task),
            None => tokio::spawn(task),
        }
    }

    /// Drop whatever call is pending. Jobs already running are unaffected.
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}
