//! Cancellable scheduled callbacks owned by a view.
//!
//! Both primitives spawn onto the ambient tokio runtime and hand back
//! nothing; the owner cancels through the primitive itself, usually from
//! `View::stop`.

use std::future::Future;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;

/// Runs only the most recently scheduled callback, once `delay` has passed
/// without another call to [`Debouncer::schedule`].
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Mutex::new(None),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Cancel whatever is pending and arm `task` to run after the delay.
    ///
    /// Once the delay elapses the task is detached: cancelling only ever
    /// stops a callback that has not started.
    pub fn schedule<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let delay = self.delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            tokio::spawn(task);
        });

        let previous = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(handle);
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    /// Drop the pending callback, if any. Returns whether one was armed.
    pub fn cancel(&self) -> bool {
        let pending = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match pending {
            Some(handle) => {
                let armed = !handle.is_finished();
                handle.abort();
                if armed {
                    tracing::trace!(
                        delay_ms = self.delay.as_millis() as u64,
                        "debounced call cancelled"
                    );
                }
                armed
            }
            None => false,
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// A set of one-shot timers that can be cancelled together.
#[derive(Debug, Default)]
pub struct Timers {
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `task` once after `delay`.
    pub fn after<F>(&self, delay: Duration, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task.await;
        });

        let mut handles = self.handles.lock().unwrap_or_else(PoisonError::into_inner);
        handles.retain(|h| !h.is_finished());
        handles.push(handle);
    }

    /// Number of timers that have not fired yet.
    pub fn pending(&self) -> usize {
        self.handles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|h| !h.is_finished())
            .count()
    }

    pub fn cancel_all(&self) {
        let handles = std::mem::take(
            &mut *self.handles.lock().unwrap_or_else(PoisonError::into_inner),
        );
        if !handles.is_empty() {
            tracing::trace!(count = handles.len(), "cancelling timers");
        }
        for handle in handles {
            handle.abort();
        }
    }
}

impl Drop for Timers {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
