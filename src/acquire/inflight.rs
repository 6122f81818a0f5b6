//! Tracking of running acquisitions
//!
//! Shutdown never cancels a fetch; it closes the tracker so no new work is
//! admitted, then waits until every outstanding guard has been dropped.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

#[derive(Debug, Default)]
struct Inner {
    count: AtomicUsize,
    closed: AtomicBool,
    idle: Notify,
}

/// Counter of in-flight acquisitions
#[derive(Debug, Clone, Default)]
pub struct InFlight {
    inner: Arc<Inner>,
}

/// Held by a running acquisition; releases its slot on drop
#[derive(Debug)]
pub struct InFlightGuard {
    inner: Arc<Inner>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one acquisition, or `None` once draining has begun
    pub fn enter(&self) -> Option<InFlightGuard> {
        if self.inner.closed.load(Ordering::SeqCst) {
            return None;
        }
        self.inner.count.fetch_add(1, Ordering::SeqCst);

        // Lost the race against drain
        if self.inner.closed.load(Ordering::SeqCst) {
            release(&self.inner);
            return None;
        }

        Some(InFlightGuard {
            inner: self.inner.clone(),
        })
    }

    pub fn count(&self) -> usize {
        self.inner.count.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    /// Stops admitting work and waits for running acquisitions to finish
    pub async fn drain(&self) {
        self.inner.closed.store(true, Ordering::SeqCst);

        loop {
            let idle = self.inner.idle.notified();
            let remaining = self.count();
            if remaining == 0 {
                return;
            }
            tracing::info!("Waiting for {} in-flight fetches", remaining);
            idle.await;
        }
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        release(&self.inner);
    }
}

fn release(inner: &Inner) {
    if inner.count.fetch_sub(1, Ordering::SeqCst) == 1 {
        inner.idle.notify_waiters();
    }
}
