//! Shutdown triggers
//!
//! The service stops on the first of: Ctrl-C, SIGTERM, a message from the
//! search engine supervisor, or a configured stretch without any request.

use crate::supervisor::ShutdownReason;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::signal;
use tokio::sync::mpsc;

/// Time of the most recent request
#[derive(Debug, Clone)]
pub struct IdleClock {
    started: Instant,
    last_ms: Arc<AtomicU64>,
}

impl IdleClock {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            last_ms: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn touch(&self) {
        let now = self.started.elapsed().as_millis() as u64;
        self.last_ms.fetch_max(now, Ordering::Relaxed);
    }

    pub fn idle_for(&self) -> Duration {
        let last = Duration::from_millis(self.last_ms.load(Ordering::Relaxed));
        self.started.elapsed().saturating_sub(last)
    }
}

impl Default for IdleClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Middleware recording every request on the idle clock
pub async fn track_activity(
    State(clock): State<IdleClock>,
    request: Request,
    next: Next,
) -> Response {
    clock.touch();
    next.run(request).await
}

/// Resolves once no request has arrived for `limit`
pub async fn idle_timeout(clock: IdleClock, limit: Duration) {
    loop {
        let idle = clock.idle_for();
        if idle >= limit {
            return;
        }
        tokio::time::sleep(limit - idle).await;
    }
}

/// Waits for the first shutdown trigger and reports which one fired
pub async fn shutdown_signal(
    mut supervisor_rx: mpsc::Receiver<ShutdownReason>,
    clock: IdleClock,
    idle_limit: Option<Duration>,
) -> ShutdownReason {
    let supervisor = async {
        match supervisor_rx.recv().await {
            Some(reason) => reason,
            None => std::future::pending().await,
        }
    };

    let idle = async {
        match idle_limit {
            Some(limit) => idle_timeout(clock, limit).await,
            None => std::future::pending().await,
        }
    };

    let reason = tokio::select! {
        _ = ctrl_c() => ShutdownReason::Signal,
        _ = terminate() => ShutdownReason::Signal,
        reason = supervisor => reason,
        _ = idle => ShutdownReason::Idle,
    };

    tracing::info!("Shutdown triggered ({}), starting graceful shutdown", reason);
    reason
}

async fn ctrl_c() {
    if let Err(e) = signal::ctrl_c().await {
        tracing::error!("Failed to install Ctrl-C handler: {}", e);
        std::future::pending::<()>().await;
    }
}

#[cfg(unix)]
async fn terminate() {
    match signal::unix::signal(signal::unix::SignalKind::terminate()) {
        Ok(mut stream) => {
            stream.recv().await;
        }
        Err(e) => {
            tracing::error!("Failed to install SIGTERM handler: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn terminate() {
    std::future::pending::<()>().await;
}
