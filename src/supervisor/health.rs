//! Liveness probing of the search engine
//!
//! A probe is a cheap up/down check. The tracker counts consecutive failures;
//! any success resets the count, and reaching [`FAILURE_THRESHOLD`] marks the
//! engine dead.

use async_trait::async_trait;
use std::time::Duration;

/// Consecutive failed probes after which the engine is considered dead
pub const FAILURE_THRESHOLD: u32 = 3;

/// Something that can tell whether the search engine is reachable
#[async_trait]
pub trait HealthProbe: Send + Sync {
    async fn is_healthy(&self) -> bool;
}

/// Verdict after recording one probe result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    /// Last probe succeeded
    Healthy,
    /// Some consecutive failures, still below the threshold
    Degraded(u32),
    /// Threshold reached
    Dead,
}

/// Consecutive-failure counter
#[derive(Debug, Clone)]
pub struct LivenessTracker {
    consecutive_failures: u32,
    threshold: u32,
}

impl LivenessTracker {
    pub fn new(threshold: u32) -> Self {
        Self {
            consecutive_failures: 0,
            threshold,
        }
    }

    pub fn record(&mut self, healthy: bool) -> Liveness {
        if healthy {
            self.consecutive_failures = 0;
            return Liveness::Healthy;
        }

        self.consecutive_failures += 1;
        if self.consecutive_failures >= self.threshold {
            Liveness::Dead
        } else {
            Liveness::Degraded(self.consecutive_failures)
        }
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }
}

impl Default for LivenessTracker {
    fn default() -> Self {
        Self::new(FAILURE_THRESHOLD)
    }
}

/// Timing of the probe loop
#[derive(Debug, Clone, Copy)]
pub struct ProbePolicy {
    /// Delay before the first probe, while the engine starts up
    pub warmup: Duration,
    /// Delay between probes
    pub interval: Duration,
}

/// Probes until the tracker declares the engine dead
///
/// Never returns while the engine stays healthy; callers race it against their
/// own stop condition.
pub async fn watch_liveness(
    probe: &dyn HealthProbe,
    tracker: &mut LivenessTracker,
    policy: ProbePolicy,
) {
    tokio::time::sleep(policy.warmup).await;
    tracing::info!("Started search health check");

    loop {
        let healthy = probe.is_healthy().await;
        match tracker.record(healthy) {
            Liveness::Healthy => {}
            Liveness::Degraded(failures) => {
                tracing::warn!("Search health check failed ({} in a row)", failures);
            }
            Liveness::Dead => {
                tracing::error!(
                    "Search health check failed {} times in a row",
                    tracker.consecutive_failures()
                );
                return;
            }
        }
        tokio::time::sleep(policy.interval).await;
    }
}
