//! Process-wide counters for events and callback deliveries

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics handle for recording counters
#[derive(Debug, Default)]
pub struct Metrics {
    events_received: AtomicU64,
    events_succeeded: AtomicU64,
    events_failed: AtomicU64,
    callbacks_delivered: AtomicU64,
    callbacks_failed: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn event_received(&self) {
        self.events_received.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "events_received", "Metric incremented");
    }

    pub fn event_succeeded(&self) {
        self.events_succeeded.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "events_succeeded", "Metric incremented");
    }

    pub fn event_failed(&self) {
        self.events_failed.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "events_failed", "Metric incremented");
    }

    pub fn callback_delivered(&self) {
        self.callbacks_delivered.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "callbacks_delivered", "Metric incremented");
    }

    pub fn callback_failed(&self) {
        self.callbacks_failed.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "callbacks_failed", "Metric incremented");
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            events_received: self.events_received.load(Ordering::Relaxed),
            events_succeeded: self.events_succeeded.load(Ordering::Relaxed),
            events_failed: self.events_failed.load(Ordering::Relaxed),
            callbacks_delivered: self.callbacks_delivered.load(Ordering::Relaxed),
            callbacks_failed: self.callbacks_failed.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub events_received: u64,
    pub events_succeeded: u64,
    pub events_failed: u64,
    pub callbacks_delivered: u64,
    pub callbacks_failed: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_reflects_increments() {
        let metrics = Metrics::new();
        metrics.event_received();
        metrics.event_received();
        metrics.event_failed();
        metrics.callback_delivered();

        assert_eq!(
            metrics.snapshot(),
            MetricsSnapshot {
                events_received: 2,
                events_failed: 1,
                callbacks_delivered: 1,
                ..Default::default()
            }
        );
    }
}
