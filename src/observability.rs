use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

/// Relay usage metrics
#[derive(Debug, Default)]
pub struct RelayMetrics {
    pub requests_served: AtomicU64,
    pub dispatches_issued: AtomicU64,
    pub already_active: AtomicU64,
    pub failures: AtomicU64,
}

impl RelayMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_request(&self) {
        self.requests_served.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dispatch(&self) {
        self.dispatches_issued.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_already_active(&self) {
        self.already_active.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_stats(&self) -> RelayStats {
        RelayStats {
            requests_served: self.requests_served.load(Ordering::Relaxed),
            dispatches_issued: self.dispatches_issued.load(Ordering::Relaxed),
            already_active: self.already_active.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }

    pub fn log_stats(&self) {
        let stats = self.get_stats();
        info!(
            "Relay metrics: requests={}, dispatches={}, already_active={}, failures={}",
            stats.requests_served, stats.dispatches_issued, stats.already_active, stats.failures
        );
    }
}

#[derive(Debug, Clone)]
pub struct RelayStats {
    pub requests_served: u64,
    pub dispatches_issued: u64,
    pub already_active: u64,
    pub failures: u64,
}

/// Global metrics instance
static RELAY_METRICS: std::sync::LazyLock<RelayMetrics> =
    std::sync::LazyLock::new(RelayMetrics::new);

pub fn relay_metrics() -> &'static RelayMetrics {
    &RELAY_METRICS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let metrics = RelayMetrics::new();
        metrics.record_request();
        metrics.record_request();
        metrics.record_dispatch();
        metrics.record_failure();

        let stats = metrics.get_stats();
        assert_eq!(stats.requests_served, 2);
        assert_eq!(stats.dispatches_issued, 1);
        assert_eq!(stats.already_active, 0);
        assert_eq!(stats.failures, 1);
    }
}
