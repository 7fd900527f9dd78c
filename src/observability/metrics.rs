//! Engine counters
//!
//! - Counters only, monotonic
//! - Thread-safe (parallel cut execution bumps them concurrently)

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Counters for one engine instance
#[derive(Debug, Default)]
pub struct EngineMetrics {
    cuts_executed: AtomicU64,
    cuts_failed: AtomicU64,
    cuts_rejected: AtomicU64,
    segments_materialized: AtomicU64,
    segments_rejected: AtomicU64,
}

impl EngineMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_cuts_executed(&self) {
        self.cuts_executed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_cuts_failed(&self) {
        self.cuts_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_cuts_rejected(&self) {
        self.cuts_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_segments_materialized(&self) {
        self.segments_materialized.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_segments_rejected(&self) {
        self.segments_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Get all counters as a snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            cuts_executed: self.cuts_executed.load(Ordering::Relaxed),
            cuts_failed: self.cuts_failed.load(Ordering::Relaxed),
            cuts_rejected: self.cuts_rejected.load(Ordering::Relaxed),
            segments_materialized: self.segments_materialized.load(Ordering::Relaxed),
            segments_rejected: self.segments_rejected.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time copy of all counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub cuts_executed: u64,
    pub cuts_failed: u64,
    pub cuts_rejected: u64,
    pub segments_materialized: u64,
    pub segments_rejected: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_registry_has_zero_values() {
        let snapshot = EngineMetrics::new().snapshot();
        assert_eq!(snapshot.cuts_executed, 0);
        assert_eq!(snapshot.segments_rejected, 0);
    }

    #[test]
    fn test_increment_counters() {
        let metrics = EngineMetrics::new();
        metrics.increment_cuts_executed();
        metrics.increment_cuts_executed();
        metrics.increment_cuts_failed();
        metrics.increment_cuts_rejected();
        metrics.increment_segments_materialized();
        metrics.increment_segments_rejected();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.cuts_executed, 2);
        assert_eq!(snapshot.cuts_failed, 1);
        assert_eq!(snapshot.cuts_rejected, 1);
        assert_eq!(snapshot.segments_materialized, 1);
        assert_eq!(snapshot.segments_rejected, 1);
    }

    #[test]
    fn test_snapshot_serializes() {
        let value = serde_json::to_value(EngineMetrics::new().snapshot()).unwrap();
        assert_eq!(value["cuts_failed"], 0);
    }
}
