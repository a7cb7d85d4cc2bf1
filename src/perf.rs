//! PerformanceTracker: diagnostic counters.
//!
//! Purely observational. Nothing reads these to make decisions.

use serde::{Deserialize, Serialize};

/// Point-in-time copy of all counters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerfSnapshot {
    pub state_updates: u64,
    pub remaps: u64,
    /// Incremental diffs computed by the session
    pub diffs: u64,
    /// Context snippets built for incremental requests
    pub snippets: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub detector_calls: u64,
    pub detector_failures: u64,
    pub stale_results: u64,
    pub pause_signals: u64,
    pub suppressed_bursts: u64,
    /// Round trip of the last completed detection, in ms
    pub last_detection_ms: Option<u64>,
}

impl PerfSnapshot {
    /// Cache hit rate as a percentage
    pub fn cache_hit_rate(&self) -> f64 {
        let total = self.cache_hits + self.cache_misses;
        if total == 0 {
            return 0.0;
        }
        (self.cache_hits as f64 / total as f64) * 100.0
    }
}

#[derive(Debug, Clone, Default)]
pub struct PerformanceTracker {
    counters: PerfSnapshot,
}

impl PerformanceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_state_update(&mut self) {
        self.counters.state_updates += 1;
    }

    pub fn record_remap(&mut self) {
        self.counters.remaps += 1;
    }

    pub fn record_diff(&mut self) {
        self.counters.diffs += 1;
    }

    pub fn record_snippet(&mut self) {
        self.counters.snippets += 1;
    }

    pub fn record_cache(&mut self, hit: bool) {
        if hit {
            self.counters.cache_hits += 1;
        } else {
            self.counters.cache_misses += 1;
        }
    }

    pub fn record_detector_call(&mut self) {
        self.counters.detector_calls += 1;
    }

    pub fn record_detection_result(&mut self, ok: bool, stale: bool, elapsed_ms: u64) {
        if !ok {
            self.counters.detector_failures += 1;
        }
        if stale {
            self.counters.stale_results += 1;
        }
        self.counters.last_detection_ms = Some(elapsed_ms);
    }

    pub fn record_pause_signal(&mut self) {
        self.counters.pause_signals += 1;
    }

    pub fn record_suppressed_burst(&mut self) {
        self.counters.suppressed_bursts += 1;
    }

    pub fn snapshot(&self) -> PerfSnapshot {
        self.counters.clone()
    }

    pub fn reset(&mut self) {
        self.counters = PerfSnapshot::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_and_reset() {
        let mut perf = PerformanceTracker::new();
        perf.record_cache(true);
        perf.record_cache(true);
        perf.record_cache(false);
        perf.record_detector_call();
        perf.record_detection_result(false, true, 120);

        let snap = perf.snapshot();
        assert_eq!(snap.cache_hits, 2);
        assert_eq!(snap.detector_failures, 1);
        assert_eq!(snap.stale_results, 1);
        assert_eq!(snap.last_detection_ms, Some(120));
        assert!((snap.cache_hit_rate() - 66.666).abs() < 0.01);

        perf.reset();
        assert_eq!(perf.snapshot(), PerfSnapshot::default());
    }

    #[test]
    fn test_snapshot_serializes() {
        let json = serde_json::to_string(&PerformanceTracker::new().snapshot()).unwrap();
        assert!(json.contains("\"suppressed_bursts\":0"));
    }
}
