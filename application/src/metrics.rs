//! Engine performance tracking
//!
//! Running counters across the lifetime of a [`ConsensusEngine`]
//! instance. Updates use relaxed atomics: calculations touch no other
//! shared state, and eventual consistency between counters is acceptable
//! for a snapshot read.
//!
//! [`ConsensusEngine`]: crate::engine::ConsensusEngine

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use verdict_domain::consensus::{ConsensusStrategy, TieBreakPolicy};

/// Monotonically increasing calculation counters.
#[derive(Debug, Default)]
pub struct PerformanceTracker {
    total_calculations: AtomicU64,
    successful_calculations: AtomicU64,
    failed_calculations: AtomicU64,
    tie_breaking_events: AtomicU64,
}

impl PerformanceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a calculation that completed without an internal fault
    /// (sentinel outcomes included).
    pub fn record_success(&self) {
        self.total_calculations.fetch_add(1, Ordering::Relaxed);
        self.successful_calculations.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a calculation that hit an internal fault or a bad selector.
    pub fn record_failure(&self) {
        self.total_calculations.fetch_add(1, Ordering::Relaxed);
        self.failed_calculations.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a tie-break intervention.
    pub fn record_tie_break(&self) {
        self.tie_breaking_events.fetch_add(1, Ordering::Relaxed);
    }

    /// Take a point-in-time snapshot with derived rates.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let total = self.total_calculations.load(Ordering::Relaxed);
        let successful = self.successful_calculations.load(Ordering::Relaxed);
        let failed = self.failed_calculations.load(Ordering::Relaxed);
        let tie_events = self.tie_breaking_events.load(Ordering::Relaxed);

        MetricsSnapshot {
            total_calculations: total,
            successful_calculations: successful,
            failed_calculations: failed,
            tie_breaking_events: tie_events,
            success_rate: rate(successful, total),
            tie_rate: rate(tie_events, total),
            supported_strategies: ConsensusStrategy::ALL
                .iter()
                .map(|s| s.as_str().to_string())
                .collect(),
            supported_tie_breakers: TieBreakPolicy::ALL
                .iter()
                .map(|p| p.as_str().to_string())
                .collect(),
        }
    }
}

fn rate(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64
    }
}

/// Point-in-time view of the tracker, ready for external reporting over
/// whatever transport the caller uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub total_calculations: u64,
    pub successful_calculations: u64,
    pub failed_calculations: u64,
    pub tie_breaking_events: u64,
    pub success_rate: f64,
    pub tie_rate: f64,
    pub supported_strategies: Vec<String>,
    pub supported_tie_breakers: Vec<String>,
}
