//! Cycle Metrics
//!
//! Scoped measurement context for one evaluation cycle. Created by the
//! caller, threaded through the engine, and flushed (logged) by the
//! caller — not a process-global.
//!
//! Author: AI-Generated
//! Created: 2026-02-04

use chrono::{DateTime, Utc};

/// Counters and phase timings for a single evaluation cycle
#[derive(Debug, Clone)]
pub struct CycleMetrics {
    pub started_at: DateTime<Utc>,

    // Inputs
    pub pools_in: usize,

    // Pipeline counts
    pub groups: usize,
    pub eligible_groups: usize,
    pub triplets: usize,
    pub routes_evaluated: usize,
    pub candidates: usize,
    pub profitable: usize,

    // Failure counts (per-candidate, recovered)
    pub fetch_failures: usize,
    pub leg_failures: usize,
    pub gas_failures: usize,

    // Phase timings
    pub grouping_micros: u128,
    pub enumeration_micros: u128,
    pub evaluation_micros: u128,
}

impl CycleMetrics {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            pools_in: 0,
            groups: 0,
            eligible_groups: 0,
            triplets: 0,
            routes_evaluated: 0,
            candidates: 0,
            profitable: 0,
            fetch_failures: 0,
            leg_failures: 0,
            gas_failures: 0,
            grouping_micros: 0,
            enumeration_micros: 0,
            evaluation_micros: 0,
        }
    }

    pub fn total_failures(&self) -> usize {
        self.fetch_failures + self.leg_failures + self.gas_failures
    }

    /// One-line summary for logging at cycle end
    pub fn summary(&self) -> String {
        format!(
            "{} pools → {} groups ({} eligible) → {} triplets → {} routes → {} candidates ({} profitable, {} failures) | group {}µs, enum {}µs, eval {}µs",
            self.pools_in,
            self.groups,
            self.eligible_groups,
            self.triplets,
            self.routes_evaluated,
            self.candidates,
            self.profitable,
            self.total_failures(),
            self.grouping_micros,
            self.enumeration_micros,
            self.evaluation_micros,
        )
    }
}

impl Default for CycleMetrics {
    fn default() -> Self {
        Self::new()
    }
}
