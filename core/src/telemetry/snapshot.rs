//! telemetry/snapshot.rs
//!
//! Immutable view of a queue file's counters and worker stage timings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::telemetry::counters::TelemetryCounters;
use crate::telemetry::timers::{StageTimes, TelemetryTimer};

/// Core telemetry snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    pub counters: TelemetryCounters,
    pub bytes_queued: u64,
    pub capacity_bytes: u64,
    pub throughput_bytes_per_sec: f64,
    pub elapsed: Duration,
    pub stage_times: StageTimes,
}

impl TelemetrySnapshot {
    pub fn from(
        counters: &TelemetryCounters,
        stage_times: &StageTimes,
        timer: &TelemetryTimer,
        bytes_queued: usize,
        capacity_bytes: usize,
    ) -> Self {
        let elapsed = timer.elapsed();

        let throughput = if elapsed.as_secs_f64() > 0.0 {
            counters.bytes_popped as f64 / elapsed.as_secs_f64()
        } else {
            0.0
        };

        Self {
            counters: counters.clone(),
            bytes_queued: bytes_queued as u64,
            capacity_bytes: capacity_bytes as u64,
            throughput_bytes_per_sec: throughput,
            elapsed,
            stage_times: stage_times.clone(),
        }
    }

    /// Validate internal invariants:
    /// - nothing leaves the queue that never entered it
    /// - the queued byte count matches what is still in flight
    pub fn sanity_check(&self) -> bool {
        let c = &self.counters;
        c.blocks_popped + c.blocks_discarded <= c.blocks_pushed
            && c.bytes_popped + c.bytes_discarded <= c.bytes_pushed
            && c.bytes_in_flight() == self.bytes_queued
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
