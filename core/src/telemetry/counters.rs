//! telemetry/counters.rs
//! Mutable counters collected while blocks move through a queue file.
//!
//! Converted into an immutable `TelemetrySnapshot` on request.
use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

/// Deterministic counters collected during queue-file transfers
#[derive(Default, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryCounters {
    pub blocks_pushed: u64,
    pub blocks_popped: u64,
    pub blocks_discarded: u64,
    pub bytes_pushed: u64,
    pub bytes_popped: u64,
    pub bytes_discarded: u64,
    /// Pushes that timed out waiting for space.
    pub push_waits: u64,
    /// Pops that timed out waiting for data.
    pub pop_waits: u64,
    /// Write-mode blocks flushed before they were full.
    pub short_flushes: u64,
}

impl TelemetryCounters {
    /// Record one block entering the queue.
    pub fn add_push(&mut self, len: usize) {
        self.blocks_pushed += 1;
        self.bytes_pushed += len as u64;
    }

    /// Record one block leaving the queue through a pop.
    pub fn add_pop(&mut self, len: usize) {
        self.blocks_popped += 1;
        self.bytes_popped += len as u64;
    }

    /// Record blocks dropped without being delivered.
    pub fn add_discard(&mut self, blocks: usize, bytes: usize) {
        self.blocks_discarded += blocks as u64;
        self.bytes_discarded += bytes as u64;
    }

    pub fn add_push_wait(&mut self) {
        self.push_waits += 1;
    }

    pub fn add_pop_wait(&mut self) {
        self.pop_waits += 1;
    }

    pub fn add_short_flush(&mut self) {
        self.short_flushes += 1;
    }

    /// Bytes currently accounted as in flight (pushed, not yet popped or discarded).
    pub fn bytes_in_flight(&self) -> u64 {
        self.bytes_pushed
            .saturating_sub(self.bytes_popped)
            .saturating_sub(self.bytes_discarded)
    }

    pub fn merge(&mut self, other: &TelemetryCounters) {
        self.blocks_pushed += other.blocks_pushed;
        self.blocks_popped += other.blocks_popped;
        self.blocks_discarded += other.blocks_discarded;

        self.bytes_pushed += other.bytes_pushed;
        self.bytes_popped += other.bytes_popped;
        self.bytes_discarded += other.bytes_discarded;

        self.push_waits += other.push_waits;
        self.pop_waits += other.pop_waits;
        self.short_flushes += other.short_flushes;
    }
}

impl AddAssign for TelemetryCounters {
    fn add_assign(&mut self, rhs: Self) {
        self.merge(&rhs);
    }
}
