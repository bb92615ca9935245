//! Bounded, blocking FIFO of byte blocks.
//!
//! Capacity is metered in bytes, not blocks. An empty queue always admits one
//! block, so a capacity smaller than the block size still makes progress.
//!
//! Waiting is bounded: `push` and `pop` wait at most one timeout on a condition
//! variable and then report would-block, leaving the retry policy to the
//! caller. Seal and error wake every waiter, so neither side sleeps through a
//! shutdown.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use log::trace;

use crate::queue::block::Block;
use crate::telemetry::{Stage, StageTimes, TelemetryCounters};
use crate::types::{FileError, Result};

/// Outcome of a push that did not fail.
#[derive(Debug)]
pub enum Push {
    Queued,
    /// No room before the timeout; the block is handed back for a retry.
    WouldBlock(Block),
}

/// Outcome of a pop that did not fail.
#[derive(Debug)]
pub enum Pop {
    Block(Block),
    /// Nothing arrived before the timeout. Not end of stream.
    Empty,
    /// Empty and sealed: nothing more will ever arrive.
    EndOfStream,
}

#[derive(Debug, Default)]
struct QueueState {
    blocks: VecDeque<Block>,
    bytes_queued: usize,
    sealed: bool,
    error: Option<FileError>,
    counters: TelemetryCounters,
    stage_times: StageTimes,
}

impl QueueState {
    fn has_room(&self, len: usize, capacity: usize) -> bool {
        self.blocks.is_empty() || self.bytes_queued + len <= capacity
    }
}

#[derive(Debug)]
pub struct ByteQueue {
    capacity_bytes: usize,
    block_size_hint: usize,
    state: Mutex<QueueState>,
    data_available: Condvar,
    space_available: Condvar,
}

impl ByteQueue {
    pub fn new(capacity_bytes: usize, block_size_hint: usize) -> Self {
        Self {
            capacity_bytes,
            block_size_hint,
            state: Mutex::new(QueueState::default()),
            data_available: Condvar::new(),
            space_available: Condvar::new(),
        }
    }

    pub fn capacity_bytes(&self) -> usize {
        self.capacity_bytes
    }

    pub fn block_size_hint(&self) -> usize {
        self.block_size_hint
    }

    /// Append `block`, waiting at most `timeout` for space.
    ///
    /// Fails immediately with the recorded error if there is one, or with
    /// `FileError::Sealed` once the queue is sealed.
    pub fn push(&self, block: Block, timeout: Duration) -> Result<Push> {
        let deadline = Instant::now() + timeout;
        let mut state = self.lock();
        loop {
            if let Some(e) = &state.error {
                return Err(e.clone());
            }
            if state.sealed {
                return Err(FileError::Sealed);
            }
            if state.has_room(block.len(), self.capacity_bytes) {
                trace!("queue: push {} bytes at {}", block.len(), block.pos());
                state.bytes_queued += block.len();
                state.counters.add_push(block.len());
                state.blocks.push_back(block);
                self.data_available.notify_one();
                return Ok(Push::Queued);
            }

            let now = Instant::now();
            if now >= deadline {
                state.counters.add_push_wait();
                return Ok(Push::WouldBlock(block));
            }
            let (guard, _) = self
                .space_available
                .wait_timeout(state, deadline - now)
                .unwrap_or_else(PoisonError::into_inner);
            state = guard;
        }
    }

    /// Remove the head block, waiting at most `timeout` for one to arrive.
    ///
    /// Blocks queued before a failure are still delivered in order; the
    /// recorded error is returned once the queue has run dry.
    pub fn pop(&self, timeout: Duration) -> Result<Pop> {
        let deadline = Instant::now() + timeout;
        let mut state = self.lock();
        loop {
            if let Some(block) = state.blocks.pop_front() {
                trace!("queue: pop {} bytes at {}", block.len(), block.pos());
                state.bytes_queued -= block.len();
                state.counters.add_pop(block.len());
                self.space_available.notify_one();
                return Ok(Pop::Block(block));
            }
            if let Some(e) = &state.error {
                return Err(e.clone());
            }
            if state.sealed {
                return Ok(Pop::EndOfStream);
            }

            let now = Instant::now();
            if now >= deadline {
                state.counters.add_pop_wait();
                return Ok(Pop::Empty);
            }
            let (guard, _) = self
                .data_available
                .wait_timeout(state, deadline - now)
                .unwrap_or_else(PoisonError::into_inner);
            state = guard;
        }
    }

    /// One-way. Returns true for the call that actually sealed.
    pub fn seal(&self) -> bool {
        let mut state = self.lock();
        let first = !state.sealed;
        state.sealed = true;
        drop(state);
        self.wake_all();
        first
    }

    /// First error wins. Returns true if `e` was recorded.
    pub fn set_error(&self, e: FileError) -> bool {
        let mut state = self.lock();
        let first = state.error.is_none();
        if first {
            state.error = Some(e);
        }
        drop(state);
        self.wake_all();
        first
    }

    /// Drop every queued block without delivering it. Returns how many were dropped.
    pub fn discard_pending(&self) -> usize {
        let mut state = self.lock();
        let blocks = state.blocks.len();
        let bytes = state.bytes_queued;
        state.blocks.clear();
        state.bytes_queued = 0;
        if blocks > 0 {
            state.counters.add_discard(blocks, bytes);
        }
        drop(state);
        self.space_available.notify_all();
        blocks
    }

    pub fn is_sealed(&self) -> bool {
        self.lock().sealed
    }

    pub fn error(&self) -> Option<FileError> {
        self.lock().error.clone()
    }

    pub fn bytes_queued(&self) -> usize {
        self.lock().bytes_queued
    }

    pub fn len(&self) -> usize {
        self.lock().blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().blocks.is_empty()
    }

    pub fn note_short_flush(&self) {
        self.lock().counters.add_short_flush();
    }

    pub fn record_stage(&self, stage: Stage, dur: Duration) {
        self.lock().stage_times.add(stage, dur);
    }

    /// Counters, stage times and queued bytes taken under one lock.
    pub fn telemetry_parts(&self) -> (TelemetryCounters, StageTimes, usize) {
        let state = self.lock();
        (state.counters.clone(), state.stage_times.clone(), state.bytes_queued)
    }

    fn wake_all(&self) {
        self.data_available.notify_all();
        self.space_available.notify_all();
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
