use std::fmt;

use crate::types::{FileError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerRole {
    Reader,
    Writer,
}

impl fmt::Display for WorkerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerRole::Reader => f.write_str("reader"),
            WorkerRole::Writer => f.write_str("writer"),
        }
    }
}

/// Where the worker currently is in its loop. Published for observers only;
/// nothing synchronises on it except the exited check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Starting,
    /// Reader holding a block the queue has no room for.
    WaitingForSpace,
    /// Writer waiting on an empty queue.
    WaitingForData,
    Transferring,
    /// A wait timed out; about to retry.
    Sleeping,
    Draining,
    Exited,
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WorkerState::Starting        => "starting",
            WorkerState::WaitingForSpace => "waiting-for-space",
            WorkerState::WaitingForData  => "waiting-for-data",
            WorkerState::Transferring    => "transferring",
            WorkerState::Sleeping        => "sleeping",
            WorkerState::Draining        => "draining",
            WorkerState::Exited          => "exited",
        };
        f.write_str(name)
    }
}

/// What a worker did before it exited.
#[derive(Debug, Clone)]
pub struct WorkerReport {
    pub role: WorkerRole,
    /// Blocks moved between the file and the queue.
    pub blocks: u64,
    pub bytes: u64,
    pub outcome: Result<()>,
}

impl WorkerReport {
    pub fn new(role: WorkerRole) -> Self {
        Self {
            role,
            blocks: 0,
            bytes: 0,
            outcome: Ok(()),
        }
    }

    pub fn failed(role: WorkerRole, e: FileError) -> Self {
        Self {
            outcome: Err(e),
            ..Self::new(role)
        }
    }

    pub fn add_block(&mut self, len: usize) {
        self.blocks += 1;
        self.bytes += len as u64;
    }
}
