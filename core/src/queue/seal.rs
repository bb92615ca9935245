//! Shared shutdown state between a front end and its worker.

use std::sync::Arc;

use crossbeam::atomic::AtomicCell;
use log::{debug, error};

use crate::queue::byte_queue::ByteQueue;
use crate::types::FileError;
use crate::worker::types::WorkerState;

/// Owns the seal and error signalling for one queue.
///
/// Either side may seal. Only failures of the wrapped file are recorded as
/// errors; sealing alone is an orderly shutdown.
#[derive(Debug)]
pub struct SealController {
    queue: Arc<ByteQueue>,
    worker_state: AtomicCell<WorkerState>,
}

impl SealController {
    pub fn new(queue: Arc<ByteQueue>) -> Self {
        Self {
            queue,
            worker_state: AtomicCell::new(WorkerState::Starting),
        }
    }

    pub fn queue(&self) -> &Arc<ByteQueue> {
        &self.queue
    }

    pub fn seal(&self) -> bool {
        let first = self.queue.seal();
        if first {
            debug!("queue sealed ({} bytes still queued)", self.queue.bytes_queued());
        }
        first
    }

    /// Record `e` in the error slot. Later failures are dropped.
    pub fn fail(&self, e: FileError) -> bool {
        let first = self.queue.set_error(e.clone());
        if first {
            error!("queue file failed: {e}");
        } else {
            debug!("suppressed secondary failure: {e}");
        }
        first
    }

    pub fn is_sealed(&self) -> bool {
        self.queue.is_sealed()
    }

    pub fn error(&self) -> Option<FileError> {
        self.queue.error()
    }

    pub fn set_worker_state(&self, state: WorkerState) {
        self.worker_state.store(state);
    }

    pub fn worker_state(&self) -> WorkerState {
        self.worker_state.load()
    }

    pub fn worker_exited(&self) -> bool {
        self.worker_state.load() == WorkerState::Exited
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seal_and_fail_are_first_wins() {
        let control = SealController::new(Arc::new(ByteQueue::new(10, 10)));
        assert!(!control.is_sealed());
        assert!(control.seal());
        assert!(!control.seal());

        assert!(control.fail(FileError::TransferIncomplete));
        assert!(!control.fail(FileError::WorkerPanicked));
        assert!(matches!(control.error(), Some(FileError::TransferIncomplete)));
    }

    #[test]
    fn worker_state_is_published() {
        let control = SealController::new(Arc::new(ByteQueue::new(10, 10)));
        assert_eq!(control.worker_state(), WorkerState::Starting);
        assert!(!control.worker_exited());
        control.set_worker_state(WorkerState::Exited);
        assert!(control.worker_exited());
    }
}
