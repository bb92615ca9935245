//! worker: the background thread behind each queue file.
//!
//! A reader worker moves bytes from the wrapped file into the queue; a writer
//! worker moves them from the queue into the wrapped file. Either way the
//! worker owns all I/O on the file for as long as it runs.

pub mod reader;
pub mod types;
pub mod writer;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, error};

use crate::constants::thread_names;
use crate::file::KFile;
use crate::queue::SealController;
use crate::types::{FileError, Result};

pub use types::{WorkerReport, WorkerRole, WorkerState};

/// Everything a worker thread needs, moved into the thread on spawn.
pub(crate) struct WorkerContext<F> {
    pub file: Arc<Mutex<F>>,
    pub control: Arc<SealController>,
    pub block_size: usize,
    pub timeout: Duration,
}

impl<F> WorkerContext<F> {
    pub fn lock_file(&self) -> MutexGuard<'_, F> {
        self.file.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Marks the worker exited and seals the queue even if the role panics.
/// A panic is recorded as the queue's error first, so the front end never
/// mistakes it for end of stream.
struct ExitGuard(Arc<SealController>);

impl Drop for ExitGuard {
    fn drop(&mut self) {
        if thread::panicking() {
            self.0.fail(FileError::WorkerPanicked);
        }
        self.0.seal();
        self.0.set_worker_state(WorkerState::Exited);
    }
}

/// Handle to a running (or finished) worker thread.
#[derive(Debug)]
pub struct Worker {
    role: WorkerRole,
    control: Arc<SealController>,
    thread: Option<JoinHandle<WorkerReport>>,
    report: Option<WorkerReport>,
}

impl Worker {
    pub(crate) fn spawn_reader<F: KFile + 'static>(
        ctx: WorkerContext<F>,
        start_pos: u64,
    ) -> Result<Self> {
        Self::spawn(WorkerRole::Reader, thread_names::READER, Arc::clone(&ctx.control), move || {
            reader::run(&ctx, start_pos)
        })
    }

    pub(crate) fn spawn_writer<F: KFile + 'static>(ctx: WorkerContext<F>) -> Result<Self> {
        Self::spawn(WorkerRole::Writer, thread_names::WRITER, Arc::clone(&ctx.control), move || {
            writer::run(&ctx)
        })
    }

    fn spawn<R>(
        role: WorkerRole,
        name: &str,
        control: Arc<SealController>,
        body: R,
    ) -> Result<Self>
    where
        R: FnOnce() -> WorkerReport + Send + 'static,
    {
        control.set_worker_state(WorkerState::Starting);
        let guard = ExitGuard(Arc::clone(&control));
        let thread = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                let _guard = guard;
                body()
            })
            .map_err(FileError::from)?;
        debug!("spawned {role} worker");

        Ok(Self {
            role,
            control,
            thread: Some(thread),
            report: None,
        })
    }

    pub fn role(&self) -> WorkerRole {
        self.role
    }

    pub fn state(&self) -> WorkerState {
        self.control.worker_state()
    }

    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Wait for the thread to exit. Safe to call more than once.
    pub fn join(&mut self) -> WorkerReport {
        if let Some(handle) = self.thread.take() {
            let report = match handle.join() {
                Ok(report) => report,
                Err(_) => {
                    error!("{} worker panicked", self.role);
                    self.control.fail(FileError::WorkerPanicked);
                    WorkerReport::failed(self.role, FileError::WorkerPanicked)
                }
            };
            debug!(
                "{} worker joined: {} blocks, {} bytes, ok={}",
                report.role,
                report.blocks,
                report.bytes,
                report.outcome.is_ok()
            );
            self.report = Some(report);
        }

        match &self.report {
            Some(report) => report.clone(),
            None => WorkerReport::failed(self.role, FileError::WorkerPanicked),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::file::{FileCaps, MemFile};
    use crate::queue::{ByteQueue, Pop};

    struct PanickingFile;

    impl KFile for PanickingFile {
        fn capabilities(&self) -> FileCaps {
            FileCaps::READ
        }

        fn random_access(&self) -> Result<()> {
            Ok(())
        }

        fn size(&self) -> Result<u64> {
            Ok(0)
        }

        fn set_size(&mut self, _size: u64) -> Result<()> {
            Ok(())
        }

        fn read_at(&mut self, _pos: u64, _buf: &mut [u8]) -> Result<usize> {
            panic!("read exploded");
        }

        fn write_at(&mut self, _pos: u64, _buf: &[u8]) -> Result<usize> {
            Ok(0)
        }
    }

    fn context<F>(file: F) -> WorkerContext<F> {
        WorkerContext {
            file: Arc::new(Mutex::new(file)),
            control: Arc::new(SealController::new(Arc::new(ByteQueue::new(64, 16)))),
            block_size: 16,
            timeout: Duration::from_millis(5),
        }
    }

    #[test]
    fn join_reports_completed_reader() {
        let ctx = context(MemFile::from_vec(vec![7; 40]));
        let control = Arc::clone(&ctx.control);
        let mut worker = Worker::spawn_reader(ctx, 0).unwrap();

        let mut total = 0;
        loop {
            match control.queue().pop(Duration::from_millis(50)).unwrap() {
                Pop::Block(b) => total += b.len(),
                Pop::Empty => continue,
                Pop::EndOfStream => break,
            }
        }
        let report = worker.join();
        assert_eq!(total, 40);
        assert_eq!(report.bytes, 40);
        assert_eq!(report.role, WorkerRole::Reader);
        assert!(worker.is_finished());
        assert_eq!(worker.state(), WorkerState::Exited);
        // second join returns the cached report
        assert_eq!(worker.join().blocks, report.blocks);
    }

    #[test]
    fn panic_is_recorded_not_end_of_stream() {
        let ctx = context(PanickingFile);
        let control = Arc::clone(&ctx.control);
        let mut worker = Worker::spawn_reader(ctx, 0).unwrap();

        let report = worker.join();
        assert!(matches!(report.outcome, Err(FileError::WorkerPanicked)));
        assert!(control.is_sealed());
        assert!(matches!(
            control.queue().pop(Duration::ZERO),
            Err(FileError::WorkerPanicked)
        ));
    }
}
