//! Write-behind front end.
//!
//! Writes are staged into a block-sized buffer. A full buffer, or a write
//! that does not continue where the buffer ends, pushes the buffer onto the
//! queue as one block tagged with its position. The worker writes each block
//! at that position.

use std::io;
use std::mem;
use std::sync::{Arc, Mutex, PoisonError};

use bytes::BytesMut;
use log::{debug, warn};

use crate::file::{FileCaps, FileType, KFile};
use crate::queue::{Block, ByteQueue, Push, SealController};
use crate::queue_file::api::validate_destination;
use crate::queue_file::config::QueueFileConfig;
use crate::telemetry::{TelemetrySnapshot, TelemetryTimer};
use crate::types::{FileError, Result};
use crate::worker::{Worker, WorkerContext, WorkerState};

pub struct WriteBehindFile<F: KFile + 'static> {
    file: Arc<Mutex<F>>,
    control: Arc<SealController>,
    worker: Worker,
    config: QueueFileConfig,
    size: Result<u64>,
    staging: BytesMut,
    staging_pos: u64,
    /// Position `io::Write` continues from.
    cursor: u64,
    failed: Option<FileError>,
    timer: TelemetryTimer,
    closed: Option<Result<()>>,
}

impl<F: KFile + 'static> WriteBehindFile<F> {
    pub fn with_config(dest: F, config: &QueueFileConfig) -> Result<Self> {
        validate_destination(&dest, config)?;
        let config = config.resolved();
        let size = dest.size();

        let queue = Arc::new(ByteQueue::new(config.queue_bytes, config.block_size));
        let control = Arc::new(SealController::new(queue));
        let file = Arc::new(Mutex::new(dest));
        let worker = Worker::spawn_writer(WorkerContext {
            file: Arc::clone(&file),
            control: Arc::clone(&control),
            block_size: config.block_size,
            timeout: config.timeout(),
        })?;
        debug!(
            "write-behind opened: {} blocks of {} bytes, timeout {} ms",
            config.queue_depth(),
            config.block_size,
            config.timeout_ms
        );

        Ok(Self {
            file,
            control,
            worker,
            staging: BytesMut::with_capacity(config.block_size),
            config,
            size,
            staging_pos: 0,
            cursor: 0,
            failed: None,
            timer: TelemetryTimer::new(),
            closed: None,
        })
    }

    /// Stage `buf` for writing at `pos`.
    ///
    /// Returns how many bytes were accepted. Once any bytes are accepted the
    /// call succeeds; a failure behind them is reported on the next call.
    /// Errors of the wrapped file surface here or at `close`, never later.
    pub fn write_at(&mut self, pos: u64, buf: &[u8]) -> Result<usize> {
        if self.closed.is_some() {
            return Err(FileError::Sealed);
        }
        if let Some(e) = &self.failed {
            return Err(e.clone());
        }

        let block_size = self.config.block_size;
        let mut pos = pos;
        let mut total = 0;
        while total < buf.len() {
            if !self.staging.is_empty() && pos != self.staging_end() {
                if let Err(e) = self.flush_staging() {
                    return if total > 0 { Ok(total) } else { Err(e) };
                }
            }
            if self.staging.is_empty() {
                self.staging_pos = pos;
            }

            let n = (block_size - self.staging.len()).min(buf.len() - total);
            self.staging.extend_from_slice(&buf[total..total + n]);
            total += n;
            pos += n as u64;
            self.cursor = pos;

            if self.staging.len() >= block_size {
                if let Err(e) = self.flush_staging() {
                    debug!("write-behind: accepted {total} bytes before failure: {e}");
                    return Ok(total);
                }
            }
        }
        Ok(total)
    }

    fn staging_end(&self) -> u64 {
        self.staging_pos + self.staging.len() as u64
    }

    /// Push the staged bytes as one block. A failure sticks.
    fn flush_staging(&mut self) -> Result<()> {
        if self.staging.is_empty() {
            return Ok(());
        }
        let block_size = self.config.block_size;
        if self.staging.len() < block_size {
            self.control.queue().note_short_flush();
        }
        let data = mem::replace(&mut self.staging, BytesMut::with_capacity(block_size)).freeze();
        let result = self.push_block(Block::new(self.staging_pos, data));
        if let Err(e) = &result {
            self.failed = Some(e.clone());
        }
        result
    }

    fn push_block(&self, block: Block) -> Result<()> {
        let queue = self.control.queue();
        let timeout = self.config.timeout();
        let mut block = block;
        loop {
            match queue.push(block, timeout) {
                Ok(Push::Queued) => return Ok(()),
                Ok(Push::WouldBlock(back)) => {
                    if self.control.worker_exited() {
                        return Err(self.transfer_error());
                    }
                    block = back;
                }
                Err(FileError::Sealed) => return Err(self.transfer_error()),
                Err(e) => return Err(e),
            }
        }
    }

    /// The worker's recorded failure, or `TransferIncomplete` if it left quietly.
    fn transfer_error(&self) -> FileError {
        self.control.error().unwrap_or(FileError::TransferIncomplete)
    }

    /// Flush the partial block, let the worker drain the queue, and report
    /// any failure the worker hit. Idempotent: later calls return the same
    /// result.
    pub fn close(&mut self) -> Result<()> {
        if let Some(result) = &self.closed {
            return result.clone();
        }
        let flushed = if self.failed.is_none() { self.flush_staging() } else { Ok(()) };
        self.control.seal();
        let report = self.worker.join();
        self.timer.finish();
        debug!(
            "write-behind closed: worker wrote {} blocks, {} bytes",
            report.blocks, report.bytes
        );

        let latent = match (&self.failed, self.control.error()) {
            (_, Some(e)) => Err(e),
            (Some(e), None) => Err(e.clone()),
            (None, None) => Ok(()),
        };
        let result = latent.and(report.outcome).and(flushed);
        self.closed = Some(result.clone());
        result
    }

    /// Close and hand back the wrapped file.
    pub fn into_inner(mut self) -> Result<F> {
        self.close()?;
        let file = Arc::clone(&self.file);
        drop(self);
        let mutex = Arc::try_unwrap(file)
            .map_err(|_| FileError::Unsupported("wrapped file is still shared"))?;
        Ok(mutex.into_inner().unwrap_or_else(PoisonError::into_inner))
    }

    /// Resize the wrapped file directly, outside the queue.
    ///
    /// Blocks still queued are written afterwards and may extend the file
    /// again.
    pub fn set_size(&mut self, size: u64) -> Result<()> {
        if self.closed.is_some() {
            return Err(FileError::Sealed);
        }
        self.file
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .set_size(size)?;
        self.size = Ok(size);
        Ok(())
    }

    /// Bytes staged but not yet queued.
    pub fn staged(&self) -> usize {
        self.staging.len()
    }

    pub fn config(&self) -> &QueueFileConfig {
        &self.config
    }

    pub fn worker_state(&self) -> WorkerState {
        self.worker.state()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.is_some()
    }

    pub fn telemetry(&self) -> TelemetrySnapshot {
        let queue = self.control.queue();
        let (counters, stage_times, queued) = queue.telemetry_parts();
        TelemetrySnapshot::from(&counters, &stage_times, &self.timer, queued, queue.capacity_bytes())
    }
}

impl<F: KFile + 'static> KFile for WriteBehindFile<F> {
    fn capabilities(&self) -> FileCaps {
        FileCaps::WRITE
    }

    fn file_type(&self) -> FileType {
        FileType::Fifo
    }

    fn random_access(&self) -> Result<()> {
        Err(FileError::RandomAccessUnsupported)
    }

    /// Size of the destination when it was opened, or as last set.
    fn size(&self) -> Result<u64> {
        self.size.clone()
    }

    fn set_size(&mut self, size: u64) -> Result<()> {
        WriteBehindFile::set_size(self, size)
    }

    fn read_at(&mut self, _pos: u64, _buf: &mut [u8]) -> Result<usize> {
        Err(FileError::WriteOnly)
    }

    fn write_at(&mut self, pos: u64, buf: &[u8]) -> Result<usize> {
        WriteBehindFile::write_at(self, pos, buf)
    }

    /// Hands the partial block to the worker. Does not wait for it to land.
    fn flush(&mut self) -> Result<()> {
        if self.closed.is_some() {
            return Err(FileError::Sealed);
        }
        if let Some(e) = &self.failed {
            return Err(e.clone());
        }
        self.flush_staging()
    }
}

impl<F: KFile + 'static> io::Write for WriteBehindFile<F> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let pos = self.cursor;
        WriteBehindFile::write_at(self, pos, buf).map_err(io::Error::from)
    }

    fn flush(&mut self) -> io::Result<()> {
        KFile::flush(self).map_err(io::Error::from)
    }
}

impl<F: KFile + 'static> Drop for WriteBehindFile<F> {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!("write-behind close on drop failed: {e}");
        }
    }
}
