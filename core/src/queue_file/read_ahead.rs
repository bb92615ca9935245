//! Read-ahead front end.
//!
//! The worker reads the wrapped file sequentially from the start position
//! into the queue. The consumer reads forward from the queue; skipping ahead
//! is allowed, backing up is not.

use std::io;
use std::sync::{Arc, Mutex, PoisonError};

use log::{debug, warn};

use crate::file::{FileCaps, FileType, KFile};
use crate::queue::{Block, ByteQueue, Pop, SealController};
use crate::queue_file::api::validate_source;
use crate::queue_file::config::QueueFileConfig;
use crate::telemetry::{TelemetrySnapshot, TelemetryTimer};
use crate::types::{FileError, Result};
use crate::worker::{Worker, WorkerContext, WorkerState};

pub struct ReadAheadFile<F: KFile + 'static> {
    file: Arc<Mutex<F>>,
    control: Arc<SealController>,
    worker: Worker,
    config: QueueFileConfig,
    /// Size of the source when it was opened.
    size: Result<u64>,
    start_pos: u64,
    next_pos: u64,
    /// Block being consumed and how far into it the consumer is.
    current: Option<Block>,
    offset: usize,
    eof: bool,
    failed: Option<FileError>,
    timer: TelemetryTimer,
    closed: Option<Result<()>>,
}

impl<F: KFile + 'static> ReadAheadFile<F> {
    /// Wrap `source`, starting the reader worker at `start_pos`.
    ///
    /// A non-zero start position needs a randomly accessible source.
    pub fn with_config(start_pos: u64, source: F, config: &QueueFileConfig) -> Result<Self> {
        validate_source(&source, start_pos, config)?;
        let config = config.resolved();
        let size = source.size();

        let queue = Arc::new(ByteQueue::new(config.queue_bytes, config.block_size));
        let control = Arc::new(SealController::new(queue));
        let file = Arc::new(Mutex::new(source));
        let worker = Worker::spawn_reader(
            WorkerContext {
                file: Arc::clone(&file),
                control: Arc::clone(&control),
                block_size: config.block_size,
                timeout: config.timeout(),
            },
            start_pos,
        )?;
        debug!(
            "read-ahead opened at {start_pos}: {} blocks of {} bytes, timeout {} ms",
            config.queue_depth(),
            config.block_size,
            config.timeout_ms
        );

        Ok(Self {
            file,
            control,
            worker,
            config,
            size,
            start_pos,
            next_pos: start_pos,
            current: None,
            offset: 0,
            eof: false,
            failed: None,
            timer: TelemetryTimer::new(),
            closed: None,
        })
    }

    /// Read up to `buf.len()` bytes at `pos`, assembling across blocks.
    ///
    /// `pos` must not be behind the position following the previous read.
    /// A position ahead of it skips the bytes in between. Returns `Ok(0)`
    /// at end of file. A failure of the wrapped file is returned on this and
    /// every later read.
    pub fn read_at(&mut self, pos: u64, buf: &mut [u8]) -> Result<usize> {
        if self.closed.is_some() {
            return Err(FileError::Sealed);
        }
        if let Some(e) = &self.failed {
            return Err(e.clone());
        }
        if pos < self.next_pos {
            return Err(FileError::BackedUp {
                current: self.next_pos,
                requested: pos,
            });
        }
        if buf.is_empty() {
            return Ok(0);
        }

        let mut skip = pos - self.next_pos;
        let mut filled = 0;
        while filled < buf.len() {
            let available = self.current.as_ref().map_or(0, |b| b.len() - self.offset);
            if available == 0 {
                if self.eof || !self.advance()? {
                    break;
                }
                continue;
            }

            let n = if skip > 0 {
                let n = (skip.min(available as u64)) as usize;
                skip -= n as u64;
                n
            } else {
                let n = available.min(buf.len() - filled);
                if let Some(block) = &self.current {
                    buf[filled..filled + n]
                        .copy_from_slice(&block.data()[self.offset..self.offset + n]);
                }
                filled += n;
                n
            };
            self.offset += n;
            self.next_pos += n as u64;
        }
        Ok(filled)
    }

    /// Swap in the next queued block. `Ok(false)` at end of stream.
    fn advance(&mut self) -> Result<bool> {
        self.current = None;
        self.offset = 0;
        loop {
            match self.control.queue().pop(self.config.timeout()) {
                Ok(Pop::Block(block)) => {
                    debug_assert_eq!(block.pos(), self.next_pos);
                    self.current = Some(block);
                    return Ok(true);
                }
                // timed out; the worker is still going
                Ok(Pop::Empty) => continue,
                Ok(Pop::EndOfStream) => {
                    debug!("read-ahead: end of stream at {}", self.next_pos);
                    self.eof = true;
                    return Ok(false);
                }
                Err(e) => {
                    self.failed = Some(e.clone());
                    return Err(e);
                }
            }
        }
    }

    /// Stop the worker and drop everything it read ahead. Idempotent.
    ///
    /// Only a panicked worker makes this fail; read errors were already
    /// reported through `read_at`.
    pub fn close(&mut self) -> Result<()> {
        if let Some(result) = &self.closed {
            return result.clone();
        }
        let queue = Arc::clone(self.control.queue());
        self.control.seal();
        let mut dropped = queue.discard_pending();
        self.current = None;

        let report = self.worker.join();
        dropped += queue.discard_pending();
        self.timer.finish();
        debug!(
            "read-ahead closed at {}: worker read {} bytes, {dropped} blocks discarded",
            self.next_pos, report.bytes
        );

        let result = match report.outcome {
            Err(FileError::WorkerPanicked) => Err(FileError::WorkerPanicked),
            _ => Ok(()),
        };
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

    /// Offset the next sequential read starts at.
    pub fn position(&self) -> u64 {
        self.next_pos
    }

    pub fn start_position(&self) -> u64 {
        self.start_pos
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

impl<F: KFile + 'static> KFile for ReadAheadFile<F> {
    fn capabilities(&self) -> FileCaps {
        FileCaps::READ
    }

    fn file_type(&self) -> FileType {
        FileType::Fifo
    }

    fn random_access(&self) -> Result<()> {
        Err(FileError::RandomAccessUnsupported)
    }

    fn size(&self) -> Result<u64> {
        self.size.clone()
    }

    fn set_size(&mut self, _size: u64) -> Result<()> {
        Err(FileError::ReadOnly)
    }

    fn read_at(&mut self, pos: u64, buf: &mut [u8]) -> Result<usize> {
        ReadAheadFile::read_at(self, pos, buf)
    }

    fn write_at(&mut self, _pos: u64, _buf: &[u8]) -> Result<usize> {
        Err(FileError::ReadOnly)
    }
}

impl<F: KFile + 'static> io::Read for ReadAheadFile<F> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let pos = self.next_pos;
        ReadAheadFile::read_at(self, pos, buf).map_err(io::Error::from)
    }
}

impl<F: KFile + 'static> Drop for ReadAheadFile<F> {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!("read-ahead close on drop failed: {e}");
        }
    }
}
