//! Helpers shared by the integration tests.
#![allow(dead_code)]

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use queue_file::file::{FileCaps, KFile, MemFile};
use queue_file::types::{FileError, Result};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Deterministic non-repeating-looking bytes.
pub fn patterned(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 31 % 251) as u8).collect()
}

/// Read from `f` until end of file, `chunk` bytes at a time.
pub fn read_to_end<F: KFile>(f: &mut F, start: u64, chunk: usize) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let mut buf = vec![0u8; chunk];
    let mut pos = start;
    loop {
        let n = f.read_at(pos, &mut buf)?;
        if n == 0 {
            return Ok(out);
        }
        out.extend_from_slice(&buf[..n]);
        pos += n as u64;
    }
}

/// Readable source that sleeps before every read.
pub struct SlowFile {
    inner: MemFile,
    delay: Duration,
}

impl SlowFile {
    pub fn new(data: Vec<u8>, delay: Duration) -> Self {
        Self {
            inner: MemFile::from_vec(data),
            delay,
        }
    }
}

impl KFile for SlowFile {
    fn capabilities(&self) -> FileCaps {
        FileCaps::READ
    }

    fn random_access(&self) -> Result<()> {
        Ok(())
    }

    fn size(&self) -> Result<u64> {
        self.inner.size()
    }

    fn set_size(&mut self, _size: u64) -> Result<()> {
        Err(FileError::ReadOnly)
    }

    fn read_at(&mut self, pos: u64, buf: &mut [u8]) -> Result<usize> {
        thread::sleep(self.delay);
        self.inner.read_at(pos, buf)
    }

    fn write_at(&mut self, _pos: u64, _buf: &[u8]) -> Result<usize> {
        Err(FileError::ReadOnly)
    }
}

/// In-memory file whose reads and writes start failing after a number of
/// successful calls. The same error instance is returned every time.
pub struct FailingFile {
    inner: MemFile,
    ok_calls: usize,
    calls: Arc<AtomicUsize>,
    error: FileError,
}

impl FailingFile {
    pub fn new(inner: MemFile, ok_calls: usize) -> Self {
        Self {
            inner,
            ok_calls,
            calls: Arc::new(AtomicUsize::new(0)),
            error: io::Error::other("injected failure").into(),
        }
    }

    pub fn error(&self) -> FileError {
        self.error.clone()
    }

    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }

    fn tick(&self) -> Result<()> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call >= self.ok_calls {
            Err(self.error.clone())
        } else {
            Ok(())
        }
    }
}

impl KFile for FailingFile {
    fn capabilities(&self) -> FileCaps {
        self.inner.capabilities()
    }

    fn random_access(&self) -> Result<()> {
        Ok(())
    }

    fn size(&self) -> Result<u64> {
        self.inner.size()
    }

    fn set_size(&mut self, size: u64) -> Result<()> {
        self.inner.set_size(size)
    }

    fn read_at(&mut self, pos: u64, buf: &mut [u8]) -> Result<usize> {
        self.tick()?;
        self.inner.read_at(pos, buf)
    }

    fn write_at(&mut self, pos: u64, buf: &[u8]) -> Result<usize> {
        self.tick()?;
        self.inner.write_at(pos, buf)
    }
}
