use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::file::types::{require_read, require_write, FileCaps, KFile};
use crate::types::Result;

/// A `std::fs::File` addressed by position.
///
/// Tracks the OS cursor so sequential access does not pay for a seek per call.
#[derive(Debug)]
pub struct StdFile {
    inner: File,
    caps: FileCaps,
    cursor: Option<u64>,
}

impl StdFile {
    /// Open an existing file for reading.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let inner = File::open(path)?;
        Ok(Self::from_file(inner, FileCaps::READ))
    }

    /// Create (or truncate) a file for writing.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let inner = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        Ok(Self::from_file(inner, FileCaps::READ_WRITE))
    }

    /// Wrap an already opened file; `caps` must match how it was opened.
    pub fn from_file(inner: File, caps: FileCaps) -> Self {
        Self {
            inner,
            caps,
            cursor: None,
        }
    }

    pub fn into_inner(self) -> File {
        self.inner
    }

    fn seek_to(&mut self, pos: u64) -> Result<()> {
        if self.cursor != Some(pos) {
            self.inner.seek(SeekFrom::Start(pos))?;
            self.cursor = Some(pos);
        }
        Ok(())
    }
}

impl KFile for StdFile {
    fn capabilities(&self) -> FileCaps {
        self.caps
    }

    fn random_access(&self) -> Result<()> {
        Ok(())
    }

    fn size(&self) -> Result<u64> {
        Ok(self.inner.metadata()?.len())
    }

    fn set_size(&mut self, size: u64) -> Result<()> {
        require_write(self.caps)?;
        self.inner.set_len(size)?;
        Ok(())
    }

    fn read_at(&mut self, pos: u64, buf: &mut [u8]) -> Result<usize> {
        require_read(self.caps)?;
        self.seek_to(pos)?;
        let result = self.inner.read(buf);
        match result {
            Ok(n) => {
                self.cursor = Some(pos + n as u64);
                Ok(n)
            }
            Err(e) => {
                self.cursor = None;
                Err(e.into())
            }
        }
    }

    fn write_at(&mut self, pos: u64, buf: &[u8]) -> Result<usize> {
        require_write(self.caps)?;
        self.seek_to(pos)?;
        let result = self.inner.write(buf);
        match result {
            Ok(n) => {
                self.cursor = Some(pos + n as u64);
                Ok(n)
            }
            Err(e) => {
                self.cursor = None;
                Err(e.into())
            }
        }
    }

    fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }
}
