//! Sequential adapters and input/output normalization.
//!
//! A `Read` or `Write` has no notion of position, so these adapters only accept
//! access at their current cursor. That is exactly how the queue file's worker
//! drives them, which makes any stream usable as a read-ahead source or a
//! write-behind destination.

use std::io::{Read, Write};
use std::path::PathBuf;

use crate::file::mem::MemFile;
use crate::file::std_file::StdFile;
use crate::file::types::{require_read, require_write, FileCaps, FileType, KFile};
use crate::types::{FileError, Result};

/// Canonical input abstraction
pub enum InputSource {
    Reader(Box<dyn Read + Send>),
    File(PathBuf),
    Memory(Vec<u8>),
}

/// Canonical output abstraction
pub enum OutputSink {
    Writer(Box<dyn Write + Send>),
    File(PathBuf),
    Memory,
}

/// Normalize an input source into a positional file
pub fn open_input(src: InputSource) -> Result<Box<dyn KFile>> {
    let file: Box<dyn KFile> = match src {
        InputSource::Reader(r) => Box::new(StreamSource::new(r)),
        InputSource::File(p) => Box::new(StdFile::open(p)?),
        InputSource::Memory(b) => Box::new(MemFile::read_only(b)),
    };
    Ok(file)
}

/// Normalize an output sink into a positional file.
///
/// For `OutputSink::Memory` the second element is a handle on the buffer being
/// written, readable once the queue file is closed.
pub fn open_output(sink: OutputSink) -> Result<(Box<dyn KFile>, Option<MemFile>)> {
    match sink {
        OutputSink::Writer(w) => Ok((Box::new(StreamSink::new(w)), None)),
        OutputSink::File(p) => Ok((Box::new(StdFile::create(p)?), None)),
        OutputSink::Memory => {
            let buf = MemFile::write_only();
            Ok((Box::new(buf.clone()), Some(buf)))
        }
    }
}

/// Read-only sequential file over any `Read`.
pub struct StreamSource<R: Read> {
    inner: R,
    cursor: u64,
}

impl<R: Read> StreamSource<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, cursor: 0 }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read + Send> KFile for StreamSource<R> {
    fn capabilities(&self) -> FileCaps {
        FileCaps::READ
    }

    fn file_type(&self) -> FileType {
        FileType::Stream
    }

    fn random_access(&self) -> Result<()> {
        Err(FileError::RandomAccessUnsupported)
    }

    fn size(&self) -> Result<u64> {
        Err(FileError::Unsupported("size of a stream"))
    }

    fn set_size(&mut self, _size: u64) -> Result<()> {
        Err(FileError::ReadOnly)
    }

    fn read_at(&mut self, pos: u64, buf: &mut [u8]) -> Result<usize> {
        require_read(self.capabilities())?;
        if pos != self.cursor {
            return Err(FileError::NonSequential { expected: self.cursor, requested: pos });
        }
        let n = self.inner.read(buf)?;
        self.cursor += n as u64;
        Ok(n)
    }

    fn write_at(&mut self, _pos: u64, _buf: &[u8]) -> Result<usize> {
        Err(FileError::ReadOnly)
    }
}

/// Write-only sequential file over any `Write`.
pub struct StreamSink<W: Write> {
    inner: W,
    cursor: u64,
}

impl<W: Write> StreamSink<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, cursor: 0 }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write + Send> KFile for StreamSink<W> {
    fn capabilities(&self) -> FileCaps {
        FileCaps::WRITE
    }

    fn file_type(&self) -> FileType {
        FileType::Stream
    }

    fn random_access(&self) -> Result<()> {
        Err(FileError::RandomAccessUnsupported)
    }

    /// Bytes written so far.
    fn size(&self) -> Result<u64> {
        Ok(self.cursor)
    }

    fn set_size(&mut self, _size: u64) -> Result<()> {
        Err(FileError::Unsupported("resizing a stream"))
    }

    fn read_at(&mut self, _pos: u64, _buf: &mut [u8]) -> Result<usize> {
        Err(FileError::WriteOnly)
    }

    fn write_at(&mut self, pos: u64, buf: &[u8]) -> Result<usize> {
        require_write(self.capabilities())?;
        if pos != self.cursor {
            return Err(FileError::NonSequential { expected: self.cursor, requested: pos });
        }
        let n = self.inner.write(buf)?;
        self.cursor += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }
}
