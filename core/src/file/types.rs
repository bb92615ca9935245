use std::fmt;

use bitflags::bitflags;

use crate::types::{FileError, Result};

bitflags! {
    /// Access a file was opened with.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FileCaps: u8 {
        const READ  = 0b01;
        const WRITE = 0b10;
        const READ_WRITE = Self::READ.bits() | Self::WRITE.bits();
    }
}

/// Implementation class of a file, not a content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    File,
    Fifo,
    Stream,
    Memory,
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FileType::File   => "file",
            FileType::Fifo   => "fifo",
            FileType::Stream => "stream",
            FileType::Memory => "memory",
        };
        f.write_str(name)
    }
}

/// Positional file interface.
///
/// Wrapped sources and destinations implement it, and so do the queue files
/// themselves, which lets wrappers stack transparently.
pub trait KFile: Send {
    fn capabilities(&self) -> FileCaps;

    fn file_type(&self) -> FileType {
        FileType::File
    }

    /// `Ok(())` if the file can be addressed at arbitrary positions.
    fn random_access(&self) -> Result<()>;

    fn size(&self) -> Result<u64>;

    fn set_size(&mut self, size: u64) -> Result<()>;

    /// Read up to `buf.len()` bytes at `pos`. `Ok(0)` means end of file.
    fn read_at(&mut self, pos: u64, buf: &mut [u8]) -> Result<usize>;

    /// Write up to `buf.len()` bytes at `pos`, returning how many were taken.
    fn write_at(&mut self, pos: u64, buf: &[u8]) -> Result<usize>;

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn read_enabled(&self) -> bool {
        self.capabilities().contains(FileCaps::READ)
    }

    fn write_enabled(&self) -> bool {
        self.capabilities().contains(FileCaps::WRITE)
    }

    /// Loop on short reads until `buf` is full or the file ends.
    fn read_all_at(&mut self, pos: u64, buf: &mut [u8]) -> Result<usize> {
        let mut total = 0;
        while total < buf.len() {
            let n = self.read_at(pos + total as u64, &mut buf[total..])?;
            if n == 0 {
                break;
            }
            total += n;
        }
        Ok(total)
    }

    /// Loop on short writes until all of `buf` is taken.
    fn write_all_at(&mut self, pos: u64, buf: &[u8]) -> Result<usize> {
        let mut total = 0;
        while total < buf.len() {
            let n = self.write_at(pos + total as u64, &buf[total..])?;
            if n == 0 {
                return Err(std::io::Error::from(std::io::ErrorKind::WriteZero).into());
            }
            total += n;
        }
        Ok(total)
    }
}

impl<F: KFile + ?Sized> KFile for Box<F> {
    fn capabilities(&self) -> FileCaps {
        (**self).capabilities()
    }

    fn file_type(&self) -> FileType {
        (**self).file_type()
    }

    fn random_access(&self) -> Result<()> {
        (**self).random_access()
    }

    fn size(&self) -> Result<u64> {
        (**self).size()
    }

    fn set_size(&mut self, size: u64) -> Result<()> {
        (**self).set_size(size)
    }

    fn read_at(&mut self, pos: u64, buf: &mut [u8]) -> Result<usize> {
        (**self).read_at(pos, buf)
    }

    fn write_at(&mut self, pos: u64, buf: &[u8]) -> Result<usize> {
        (**self).write_at(pos, buf)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }
}

/// Shared guard for the read side of a file's capabilities.
pub(crate) fn require_read(caps: FileCaps) -> Result<()> {
    if caps.contains(FileCaps::READ) {
        Ok(())
    } else if caps.contains(FileCaps::WRITE) {
        Err(FileError::WriteOnly)
    } else {
        Err(FileError::NoPermission)
    }
}

/// Shared guard for the write side of a file's capabilities.
pub(crate) fn require_write(caps: FileCaps) -> Result<()> {
    if caps.contains(FileCaps::WRITE) {
        Ok(())
    } else if caps.contains(FileCaps::READ) {
        Err(FileError::ReadOnly)
    } else {
        Err(FileError::NoPermission)
    }
}
