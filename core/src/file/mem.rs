use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::file::types::{require_read, require_write, FileCaps, FileType, KFile};
use crate::types::Result;

/// In-memory file over a shared buffer.
///
/// Clones share the same bytes, so a test can hand one clone to a queue file
/// and keep another to inspect what the worker wrote.
#[derive(Debug, Clone)]
pub struct MemFile {
    buf: Arc<Mutex<Vec<u8>>>,
    caps: FileCaps,
}

impl MemFile {
    /// Empty read/write file.
    pub fn new() -> Self {
        Self::with_caps(Vec::new(), FileCaps::READ_WRITE)
    }

    /// Read/write file holding `data`.
    pub fn from_vec(data: Vec<u8>) -> Self {
        Self::with_caps(data, FileCaps::READ_WRITE)
    }

    pub fn read_only(data: Vec<u8>) -> Self {
        Self::with_caps(data, FileCaps::READ)
    }

    pub fn write_only() -> Self {
        Self::with_caps(Vec::new(), FileCaps::WRITE)
    }

    pub fn with_caps(data: Vec<u8>, caps: FileCaps) -> Self {
        Self {
            buf: Arc::new(Mutex::new(data)),
            caps,
        }
    }

    /// Copy of the current contents.
    pub fn contents(&self) -> Vec<u8> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<u8>> {
        self.buf.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MemFile {
    fn default() -> Self {
        Self::new()
    }
}

impl KFile for MemFile {
    fn capabilities(&self) -> FileCaps {
        self.caps
    }

    fn file_type(&self) -> FileType {
        FileType::Memory
    }

    fn random_access(&self) -> Result<()> {
        Ok(())
    }

    fn size(&self) -> Result<u64> {
        Ok(self.lock().len() as u64)
    }

    fn set_size(&mut self, size: u64) -> Result<()> {
        require_write(self.caps)?;
        self.lock().resize(size as usize, 0);
        Ok(())
    }

    fn read_at(&mut self, pos: u64, buf: &mut [u8]) -> Result<usize> {
        require_read(self.caps)?;
        let data = self.lock();
        let start = (pos as usize).min(data.len());
        let n = buf.len().min(data.len() - start);
        buf[..n].copy_from_slice(&data[start..start + n]);
        Ok(n)
    }

    fn write_at(&mut self, pos: u64, buf: &[u8]) -> Result<usize> {
        require_write(self.caps)?;
        let mut data = self.lock();
        let start = pos as usize;
        let end = start + buf.len();
        if data.len() < end {
            // gap beyond the old end reads back as zeros
            data.resize(end, 0);
        }
        data[start..end].copy_from_slice(buf);
        Ok(buf.len())
    }
}
