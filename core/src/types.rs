use std::io;
use std::sync::Arc;

use thiserror::Error;

/// Unified error covering construction, contract violations, transport state and wrapped-file I/O.
/// - `Clone` so the queue's error slot can hand the same error to every observer.
/// - Ergonomic `From<io::Error>` enables `?` across `KFile` implementations.
#[derive(Debug, Clone, Error)]
pub enum FileError {
    /// Invalid constructor parameter (zero capacity, oversized block, ...).
    #[error("invalid parameter: {0}")]
    InvalidParam(String),

    /// Source or destination has neither read nor write permission.
    #[error("file has no read or write permission")]
    NoPermission,

    /// Read attempted on a write-only file.
    #[error("file is write-only")]
    WriteOnly,

    /// Write attempted on a read-only file.
    #[error("file is read-only")]
    ReadOnly,

    /// The file cannot be addressed at arbitrary positions.
    #[error("random access is not supported")]
    RandomAccessUnsupported,

    /// Sequential adapter addressed away from its cursor.
    #[error("non-sequential access: expected position {expected}, got {requested}")]
    NonSequential { expected: u64, requested: u64 },

    /// Read position moved backwards.
    #[error("attempt to back up from {current} to {requested}")]
    BackedUp { current: u64, requested: u64 },

    /// Push attempted after the queue was sealed.
    #[error("queue is sealed")]
    Sealed,

    /// The background worker went away before the data could be handed off.
    #[error("transfer incomplete: background worker has exited")]
    TransferIncomplete,

    /// Operation the file does not implement.
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),

    /// The background worker panicked.
    #[error("background worker panicked")]
    WorkerPanicked,

    /// I/O error from the wrapped file, shared so it can be reported more than once.
    #[error("I/O error: {0}")]
    Io(Arc<io::Error>),
}

impl FileError {
    /// Once a stream reports one of these, retrying will never make progress.
    pub fn is_unrecoverable(&self) -> bool {
        matches!(
            self,
            FileError::Io(_) | FileError::TransferIncomplete | FileError::WorkerPanicked
        )
    }

    /// True when both errors came from the same recorded failure.
    pub fn same_failure(&self, other: &FileError) -> bool {
        match (self, other) {
            (FileError::Io(a), FileError::Io(b)) => Arc::ptr_eq(a, b),
            _ => self.to_string() == other.to_string(),
        }
    }
}

impl From<io::Error> for FileError {
    fn from(e: io::Error) -> Self {
        FileError::Io(Arc::new(e))
    }
}

impl From<FileError> for io::Error {
    fn from(e: FileError) -> Self {
        let kind = match &e {
            FileError::Io(inner) => inner.kind(),
            FileError::InvalidParam(_) => io::ErrorKind::InvalidInput,
            FileError::NoPermission | FileError::WriteOnly | FileError::ReadOnly => {
                io::ErrorKind::PermissionDenied
            }
            FileError::RandomAccessUnsupported | FileError::Unsupported(_) => {
                io::ErrorKind::Unsupported
            }
            FileError::NonSequential { .. } | FileError::BackedUp { .. } => {
                io::ErrorKind::InvalidInput
            }
            FileError::Sealed | FileError::TransferIncomplete => io::ErrorKind::BrokenPipe,
            FileError::WorkerPanicked => io::ErrorKind::Other,
        };
        io::Error::new(kind, e)
    }
}

pub type Result<T> = std::result::Result<T, FileError>;
