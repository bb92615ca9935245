//! queue-file
//!
//! Background read-ahead / write-behind wrappers for positional files.
//! A worker thread moves fixed-size blocks between the wrapped file and a
//! bounded queue while the caller reads or writes at its own pace.

#![forbid(unsafe_code)]

// Shared and top level
pub mod constants;
pub mod types;
pub mod utils;

pub mod file;
pub mod telemetry;

// Transport
pub mod queue;
pub mod worker;

// Front ends
pub mod queue_file;

// -----------------------------------------------------------------------------
// Prelude (Rust users)
// -----------------------------------------------------------------------------
pub mod prelude {
    pub use crate::file::{FileCaps, FileType, KFile, MemFile, StdFile};
    pub use crate::queue_file::{
        make_read_ahead, make_write_behind, QueueFileConfig, ReadAheadFile, WriteBehindFile,
    };
    pub use crate::telemetry::TelemetrySnapshot;
    pub use crate::types::{FileError, Result};
}
