//! queue_file: read-ahead and write-behind wrappers around a `KFile`.

pub mod api;
pub mod config;
pub mod read_ahead;
pub mod write_behind;

pub use api::{make_read_ahead, make_write_behind, validate_destination, validate_source};
pub use config::QueueFileConfig;
pub use read_ahead::ReadAheadFile;
pub use write_behind::WriteBehindFile;
