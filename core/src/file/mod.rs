//! file: the positional file capability shared by wrapped files and queue files.
//!
//! Responsibilities:
//! - Define the `KFile` trait every wrapped source/destination implements
//! - Provide ready-made files: in-memory, `std::fs::File`, sequential streams
//!
//! Non-responsibilities:
//! - Buffering or threading (see `queue_file`)

pub mod types;
pub mod mem;
pub mod std_file;
pub mod stream;

pub use types::{FileCaps, FileType, KFile};
pub use mem::MemFile;
pub use std_file::StdFile;
pub use stream::{open_input, open_output, InputSource, OutputSink, StreamSink, StreamSource};
