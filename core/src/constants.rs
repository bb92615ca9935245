//! constants.rs
//! Defaults applied when a caller passes zero for a tuning knob.

/// Block size used when the caller passes `0`.
pub const DEFAULT_BLOCK_SIZE: usize = 64 * 1024; // 64 KiB

/// Poll timeout used when the caller passes `0`.
pub const DEFAULT_TIMEOUT_MS: u32 = 150;

/// Queue capacity used by `QueueFileConfig::default()`.
pub const DEFAULT_QUEUE_BYTES: usize = 1024 * 1024; // 1 MiB

/// Max block size sanity bound (32 MiB).
pub const MAX_BLOCK_SIZE: usize = 32 * 1024 * 1024;

/// Upper bound on queue depth picked by `QueueFileConfig::dynamic`.
pub const DEFAULT_MAX_QUEUE_BLOCKS: usize = 64;

/// Names given to the background threads.
pub mod thread_names {
    pub const READER: &str = "queue-file-reader";
    pub const WRITER: &str = "queue-file-writer";
}
