//! queue_file/api.rs
//!
//! Positional constructors. Zero `block_size` and zero `timeout_ms` select the
//! defaults.

use crate::file::types::{require_read, require_write};
use crate::file::KFile;
use crate::queue_file::config::QueueFileConfig;
use crate::queue_file::read_ahead::ReadAheadFile;
use crate::queue_file::write_behind::WriteBehindFile;
use crate::types::Result;

/// Wrap `source` for sequential reading from `start_pos`, read ahead by a
/// background thread into a queue of `queue_bytes`.
///
/// # Errors
/// - `InvalidParam` for zero `queue_bytes` or an oversized block.
/// - `WriteOnly` / `NoPermission` if `source` cannot be read.
/// - `RandomAccessUnsupported` for a non-zero `start_pos` on a sequential source.
pub fn make_read_ahead<F: KFile + 'static>(
    start_pos: u64,
    source: F,
    queue_bytes: usize,
    block_size: usize,
    timeout_ms: u32,
) -> Result<ReadAheadFile<F>> {
    ReadAheadFile::with_config(
        start_pos,
        source,
        &QueueFileConfig::new(queue_bytes, block_size, timeout_ms),
    )
}

/// Wrap `dest` so writes are handed to a background thread through a queue
/// of `queue_bytes`.
///
/// # Errors
/// - `InvalidParam` for zero `queue_bytes` or an oversized block.
/// - `ReadOnly` / `NoPermission` if `dest` cannot be written.
pub fn make_write_behind<F: KFile + 'static>(
    dest: F,
    queue_bytes: usize,
    block_size: usize,
    timeout_ms: u32,
) -> Result<WriteBehindFile<F>> {
    WriteBehindFile::with_config(dest, &QueueFileConfig::new(queue_bytes, block_size, timeout_ms))
}

/// Check a read-ahead source without spawning anything.
pub fn validate_source<F: KFile + ?Sized>(
    source: &F,
    start_pos: u64,
    config: &QueueFileConfig,
) -> Result<()> {
    config.validate()?;
    require_read(source.capabilities())?;
    if start_pos != 0 {
        source.random_access()?;
    }
    Ok(())
}

/// Check a write-behind destination without spawning anything.
pub fn validate_destination<F: KFile + ?Sized>(
    dest: &F,
    config: &QueueFileConfig,
) -> Result<()> {
    config.validate()?;
    require_write(dest.capabilities())
}
