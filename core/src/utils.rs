use std::time::Duration;

use crate::constants::{DEFAULT_BLOCK_SIZE, DEFAULT_TIMEOUT_MS};

/// Zero block size means default.
pub fn effective_block_size(requested: usize) -> usize {
    if requested == 0 {
        DEFAULT_BLOCK_SIZE
    } else {
        requested
    }
}

/// Zero timeout means default.
pub fn effective_timeout(timeout_ms: u32) -> Duration {
    let ms = if timeout_ms == 0 { DEFAULT_TIMEOUT_MS } else { timeout_ms };
    Duration::from_millis(u64::from(ms))
}

/// Queue capacity expressed in blocks, rounded up, never less than one.
pub fn queue_depth_in_blocks(queue_bytes: usize, block_size: usize) -> usize {
    let block_size = effective_block_size(block_size);
    queue_bytes.div_ceil(block_size).max(1)
}
