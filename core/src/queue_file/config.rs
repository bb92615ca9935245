//! queue_file/config.rs
//!
//! Tuning knobs for a queue file. Zero block size and zero timeout select the
//! defaults from `constants`.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use sysinfo::System;

use crate::constants::{DEFAULT_MAX_QUEUE_BLOCKS, DEFAULT_QUEUE_BYTES, MAX_BLOCK_SIZE};
use crate::types::{FileError, Result};
use crate::utils::{effective_block_size, effective_timeout, queue_depth_in_blocks};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueFileConfig {
    /// Queue capacity in bytes.
    pub queue_bytes: usize,
    /// Bytes per block; `0` selects `DEFAULT_BLOCK_SIZE`.
    pub block_size: usize,
    /// Poll interval in milliseconds; `0` selects `DEFAULT_TIMEOUT_MS`.
    pub timeout_ms: u32,
}

impl Default for QueueFileConfig {
    fn default() -> Self {
        Self {
            queue_bytes: DEFAULT_QUEUE_BYTES,
            block_size: 0,
            timeout_ms: 0,
        }
    }
}

impl QueueFileConfig {
    pub fn new(queue_bytes: usize, block_size: usize, timeout_ms: u32) -> Self {
        Self {
            queue_bytes,
            block_size,
            timeout_ms,
        }
    }

    pub fn with_queue_bytes(mut self, queue_bytes: usize) -> Self {
        self.queue_bytes = queue_bytes;
        self
    }

    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u32) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Size queue capacity from currently available memory.
    ///
    /// Takes `mem_fraction` of available memory, rounded down to whole blocks,
    /// clamped to `1..=max_blocks` (`0` means `DEFAULT_MAX_QUEUE_BLOCKS`).
    pub fn dynamic(block_size: usize, mem_fraction: f64, max_blocks: usize) -> Self {
        let block_size = effective_block_size(block_size);
        let max_blocks = if max_blocks == 0 { DEFAULT_MAX_QUEUE_BLOCKS } else { max_blocks };

        let mut sys = System::new();
        sys.refresh_memory();
        let available = sys.available_memory();

        let fraction = if mem_fraction.is_finite() { mem_fraction.clamp(0.0, 1.0) } else { 0.0 };
        let budget = (available as f64 * fraction) as u64;
        let blocks = (budget / block_size as u64).clamp(1, max_blocks as u64) as usize;

        Self {
            queue_bytes: blocks * block_size,
            block_size,
            timeout_ms: 0,
        }
    }

    pub fn effective_block_size(&self) -> usize {
        effective_block_size(self.block_size)
    }

    pub fn timeout(&self) -> Duration {
        effective_timeout(self.timeout_ms)
    }

    pub fn queue_depth(&self) -> usize {
        queue_depth_in_blocks(self.queue_bytes, self.block_size)
    }

    /// Copy with defaults substituted for zero knobs.
    pub fn resolved(&self) -> Self {
        Self {
            queue_bytes: self.queue_bytes,
            block_size: self.effective_block_size(),
            timeout_ms: self.timeout().as_millis() as u32,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.queue_bytes == 0 {
            return Err(FileError::InvalidParam("queue_bytes must be greater than zero".into()));
        }
        let block_size = self.effective_block_size();
        if block_size > MAX_BLOCK_SIZE {
            return Err(FileError::InvalidParam(format!(
                "block_size {block_size} exceeds maximum {MAX_BLOCK_SIZE}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{DEFAULT_BLOCK_SIZE, DEFAULT_TIMEOUT_MS};

    #[test]
    fn resolved_fills_defaults() {
        let cfg = QueueFileConfig::new(100, 0, 0).resolved();
        assert_eq!(cfg.block_size, DEFAULT_BLOCK_SIZE);
        assert_eq!(cfg.timeout_ms, DEFAULT_TIMEOUT_MS);
        assert_eq!(cfg.queue_bytes, 100);
    }

    #[test]
    fn validate_rejects_bad_knobs() {
        assert!(matches!(
            QueueFileConfig::new(0, 10, 10).validate(),
            Err(FileError::InvalidParam(_))
        ));
        assert!(matches!(
            QueueFileConfig::new(10, MAX_BLOCK_SIZE + 1, 10).validate(),
            Err(FileError::InvalidParam(_))
        ));
        assert!(QueueFileConfig::new(1, 10, 0).validate().is_ok());
    }

    #[test]
    fn dynamic_respects_bounds() {
        let cfg = QueueFileConfig::dynamic(4096, 0.5, 8);
        assert_eq!(cfg.block_size, 4096);
        assert!(cfg.queue_bytes >= 4096);
        assert!(cfg.queue_bytes <= 8 * 4096);
        assert_eq!(cfg.queue_bytes % 4096, 0);

        let tiny = QueueFileConfig::dynamic(4096, 0.0, 8);
        assert_eq!(tiny.queue_bytes, 4096);
    }

    #[test]
    fn builders_chain() {
        let cfg = QueueFileConfig::default()
            .with_queue_bytes(64)
            .with_block_size(16)
            .with_timeout_ms(5);
        assert_eq!(cfg, QueueFileConfig::new(64, 16, 5));
        assert_eq!(cfg.queue_depth(), 4);
    }
}
