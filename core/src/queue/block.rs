use bytes::Bytes;

/// Unit of transfer between the queue and the wrapped file.
///
/// `pos` is the block's absolute offset: where it was read from in read
/// mode, where it must be written in write mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pos: u64,
    data: Bytes,
}

impl Block {
    pub fn new(pos: u64, data: Bytes) -> Self {
        Self { pos, data }
    }

    pub fn pos(&self) -> u64 {
        self.pos
    }

    /// Offset one past the last byte.
    pub fn end(&self) -> u64 {
        self.pos + self.data.len() as u64
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
