//! queue: coordination state shared by a front end and its worker.
//!
//! Responsibilities:
//! - Bounded FIFO of byte blocks, metered in bytes
//! - Seal flag and first-error-wins error slot
//!
//! Non-responsibilities:
//! - I/O (the worker owns the wrapped file)
//! - Threading (see `worker`)

pub mod block;
pub mod byte_queue;
pub mod seal;

pub use block::Block;
pub use byte_queue::{ByteQueue, Pop, Push};
pub use seal::SealController;
