//! telemetry/mod.rs
//! Transfer counters, stage timers, and immutable snapshots for queue files.
//!
//! Counters live inside the queue's mutex and are updated as blocks move.
//! A snapshot is taken on demand by the front end and is serializable so a
//! loader can emit it alongside its own statistics.

pub mod counters;
pub mod timers;
pub mod snapshot;

pub use counters::*;
pub use timers::*;
pub use snapshot::*;
