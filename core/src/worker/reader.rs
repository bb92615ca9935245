//! Read-ahead role: wrapped file -> queue.

use std::time::Instant;

use bytes::BytesMut;
use log::{debug, trace};

use crate::file::KFile;
use crate::queue::{Block, Push};
use crate::telemetry::Stage;
use crate::types::FileError;
use crate::worker::types::{WorkerReport, WorkerRole, WorkerState};
use crate::worker::WorkerContext;

/// Read blocks from `start_pos` until end of file, a read error, or a seal.
/// The queue is always sealed on the way out.
pub(crate) fn run<F: KFile>(ctx: &WorkerContext<F>, start_pos: u64) -> WorkerReport {
    let control = &ctx.control;
    let queue = control.queue();
    let mut report = WorkerReport::new(WorkerRole::Reader);
    let mut pos = start_pos;

    'blocks: loop {
        if control.is_sealed() {
            debug!("reader: sealed by consumer at {pos}");
            break;
        }

        control.set_worker_state(WorkerState::Transferring);
        let mut buf = BytesMut::zeroed(ctx.block_size);
        let started = Instant::now();
        let read = ctx.lock_file().read_all_at(pos, &mut buf);
        queue.record_stage(Stage::Read, started.elapsed());

        let n = match read {
            Ok(0) => {
                debug!("reader: end of file at {pos}");
                break;
            }
            Ok(n) => n,
            Err(e) => {
                control.fail(e.clone());
                report.outcome = Err(e);
                break;
            }
        };
        buf.truncate(n);
        let mut block = Block::new(pos, buf.freeze());

        loop {
            control.set_worker_state(WorkerState::WaitingForSpace);
            let waited = Instant::now();
            let pushed = queue.push(block, ctx.timeout);
            queue.record_stage(Stage::Wait, waited.elapsed());

            match pushed {
                Ok(Push::Queued) => break,
                Ok(Push::WouldBlock(back)) => {
                    control.set_worker_state(WorkerState::Sleeping);
                    trace!("reader: queue full at {pos}, retrying");
                    block = back;
                }
                Err(FileError::Sealed) => {
                    debug!("reader: sealed while holding block at {pos}");
                    break 'blocks;
                }
                Err(e) => {
                    report.outcome = Err(e);
                    break 'blocks;
                }
            }
        }

        report.add_block(n);
        pos += n as u64;
    }

    control.set_worker_state(WorkerState::Draining);
    control.seal();
    report
}
