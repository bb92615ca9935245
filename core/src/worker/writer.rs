//! Write-behind role: queue -> wrapped file.

use std::time::Instant;

use log::{debug, trace, warn};

use crate::file::KFile;
use crate::queue::Pop;
use crate::telemetry::Stage;
use crate::worker::types::{WorkerReport, WorkerRole, WorkerState};
use crate::worker::WorkerContext;

/// Write queued blocks at their own positions until the queue is sealed and
/// drained, or a write fails. On failure the remaining blocks are discarded.
pub(crate) fn run<F: KFile>(ctx: &WorkerContext<F>) -> WorkerReport {
    let control = &ctx.control;
    let queue = control.queue();
    let mut report = WorkerReport::new(WorkerRole::Writer);

    loop {
        control.set_worker_state(WorkerState::WaitingForData);
        let waited = Instant::now();
        let popped = queue.pop(ctx.timeout);
        queue.record_stage(Stage::Wait, waited.elapsed());

        match popped {
            Ok(Pop::Block(block)) => {
                control.set_worker_state(WorkerState::Transferring);
                let started = Instant::now();
                let written = ctx.lock_file().write_all_at(block.pos(), block.data());
                queue.record_stage(Stage::Write, started.elapsed());

                match written {
                    Ok(n) => {
                        trace!("writer: {n} bytes at {}..{}", block.pos(), block.end());
                        report.add_block(n);
                    }
                    Err(e) => {
                        control.fail(e.clone());
                        report.outcome = Err(e);
                        break;
                    }
                }
            }
            Ok(Pop::Empty) => {
                control.set_worker_state(WorkerState::Sleeping);
            }
            Ok(Pop::EndOfStream) => {
                debug!("writer: end of stream after {} bytes", report.bytes);
                if let Err(e) = ctx.lock_file().flush() {
                    control.fail(e.clone());
                    report.outcome = Err(e);
                }
                break;
            }
            Err(e) => {
                report.outcome = Err(e);
                break;
            }
        }
    }

    control.set_worker_state(WorkerState::Draining);
    let dropped = queue.discard_pending();
    if dropped > 0 {
        warn!("writer: discarded {dropped} undelivered blocks");
    }
    control.seal();
    report
}
