//! Worker: resolves one record at a time against the photo source

use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender};
use log::debug;

use crate::enrich::{enrich_record, PhotoSource};
use crate::pool::types::{EnrichFailure, Enriched};
use crate::record::DatasetRecord;

/// Pull records until the work queue is closed and drained. Each record
/// produces exactly one message on exactly one of the result channels.
/// Workers hold no shared mutable state and shut down independently.
pub(crate) fn worker_thread(
    worker_id: usize,
    work_rx: Receiver<DatasetRecord>,
    ok_tx: Sender<Enriched>,
    fail_tx: Sender<EnrichFailure>,
    source: Arc<dyn PhotoSource>,
) {
    debug!("worker {worker_id}: starting");

    while let Ok(record) = work_rx.recv() {
        debug!(
            "worker {worker_id}: processing line {} (id {})",
            record.line_no, record.id
        );

        match enrich_record(source.as_ref(), &record) {
            Ok(json) => {
                let enriched = Enriched { id: record.id, json };
                if ok_tx.send(enriched).is_err() {
                    break; // collector is gone, nothing left to report to
                }
            }
            Err(error) => {
                let failure = EnrichFailure {
                    line_no: record.line_no,
                    id: Some(record.id),
                    error,
                };
                if fail_tx.send(failure).is_err() {
                    break;
                }
            }
        }
    }

    debug!("worker {worker_id}: finished");
}
