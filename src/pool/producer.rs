//! Producer: streams records into the pool and publishes the total count

use std::io::BufRead;

use anyhow::{bail, Context, Result};
use crossbeam_channel::Sender;
use log::debug;

use crate::enrich::EnrichError;
use crate::pool::types::EnrichFailure;
use crate::record::DatasetRecord;

/// Read dataset lines and hand each record to the workers. Malformed lines
/// become failure results directly and the run continues, so every line is
/// accounted for by exactly one result.
///
/// The total line count is published on `count_tx` only after the last line
/// has been handed off; dropping the senders afterwards is what tells the
/// workers that nothing more will ever arrive.
pub(crate) fn producer_thread<R: BufRead>(
    reader: R,
    work_tx: Sender<DatasetRecord>,
    fail_tx: Sender<EnrichFailure>,
    count_tx: Sender<u64>,
) -> Result<()> {
    let mut lines = 0u64;

    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.with_context(|| format!("failed reading input at line {line_no}"))?;
        lines += 1;

        match DatasetRecord::parse(line_no, &line) {
            Ok(record) => {
                debug!("producer: dispatching line {line_no} (id {})", record.id);
                if work_tx.send(record).is_err() {
                    bail!("work queue closed before all records were dispatched");
                }
            }
            Err(err) => {
                let failure = EnrichFailure {
                    line_no,
                    id: DatasetRecord::probable_id(&line),
                    error: EnrichError::InvalidRecord(err),
                };
                if fail_tx.send(failure).is_err() {
                    bail!("failure queue closed before all records were dispatched");
                }
            }
        }
    }

    debug!("producer: dispatched {lines} lines");
    count_tx
        .send(lines)
        .map_err(|_| anyhow::anyhow!("count channel closed before the total was published"))?;

    Ok(())
    // work_tx, fail_tx and count_tx drop here, closing the producer's side.
}
