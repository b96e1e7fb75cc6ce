//! Pool orchestration: channel wiring and thread lifetime

use std::io::{BufRead, Write};
use std::sync::Arc;
use std::thread;

use anyhow::Result;
use crossbeam_channel::bounded;

use crate::enrich::PhotoSource;
use crate::pool::collector::collector_thread;
use crate::pool::producer::producer_thread;
use crate::pool::types::PoolConfig;
use crate::pool::worker::worker_thread;
use crate::stats::RunStats;

/// The fan-out/fan-in pipeline: one producer, a fixed pool of workers and
/// one collector, all joined before the run statistics are returned. The
/// orchestrator itself processes no data.
pub struct EnrichPool {
    config: PoolConfig,
}

impl EnrichPool {
    pub fn new(config: PoolConfig) -> Self {
        Self { config }
    }

    pub fn run<R, W>(
        &self,
        reader: R,
        source: Arc<dyn PhotoSource>,
        output: W,
    ) -> Result<RunStats>
    where
        R: BufRead + Send + 'static,
        W: Write + Send + 'static,
    {
        let (work_tx, work_rx) = bounded(self.config.queue_depth);
        let (ok_tx, ok_rx) = bounded(self.config.workers * 4);
        let (err_tx, err_rx) = bounded(self.config.workers * 4);
        let (count_tx, count_rx) = bounded(1);

        let producer_handle = {
            let fail_tx = err_tx.clone();
            thread::spawn(move || producer_thread(reader, work_tx, fail_tx, count_tx))
        };

        let mut worker_handles = Vec::with_capacity(self.config.workers);
        for worker_id in 0..self.config.workers {
            let work_rx = work_rx.clone();
            let ok_tx = ok_tx.clone();
            let fail_tx = err_tx.clone();
            let source = Arc::clone(&source);

            worker_handles.push(thread::spawn(move || {
                worker_thread(worker_id, work_rx, ok_tx, fail_tx, source)
            }));
        }

        // Drop the original handles so the result channels close once the
        // producer and every worker are done.
        drop(work_rx);
        drop(ok_tx);
        drop(err_tx);

        let collector_handle = thread::spawn(move || {
            let mut output = output;
            collector_thread(ok_rx, err_rx, count_rx, &mut output)
        });

        let producer_result = producer_handle
            .join()
            .unwrap_or_else(|e| panic!("producer thread panicked: {e:?}"));

        for (idx, handle) in worker_handles.into_iter().enumerate() {
            handle
                .join()
                .unwrap_or_else(|e| panic!("worker thread {idx} panicked: {e:?}"));
        }

        let collector_result = collector_handle
            .join()
            .unwrap_or_else(|e| panic!("collector thread panicked: {e:?}"));

        // A failed producer makes the collector report a secondary protocol
        // error; the producer's error is the root cause.
        if let Err(err) = producer_result {
            return Err(err);
        }
        collector_result
    }
}
