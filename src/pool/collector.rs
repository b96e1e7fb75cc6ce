//! Collector: merges both result streams and decides when the run is done
//!
//! Termination needs two facts, learned on independent channels: the total
//! number of records the producer dispatched, and the number of results
//! consumed so far. The total arrives at most once, on a side channel the
//! producer fills only after the last record, and it may show up before,
//! between or after any of the results. The loop below therefore blocks on
//! whichever of the three sources is ready and re-checks `consumed == total`
//! after every event. A source that is finished is swapped for a channel
//! that never becomes ready, so a closed count channel can never be read as
//! "total = 0" and the wait never degenerates into a poll.

use std::io::Write;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use crossbeam_channel::{never, select, Receiver};
use log::{debug, warn};

use crate::pool::types::{EnrichFailure, Enriched};
use crate::stats::RunStats;

pub(crate) fn collector_thread<W: Write>(
    mut ok_rx: Receiver<Enriched>,
    mut err_rx: Receiver<EnrichFailure>,
    mut count_rx: Receiver<u64>,
    output: &mut W,
) -> Result<RunStats> {
    let started = Instant::now();
    let mut stats = RunStats::default();
    let mut total: Option<u64> = None;
    let mut count_done = false;
    let mut ok_open = true;
    let mut err_open = true;

    loop {
        if let Some(total) = total {
            if stats.results() == total {
                break;
            }
        }

        // Every source is gone with records still unaccounted for: a worker
        // died without reporting. Fail loudly instead of waiting forever.
        if count_done && !ok_open && !err_open {
            match total {
                Some(total) => bail!(
                    "result channels closed after {} of {} results",
                    stats.results(),
                    total
                ),
                None => bail!("result channels closed before a total count was published"),
            }
        }

        select! {
            recv(count_rx) -> msg => match msg {
                Ok(count) => {
                    debug!("collector: total record count received: {count}");
                    total = Some(count);
                    stats.lines = count;
                    count_done = true;
                }
                Err(_) => {
                    // Closed without a value. Distinct from total = 0: keep
                    // draining results and let the check above report the
                    // protocol violation if they close too.
                    count_done = true;
                }
            },
            recv(ok_rx) -> msg => match msg {
                Ok(enriched) => {
                    writeln!(output, "{}", enriched.json)
                        .context("failed writing enriched record")?;
                    output.flush().context("failed flushing output")?;
                    debug!("collector: {}: ok", enriched.id);
                    stats.ok += 1;
                }
                Err(_) => ok_open = false,
            },
            recv(err_rx) -> msg => match msg {
                Ok(failure) => {
                    warn!(
                        "line {} ({}): {}",
                        failure.line_no,
                        failure.id.as_deref().unwrap_or("?"),
                        failure.error
                    );
                    stats.errors += 1;
                }
                Err(_) => err_open = false,
            },
        }

        // Retire finished sources: the count arrives at most once and a
        // closed channel would otherwise be ready on every pass.
        if count_done {
            count_rx = never();
        }
        if !ok_open {
            ok_rx = never();
        }
        if !err_open {
            err_rx = never();
        }
    }

    stats.elapsed = started.elapsed();
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrich::EnrichError;
    use crossbeam_channel::{unbounded, Sender};

    type Channels = (
        Sender<Enriched>,
        Receiver<Enriched>,
        Sender<EnrichFailure>,
        Receiver<EnrichFailure>,
        Sender<u64>,
        Receiver<u64>,
    );

    fn channels() -> Channels {
        let (ok_tx, ok_rx) = unbounded();
        let (err_tx, err_rx) = unbounded();
        let (count_tx, count_rx) = unbounded();
        (ok_tx, ok_rx, err_tx, err_rx, count_tx, count_rx)
    }

    fn enriched(id: &str) -> Enriched {
        Enriched {
            id: id.to_string(),
            json: format!("{{\"id\":\"{id}\"}}"),
        }
    }

    fn failure(line_no: usize, id: &str) -> EnrichFailure {
        EnrichFailure {
            line_no,
            id: Some(id.to_string()),
            error: EnrichError::Transport("unreachable".to_string()),
        }
    }

    #[test]
    fn terminates_when_count_arrives_first() {
        let (ok_tx, ok_rx, err_tx, err_rx, count_tx, count_rx) = channels();
        count_tx.send(3).unwrap();
        ok_tx.send(enriched("1")).unwrap();
        ok_tx.send(enriched("2")).unwrap();
        err_tx.send(failure(3, "3")).unwrap();

        let mut out = Vec::new();
        let stats = collector_thread(ok_rx, err_rx, count_rx, &mut out).unwrap();

        assert_eq!((stats.lines, stats.ok, stats.errors), (3, 2, 1));
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("\"id\":\"1\""));
        assert!(text.contains("\"id\":\"2\""));
    }

    #[test]
    fn terminates_when_count_arrives_last() {
        let (ok_tx, ok_rx, err_tx, err_rx, count_tx, count_rx) = channels();
        ok_tx.send(enriched("1")).unwrap();
        err_tx.send(failure(2, "2")).unwrap();
        drop(ok_tx);
        drop(err_tx);
        count_tx.send(2).unwrap();

        let mut out = Vec::new();
        let stats = collector_thread(ok_rx, err_rx, count_rx, &mut out).unwrap();
        assert_eq!((stats.lines, stats.ok, stats.errors), (2, 1, 1));
    }

    #[test]
    fn terminates_when_count_is_interleaved() {
        let (ok_tx, ok_rx, err_tx, err_rx, count_tx, count_rx) = channels();
        ok_tx.send(enriched("1")).unwrap();
        count_tx.send(3).unwrap();
        ok_tx.send(enriched("2")).unwrap();
        err_tx.send(failure(3, "3")).unwrap();

        let mut out = Vec::new();
        let stats = collector_thread(ok_rx, err_rx, count_rx, &mut out).unwrap();
        assert_eq!((stats.lines, stats.ok, stats.errors), (3, 2, 1));
    }

    #[test]
    fn empty_run_terminates_without_results() {
        let (ok_tx, ok_rx, err_tx, err_rx, count_tx, count_rx) = channels();
        count_tx.send(0).unwrap();
        drop(ok_tx);
        drop(err_tx);

        let mut out = Vec::new();
        let stats = collector_thread(ok_rx, err_rx, count_rx, &mut out).unwrap();
        assert_eq!(stats, RunStats { elapsed: stats.elapsed, ..RunStats::default() });
        assert!(out.is_empty());
    }

    #[test]
    fn closed_count_channel_is_not_a_zero_total() {
        let (ok_tx, ok_rx, err_tx, err_rx, count_tx, count_rx) = channels();
        // The count channel closes without a value while a result is still
        // pending; the collector must consume the result, not stop at 0.
        drop(count_tx);
        ok_tx.send(enriched("1")).unwrap();
        drop(ok_tx);
        drop(err_tx);

        let mut out = Vec::new();
        let err = collector_thread(ok_rx, err_rx, count_rx, &mut out).unwrap_err();
        assert!(err.to_string().contains("before a total count"));
        // The pending result was still drained and written.
        assert!(!out.is_empty());
    }

    #[test]
    fn missing_results_are_a_protocol_error() {
        let (ok_tx, ok_rx, err_tx, err_rx, count_tx, count_rx) = channels();
        count_tx.send(3).unwrap();
        ok_tx.send(enriched("1")).unwrap();
        ok_tx.send(enriched("2")).unwrap();
        drop(ok_tx);
        drop(err_tx);

        let mut out = Vec::new();
        let err = collector_thread(ok_rx, err_rx, count_rx, &mut out).unwrap_err();
        assert!(err.to_string().contains("after 2 of 3 results"));
    }
}
