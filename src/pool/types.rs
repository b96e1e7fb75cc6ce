//! Message and configuration types for the enrichment pool

use crate::config::MAX_WORKERS;
use crate::enrich::EnrichError;

/// Pool sizing. A `queue_depth` of 0 makes the work channel a rendezvous
/// channel: the producer blocks until a worker is ready to take the record,
/// so it can never race ahead of the pool.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub workers: usize,
    pub queue_depth: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            workers: num_cpus::get().clamp(1, MAX_WORKERS),
            queue_depth: 0,
        }
    }
}

/// Successful enrichment of one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enriched {
    pub id: String,
    pub json: String,
}

/// Failed enrichment of one record. `id` is absent when the line was too
/// malformed to extract one.
#[derive(Debug)]
pub struct EnrichFailure {
    pub line_no: usize,
    pub id: Option<String>,
    pub error: EnrichError,
}
