//! Concurrent enrichment pipeline
//!
//! One producer thread streams dataset records to a fixed pool of worker
//! threads over a bounded channel; each worker resolves one record against
//! the photo source and routes the outcome to a success or a failure channel.
//! A single collector merges both result streams, learns the total record
//! count from a side channel the producer fills only after the last record,
//! and terminates once every record is accounted for.
//!
//! # Module Structure
//!
//! - `types`: message and configuration types shared by the threads
//! - `producer`: input reader and work dispatcher
//! - `worker`: per-record enrichment thread
//! - `collector`: result merge, output and termination protocol
//! - `processor`: channel wiring and thread lifetime

mod collector;
mod processor;
mod producer;
mod types;
mod worker;

pub use processor::EnrichPool;
pub use types::{EnrichFailure, Enriched, PoolConfig};
