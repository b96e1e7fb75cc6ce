//! Command-line interface definition

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "picline")]
#[command(about = "Enrich photo dataset lines with catalog metadata, in parallel")]
#[command(
    long_about = "Enrich photo dataset lines with catalog metadata, in parallel\n\n\
Each input line carries a photo id, its owner and the taken timestamp in fixed\n\
whitespace-separated positions. Every line is looked up against the catalog by a\n\
pool of worker threads; successes stream to stdout as JSON records in completion\n\
order, failures go to the diagnostic stream, and a summary is printed at the end."
)]
#[command(version)]
pub struct Cli {
    /// Dataset file to read, one record per line ("-" for stdin)
    pub file: String,

    /// Photo catalog JSON file answering the lookups
    #[arg(short = 'c', long = "catalog", help_heading = "Lookup Options")]
    pub catalog: PathBuf,

    /// Number of worker threads (1-50), default: available CPUs
    #[arg(short = 'j', long = "workers", help_heading = "Processing Options")]
    pub workers: Option<usize>,

    /// Work queue capacity; 0 hands records directly to a ready worker
    #[arg(long = "queue-depth", default_value_t = 0, help_heading = "Processing Options")]
    pub queue_depth: usize,

    /// Write enriched records to this file instead of stdout
    #[arg(short = 'o', long = "output", help_heading = "Output Options")]
    pub output: Option<PathBuf>,

    /// Only log warnings and errors
    #[arg(short = 'q', long = "quiet", conflicts_with = "verbose", help_heading = "Output Options")]
    pub quiet: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, help_heading = "Output Options")]
    pub verbose: u8,
}
