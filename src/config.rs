//! Validated runtime configuration derived from the CLI

use std::path::PathBuf;

use anyhow::{bail, Result};

use crate::cli::Cli;

/// Upper bound on the worker pool size.
pub const MAX_WORKERS: usize = 50;

/// Where the dataset lines come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Stdin,
    File(PathBuf),
}

/// All validated settings for one run.
#[derive(Debug, Clone)]
pub struct Config {
    pub input: Input,
    pub catalog: PathBuf,
    pub workers: usize,
    pub queue_depth: usize,
    pub output: Option<PathBuf>,
}

impl Config {
    /// Validate CLI arguments for early error detection. A bad pool size is
    /// a startup error: the run must not begin with it.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let workers = match cli.workers {
            Some(0) => bail!("--workers must be at least 1"),
            Some(n) if n > MAX_WORKERS => {
                bail!("--workers must be between 1 and {}", MAX_WORKERS)
            }
            Some(n) => n,
            None => num_cpus::get().clamp(1, MAX_WORKERS),
        };

        let input = if cli.file == "-" {
            Input::Stdin
        } else {
            Input::File(PathBuf::from(&cli.file))
        };

        Ok(Self {
            input,
            catalog: cli.catalog.clone(),
            workers,
            queue_depth: cli.queue_depth,
            output: cli.output.clone(),
        })
    }
}
