use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use picline::cli::Cli;
use picline::config::{Config, Input};
use picline::enrich::CatalogLookup;
use picline::pool::{EnrichPool, PoolConfig};

fn main() {
    let cli = Cli::parse();
    init_logging(&cli);

    if let Err(err) = run(&cli) {
        eprintln!("picline: {err:#}");
        std::process::exit(1);
    }
}

fn init_logging(cli: &Cli) {
    let default_filter = if cli.quiet {
        "warn"
    } else {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let config = Config::from_cli(cli)?;

    let source = Arc::new(CatalogLookup::open(&config.catalog)?);
    info!(
        "catalog loaded: {} photos, pool size {}",
        source.len(),
        config.workers
    );

    let reader: Box<dyn BufRead + Send> = match &config.input {
        Input::Stdin => Box::new(BufReader::new(io::stdin())),
        Input::File(path) => Box::new(BufReader::new(
            File::open(path)
                .with_context(|| format!("cannot open input file {}", path.display()))?,
        )),
    };

    let writer: Box<dyn Write + Send> = match &config.output {
        Some(path) => Box::new(BufWriter::new(File::create(path).with_context(|| {
            format!("cannot create output file {}", path.display())
        })?)),
        None => Box::new(BufWriter::new(io::stdout())),
    };

    let pool = EnrichPool::new(PoolConfig {
        workers: config.workers,
        queue_depth: config.queue_depth,
    });

    let stats = pool.run(reader, source, writer)?;
    info!("{}", stats.format_summary());

    Ok(())
}
