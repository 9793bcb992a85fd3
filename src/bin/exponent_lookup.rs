use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use dotenvy::dotenv;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use l2_ticks::exponents::ExponentTable;
use l2_ticks::instruments::{DataFile, load_descriptors};

#[derive(Debug, Parser)]
#[command(about = "Resolve the quantity exponent of a capture file from instrument metadata")]
struct Args {
    /// Instrument descriptors (JSON array)
    #[arg(long, env = "INSTRUMENTS")]
    instruments: PathBuf,

    /// Capture file whose parent directory is <Provider>.<city>
    #[arg(long = "in", short = 'i', env = "IN_FILE")]
    input: PathBuf,

    /// Exit with an error when the instrument has no exponent
    #[arg(long, default_value_t = false)]
    strict: bool,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn main() -> Result<()> {
    let _ = dotenv();
    init_logging();
    let args = Args::parse();

    let descriptors = load_descriptors(&args.instruments)?;
    let mut table = ExponentTable::new();
    let rejected = table.ingest(descriptors.iter().filter_map(|d| d.exponent_entry()));
    for r in &rejected {
        warn!(provider = %r.provider, pair = %r.pair, error = %r.error, "problem parsing exponent from scientific notation");
    }
    info!(instruments = descriptors.len(), entries = table.len(), rejected = rejected.len(), "exponent table loaded");

    let source = DataFile::from_path(args.input.clone()).with_context(|| "derive provider and pair")?;
    let (exponent, found) = table.get(&source.provider, &source.pair);
    if !found && args.strict {
        bail!("no exponent for {} {}", source.provider, source.pair);
    }
    println!(
        "provider={} city={} pair={} exponent={} found={}",
        source.provider, source.city, source.pair, exponent, found
    );
    Ok(())
}
