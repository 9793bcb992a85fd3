use std::fs::{self, File};
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use dotenvy::dotenv;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use l2_ticks::convert::{ErrorPolicy, write_csv};
use l2_ticks::decimal::MAX_EXPONENT;
use l2_ticks::exponents::{DEFAULT_EXPONENT, ExponentTable};
use l2_ticks::instruments::{DataFile, load_descriptors};
use l2_ticks::record::{FILE_HEADER_SIZE, QuantityFormat, RECORD_SIZE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OnError {
    /// Stop at the first bad record
    Abort,
    /// Leave bad records out and keep going
    Skip,
}

impl From<OnError> for ErrorPolicy {
    fn from(v: OnError) -> Self {
        match v {
            OnError::Abort => ErrorPolicy::Abort,
            OnError::Skip => ErrorPolicy::Skip,
        }
    }
}

#[derive(Debug, Parser)]
#[command(version, about = "Convert an L2 tick capture (.dat) to CSV")]
struct Args {
    /// Capture file to read, e.g. Bitfinex.london/BTCUSD.dat.uncompressed
    #[arg(long = "in", short = 'i', env = "IN_FILE")]
    input: PathBuf,

    /// CSV file to write
    #[arg(long, short = 'o', env = "OUT_FILE")]
    out: PathBuf,

    /// Instrument descriptors (JSON) used to look up the quantity exponent
    #[arg(long, env = "INSTRUMENTS")]
    instruments: Option<PathBuf>,

    /// Quantity exponent; overrides any instrument lookup
    #[arg(
        long,
        allow_hyphen_values = true,
        value_parser = clap::value_parser!(i32).range(-i64::from(MAX_EXPONENT)..=i64::from(MAX_EXPONENT))
    )]
    exponent: Option<i32>,

    /// Print quantities as plain integers
    #[arg(long, default_value_t = false, conflicts_with = "exponent")]
    raw_quantity: bool,

    /// Bytes of file header to skip before the first record
    #[arg(long, default_value_t = FILE_HEADER_SIZE)]
    header_size: usize,

    /// What to do with records that fail to decode
    #[arg(long, value_enum, default_value_t = OnError::Abort)]
    on_error: OnError,
}

/// Log to stderr, filtered by `RUST_LOG` (default `info`).
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn quantity_format(args: &Args) -> Result<QuantityFormat> {
    if args.raw_quantity {
        return Ok(QuantityFormat::Raw);
    }
    if let Some(exp) = args.exponent {
        return Ok(QuantityFormat::Scaled(exp));
    }
    let Some(path) = &args.instruments else {
        return Ok(QuantityFormat::Scaled(DEFAULT_EXPONENT));
    };

    let mut table = ExponentTable::new();
    let entries = load_descriptors(path)?.iter().filter_map(|d| d.exponent_entry()).collect::<Vec<_>>();
    for rejected in table.ingest(entries) {
        warn!(provider = %rejected.provider, pair = %rejected.pair, error = %rejected.error, "skipping instrument exponent");
    }
    let source = DataFile::from_path(&args.input)?;
    let (exp, found) = table.get(&source.provider, &source.pair);
    if found {
        info!(provider = %source.provider, pair = %source.pair, exponent = exp, "quantity exponent");
    } else {
        warn!(provider = %source.provider, pair = %source.pair, exponent = exp, "no exponent for instrument, using fallback");
    }
    Ok(QuantityFormat::Scaled(exp))
}

fn main() -> Result<()> {
    // Load environment variables from .env if present
    let _ = dotenv();
    init_logging();
    let args = Args::parse();

    let quantity = quantity_format(&args)?;
    let buffer = fs::read(&args.input).with_context(|| format!("open {:?}", args.input))?;
    let out = File::create(&args.out).with_context(|| format!("create {:?}", args.out))?;
    let w = BufWriter::with_capacity(1 << 20, out);

    info!(input = ?args.input, bytes = buffer.len(), record_size = RECORD_SIZE, "start reading");
    let summary = write_csv(&buffer, args.header_size, quantity, args.on_error.into(), w)?;

    for (offset, err) in &summary.skipped {
        warn!(offset, error = %err, "skipped record");
    }
    if summary.trailing_bytes > 0 {
        warn!(bytes = summary.trailing_bytes, "ignoring truncated record at end of file");
    }
    info!(lines = summary.rows, skipped = summary.skipped.len(), out = ?args.out, "saved");
    Ok(())
}
