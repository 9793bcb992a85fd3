use std::fs;
use std::path::Path;
use std::process::Command;

use l2_ticks::convert::{ErrorPolicy, write_csv};
use l2_ticks::exponents::ExponentTable;
use l2_ticks::instruments::{DataFile, load_descriptors};
use l2_ticks::record::{FILE_HEADER_SIZE, QuantityFormat, RECORD_SIZE};

fn record(exchange_ns: u64, kind: u8, side: u8, qty: u64, price: f64) -> [u8; RECORD_SIZE] {
    let mut b = [0u8; RECORD_SIZE];
    b[0..8].copy_from_slice(&exchange_ns.to_le_bytes());
    b[8..16].copy_from_slice(&(exchange_ns + 250).to_le_bytes());
    b[16] = kind;
    b[17] = side;
    b[18..26].copy_from_slice(&qty.to_le_bytes());
    b[26..34].copy_from_slice(&price.to_le_bytes());
    b
}

fn write_capture(path: &Path) {
    let mut bytes = vec![0xAB; FILE_HEADER_SIZE];
    bytes.extend_from_slice(&record(1_000_000_000, 0, 0, 0, 0.0));
    bytes.extend_from_slice(&record(2_000_000_000, 1, b'B', 250_000, 3512.5));
    bytes.extend_from_slice(&record(3_000_000_000, 2, b'A', 7, 3513.0));
    fs::write(path, bytes).unwrap();
}

const INSTRUMENTS: &str = r#"[
    {"Isin": "BTCUSD||Bitfinex.MD", "BaseCurrency": "BTC", "QuoteCurrency": "USD", "ExchangeLotSize": "1E-05"},
    {"Isin": "ETHUSD||Bitfinex.MD", "BaseCurrency": "ETH", "QuoteCurrency": "USD", "ExchangeLotSize": "n/a"},
    {"Isin": "no-provider", "BaseCurrency": "XRP", "QuoteCurrency": "USD", "ExchangeLotSize": "1E-02"}
]"#;

#[test]
fn capture_to_csv_with_instrument_exponent() {
    let dir = tempfile::tempdir().unwrap();
    let venue = dir.path().join("Bitfinex.london");
    fs::create_dir(&venue).unwrap();
    let capture = venue.join("BTCUSD_2019-03-01.dat.uncompressed");
    write_capture(&capture);
    let instruments = dir.path().join("instruments.json");
    fs::write(&instruments, INSTRUMENTS).unwrap();

    let descriptors = load_descriptors(&instruments).unwrap();
    let mut table = ExponentTable::new();
    let rejected = table.ingest(descriptors.iter().filter_map(|d| d.exponent_entry()));
    assert_eq!(rejected.len(), 1);
    assert_eq!(rejected[0].pair, "ETHUSD");

    let source = DataFile::from_path(&capture).unwrap();
    let (exp, found) = table.get(&source.provider, &source.pair);
    assert_eq!((exp, found), (-5, true));

    let buffer = fs::read(&capture).unwrap();
    let mut out = Vec::new();
    let summary = write_csv(&buffer, FILE_HEADER_SIZE, QuantityFormat::Scaled(exp), ErrorPolicy::Abort, &mut out).unwrap();
    assert_eq!(summary.rows, 3);
    assert_eq!(summary.trailing_bytes, 0);

    let text = String::from_utf8(out).unwrap();
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[1], "2000-01-01T00:00:01Z,2000-01-01T00:00:01.00000025Z,reset,unknown,0,0");
    assert_eq!(lines[2], "2000-01-01T00:00:02Z,2000-01-01T00:00:02.00000025Z,update,bid,2.50000,3512.5");
    assert_eq!(lines[3], "2000-01-01T00:00:03Z,2000-01-01T00:00:03.00000025Z,trade,ask,0.00007,3513");
}

#[test]
fn converter_binary_writes_csv() {
    let dir = tempfile::tempdir().unwrap();
    let venue = dir.path().join("Bitfinex.london");
    fs::create_dir(&venue).unwrap();
    let capture = venue.join("BTCUSD.dat");
    write_capture(&capture);
    let csv = dir.path().join("out.csv");

    let status = Command::new(env!("CARGO_BIN_EXE_l2_ticks"))
        .arg("--in")
        .arg(&capture)
        .arg("--out")
        .arg(&csv)
        .arg("--exponent")
        .arg("-3")
        .status()
        .unwrap();
    assert!(status.success());

    let text = fs::read_to_string(&csv).unwrap();
    assert!(text.starts_with("TsExchangeUTC,TsReceiveUTC,Type,Side,Size,Price\n"));
    assert!(text.contains(",update,bid,250.000,3512.5\n"));
    assert!(text.contains(",trade,ask,0.007,3513\n"));
}

#[test]
fn converter_binary_aborts_on_bad_tag() {
    let dir = tempfile::tempdir().unwrap();
    let capture = dir.path().join("bad.dat");
    let mut bytes = vec![0u8; FILE_HEADER_SIZE];
    bytes.extend_from_slice(&record(0, 5, b'B', 1, 1.0));
    fs::write(&capture, bytes).unwrap();

    let status = Command::new(env!("CARGO_BIN_EXE_l2_ticks"))
        .args(["--raw-quantity", "--in"])
        .arg(&capture)
        .arg("--out")
        .arg(dir.path().join("bad.csv"))
        .status()
        .unwrap();
    assert!(!status.success());

    let status = Command::new(env!("CARGO_BIN_EXE_l2_ticks"))
        .args(["--raw-quantity", "--on-error", "skip", "--in"])
        .arg(&capture)
        .arg("--out")
        .arg(dir.path().join("skip.csv"))
        .status()
        .unwrap();
    assert!(status.success());
    let text = fs::read_to_string(dir.path().join("skip.csv")).unwrap();
    assert_eq!(text.lines().count(), 1);
}

#[test]
fn converter_binary_refuses_out_of_range_exponent() {
    let dir = tempfile::tempdir().unwrap();
    let capture = dir.path().join("ticks.dat");
    write_capture(&capture);

    for exp in ["100000000", "-39", "39"] {
        let csv = dir.path().join("wide.csv");
        let status = Command::new(env!("CARGO_BIN_EXE_l2_ticks"))
            .arg("--in")
            .arg(&capture)
            .arg("--out")
            .arg(&csv)
            .arg("--exponent")
            .arg(exp)
            .status()
            .unwrap();
        assert!(!status.success(), "exponent {exp} accepted");
        assert!(!csv.exists());
    }
}

#[test]
fn oversized_lot_size_falls_back_to_default_exponent() {
    let dir = tempfile::tempdir().unwrap();
    let venue = dir.path().join("Bitfinex.london");
    fs::create_dir(&venue).unwrap();
    let capture = venue.join("BTCUSD.dat");
    write_capture(&capture);
    let instruments = dir.path().join("instruments.json");
    fs::write(
        &instruments,
        r#"[{"Isin": "BTCUSD||Bitfinex.MD", "BaseCurrency": "BTC", "QuoteCurrency": "USD", "ExchangeLotSize": "1E+100000000"}]"#,
    )
    .unwrap();

    let csv = dir.path().join("out.csv");
    let status = Command::new(env!("CARGO_BIN_EXE_l2_ticks"))
        .arg("--in")
        .arg(&capture)
        .arg("--out")
        .arg(&csv)
        .arg("--instruments")
        .arg(&instruments)
        .status()
        .unwrap();
    assert!(status.success());

    let text = fs::read_to_string(&csv).unwrap();
    assert!(text.contains(",update,bid,0.00250000,3512.5\n"));
    assert!(text.contains(",trade,ask,0.00000007,3513\n"));
}
