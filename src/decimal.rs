//! Exact rendering of scaled integers as decimal strings.
//!
//! A quantity stored as `magnitude * 10^exponent` is printed digit by digit,
//! with no floating-point intermediate, so nothing is rounded or invented:
//!
//! ```
//! use l2_ticks::decimal::format_scaled;
//! assert_eq!(format_scaled(123_456_789, -8), "1.23456789");
//! assert_eq!(format_scaled(5, -8), "0.00000005");
//! assert_eq!(format_scaled(7, 3), "7000");
//! ```
//!
//! Fraction digits are kept as stored: `format_scaled(1500, -2)` is `"15.00"`.
use std::fmt::{self, Write};

/// Two-digit lookup table, `"00"` through `"99"`.
const DIGIT_PAIRS: &[u8; 200] = b"\
0001020304050607080910111213141516171819\
2021222324252627282930313233343536373839\
4041424344454647484950515253545556575859\
6061626364656667686970717273747576777879\
8081828384858687888990919293949596979899";

/// Widest `u64` in decimal digits.
pub const MAX_DIGITS: usize = 20;

/// Largest `|exponent|` accepted from metadata or the command line. Output
/// length grows with the exponent, so anything wider is rejected upstream.
pub const MAX_EXPONENT: i32 = 38;

/// Whether `exponent` lies within `-MAX_EXPONENT..=MAX_EXPONENT`.
pub const fn exponent_in_range(exponent: i32) -> bool {
    exponent >= -MAX_EXPONENT && exponent <= MAX_EXPONENT
}

const ZEROS: &str = "00000000000000000000000000000000";

/// A magnitude denominated at a power-of-ten scale, printable via `Display`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scaled {
    pub negative: bool,
    pub magnitude: u64,
    pub exponent: i32,
}

impl Scaled {
    pub const fn new(magnitude: u64, exponent: i32) -> Self {
        Self { negative: false, magnitude, exponent }
    }

    pub const fn signed(value: i64, exponent: i32) -> Self {
        Self { negative: value < 0, magnitude: value.unsigned_abs(), exponent }
    }

    /// Exact length of the rendered string.
    pub fn rendered_len(&self) -> usize {
        if self.magnitude == 0 {
            return 1;
        }
        let digits = digit_count(self.magnitude);
        let sign = usize::from(self.negative);
        let scale = self.exponent.unsigned_abs() as usize;
        if self.exponent >= 0 {
            sign + digits + scale
        } else if digits > scale {
            sign + digits + 1
        } else {
            // "0." followed by the fraction
            sign + 2 + scale
        }
    }
}

impl fmt::Display for Scaled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.magnitude == 0 {
            return f.write_str("0");
        }
        let mut buf = [0u8; MAX_DIGITS];
        let start = emit_digits(self.magnitude, &mut buf);
        let digits = std::str::from_utf8(&buf[start..]).map_err(|_| fmt::Error)?;

        if self.negative {
            f.write_char('-')?;
        }
        let scale = self.exponent.unsigned_abs() as usize;
        if self.exponent >= 0 {
            f.write_str(digits)?;
            return write_zeros(f, scale);
        }
        if digits.len() > scale {
            let (int, frac) = digits.split_at(digits.len() - scale);
            f.write_str(int)?;
            f.write_char('.')?;
            f.write_str(frac)
        } else {
            f.write_str("0.")?;
            write_zeros(f, scale - digits.len())?;
            f.write_str(digits)
        }
    }
}

/// Render `magnitude * 10^exponent` as an exact decimal string.
///
/// `0` always renders as `"0"` whatever the exponent.
pub fn format_scaled(magnitude: u64, exponent: i32) -> String {
    render(Scaled::new(magnitude, exponent))
}

/// Signed variant of [`format_scaled`]; negative values get a `-` prefix.
pub fn format_scaled_signed(value: i64, exponent: i32) -> String {
    render(Scaled::signed(value, exponent))
}

fn render(scaled: Scaled) -> String {
    let mut out = String::with_capacity(scaled.rendered_len());
    // Writing into a String cannot fail.
    let _ = write!(out, "{scaled}");
    out
}

/// Writes the decimal digits of `u` right-aligned into `buf` and returns the
/// index of the most significant digit. Digits come out two at a time.
fn emit_digits(mut u: u64, buf: &mut [u8; MAX_DIGITS]) -> usize {
    let mut i = buf.len();
    while u >= 100 {
        let is = (u % 100) as usize * 2;
        u /= 100;
        i -= 2;
        buf[i] = DIGIT_PAIRS[is];
        buf[i + 1] = DIGIT_PAIRS[is + 1];
    }
    // u < 100
    let is = u as usize * 2;
    i -= 1;
    buf[i] = DIGIT_PAIRS[is + 1];
    if u >= 10 {
        i -= 1;
        buf[i] = DIGIT_PAIRS[is];
    }
    i
}

fn write_zeros(f: &mut fmt::Formatter<'_>, mut n: usize) -> fmt::Result {
    while n > 0 {
        let chunk = n.min(ZEROS.len());
        f.write_str(&ZEROS[..chunk])?;
        n -= chunk;
    }
    Ok(())
}

fn digit_count(mut u: u64) -> usize {
    let mut n = 1;
    while u >= 10 {
        u /= 10;
        n += 1;
    }
    n
}
