//! Sort-key mangling.
//!
//! Every supported value type is rendered to bytes whose lexical (byte-value)
//! order equals the value's natural order, so an external byte-wise line sort
//! orders records correctly. Keys for several columns are joined with
//! [`COLUMN_SEPARATOR`].
//!
//! Encodings:
//! - `Integer` and `Float` share one numeric key space, so a column mixing
//!   both orders by value: the nearest `f64` with its IEEE-754 bits
//!   remapped to unsigned order (16 uppercase hex digits), then the exact
//!   integer's offset from that `f64` (4 hex digits, biased by `0x8000`).
//!   A float's offset is zero, so `10` and `10.0` get the same key.
//!   `-0.0` equals `0.0`; NaN is rejected.
//! - `Timestamp`: `YYYY-MM-DDTHH:MM:SS.ffffffZ` in UTC; years 0..=9999 only.
//! - `Text`: raw UTF-8, with `\n` and `*` replaced by order-preserving
//!   two-byte sequences (`09 FF`, `29 FF`). `FF` never occurs in UTF-8.
//! - `Opaque`: compact JSON text, mangled as `Text`.
//! - missing: empty, which sorts before any value.
//!
//! A mangled key never contains `\n` or `*`. It may contain the column
//! separator when a text value does. Keys are always followed by a space
//! (column separator or line separator), so text whose bytes after a shared
//! prefix are below `0x20` sorts before that prefix. Both are accepted
//! limitations of the fixed separators.

use chrono::{DateTime, Datelike, Utc};
use thiserror::Error;

use recsort_core::config::SortColumns;
use recsort_core::types::{Record, Value};

/// Joins the mangled values of consecutive sort columns.
pub const COLUMN_SEPARATOR: &[u8] = b" : ";

/// Width of a mangled `Integer` or `Float`.
pub const NUMERIC_WIDTH: usize = 20;
/// Width of a mangled `Timestamp`.
pub const TIMESTAMP_WIDTH: usize = 27;

const ORDERED_ESCAPE: u8 = 0xFF;

// i64 -> f64 rounds by at most 1024, so the offset always fits 4 hex digits.
const OFFSET_BIAS: i128 = 0x8000;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum KeyError {
    #[error("NaN has no sort position")]
    NaN,

    #[error("timestamp {0} is outside the years 0000-9999")]
    TimestampOutOfRange(DateTime<Utc>),
}

/// A `KeyError` tagged with the column it came from.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("cannot build sort key for column '{column}': {source}")]
pub struct ColumnKeyError {
    pub column: String,
    #[source]
    pub source: KeyError,
}

/// Mangle one field value (or its absence).
pub fn mangle(value: Option<&Value>) -> Result<Vec<u8>, KeyError> {
    let mut out = Vec::new();
    mangle_into(value, &mut out)?;
    Ok(out)
}

/// Append the mangled form of `value` to `out`.
pub fn mangle_into(value: Option<&Value>, out: &mut Vec<u8>) -> Result<(), KeyError> {
    match value {
        None => {}
        Some(Value::Integer(v)) => mangle_integer(*v, out),
        Some(Value::Float(v)) => mangle_float(*v, out)?,
        Some(Value::Timestamp(ts)) => mangle_timestamp(ts, out)?,
        Some(Value::Text(s)) => mangle_text(s.as_bytes(), out),
        Some(Value::Opaque(j)) => mangle_text(j.to_string().as_bytes(), out),
    }
    Ok(())
}

fn mangle_integer(v: i64, out: &mut Vec<u8>) {
    let approx = v as f64;
    // 2^63 (i64::MAX rounded up) still fits an i128 exactly.
    let offset = v as i128 - approx as i128;
    mangle_number(approx, offset, out);
}

fn mangle_float(v: f64, out: &mut Vec<u8>) -> Result<(), KeyError> {
    if v.is_nan() {
        return Err(KeyError::NaN);
    }
    mangle_number(v, 0, out);
    Ok(())
}

fn mangle_number(approx: f64, offset: i128, out: &mut Vec<u8>) {
    // -0.0 == 0.0, so this folds both zeros together.
    let v = if approx == 0.0 { 0.0 } else { approx };
    let bits = v.to_bits();
    let ordered = if bits >> 63 == 0 {
        bits | (1u64 << 63)
    } else {
        !bits
    };
    let offset = (offset + OFFSET_BIAS) as u16;
    out.extend_from_slice(format!("{ordered:016X}{offset:04X}").as_bytes());
}

fn mangle_timestamp(ts: &DateTime<Utc>, out: &mut Vec<u8>) -> Result<(), KeyError> {
    if !(0..=9999).contains(&ts.year()) {
        return Err(KeyError::TimestampOutOfRange(*ts));
    }
    let s = ts.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string();
    out.extend_from_slice(s.as_bytes());
    Ok(())
}

fn mangle_text(bytes: &[u8], out: &mut Vec<u8>) {
    out.reserve(bytes.len());
    for &b in bytes {
        match b {
            b'\n' => out.extend_from_slice(&[b'\n' - 1, ORDERED_ESCAPE]),
            b'*' => out.extend_from_slice(&[b'*' - 1, ORDERED_ESCAPE]),
            _ => out.push(b),
        }
    }
}

/// Build the full sort key for `record` over `columns`.
pub fn sort_key(record: &Record, columns: &SortColumns) -> Result<Vec<u8>, ColumnKeyError> {
    let mut out = Vec::new();
    KeyEncoder::new(columns.clone()).key_into(record, &mut out)?;
    Ok(out)
}

/// Reusable sort-key builder for a fixed column list.
#[derive(Debug, Clone)]
pub struct KeyEncoder {
    columns: SortColumns,
}

impl KeyEncoder {
    pub fn new(columns: SortColumns) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &SortColumns {
        &self.columns
    }

    /// Append the key for `record` to `out`.
    pub fn key_into(&self, record: &Record, out: &mut Vec<u8>) -> Result<(), ColumnKeyError> {
        for (i, column) in self.columns.iter().enumerate() {
            if i > 0 {
                out.extend_from_slice(COLUMN_SEPARATOR);
            }
            mangle_into(record.get(column), out).map_err(|source| ColumnKeyError {
                column: column.to_string(),
                source,
            })?;
        }
        Ok(())
    }
}
