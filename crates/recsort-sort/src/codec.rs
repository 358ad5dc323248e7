//! Record payload codec for the intermediate line format.
//!
//! A record is exported to its binary transport form and then escaped so it
//! fits on one line:
//!
//! 1. every `0x01` becomes `0x01 0x01`
//! 2. every `0x0A` becomes `0x01 0x02`
//!
//! Step 1 must run first so that the `0x01` introduced by step 2 is never
//! itself doubled. Decoding undoes the two steps in reverse order.

use thiserror::Error;

use recsort_core::schema;
use recsort_core::types::Record;

pub const ESCAPE: u8 = 0x01;
pub const NEWLINE: u8 = b'\n';
const ESCAPED_NEWLINE: u8 = 0x02;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("malformed escape sequence at byte {offset}")]
    BadEscape { offset: usize },

    #[error("raw newline in escaped payload at byte {offset}")]
    RawNewline { offset: usize },

    #[error(transparent)]
    Schema(#[from] recsort_core::Error),
}

/// Escape arbitrary bytes so the result contains no `\n`.
pub fn escape(bytes: &[u8]) -> Vec<u8> {
    let extra = bytes.iter().filter(|&&b| b == ESCAPE || b == NEWLINE).count();
    let mut out = Vec::with_capacity(bytes.len() + extra);
    for &b in bytes {
        match b {
            ESCAPE => out.extend_from_slice(&[ESCAPE, ESCAPE]),
            NEWLINE => out.extend_from_slice(&[ESCAPE, ESCAPED_NEWLINE]),
            _ => out.push(b),
        }
    }
    out
}

/// Inverse of [`escape`]. Rejects anything `escape` cannot have produced.
pub fn unescape(bytes: &[u8]) -> Result<Vec<u8>, CodecError> {
    let mut out = Vec::with_capacity(bytes.len());
    let mut iter = bytes.iter().copied().enumerate();
    while let Some((offset, b)) = iter.next() {
        match b {
            ESCAPE => match iter.next() {
                Some((_, ESCAPE)) => out.push(ESCAPE),
                Some((_, ESCAPED_NEWLINE)) => out.push(NEWLINE),
                _ => return Err(CodecError::BadEscape { offset }),
            },
            NEWLINE => return Err(CodecError::RawNewline { offset }),
            _ => out.push(b),
        }
    }
    Ok(out)
}

/// Export and escape a record into a single-line payload.
pub fn encode(record: &Record) -> Result<Vec<u8>, CodecError> {
    let raw = schema::export(record)?;
    Ok(escape(&raw))
}

/// Unescape and import a payload produced by [`encode`].
pub fn decode(payload: &[u8]) -> Result<Record, CodecError> {
    let raw = unescape(payload)?;
    Ok(schema::import(&raw)?)
}
