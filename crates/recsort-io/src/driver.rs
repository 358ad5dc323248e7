//! Transport drivers: how records are laid out inside a stream.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::compression::Compression;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Driver {
    /// One JSON object per line.
    Jsonl,
    /// Comma separated values with a header row.
    Csv,
}

impl Driver {
    /// Detect the driver from the path, looking past a compression extension
    /// (`pings.jsonl.gz` is Jsonl).
    pub fn from_path(path: &Path) -> Result<Self> {
        let inner = match Compression::from_path(path) {
            Compression::None => path.to_path_buf(),
            _ => path.with_extension(""),
        };
        match inner
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("json") | Some("jsonl") | Some("ndjson") => Ok(Driver::Jsonl),
            Some("csv") => Ok(Driver::Csv),
            _ => Err(Error::UnknownDriver(path.display().to_string())),
        }
    }
}

impl FromStr for Driver {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" | "jsonl" | "ndjson" | "newlinejson" => Ok(Driver::Jsonl),
            "csv" => Ok(Driver::Csv),
            other => Err(Error::BadDriverName(other.to_string())),
        }
    }
}

impl fmt::Display for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Driver::Jsonl => f.write_str("jsonl"),
            Driver::Csv => f.write_str("csv"),
        }
    }
}
