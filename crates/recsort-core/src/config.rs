//! Sort configuration that the pipeline and the CLI share.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Column used when no sort columns are given.
pub const DEFAULT_SORT_COLUMN: &str = "timestamp";

/// Ordered, non-empty list of field names. The first column is the primary key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SortColumns(Vec<String>);

impl SortColumns {
    pub fn new<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let cols: Vec<String> = columns.into_iter().map(|c| c.into().trim().to_string()).collect();
        if cols.is_empty() {
            return Err(Error::Config("at least one sort column is required".into()));
        }
        if let Some(pos) = cols.iter().position(|c| c.is_empty()) {
            return Err(Error::Config(format!("sort column {} is empty", pos + 1)));
        }
        Ok(Self(cols))
    }

    /// Parse a comma separated list, e.g. `timestamp,lat`.
    pub fn parse(spec: &str) -> Result<Self> {
        Self::new(spec.split(','))
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for SortColumns {
    fn default() -> Self {
        Self(vec![DEFAULT_SORT_COLUMN.to_string()])
    }
}

impl FromStr for SortColumns {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for SortColumns {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(","))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SortConfig {
    /// Columns to sort by, in priority order.
    pub columns: SortColumns,

    /// External sort utility: a bare name searched on `PATH`, or a path.
    pub sort_program: String,

    /// Main-memory buffer size handed to the sort utility (`-S`), e.g. `1G`.
    pub sort_buffer_size: Option<String>,

    /// Directory the sort utility spills its own runs to (`-T`).
    pub sort_temp_dir: Option<String>,

    /// Compare only the key and keep input order among equal keys.
    pub stable: bool,

    /// Buffer size for reading/writing the intermediate files.
    pub io_buffer_bytes: usize,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            columns: SortColumns::default(),
            sort_program: "sort".to_string(),
            sort_buffer_size: None,
            sort_temp_dir: None,
            stable: true,
            io_buffer_bytes: 1024 * 1024, // 1 MiB
        }
    }
}

impl SortConfig {
    /// Create a config from environment variables, falling back to defaults.
    ///
    /// Environment variables:
    /// - `RECSORT_SORT_PROGRAM`: sort utility name or path
    /// - `RECSORT_SORT_BUFFER_SIZE`: buffer size passed as `sort -S`
    /// - `RECSORT_SORT_TEMP_DIR`: temp directory passed as `sort -T`
    /// - `RECSORT_STABLE`: `0`/`false` to compare whole lines
    /// - `RECSORT_IO_BUFFER_BYTES`: intermediate file buffer size
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(s) = std::env::var("RECSORT_SORT_PROGRAM") {
            if !s.trim().is_empty() {
                cfg.sort_program = s;
            }
        }

        if let Ok(s) = std::env::var("RECSORT_SORT_BUFFER_SIZE") {
            if !s.trim().is_empty() {
                cfg.sort_buffer_size = Some(s);
            }
        }

        if let Ok(s) = std::env::var("RECSORT_SORT_TEMP_DIR") {
            if !s.trim().is_empty() {
                cfg.sort_temp_dir = Some(s);
            }
        }

        if let Ok(s) = std::env::var("RECSORT_STABLE") {
            if let Some(v) = parse_bool(&s) {
                cfg.stable = v;
            }
        }

        if let Ok(s) = std::env::var("RECSORT_IO_BUFFER_BYTES") {
            if let Ok(v) = s.parse::<usize>() {
                if v > 0 {
                    cfg.io_buffer_bytes = v;
                }
            }
        }

        cfg
    }

    pub fn with_columns(mut self, columns: SortColumns) -> Self {
        self.columns = columns;
        self
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_columns_trims_and_keeps_order() {
        let cols = SortColumns::parse("timestamp, lat ,lon").unwrap();
        assert_eq!(cols.as_slice(), &["timestamp", "lat", "lon"]);
        assert_eq!(cols.to_string(), "timestamp,lat,lon");
    }

    #[test]
    fn empty_columns_rejected() {
        assert!(SortColumns::parse("").is_err());
        assert!(SortColumns::parse("a,,b").is_err());
        assert!(SortColumns::new(Vec::<String>::new()).is_err());
    }

    #[test]
    fn defaults() {
        let cfg = SortConfig::default();
        assert_eq!(cfg.columns.as_slice(), &[DEFAULT_SORT_COLUMN]);
        assert_eq!(cfg.sort_program, "sort");
        assert!(cfg.stable);
    }

    #[test]
    fn bool_parsing() {
        assert_eq!(parse_bool("FALSE"), Some(false));
        assert_eq!(parse_bool(" on "), Some(true));
        assert_eq!(parse_bool("maybe"), None);
    }
}
