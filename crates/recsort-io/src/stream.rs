//! Opening named record streams for reading and appending.
//!
//! Driver and compression default to what the path's extensions say.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use recsort_core::schema::Schema;
use recsort_core::stream::RecordSink;
use recsort_core::types::Record;

use crate::compression::{self, CompressedWriter, Compression};
use crate::driver::Driver;
use crate::error::Result;
use crate::readers::{CsvReader, JsonlReader};
use crate::writers::{CsvWriter, JsonlWriter};

/// Resolve the driver and compression for `path`, preferring explicit choices.
/// A compression this build cannot handle is an error here, before any file
/// is opened or created.
pub fn resolve(
    path: &Path,
    driver: Option<Driver>,
    compression: Option<Compression>,
) -> Result<(Driver, Compression)> {
    let compression = compression.unwrap_or_else(|| Compression::from_path(path));
    compression.ensure_supported()?;
    let driver = match driver {
        Some(d) => d,
        None => Driver::from_path(path)?,
    };
    Ok((driver, compression))
}

/// Lazy, single-pass iterator over the records of a stream.
pub enum RecordReader {
    Jsonl(JsonlReader<BufReader<Box<dyn Read>>>),
    Csv(CsvReader<Box<dyn Read>>),
}

impl RecordReader {
    pub fn open(
        path: impl AsRef<Path>,
        driver: Option<Driver>,
        compression: Option<Compression>,
        schema: Schema,
    ) -> Result<Self> {
        let path = path.as_ref();
        let (driver, compression) = resolve(path, driver, compression)?;
        tracing::debug!(path = %path.display(), %driver, %compression, "opening record stream");

        let file = File::open(path)?;
        let inner = compression::reader(compression, file)?;
        Ok(match driver {
            Driver::Jsonl => RecordReader::Jsonl(JsonlReader::new(BufReader::new(inner), schema)),
            Driver::Csv => RecordReader::Csv(CsvReader::new(inner, schema)?),
        })
    }
}

impl Iterator for RecordReader {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            RecordReader::Jsonl(r) => r.next(),
            RecordReader::Csv(r) => r.next(),
        }
    }
}

/// Append-only writer for a stream. Call `finish` to flush and close it.
pub enum RecordWriter {
    Jsonl(JsonlWriter<CompressedWriter>),
    Csv(CsvWriter<CompressedWriter>),
}

impl RecordWriter {
    pub fn create(
        path: impl AsRef<Path>,
        driver: Option<Driver>,
        compression: Option<Compression>,
    ) -> Result<Self> {
        let path = path.as_ref();
        let (driver, compression) = resolve(path, driver, compression)?;
        tracing::debug!(path = %path.display(), %driver, %compression, "creating record stream");

        let file = File::create(path)?;
        let inner = CompressedWriter::new(compression, file)?;
        Ok(match driver {
            Driver::Jsonl => RecordWriter::Jsonl(JsonlWriter::new(inner)),
            Driver::Csv => RecordWriter::Csv(CsvWriter::new(inner)),
        })
    }

    pub fn append(&mut self, record: &Record) -> Result<()> {
        match self {
            RecordWriter::Jsonl(w) => w.append(record),
            RecordWriter::Csv(w) => w.append(record),
        }
    }

    pub fn written(&self) -> u64 {
        match self {
            RecordWriter::Jsonl(w) => w.written(),
            RecordWriter::Csv(w) => w.written(),
        }
    }

    /// Flush all buffers, finish compression, and return the record count.
    pub fn finish(self) -> Result<u64> {
        let written = self.written();
        let inner = match self {
            RecordWriter::Jsonl(w) => w.into_inner()?,
            RecordWriter::Csv(w) => w.into_inner()?,
        };
        inner.finish()?;
        Ok(written)
    }
}

impl RecordSink for RecordWriter {
    type Error = crate::error::Error;

    fn append(&mut self, record: &Record) -> Result<()> {
        RecordWriter::append(self, record)
    }

    fn finish(self) -> Result<()> {
        RecordWriter::finish(self).map(|_| ())
    }
}
