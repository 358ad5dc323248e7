//! Streaming NDJSON writer.

use std::io::{BufWriter, Write};

use recsort_core::types::Record;

use crate::error::Result;
use crate::json::record_to_json;

pub struct JsonlWriter<W: Write> {
    writer: BufWriter<W>,
    written: u64,
}

impl<W: Write> JsonlWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::new(writer),
            written: 0,
        }
    }

    /// Write one record as a JSON object on its own line.
    pub fn append(&mut self, record: &Record) -> Result<()> {
        let obj = serde_json::Value::Object(record_to_json(record));
        serde_json::to_writer(&mut self.writer, &obj)?;
        self.writer.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    /// Flush buffered output and hand back the inner writer.
    pub fn into_inner(self) -> Result<W> {
        let inner = self.writer.into_inner().map_err(|e| e.into_error())?;
        Ok(inner)
    }
}
