//! Streaming CSV writer. The header comes from the first record appended.

use std::io::Write;

use recsort_core::types::{Record, Value};

use crate::error::{Error, Result};
use crate::json::format_timestamp;

pub struct CsvWriter<W: Write> {
    writer: ::csv::Writer<W>,
    columns: Option<Vec<String>>,
    written: u64,
}

impl<W: Write> CsvWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: ::csv::WriterBuilder::new().has_headers(false).from_writer(writer),
            columns: None,
            written: 0,
        }
    }

    /// Write one record. Fields the header does not name are an error;
    /// fields the record lacks are written as empty cells.
    pub fn append(&mut self, record: &Record) -> Result<()> {
        if self.columns.is_none() {
            let cols: Vec<String> = record.names().map(str::to_string).collect();
            self.writer.write_record(&cols)?;
            self.columns = Some(cols);
        }
        let columns = self.columns.as_deref().unwrap_or_default();

        if let Some(extra) = record.names().find(|n| !columns.iter().any(|c| c == n)) {
            return Err(Error::Format {
                line: self.written + 2,
                reason: format!("field '{extra}' is not in the CSV header"),
            });
        }

        let row: Vec<String> = columns
            .iter()
            .map(|c| record.get(c).map(cell_text).unwrap_or_default())
            .collect();
        self.writer.write_record(&row)?;
        self.written += 1;
        Ok(())
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn into_inner(self) -> Result<W> {
        let inner = self
            .writer
            .into_inner()
            .map_err(|e| Error::Io(e.into_error()))?;
        Ok(inner)
    }
}

fn cell_text(v: &Value) -> String {
    match v {
        Value::Integer(i) => i.to_string(),
        // `{:?}` keeps a fraction or exponent, so the cell reads back as a float.
        Value::Float(f) => format!("{f:?}"),
        Value::Timestamp(ts) => format_timestamp(ts),
        Value::Text(s) => s.clone(),
        Value::Opaque(j) => j.to_string(),
    }
}
