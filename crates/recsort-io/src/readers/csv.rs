//! Streaming CSV reader. The first row names the fields; an empty cell is a
//! missing field.

use std::io::Read;

use recsort_core::schema::{DataType, Schema};
use recsort_core::types::{Record, Value};

use crate::error::{Error, Result};
use crate::json::parse_timestamp;

pub struct CsvReader<R: Read> {
    reader: ::csv::Reader<R>,
    headers: Vec<String>,
    schema: Schema,
    row: ::csv::StringRecord,
    done: bool,
}

impl<R: Read> CsvReader<R> {
    pub fn new(reader: R, schema: Schema) -> Result<Self> {
        let mut reader = ::csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .from_reader(reader);
        let headers = reader.headers()?.iter().map(str::to_string).collect();
        Ok(Self {
            reader,
            headers,
            schema,
            row: ::csv::StringRecord::new(),
            done: false,
        })
    }

    fn read_next(&mut self) -> Result<Option<Record>> {
        if !self.reader.read_record(&mut self.row)? {
            return Ok(None);
        }
        let line = self.row.position().map(|p| p.line()).unwrap_or(0);
        let mut rec = Record::with_capacity(self.headers.len());
        for (name, cell) in self.headers.iter().zip(self.row.iter()) {
            if cell.is_empty() {
                continue;
            }
            let value = cell_value(name, cell, &self.schema)
                .map_err(|reason| Error::Format { line, reason })?;
            rec.insert(name.clone(), value);
        }
        Ok(Some(rec))
    }
}

impl<R: Read> Iterator for CsvReader<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.read_next() {
            Ok(Some(rec)) => Some(Ok(rec)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Type a cell by schema hint, otherwise integer, then float, then text.
pub fn cell_value(name: &str, cell: &str, schema: &Schema) -> std::result::Result<Value, String> {
    match schema.data_type(name) {
        Some(DataType::Timestamp) => parse_timestamp(cell).map(Value::Timestamp),
        Some(DataType::Integer) => cell
            .trim()
            .parse::<i64>()
            .map(Value::Integer)
            .map_err(|e| format!("field '{name}': '{cell}' is not an integer: {e}")),
        Some(DataType::Float) => cell
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|e| format!("field '{name}': '{cell}' is not a float: {e}")),
        Some(DataType::Text) => Ok(Value::Text(cell.to_string())),
        Some(DataType::Opaque) => serde_json::from_str(cell)
            .map(Value::Opaque)
            .map_err(|e| format!("field '{name}': invalid JSON: {e}")),
        None => {
            if let Ok(i) = cell.parse::<i64>() {
                Ok(Value::Integer(i))
            } else if let Ok(f) = cell.parse::<f64>() {
                Ok(Value::Float(f))
            } else {
                Ok(Value::Text(cell.to_string()))
            }
        }
    }
}
