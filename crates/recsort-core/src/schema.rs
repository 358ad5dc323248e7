//! Field type hints and the binary transport encoding of records.
//!
//! Stream drivers consult a `Schema` to decide how to type textual fields
//! (e.g. a `timestamp` column holding RFC 3339 strings). `export`/`import`
//! convert a `Record` to and from its compact binary form; the sort pipeline
//! uses that form as the payload of each intermediate line.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{Record, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataType {
    Integer,
    Float,
    Timestamp,
    Text,
    Opaque,
}

impl FromStr for DataType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "int" | "integer" => Ok(DataType::Integer),
            "float" | "double" => Ok(DataType::Float),
            "timestamp" | "datetime" => Ok(DataType::Timestamp),
            "text" | "str" | "string" => Ok(DataType::Text),
            "opaque" | "json" => Ok(DataType::Opaque),
            other => Err(Error::Schema(format!("unknown data type '{other}'"))),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DataType::Integer => "integer",
            DataType::Float => "float",
            DataType::Timestamp => "timestamp",
            DataType::Text => "text",
            DataType::Opaque => "opaque",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub data_type: DataType,
}

impl Field {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// Type hints for named fields. Fields not listed are typed from their
/// transport representation alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub fields: Vec<Field>,
}

impl Default for Schema {
    fn default() -> Self {
        Self {
            fields: vec![Field::new("timestamp", DataType::Timestamp)],
        }
    }
}

impl Schema {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    pub fn empty() -> Self {
        Self { fields: Vec::new() }
    }

    /// Parse `name:type[,name:type...]`, e.g. `timestamp:timestamp,mmsi:integer`.
    pub fn parse(spec: &str) -> Result<Self> {
        let mut fields = Vec::new();
        for part in spec.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (name, ty) = part
                .split_once(':')
                .ok_or_else(|| Error::Schema(format!("expected name:type, got '{part}'")))?;
            let name = name.trim();
            if name.is_empty() {
                return Err(Error::Schema(format!("empty field name in '{part}'")));
            }
            fields.push(Field::new(name, ty.parse()?));
        }
        Ok(Self { fields })
    }

    pub fn data_type(&self, name: &str) -> Option<DataType> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.data_type)
    }
}

// Transport form. Timestamps travel as microseconds since the epoch, opaque
// values as compact JSON text, so the binary encoding never needs
// self-describing input.
#[derive(Serialize, Deserialize)]
enum WireValue<'a> {
    Integer(i64),
    Float(f64),
    Timestamp(i64),
    Text(Cow<'a, str>),
    Opaque(String),
}

#[derive(Serialize, Deserialize)]
struct WireRecord<'a> {
    fields: Vec<(Cow<'a, str>, WireValue<'a>)>,
}

/// Serialize a record to its compact binary transport form.
pub fn export(record: &Record) -> Result<Vec<u8>> {
    let mut fields = Vec::with_capacity(record.len());
    for (name, value) in record.iter() {
        let wire = match value {
            Value::Integer(v) => WireValue::Integer(*v),
            Value::Float(v) => WireValue::Float(*v),
            Value::Timestamp(ts) => WireValue::Timestamp(ts.timestamp_micros()),
            Value::Text(s) => WireValue::Text(Cow::Borrowed(s.as_str())),
            Value::Opaque(v) => WireValue::Opaque(serde_json::to_string(v)?),
        };
        fields.push((Cow::Borrowed(name), wire));
    }
    let bytes = bincode::serde::encode_to_vec(WireRecord { fields }, bincode::config::standard())?;
    Ok(bytes)
}

/// Inverse of [`export`]. Trailing bytes after the record are an error.
pub fn import(bytes: &[u8]) -> Result<Record> {
    let (wire, used): (WireRecord<'static>, usize) =
        bincode::serde::decode_from_slice(bytes, bincode::config::standard())?;
    if used != bytes.len() {
        return Err(Error::Transport(format!(
            "{} trailing bytes after record",
            bytes.len() - used
        )));
    }

    let mut record = Record::with_capacity(wire.fields.len());
    for (name, value) in wire.fields {
        let value = match value {
            WireValue::Integer(v) => Value::Integer(v),
            WireValue::Float(v) => Value::Float(v),
            WireValue::Timestamp(micros) => {
                let ts = DateTime::from_timestamp_micros(micros).ok_or_else(|| {
                    Error::Transport(format!("timestamp {micros}us out of range"))
                })?;
                Value::Timestamp(ts)
            }
            WireValue::Text(s) => Value::Text(s.into_owned()),
            WireValue::Opaque(json) => Value::Opaque(serde_json::from_str(&json)?),
        };
        record.insert(name.into_owned(), value);
    }
    Ok(record)
}
