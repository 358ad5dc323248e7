//! Typed field values and the ordered record that carries them.
//!
//! A `Record` is what stream drivers produce and consume. It keeps fields in
//! insertion order so a record written back out looks like the one read in.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::schema::DataType;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Integer(i64),
    Float(f64),
    /// UTC instant at microsecond resolution.
    Timestamp(DateTime<Utc>),
    Text(String),
    /// Nested or otherwise untyped content (objects, arrays, booleans, null).
    Opaque(serde_json::Value),
}

impl Value {
    /// Build a timestamp value, truncating to microsecond resolution.
    pub fn timestamp(ts: DateTime<Utc>) -> Self {
        Value::Timestamp(ts.trunc_subsecs(6))
    }

    pub fn data_type(&self) -> DataType {
        match self {
            Value::Integer(_) => DataType::Integer,
            Value::Float(_) => DataType::Float,
            Value::Timestamp(_) => DataType::Timestamp,
            Value::Text(_) => DataType::Text,
            Value::Opaque(_) => DataType::Opaque,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Timestamp(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(v) => Some(v),
            _ => None,
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::timestamp(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

/// Ordered mapping from field name to value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(n: usize) -> Self {
        Self {
            fields: Vec::with_capacity(n),
        }
    }

    /// Set a field. An existing field keeps its position and gets the new value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Builder-style `insert`.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let mut rec = Record::new();
        for (name, value) in iter {
            rec.insert(name, value);
        }
        rec
    }
}

impl IntoIterator for Record {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn insert_replaces_in_place() {
        let mut rec = Record::new().with("a", 1i64).with("b", "x");
        rec.insert("a", 2i64);
        let names: Vec<&str> = rec.names().collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(rec.get("a"), Some(&Value::Integer(2)));
        assert_eq!(rec.len(), 2);
    }

    #[test]
    fn timestamp_is_truncated_to_micros() {
        let ts = Utc.timestamp_opt(1_400_000_000, 123_456_789).unwrap();
        let v = Value::timestamp(ts);
        assert_eq!(
            v.as_timestamp().unwrap().timestamp_subsec_nanos(),
            123_456_000
        );
    }

    #[test]
    fn missing_field_is_none() {
        let rec = Record::new().with("lat", 1.5);
        assert!(rec.get("timestamp").is_none());
        assert!(!rec.contains("timestamp"));
        assert_eq!(rec.get("lat").and_then(Value::as_f64), Some(1.5));
    }
}
