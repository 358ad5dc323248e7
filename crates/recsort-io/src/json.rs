//! Mapping between JSON values and typed record values.
//!
//! Integers become `Integer`, other numbers `Float`, strings `Text` (or
//! `Timestamp` when the schema says so), and everything else stays `Opaque`.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde_json::Map;

use recsort_core::schema::{DataType, Schema};
use recsort_core::types::{Record, Value};

/// Type one JSON field, honouring the schema hint for `name` when present.
pub fn value_from_json(
    name: &str,
    json: serde_json::Value,
    schema: &Schema,
) -> Result<Value, String> {
    use serde_json::Value as J;

    match (schema.data_type(name), json) {
        (Some(DataType::Timestamp), J::String(s)) => parse_timestamp(&s).map(Value::Timestamp),
        (Some(DataType::Text), J::String(s)) => Ok(Value::Text(s)),
        (Some(DataType::Text), J::Number(n)) => Ok(Value::Text(n.to_string())),
        (Some(DataType::Float), J::Number(n)) => n
            .as_f64()
            .map(Value::Float)
            .ok_or_else(|| format!("field '{name}': {n} is not a float")),
        (Some(DataType::Integer), J::Number(n)) => n
            .as_i64()
            .map(Value::Integer)
            .ok_or_else(|| format!("field '{name}': {n} is not a 64-bit integer")),
        (Some(DataType::Opaque), other) => Ok(Value::Opaque(other)),
        (_, J::Number(n)) => match n.as_i64() {
            Some(i) => Ok(Value::Integer(i)),
            None => n
                .as_f64()
                .map(Value::Float)
                .ok_or_else(|| format!("field '{name}': unrepresentable number {n}")),
        },
        (_, J::String(s)) => Ok(Value::Text(s)),
        (_, other) => Ok(Value::Opaque(other)),
    }
}

pub fn value_to_json(v: &Value) -> serde_json::Value {
    match v {
        Value::Integer(i) => serde_json::Value::from(*i),
        // JSON has no NaN/inf; serde_json maps them to null.
        Value::Float(f) => serde_json::Value::from(*f),
        Value::Timestamp(ts) => serde_json::Value::String(format_timestamp(ts)),
        Value::Text(s) => serde_json::Value::String(s.clone()),
        Value::Opaque(j) => j.clone(),
    }
}

pub fn record_from_json(
    obj: Map<String, serde_json::Value>,
    schema: &Schema,
) -> Result<Record, String> {
    let mut rec = Record::with_capacity(obj.len());
    for (name, json) in obj {
        let value = value_from_json(&name, json, schema)?;
        rec.insert(name, value);
    }
    Ok(rec)
}

pub fn record_to_json(rec: &Record) -> Map<String, serde_json::Value> {
    let mut obj = Map::with_capacity(rec.len());
    for (name, value) in rec.iter() {
        obj.insert(name.to_string(), value_to_json(value));
    }
    obj
}

/// RFC 3339, truncated to microseconds, normalised to UTC.
pub fn parse_timestamp(s: &str) -> Result<chrono::DateTime<Utc>, String> {
    let ts = DateTime::parse_from_rfc3339(s.trim())
        .map_err(|e| format!("invalid timestamp '{s}': {e}"))?;
    Ok(ts.with_timezone(&Utc).trunc_subsecs(6))
}

pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}
