//! Streaming NDJSON reader.

use std::io::BufRead;

use recsort_core::schema::Schema;
use recsort_core::types::Record;

use crate::error::{Error, Result};
use crate::json::record_from_json;

pub struct JsonlReader<R: BufRead> {
    reader: R,
    schema: Schema,
    line_no: u64,
    buf: String,
    done: bool,
}

impl<R: BufRead> JsonlReader<R> {
    pub fn new(reader: R, schema: Schema) -> Self {
        Self {
            reader,
            schema,
            line_no: 0,
            buf: String::new(),
            done: false,
        }
    }

    fn read_next(&mut self) -> Result<Option<Record>> {
        loop {
            self.buf.clear();
            if self.reader.read_line(&mut self.buf)? == 0 {
                return Ok(None);
            }
            self.line_no += 1;
            let line = self.buf.trim();
            if line.is_empty() {
                continue;
            }
            let parsed = serde_json::from_str::<serde_json::Value>(line).map_err(|e| Error::Format {
                line: self.line_no,
                reason: e.to_string(),
            })?;
            let obj = match parsed {
                serde_json::Value::Object(obj) => obj,
                other => {
                    return Err(Error::Format {
                        line: self.line_no,
                        reason: format!("expected a JSON object, found {}", json_kind(&other)),
                    })
                }
            };
            let rec = record_from_json(obj, &self.schema).map_err(|reason| Error::Format {
                line: self.line_no,
                reason,
            })?;
            return Ok(Some(rec));
        }
    }
}

impl<R: BufRead> Iterator for JsonlReader<R> {
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
                // single pass: stop after the first error
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

fn json_kind(v: &serde_json::Value) -> &'static str {
    match v {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recsort_core::types::Value;

    #[test]
    fn reads_objects_and_skips_blank_lines() {
        let data = "{\"timestamp\":\"2014-01-01T00:00:00Z\",\"lat\":1.5}\n\n{\"lat\":2}\n";
        let recs: Vec<Record> = JsonlReader::new(data.as_bytes(), Schema::default())
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(recs.len(), 2);
        assert!(matches!(recs[0].get("timestamp"), Some(Value::Timestamp(_))));
        assert_eq!(recs[1].get("lat"), Some(&Value::Integer(2)));
    }

    #[test]
    fn non_object_line_reports_line_number() {
        let data = "{\"a\":1}\n[1,2]\n{\"a\":3}\n";
        let mut r = JsonlReader::new(data.as_bytes(), Schema::empty());
        assert!(r.next().unwrap().is_ok());
        match r.next().unwrap() {
            Err(Error::Format { line, .. }) => assert_eq!(line, 2),
            other => panic!("unexpected: {other:?}"),
        }
        assert!(r.next().is_none());
    }

    #[test]
    fn invalid_json_reports_line_number() {
        let data = "{\"a\":1}\n\n{\"a\":\n";
        let err = JsonlReader::new(data.as_bytes(), Schema::empty())
            .nth(1)
            .unwrap()
            .unwrap_err();
        assert!(matches!(err, Error::Format { line: 3, .. }), "{err}");
    }

    #[test]
    fn field_order_is_preserved() {
        let data = "{\"z\":1,\"a\":2,\"m\":3}\n";
        let rec = JsonlReader::new(data.as_bytes(), Schema::empty())
            .next()
            .unwrap()
            .unwrap();
        let names: Vec<&str> = rec.names().collect();
        assert_eq!(names, vec!["z", "a", "m"]);
    }
}
