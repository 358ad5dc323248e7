//! Interfaces for the record streams the sort pipeline reads and writes.
//!
//! Sources are plain iterators of `Result<Record, E>`. Destinations implement
//! `RecordSink`. Concrete file-backed implementations live in `recsort-io`.

use crate::types::Record;

/// Append-only destination for records.
pub trait RecordSink {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Append one record after all previously appended records.
    fn append(&mut self, record: &Record) -> Result<(), Self::Error>;

    /// Flush and close the destination after the last record.
    fn finish(self) -> Result<(), Self::Error>
    where
        Self: Sized,
    {
        Ok(())
    }
}

impl RecordSink for Vec<Record> {
    type Error = std::convert::Infallible;

    fn append(&mut self, record: &Record) -> Result<(), Self::Error> {
        self.push(record.clone());
        Ok(())
    }
}

/// Borrowed sinks are appended to but left open for their owner to finish.
impl<S: RecordSink + ?Sized> RecordSink for &mut S {
    type Error = S::Error;

    fn append(&mut self, record: &Record) -> Result<(), Self::Error> {
        (**self).append(record)
    }
}
