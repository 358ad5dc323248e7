//! Streaming readers that yield one `Record` at a time.

pub mod csv;
pub mod jsonl;

pub use self::csv::CsvReader;
pub use self::jsonl::JsonlReader;
