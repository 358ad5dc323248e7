#![forbid(unsafe_code)]
//! recsort-io: record stream drivers for the sort pipeline.
//!
//! A stream is a file holding records in some transport (`Driver`), possibly
//! compressed (`Compression`). `RecordReader` iterates records lazily in a
//! single pass; `RecordWriter` appends them.

pub mod buf;
pub mod compression;
pub mod driver;
pub mod error;
pub mod json;
pub mod readers;
pub mod stream;
pub mod writers;

pub use compression::Compression;
pub use driver::Driver;
pub use error::{Error, Result};
pub use stream::{RecordReader, RecordWriter};
