#![forbid(unsafe_code)]
//! recsort-core: values, records, schema hints, transport encoding, and config.
//!
//! No I/O lives here. Stream drivers are in `recsort-io`, the sort pipeline in
//! `recsort-sort`.

pub mod config;
pub mod error;
pub mod prelude;
pub mod schema;
pub mod stream;
pub mod types;

pub use config::{SortColumns, SortConfig};
pub use error::{Error, Result};
pub use schema::{DataType, Schema};
pub use stream::RecordSink;
pub use types::{Record, Value};
