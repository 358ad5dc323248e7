//! Convenient re-exports for downstream crates.

pub use crate::config::{SortColumns, SortConfig};
pub use crate::error::{Error, Result};
pub use crate::schema::{DataType, Schema};
pub use crate::types::{Record, Value};
pub use crate::stream::RecordSink;
