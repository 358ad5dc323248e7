//! recsort: external, disk-backed sort of record streams.
//!
//! Records are keyed by order-preserving byte encodings of their sort
//! columns, spilled one per line, ordered by the system `sort` utility under
//! byte collation, and streamed back in order.

pub use recsort_core as core;
pub use recsort_io as io;
pub use recsort_sort as sort;

pub use recsort_core::{Record, RecordSink, Schema, SortColumns, SortConfig, Value};
pub use recsort_sort::pipeline::{sort_file, StreamSpec};
pub use recsort_sort::{Error, Result, SortPipeline, SortReport};
