#![forbid(unsafe_code)]
//! recsort-sort: external sort of record streams by mangled byte keys.
//!
//! The pipeline writes each record as one `<key> * <payload>` line, lets the
//! system `sort` utility order those lines under byte collation, and reads
//! them back in order:
//! - `key`: typed values to order-preserving bytes.
//! - `codec`: record to a single escaped line payload, and back.
//! - `external`: locating and running the sort utility.
//! - `temp`: the two scratch files next to the output.
//! - `pipeline`: the three phases and their state machine.

pub mod codec;
pub mod error;
pub mod external;
pub mod key;
pub mod pipeline;
pub mod temp;

pub use codec::{decode, encode, escape, unescape, CodecError};
pub use error::{Error, Result};
pub use external::{Collation, SortUtility};
pub use key::{mangle, sort_key, ColumnKeyError, KeyEncoder, KeyError};
pub use pipeline::{sort_file, Phase, SortPipeline, SortReport, StreamSpec};
