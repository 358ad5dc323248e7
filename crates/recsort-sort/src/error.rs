use std::path::{Path, PathBuf};
use std::process::ExitStatus;

use thiserror::Error;

use crate::codec::CodecError;
use crate::key::ColumnKeyError;

/// Result type local to recsort-sort.
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error from a caller-supplied record source or sink.
pub type StreamError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("external sort utility '{program}' is not on PATH (or not executable)")]
    SortUtilityNotFound { program: String },

    #[error("failed to launch '{program}': {source}")]
    SortLaunch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("external sort failed ({status}): {stderr}")]
    SortFailed { status: ExitStatus, stderr: String },

    #[error("input record {record}: {source}")]
    Key {
        record: u64,
        #[source]
        source: ColumnKeyError,
    },

    #[error("input record {record}: {source}")]
    Encode {
        record: u64,
        #[source]
        source: CodecError,
    },

    #[error("sorted line {line}: {source}")]
    Decode {
        line: u64,
        #[source]
        source: CodecError,
    },

    #[error("sorted line {line} has no key separator")]
    MalformedLine { line: u64 },

    #[error("{op} '{}': {source}", path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("reading input: {0}")]
    Input(#[source] StreamError),

    #[error("writing output: {0}")]
    Output(#[source] StreamError),

    #[error(transparent)]
    Stream(#[from] recsort_io::Error),

    #[error(transparent)]
    Core(#[from] recsort_core::Error),

    #[error("internal invariant failed: {0}")]
    Invariant(String),
}

impl Error {
    pub(crate) fn io(op: &'static str, path: &Path, source: std::io::Error) -> Error {
        Error::Io {
            op,
            path: path.to_path_buf(),
            source,
        }
    }
}
