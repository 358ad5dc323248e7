use thiserror::Error;

/// Result type local to recsort-io.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Core(#[from] recsort_core::Error),

    #[error("cannot determine driver for '{0}'; pass one explicitly")]
    UnknownDriver(String),

    #[error("unknown driver name '{0}'")]
    BadDriverName(String),

    #[error("unknown compression name '{0}'")]
    BadCompressionName(String),

    #[error("compression not compiled in: {0}")]
    CompressionUnsupported(&'static str),

    #[error("line {line}: {reason}")]
    Format { line: u64, reason: String },
}
