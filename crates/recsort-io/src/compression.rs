//! Compression facade for record streams (zstd is feature-gated).
//!
//! Keep this tiny and synchronous. We only support `None`, `Gzip`, `Zstd`.

use std::fmt;
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;
use std::str::FromStr;

use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Compression {
    None,
    Gzip,
    Zstd,
}

impl Compression {
    /// Guess from the final extension; anything unrecognised is uncompressed.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("gz") | Some("gzip") => Compression::Gzip,
            Some("zst") | Some("zstd") => Compression::Zstd,
            _ => Compression::None,
        }
    }

    /// Fail unless this build can read and write the format.
    pub fn ensure_supported(self) -> Result<()> {
        match self {
            #[cfg(not(feature = "zstd"))]
            Compression::Zstd => Err(Error::CompressionUnsupported("zstd")),
            _ => Ok(()),
        }
    }

    /// File extension this compression adds, if any.
    pub fn extension(&self) -> Option<&'static str> {
        match self {
            Compression::None => None,
            Compression::Gzip => Some("gz"),
            Compression::Zstd => Some("zst"),
        }
    }
}

impl FromStr for Compression {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Ok(Compression::None),
            "gz" | "gzip" => Ok(Compression::Gzip),
            "zst" | "zstd" => Ok(Compression::Zstd),
            other => Err(Error::BadCompressionName(other.to_string())),
        }
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Compression::None => "none",
            Compression::Gzip => "gzip",
            Compression::Zstd => "zstd",
        };
        f.write_str(s)
    }
}

/// Wrap an opened file in the matching decompressor.
pub fn reader(compression: Compression, file: File) -> Result<Box<dyn Read>> {
    match compression {
        Compression::None => Ok(Box::new(file)),
        Compression::Gzip => Ok(Box::new(MultiGzDecoder::new(file))),
        Compression::Zstd => {
            #[cfg(feature = "zstd")]
            {
                let dec = zstd::stream::read::Decoder::new(file)?;
                Ok(Box::new(dec))
            }
            #[cfg(not(feature = "zstd"))]
            {
                drop(file);
                Err(Error::CompressionUnsupported("zstd"))
            }
        }
    }
}

/// Output side. Compressed variants must be `finish`ed to write their trailer.
pub enum CompressedWriter {
    Plain(File),
    Gzip(GzEncoder<File>),
    #[cfg(feature = "zstd")]
    Zstd(zstd::stream::write::Encoder<'static, File>),
}

impl CompressedWriter {
    pub fn new(compression: Compression, file: File) -> Result<Self> {
        match compression {
            Compression::None => Ok(CompressedWriter::Plain(file)),
            Compression::Gzip => Ok(CompressedWriter::Gzip(GzEncoder::new(
                file,
                flate2::Compression::default(),
            ))),
            Compression::Zstd => {
                #[cfg(feature = "zstd")]
                {
                    let lvl = 3;
                    Ok(CompressedWriter::Zstd(zstd::stream::write::Encoder::new(
                        file, lvl,
                    )?))
                }
                #[cfg(not(feature = "zstd"))]
                {
                    drop(file);
                    Err(Error::CompressionUnsupported("zstd"))
                }
            }
        }
    }

    /// Flush, write any compression trailer, and return the underlying file.
    pub fn finish(self) -> Result<File> {
        let mut file = match self {
            CompressedWriter::Plain(f) => f,
            CompressedWriter::Gzip(enc) => enc.finish()?,
            #[cfg(feature = "zstd")]
            CompressedWriter::Zstd(enc) => enc.finish()?,
        };
        file.flush()?;
        Ok(file)
    }
}

impl Write for CompressedWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            CompressedWriter::Plain(f) => f.write(buf),
            CompressedWriter::Gzip(enc) => enc.write(buf),
            #[cfg(feature = "zstd")]
            CompressedWriter::Zstd(enc) => enc.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            CompressedWriter::Plain(f) => f.flush(),
            CompressedWriter::Gzip(enc) => enc.flush(),
            #[cfg(feature = "zstd")]
            CompressedWriter::Zstd(enc) => enc.flush(),
        }
    }
}
