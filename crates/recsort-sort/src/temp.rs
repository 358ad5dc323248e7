//! Scratch files next to the output target.
//!
//! A run uses `<output>.tmp1` for the keyed spill and `<output>.tmp2` for the
//! sorted lines. They are removed only after a successful run; on failure
//! they stay behind for inspection.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

#[derive(Debug)]
pub struct ScratchFiles {
    spill: PathBuf,
    sorted: PathBuf,
}

impl ScratchFiles {
    pub fn for_target(target: &Path) -> Self {
        Self {
            spill: with_suffix(target, ".tmp1"),
            sorted: with_suffix(target, ".tmp2"),
        }
    }

    pub fn spill(&self) -> &Path {
        &self.spill
    }

    pub fn sorted(&self) -> &Path {
        &self.sorted
    }

    /// Delete both files. Files that are already gone are fine.
    pub fn release(self) -> Result<()> {
        for path in [&self.spill, &self.sorted] {
            match std::fs::remove_file(path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(Error::io("removing scratch file", path, e)),
            }
        }
        Ok(())
    }

    /// Leave the files in place and say where they are.
    pub fn abandon(self) {
        for path in [&self.spill, &self.sorted] {
            if path.exists() {
                tracing::warn!(path = %path.display(), "leaving scratch file after failed sort");
            }
        }
    }
}

fn with_suffix(target: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(target.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}
