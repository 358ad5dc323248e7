//! Locating and invoking the system `sort` utility.

use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use recsort_core::config::SortConfig;

use crate::error::{Error, Result};

/// How the external utility compares line bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Collation {
    /// Byte-value order (`LC_ALL=C`). Mangled keys are only ordered under this.
    #[default]
    Bytes,
    /// Whatever the inherited locale says.
    Locale,
}

/// A resolved sort program plus the options passed on every invocation.
#[derive(Debug, Clone)]
pub struct SortUtility {
    program: PathBuf,
    pub collation: Collation,
    pub stable: bool,
    pub buffer_size: Option<String>,
    pub temp_dir: Option<PathBuf>,
}

impl SortUtility {
    /// Resolve `program` to an executable file and use default options.
    pub fn locate(program: &str) -> Result<Self> {
        let program = find_program(program).ok_or_else(|| Error::SortUtilityNotFound {
            program: program.to_string(),
        })?;
        Ok(Self {
            program,
            collation: Collation::Bytes,
            stable: true,
            buffer_size: None,
            temp_dir: None,
        })
    }

    pub fn from_config(cfg: &SortConfig) -> Result<Self> {
        let mut utility = Self::locate(&cfg.sort_program)?;
        utility.stable = cfg.stable;
        utility.buffer_size = cfg.sort_buffer_size.clone();
        utility.temp_dir = cfg.sort_temp_dir.as_ref().map(PathBuf::from);
        Ok(utility)
    }

    /// Resolved path of the program.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Build the command that sorts `input` into `output`.
    pub fn command(&self, input: &Path, output: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        if self.stable {
            // Compare only the key field; the key never contains '*'.
            cmd.args(["-s", "-t", "*", "-k", "1,1"]);
        }
        if let Some(size) = &self.buffer_size {
            cmd.arg("-S").arg(size);
        }
        if let Some(dir) = &self.temp_dir {
            cmd.arg("-T").arg(dir);
        }
        cmd.arg("-o").arg(output).arg("--").arg(input);
        if self.collation == Collation::Bytes {
            cmd.env("LC_ALL", "C").env("LC_COLLATE", "C");
        }
        cmd.stdin(Stdio::null());
        cmd
    }

    /// Run one blocking sort of `input` into `output`.
    pub fn run(&self, input: &Path, output: &Path) -> Result<()> {
        let mut cmd = self.command(input, output);
        tracing::debug!(command = ?cmd, "running external sort");

        let out = cmd.output().map_err(|source| Error::SortLaunch {
            program: self.program.display().to_string(),
            source,
        })?;
        if out.status.success() {
            Ok(())
        } else {
            Err(Error::SortFailed {
                status: out.status,
                stderr: String::from_utf8_lossy(&out.stderr).trim().to_string(),
            })
        }
    }
}

fn find_program(program: &str) -> Option<PathBuf> {
    if program.is_empty() {
        return None;
    }
    let candidate = Path::new(program);
    if candidate.components().count() > 1 {
        return is_executable(candidate).then(|| candidate.to_path_buf());
    }
    let paths = env::var_os("PATH").unwrap_or_else(OsString::new);
    env::split_paths(&paths)
        .map(|dir| dir.join(program))
        .find(|p| is_executable(p))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsStr;

    fn args(cmd: &Command) -> Vec<String> {
        cmd.get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn stable_command_compares_key_field_only() {
        let Ok(mut sort) = SortUtility::locate("sort") else {
            return;
        };
        sort.buffer_size = Some("64M".into());
        sort.temp_dir = Some(PathBuf::from("/scratch"));
        let cmd = sort.command(Path::new("in.tmp1"), Path::new("in.tmp2"));
        assert_eq!(
            args(&cmd),
            ["-s", "-t", "*", "-k", "1,1", "-S", "64M", "-T", "/scratch", "-o", "in.tmp2", "--", "in.tmp1"]
        );
        let envs: Vec<_> = cmd.get_envs().collect();
        assert!(envs.contains(&(OsStr::new("LC_ALL"), Some(OsStr::new("C")))));
        assert!(envs.contains(&(OsStr::new("LC_COLLATE"), Some(OsStr::new("C")))));
    }

    #[test]
    fn unstable_locale_command_is_plain() {
        let Ok(mut sort) = SortUtility::locate("sort") else {
            return;
        };
        sort.stable = false;
        sort.collation = Collation::Locale;
        let cmd = sort.command(Path::new("a"), Path::new("b"));
        assert_eq!(args(&cmd), ["-o", "b", "--", "a"]);
        assert_eq!(cmd.get_envs().count(), 0);
    }

    #[test]
    fn missing_program_is_reported() {
        let err = SortUtility::locate("recsort-no-such-sort-program").unwrap_err();
        assert!(matches!(err, Error::SortUtilityNotFound { ref program } if program == "recsort-no-such-sort-program"));
        assert!(SortUtility::locate("").is_err());
        assert!(SortUtility::locate("/nonexistent/dir/sort").is_err());
    }

    #[test]
    fn directory_is_not_a_program() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().to_string_lossy().into_owned();
        assert!(SortUtility::locate(&path).is_err());
    }

    #[test]
    fn runs_byte_order_sort() {
        let Ok(sort) = SortUtility::locate("sort") else {
            return;
        };
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("x.tmp1");
        let output = dir.path().join("x.tmp2");
        std::fs::write(&input, "b * 2\nB * 1\na * 3\nb * 0\n").unwrap();
        sort.run(&input, &output).unwrap();
        // Byte order puts uppercase first; equal keys keep input order.
        assert_eq!(
            std::fs::read_to_string(&output).unwrap(),
            "B * 1\na * 3\nb * 2\nb * 0\n"
        );
    }

    #[test]
    fn non_zero_exit_is_sort_failed() {
        let Ok(sort) = SortUtility::locate("false") else {
            return;
        };
        let dir = tempfile::tempdir().unwrap();
        let err = sort
            .run(&dir.path().join("in"), &dir.path().join("out"))
            .unwrap_err();
        assert!(matches!(err, Error::SortFailed { status, .. } if !status.success()));
    }
}
