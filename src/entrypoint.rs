//! Entrypoint resolution
//!
//! Finds the runnable file inside an install directory. Search is
//! deterministic: named candidates per platform first, subdirectory-major,
//! then a sorted scan for any executable file. An unsupported platform
//! resolves nothing, even if executables exist on disk.

use crate::error::{ZiplineError, ZiplineResult};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Conventional bundle layouts place the entry at the root or under one
/// of these subdirectories, searched in this order.
const SUBDIR_HINTS: &[&str] = &["", "dist", "build", "out"];

/// Platforms the launcher knows how to dispatch on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Linux,
    MacOs,
    Windows,
    /// Anything else; resolves no candidates and no fallback
    Unsupported,
}

impl Platform {
    /// Detect the platform this process is running on
    pub fn current() -> Self {
        Self::from_os(std::env::consts::OS)
    }

    /// Map an OS identifier (as in `std::env::consts::OS`) to a platform
    pub fn from_os(os: &str) -> Self {
        match os {
            "linux" => Self::Linux,
            "macos" => Self::MacOs,
            "windows" => Self::Windows,
            _ => Self::Unsupported,
        }
    }

    /// Candidate entrypoint filenames, in priority order
    pub fn candidates(&self) -> &'static [&'static str] {
        match self {
            Self::Windows => &["run.bat", "run.cmd", "run.ps1", "main.exe"],
            Self::MacOs => &["run.sh", "run", "main_macos"],
            Self::Linux => &["run.sh", "run", "main_linux"],
            Self::Unsupported => &[],
        }
    }

    pub fn is_windows(&self) -> bool {
        matches!(self, Self::Windows)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Linux => "linux",
            Self::MacOs => "macos",
            Self::Windows => "windows",
            Self::Unsupported => "unsupported",
        };
        write!(f, "{}", name)
    }
}

/// Resolve the entrypoint inside `install_dir` for `platform`.
///
/// Pass 1 checks the platform's named candidates in every hinted
/// subdirectory (subdirectory-major order, first hit wins). Pass 2 falls
/// back to the first executable regular file per directory, entries sorted
/// by name. On non-Unix platforms every regular file counts as executable;
/// Unix requires an execute permission bit.
pub fn resolve(install_dir: &Path, platform: Platform) -> ZiplineResult<PathBuf> {
    let candidates = platform.candidates();
    if candidates.is_empty() {
        return Err(ZiplineError::NoEntrypoint {
            platform,
            install_dir: install_dir.to_path_buf(),
        });
    }

    for base in hinted_dirs(install_dir) {
        for candidate in candidates {
            let path = base.join(candidate);
            if path.is_file() {
                debug!("Resolved entrypoint by name: {}", path.display());
                return Ok(path);
            }
        }
    }

    for base in hinted_dirs(install_dir) {
        let Ok(entries) = fs::read_dir(&base) else {
            continue;
        };
        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .collect();
        paths.sort();

        for path in paths {
            if path.is_file() && is_executable(&path) {
                debug!("Resolved entrypoint by permission scan: {}", path.display());
                return Ok(path);
            }
        }
    }

    Err(ZiplineError::NoEntrypoint {
        platform,
        install_dir: install_dir.to_path_buf(),
    })
}

/// Hinted directories that exist, in search order
fn hinted_dirs(install_dir: &Path) -> impl Iterator<Item = PathBuf> + '_ {
    SUBDIR_HINTS
        .iter()
        .map(move |sub| {
            if sub.is_empty() {
                install_dir.to_path_buf()
            } else {
                install_dir.join(sub)
            }
        })
        .filter(|dir| dir.is_dir())
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path)
        .map(|meta| meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

// Without POSIX permission bits "executable" is not a meaningful filter;
// any regular file passes, matching the reference launcher's behavior.
#[cfg(not(unix))]
fn is_executable(_path: &Path) -> bool {
    true
}
