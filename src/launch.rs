//! Child process launching
//!
//! Marks the resolved entrypoint executable (best-effort), dispatches by
//! platform and extension, forwards pass-through arguments in order, and
//! blocks until the child exits. The environment is inherited as-is.

use crate::entrypoint::Platform;
use crate::error::{ZiplineError, ZiplineResult};
use std::ffi::OsString;
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// Set execute permission bits on `entry`.
///
/// Callers treat failure as ignorable; on platforms without POSIX
/// permission bits there is nothing to set.
pub fn make_executable(entry: &Path) -> ZiplineResult<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let meta = std::fs::metadata(entry)
            .map_err(|e| ZiplineError::io(format!("stat {}", entry.display()), e))?;
        let mut perms = meta.permissions();
        perms.set_mode(perms.mode() | 0o111);
        std::fs::set_permissions(entry, perms)
            .map_err(|e| ZiplineError::io(format!("chmod {}", entry.display()), e))?;
    }
    #[cfg(not(unix))]
    let _ = entry;
    Ok(())
}

/// Run `entry` with `args` and return the child's exit code.
///
/// On Windows a `.ps1` entry goes through
/// `powershell -ExecutionPolicy Bypass -File`; `.bat`/`.cmd` and plain
/// executables on every platform run directly. On Unix a signal-terminated
/// child maps to `128 + signal`, the conventional shell encoding.
pub fn launch(entry: &Path, args: &[OsString], platform: Platform) -> ZiplineResult<i32> {
    let mut command = build_command(entry, platform);
    command.args(args);

    debug!("Launching {} with {} forwarded arg(s)", entry.display(), args.len());

    let status = command
        .status()
        .map_err(|e| ZiplineError::command_failed(entry.display().to_string(), e))?;

    exit_code(status)
}

fn build_command(entry: &Path, platform: Platform) -> Command {
    if platform.is_windows() && has_extension(entry, "ps1") {
        let mut command = Command::new("powershell");
        command
            .arg("-ExecutionPolicy")
            .arg("Bypass")
            .arg("-File")
            .arg(entry);
        return command;
    }
    Command::new(entry)
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .map(|e| e.eq_ignore_ascii_case(ext))
        .unwrap_or(false)
}

#[cfg(unix)]
fn exit_code(status: std::process::ExitStatus) -> ZiplineResult<i32> {
    use std::os::unix::process::ExitStatusExt;
    status
        .code()
        .or_else(|| status.signal().map(|sig| 128 + sig))
        .ok_or(ZiplineError::ProcessSignaled)
}

#[cfg(not(unix))]
fn exit_code(status: std::process::ExitStatus) -> ZiplineResult<i32> {
    status.code().ok_or(ZiplineError::ProcessSignaled)
}
