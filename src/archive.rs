//! Zip extraction into an install directory
//!
//! Entry paths are validated through `enclosed_name` before anything is
//! written: an entry whose resolved path would land outside the
//! destination (zip-slip) fails the whole extraction.

use crate::error::{ZiplineError, ZiplineResult};
use std::fs::{self, File};
use std::io::{self, Cursor};
use std::path::Path;
use tracing::debug;
use zip::ZipArchive;

/// Unpack the zip `payload` into `dest`, recreating its directory structure.
///
/// `dest` must already exist. On Unix the mode bits recorded in the
/// archive are restored on extracted files.
pub fn extract(payload: &[u8], dest: &Path) -> ZiplineResult<()> {
    let mut archive = ZipArchive::new(Cursor::new(payload)).map_err(|e| {
        ZiplineError::ArchiveInvalid {
            reason: e.to_string(),
        }
    })?;

    debug!("Extracting {} entries to {}", archive.len(), dest.display());

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| ZiplineError::ArchiveInvalid {
                reason: format!("entry {}: {}", i, e),
            })?;

        // None means the entry path would escape dest (absolute or `..`)
        let relative = entry
            .enclosed_name()
            .ok_or_else(|| ZiplineError::ArchivePathEscape {
                entry: entry.name().to_string(),
            })?;
        let outpath = dest.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&outpath)
                .map_err(|e| ZiplineError::io(format!("creating {}", outpath.display()), e))?;
            continue;
        }

        if let Some(parent) = outpath.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ZiplineError::io(format!("creating {}", parent.display()), e))?;
        }

        let mut outfile = File::create(&outpath)
            .map_err(|e| ZiplineError::io(format!("creating {}", outpath.display()), e))?;
        io::copy(&mut entry, &mut outfile)
            .map_err(|e| ZiplineError::io(format!("writing {}", outpath.display()), e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = entry.unix_mode() {
                fs::set_permissions(&outpath, fs::Permissions::from_mode(mode))
                    .map_err(|e| ZiplineError::io(format!("chmod {}", outpath.display()), e))?;
            }
        }
    }

    Ok(())
}
