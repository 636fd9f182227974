//! Expansion of the backup ZIP archive into the working directory.

use std::fs::{self, File};
use std::io;
use std::path::Path;

use tracing::{debug, warn};
use zip::ZipArchive;

use crate::error::{Result, RestoreError};

/// Open the archive, mapping a missing file to [`RestoreError::ArchiveNotFound`]
/// and a malformed one to [`RestoreError::ArchiveInvalid`].
fn open(archive_path: &Path) -> Result<ZipArchive<File>> {
    let file = File::open(archive_path).map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            RestoreError::ArchiveNotFound {
                path: archive_path.display().to_string(),
            }
        } else {
            RestoreError::Io(e)
        }
    })?;

    ZipArchive::new(file).map_err(|e| RestoreError::ArchiveInvalid(e.to_string()))
}

/// List the file entry names of the archive without extracting anything.
///
/// Entries whose paths would escape the extraction root are skipped, same as
/// during expansion.
pub fn list_entries(archive_path: &Path) -> Result<Vec<String>> {
    let mut archive = open(archive_path)?;

    let mut names = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        let entry = archive
            .by_index(i)
            .map_err(|e| RestoreError::ArchiveInvalid(format!("entry {i}: {e}")))?;
        if entry.is_dir() {
            continue;
        }
        match entry.enclosed_name() {
            Some(rel) => names.push(rel.to_string_lossy().to_string()),
            None => warn!(entry = %entry.name(), "Skipping unsafe archive entry"),
        }
    }
    Ok(names)
}

/// Expand every entry of the archive into `workdir`, overwriting files that
/// share a name with an archive entry. Files already in `workdir` that the
/// archive does not name are left untouched (force-overwrite, not merge).
///
/// Returns the number of files written.
pub fn expand(archive_path: &Path, workdir: &Path) -> Result<usize> {
    if !workdir.is_dir() {
        return Err(RestoreError::WorkdirNotFound {
            path: workdir.display().to_string(),
        });
    }

    let mut archive = open(archive_path)?;

    let mut written = 0;
    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| RestoreError::ArchiveInvalid(format!("entry {i}: {e}")))?;

        let Some(rel) = entry.enclosed_name() else {
            warn!(entry = %entry.name(), "Skipping unsafe archive entry");
            continue;
        };
        let out_path = workdir.join(rel);

        if entry.is_dir() {
            fs::create_dir_all(&out_path)?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = File::create(&out_path)?;
        io::copy(&mut entry, &mut out)?;
        written += 1;
    }

    debug!(
        archive = %archive_path.display(),
        workdir = %workdir.display(),
        written,
        "Expanded backup archive"
    );
    Ok(written)
}
