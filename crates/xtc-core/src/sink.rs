//! Atomic container output for native targets.
//!
//! The container is streamed into a temporary file in the destination
//! directory, flushed and synced, then renamed over the destination, and
//! the directory is synced so the rename survives a crash. A
//! failure at any step removes the temporary file, so the destination
//! either holds a complete container or is left untouched.

use std::io::{BufWriter, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::assembler::Container;
use crate::error::{Section, XtcError};

/// Write `container` to `dest` atomically.
///
/// # Errors
///
/// Returns `XtcError::WriteFailure` with the section that failed. Failures
/// creating, syncing or renaming the temporary file report
/// `Section::Commit`.
pub fn write_atomic(container: &Container, dest: &Path) -> Result<(), XtcError> {
    let dir = match dest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(dir).map_err(|e| {
        warn!("Failed to create temp file in {:?}: {}", dir, e);
        XtcError::write(Section::Commit, e)
    })?;
    debug!("Writing container to temp file: {:?}", temp.path());

    // Dropping `temp` on any early return deletes the partial file
    {
        let mut writer = BufWriter::new(temp.as_file_mut());
        if let Err(e) = container.write_to(&mut writer) {
            warn!("Failed to write container to temp file: {}", e);
            return Err(e);
        }
        writer
            .flush()
            .map_err(|e| XtcError::write(Section::Commit, e))?;
    }
    temp.as_file()
        .sync_all()
        .map_err(|e| XtcError::write(Section::Commit, e))?;

    debug!("Moving container to final location: {:?}", dest);
    temp.persist(dest).map_err(|e| {
        warn!("Failed to rename temp file to {:?}: {}", dest, e.error);
        // The temp file is removed when `e.file` drops
        XtcError::write(Section::Commit, e.error)
    })?;

    // File is already in place; a directory sync failure only warns
    if let Err(e) = sync_dir(dir) {
        warn!("Failed to sync parent directory after rename: {}", e);
    }

    info!(
        path = %dest.display(),
        pages = container.page_count(),
        bytes = container.len(),
        "Container committed"
    );
    Ok(())
}

#[cfg(unix)]
fn sync_dir(dir: &Path) -> std::io::Result<()> {
    std::fs::File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> std::io::Result<()> {
    Ok(())
}
