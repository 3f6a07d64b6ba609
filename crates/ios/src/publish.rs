//! Artifact publishing
//!
//! Copies the exported package to its destination, keeping permissions and
//! access/modification times, then reports the size actually on disk.

use serde::Serialize;
use std::fs::{self, File, FileTimes};
use std::path::{Path, PathBuf};
use talkone_core::error::{Error, Result};

/// Result of a successful publish
#[derive(Debug, Clone, Serialize)]
pub struct PublishReport {
    /// File that was copied
    pub source: PathBuf,
    /// Where the copy was written
    pub destination: PathBuf,
    /// Size of the destination file in bytes
    pub size: u64,
}

/// Copy `source` to `destination`.
///
/// The destination directory is not created: a missing directory is a copy
/// failure, like any other filesystem error. Publishing a file onto itself
/// (through any path spelling, symlink or hard link) is refused before
/// anything is written.
pub fn publish_artifact(source: &Path, destination: &Path) -> Result<PublishReport> {
    if !source.is_file() {
        return Err(Error::artifact_not_found(source));
    }

    tracing::info!(
        source = %source.display(),
        destination = %destination.display(),
        "publishing artifact"
    );

    let copy_failed = |e| Error::copy_failed(source, destination, e);

    // Copying onto the source truncates it before it is read.
    if is_same_file(source, destination).map_err(copy_failed)? {
        return Err(copy_failed(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "source and destination are the same file",
        )));
    }

    // fs::copy carries the permission bits over.
    fs::copy(source, destination).map_err(copy_failed)?;
    preserve_times(source, destination).map_err(copy_failed)?;

    let size = fs::metadata(destination).map_err(copy_failed)?.len();
    tracing::debug!(size, "artifact published");

    Ok(PublishReport {
        source: source.to_path_buf(),
        destination: destination.to_path_buf(),
        size,
    })
}

fn is_same_file(source: &Path, destination: &Path) -> std::io::Result<bool> {
    match fs::metadata(destination) {
        Ok(dest) => same_inode(source, &dest, destination),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

#[cfg(unix)]
fn same_inode(source: &Path, dest: &fs::Metadata, _destination: &Path) -> std::io::Result<bool> {
    use std::os::unix::fs::MetadataExt;

    let src = fs::metadata(source)?;
    Ok(src.dev() == dest.dev() && src.ino() == dest.ino())
}

#[cfg(not(unix))]
fn same_inode(source: &Path, _dest: &fs::Metadata, destination: &Path) -> std::io::Result<bool> {
    Ok(fs::canonicalize(source)? == fs::canonicalize(destination)?)
}

fn preserve_times(source: &Path, destination: &Path) -> std::io::Result<()> {
    let meta = fs::metadata(source)?;
    let times = FileTimes::new()
        .set_accessed(meta.accessed()?)
        .set_modified(meta.modified()?);

    // The copy may be read-only; the owner can still set times via a read handle.
    #[cfg(unix)]
    let file = File::open(destination)?;
    #[cfg(not(unix))]
    let file = File::options().write(true).open(destination)?;

    file.set_times(times)
}
