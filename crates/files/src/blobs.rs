//! Namespace-scoped blob store implementation
//!
//! [`BlobStore`] is bound to one namespace directory. Writes stream through a
//! [`NamedTempFile`] created inside the destination directory, so a failed or
//! interrupted copy never leaves a partial file under the final name; the temp
//! file is removed when it is dropped.

use crate::FilesError;
use locker_types::FileName;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Blob storage bound to a single namespace directory
///
/// Construction performs no I/O. The directory is created on demand through
/// [`BlobStore::ensure_directory`].
#[derive(Debug, Clone)]
pub struct BlobStore {
    directory: PathBuf,
}

impl BlobStore {
    /// Creates a store for `directory`. The directory need not exist yet.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// Returns the namespace directory this store writes into
    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Creates the namespace directory if it is absent
    ///
    /// # Errors
    ///
    /// Returns `FilesError::InvalidDirectory` if the path exists but is not a
    /// directory, or `FilesError::Io` if creation fails.
    pub fn ensure_directory(&self) -> Result<(), FilesError> {
        if self.directory.exists() && !self.directory.is_dir() {
            return Err(FilesError::InvalidDirectory(format!(
                "Path exists but is not a directory: {}",
                self.directory.display()
            )));
        }

        fs::create_dir_all(&self.directory).map_err(|e| {
            FilesError::Io(io::Error::new(
                e.kind(),
                format!(
                    "Failed to create namespace directory {}: {}",
                    self.directory.display(),
                    e
                ),
            ))
        })
    }

    /// Absolute location of the blob stored as `stored_name`
    #[must_use]
    pub fn blob_path(&self, stored_name: &FileName) -> PathBuf {
        self.directory.join(stored_name.as_str())
    }

    /// Copies `source_path` into the namespace as `stored_name`
    ///
    /// The bytes are streamed into a temp file in the namespace directory,
    /// flushed to disk, then renamed over `stored_name`. An existing blob with
    /// the same stored name is replaced.
    ///
    /// # Returns
    ///
    /// The number of bytes copied.
    ///
    /// # Errors
    ///
    /// Returns `FilesError::Io` if the source cannot be opened or read, or if
    /// the temp file cannot be created, written, flushed or renamed. On error no
    /// file exists under `stored_name` that was not there before.
    pub fn store(&self, source_path: &Path, stored_name: &FileName) -> Result<u64, FilesError> {
        let mut source = fs::File::open(source_path).map_err(|e| {
            FilesError::Io(io::Error::new(
                e.kind(),
                format!(
                    "Failed to open source file {}: {}",
                    source_path.display(),
                    e
                ),
            ))
        })?;

        let target = self.blob_path(stored_name);
        write_via_temp(&self.directory, &target, |temp| {
            io::copy(&mut source, temp).map_err(|e| {
                io::Error::new(
                    e.kind(),
                    format!(
                        "Failed to copy {} into {}: {}",
                        source_path.display(),
                        target.display(),
                        e
                    ),
                )
            })
        })
    }

    /// Copies the blob stored as `stored_name` to `destination`
    ///
    /// `destination` is the full target file path; an existing file there is
    /// replaced. The copy goes through a temp file in the destination's parent
    /// directory.
    ///
    /// # Errors
    ///
    /// Returns `FilesError::BlobMissing` if no blob exists under `stored_name`,
    /// or `FilesError::Io` if reading or writing fails.
    pub fn retrieve(&self, stored_name: &FileName, destination: &Path) -> Result<u64, FilesError> {
        let blob_path = self.blob_path(stored_name);
        if !blob_path.is_file() {
            return Err(FilesError::BlobMissing(blob_path));
        }

        let mut blob = fs::File::open(&blob_path)?;
        let parent = destination
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        write_via_temp(parent, destination, |temp| io::copy(&mut blob, temp))
    }

    /// Removes the blob stored as `stored_name`
    ///
    /// Removing a blob that is already absent is not an error.
    pub fn discard(&self, stored_name: &FileName) -> Result<(), FilesError> {
        match fs::remove_file(self.blob_path(stored_name)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(FilesError::Io(e)),
        }
    }
}

/// Fills a temp file in `directory` via `fill`, syncs it and renames it onto `target`.
fn write_via_temp(
    directory: &Path,
    target: &Path,
    fill: impl FnOnce(&mut NamedTempFile) -> io::Result<u64>,
) -> Result<u64, FilesError> {
    let mut temp = NamedTempFile::new_in(directory).map_err(|e| {
        FilesError::Io(io::Error::new(
            e.kind(),
            format!(
                "Failed to create temp file in {}: {}",
                directory.display(),
                e
            ),
        ))
    })?;

    let written = fill(&mut temp)?;
    temp.flush()?;
    temp.as_file().sync_all()?;

    temp.persist(target).map_err(|e| {
        FilesError::Io(io::Error::new(
            e.error.kind(),
            format!("Failed to persist {}: {}", target.display(), e.error),
        ))
    })?;

    Ok(written)
}
