//! Locker blob storage
//!
//! This crate moves file bytes in and out of a single user's namespace
//! directory. It knows nothing about users, credentials or metadata logs: the
//! caller hands it a directory and a [`FileName`] and it guarantees that
//!
//! - a blob only appears under its stored name once every byte has been copied
//!   and flushed (temp file in the same directory, then rename),
//! - the reported size is the number of bytes actually copied, never a value
//!   supplied by the caller,
//! - nothing outside the namespace directory is ever written, because stored
//!   names are plain single path segments.
//!
//! ```text
//! <data_dir>/
//! └── <username>/           # namespace directory, one per user
//!     ├── <token>_notes.txt
//!     └── <token>_photo.png
//! ```
//!
//! ## Example Usage
//!
//! ```no_run
//! use locker_files::BlobStore;
//! use locker_types::FileName;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = BlobStore::new("data/alice");
//! store.ensure_directory()?;
//!
//! let stored_name = FileName::new("550e8400e29b41d4a716446655440000_notes.txt")?;
//! let size = store.store(Path::new("notes.txt"), &stored_name)?;
//! # Ok(())
//! # }
//! ```

mod blobs;

pub use blobs::BlobStore;
pub use locker_types::FileName;

/// Errors that can occur during blob operations
#[derive(Debug, thiserror::Error)]
pub enum FilesError {
    /// Namespace path exists but is not a directory, or cannot be created
    #[error("Invalid namespace directory: {0}")]
    InvalidDirectory(String),

    /// A blob expected under the namespace is absent
    #[error("Blob missing: {}", .0.display())]
    BlobMissing(std::path::PathBuf),

    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
