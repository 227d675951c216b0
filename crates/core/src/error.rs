use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum LockerError {
    #[error("invalid input: {0}")]
    Validation(String),
    #[error("username already registered: {0}")]
    DuplicateIdentity(String),
    #[error("invalid username or password")]
    AuthFailure,
    #[error("no user is signed in")]
    NotAuthenticated,
    #[error("file with ID {0} not found in your locker")]
    NotFound(String),
    #[error(
        "stored content for file {id} is missing (expected at {path})",
        path = path.display()
    )]
    BlobMissing { id: String, path: PathBuf },
    #[error(
        "corrupt record at {path}:{line}: {reason}",
        path = path.display()
    )]
    CorruptRecord {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("user {username} was registered but their storage directory could not be created: {source}")]
    NamespaceCreation {
        username: String,
        #[source]
        source: locker_files::FilesError,
    },
    #[error(
        "upload failed and cleanup also failed (path: {path}): upload={upload_error}; cleanup={cleanup_error}",
        path = path.display()
    )]
    CleanupAfterUploadFailed {
        path: PathBuf,
        #[source]
        upload_error: Box<LockerError>,
        cleanup_error: locker_files::FilesError,
    },

    #[error("failed to create storage directory: {0}")]
    StorageDirCreation(std::io::Error),
    #[error("failed to read identity store: {0}")]
    IdentityRead(std::io::Error),
    #[error("failed to write identity store: {0}")]
    IdentityWrite(std::io::Error),
    #[error("failed to read file metadata: {0}")]
    MetadataRead(std::io::Error),
    #[error("failed to write file metadata: {0}")]
    MetadataWrite(std::io::Error),
    #[error("file storage error: {0}")]
    Files(#[from] locker_files::FilesError),
}

impl From<locker_types::TextError> for LockerError {
    fn from(e: locker_types::TextError) -> Self {
        LockerError::Validation(e.to_string())
    }
}

pub type LockerResult<T> = std::result::Result<T, LockerError>;
