//! The locker engine.
//!
//! [`LockerEngine`] is the only component that touches the identity store, the
//! metadata store and blob storage together. It is stateless between calls:
//! the caller owns the [`Session`] and passes it to each operation.
//!
//! ## Upload ordering
//!
//! An upload appends its metadata record only after the blob has been fully
//! copied, synced and renamed into place. If the append then fails, the blob
//! is removed again, so a failed upload never leaves a record pointing at
//! nothing and never leaves an orphaned blob unless cleanup itself fails
//! (reported as [`LockerError::CleanupAfterUploadFailed`]).
//!
//! ## Access control
//!
//! Every file lookup goes through the metadata log of the session's user. An id
//! that belongs to another user resolves to [`LockerError::NotFound`], exactly
//! as if it had never existed.

use crate::config::CoreConfig;
use crate::constants::{STORED_NAME_SEPARATOR, UPLOAD_TIMESTAMP_FORMAT};
use crate::hasher::{CredentialHasher, Sha256Hasher};
use crate::identity::IdentityStore;
use crate::metadata::MetadataStore;
use crate::models::{FileRecord, User};
use crate::namespace::NamespaceResolver;
use crate::session::Session;
use crate::{LockerError, LockerResult};
use chrono::Local;
use locker_files::FilesError;
use locker_types::{FileName, Username};
use locker_uuid::LockerId;
use std::path::Path;
use std::sync::Arc;

/// Longest stored name most filesystems accept for a single path segment.
const MAX_STORED_NAME_LEN: usize = 255;

// ============================================================================
// ENGINE
// ============================================================================

/// Orchestrates registration, authentication and file operations.
///
/// Generic over the credential hasher so deployments and tests can inject
/// their own; [`Sha256Hasher`] is the default.
#[derive(Clone, Debug)]
pub struct LockerEngine<H = Sha256Hasher> {
    identities: IdentityStore,
    metadata: MetadataStore,
    namespaces: NamespaceResolver,
    hasher: H,
}

impl LockerEngine<Sha256Hasher> {
    /// Creates an engine with the default salted SHA-256 hasher.
    pub fn new(cfg: Arc<CoreConfig>) -> Self {
        Self::with_hasher(cfg, Sha256Hasher::new())
    }
}

impl<H: CredentialHasher> LockerEngine<H> {
    /// Creates an engine using `hasher` for credential digests.
    ///
    /// Performs no I/O; the data directory is expected to exist already (see
    /// [`CoreConfig::ensure_data_dir`]).
    pub fn with_hasher(cfg: Arc<CoreConfig>, hasher: H) -> Self {
        let namespaces = NamespaceResolver::new(Arc::clone(&cfg));
        Self {
            identities: IdentityStore::new(cfg.users_file()),
            metadata: MetadataStore::new(namespaces.clone()),
            namespaces,
            hasher,
        }
    }

    // ------------------------------------------------------------------------
    // Identity
    // ------------------------------------------------------------------------

    /// Registers a new user and creates their empty namespace directory.
    ///
    /// # Errors
    ///
    /// - `Validation` if the username fails the allow-list or the password is blank.
    /// - `DuplicateIdentity` if the username is taken; the stored credential is untouched.
    /// - `NamespaceCreation` if the user was persisted but their directory could not be
    ///   created. The account exists; the directory is created again on first upload.
    pub fn register(&self, username: &str, password: &str) -> LockerResult<User> {
        let username = Username::parse(username)?;
        if password.trim().is_empty() {
            return Err(LockerError::Validation("password cannot be empty".into()));
        }

        let digest = self.hasher.hash(password);
        if !self.identities.create(&username, &digest)? {
            return Err(LockerError::DuplicateIdentity(username.to_string()));
        }
        tracing::info!(user = %username, "registered user");

        self.namespaces
            .blob_store(&username)
            .ensure_directory()
            .map_err(|source| LockerError::NamespaceCreation {
                username: username.to_string(),
                source,
            })?;

        Ok(User::new(username, digest))
    }

    /// Checks `password` for `username`.
    ///
    /// Unknown usernames, malformed usernames and wrong passwords all return the
    /// same `AuthFailure`.
    pub fn authenticate(&self, username: &str, password: &str) -> LockerResult<User> {
        let Ok(username) = Username::parse(username) else {
            return Err(LockerError::AuthFailure);
        };

        match self.identities.find(&username)? {
            Some(user) if self.hasher.verify(password, user.credential_digest()) => {
                tracing::info!(user = %username, "authenticated");
                Ok(user)
            }
            _ => {
                tracing::debug!(user = %username, "authentication failed");
                Err(LockerError::AuthFailure)
            }
        }
    }

    /// Moves `session` back to anonymous.
    pub fn logout(&self, session: &mut Session) {
        session.logout();
    }

    // ------------------------------------------------------------------------
    // Files
    // ------------------------------------------------------------------------

    /// Copies `source` into the session user's locker and records it.
    ///
    /// The stored name is a fresh random token joined to the original file name,
    /// so uploads never overwrite each other. The recorded size is the number of
    /// bytes actually copied.
    ///
    /// # Errors
    ///
    /// - `NotAuthenticated` without a signed-in user.
    /// - `Validation` if `source` has no usable final path segment.
    /// - `Files` if the namespace cannot be prepared or the copy fails. No record
    ///   is written in that case.
    /// - `MetadataWrite` if the record cannot be appended; the blob is removed.
    pub fn upload(&self, session: &Session, source: &Path) -> LockerResult<FileRecord> {
        let user = session.current()?;
        let blobs = self.namespaces.blob_store(user.username());
        blobs.ensure_directory()?;

        let original_name = original_name_of(source)?;
        let stored_name = FileName::new(format!(
            "{}{STORED_NAME_SEPARATOR}{}",
            LockerId::new(),
            original_name
        ))?;
        if stored_name.as_str().len() > MAX_STORED_NAME_LEN {
            return Err(LockerError::Validation(format!(
                "file name {original_name} is too long"
            )));
        }

        let size_bytes = blobs.store(source, &stored_name)?;

        let record = FileRecord {
            id: LockerId::new().to_string(),
            original_name,
            stored_name,
            upload_timestamp: Local::now().format(UPLOAD_TIMESTAMP_FORMAT).to_string(),
            size_bytes,
        };

        if let Err(upload_error) = self.metadata.append(user, &record) {
            let path = blobs.blob_path(&record.stored_name);
            return Err(match blobs.discard(&record.stored_name) {
                Ok(()) => upload_error,
                Err(cleanup_error) => LockerError::CleanupAfterUploadFailed {
                    path,
                    upload_error: Box::new(upload_error),
                    cleanup_error,
                },
            });
        }

        tracing::info!(
            user = %user.username(),
            file_id = %record.id,
            size = record.size_bytes,
            "uploaded file"
        );
        Ok(record)
    }

    /// Copies a stored file to `destination_dir/<original name>`, replacing any
    /// file already there.
    ///
    /// # Returns
    ///
    /// The number of bytes written.
    ///
    /// # Errors
    ///
    /// - `NotFound` if `file_id` is not in the session user's log.
    /// - `BlobMissing` if the record exists but its stored blob does not.
    /// - `Validation` for a blank id or a destination that is not a directory.
    pub fn download(
        &self,
        session: &Session,
        file_id: &str,
        destination_dir: &Path,
    ) -> LockerResult<u64> {
        let user = session.current()?;
        let record = self.find_file(session, file_id)?;

        if !destination_dir.is_dir() {
            return Err(LockerError::Validation(format!(
                "destination {} is not a directory",
                destination_dir.display()
            )));
        }

        let blobs = self.namespaces.blob_store(user.username());
        let destination = destination_dir.join(record.original_name.as_str());
        let written = blobs
            .retrieve(&record.stored_name, &destination)
            .map_err(|e| match e {
                FilesError::BlobMissing(path) => {
                    tracing::warn!(
                        user = %user.username(),
                        file_id = %record.id,
                        path = %path.display(),
                        "metadata record has no stored blob"
                    );
                    LockerError::BlobMissing {
                        id: record.id.clone(),
                        path,
                    }
                }
                other => LockerError::Files(other),
            })?;

        tracing::info!(
            user = %user.username(),
            file_id = %record.id,
            destination = %destination.display(),
            "downloaded file"
        );
        Ok(written)
    }

    /// The session user's file records in upload order.
    pub fn list(&self, session: &Session) -> LockerResult<Vec<FileRecord>> {
        self.metadata.list(session.current()?)
    }

    /// Resolves `file_id` within the session user's log.
    pub fn find_file(&self, session: &Session, file_id: &str) -> LockerResult<FileRecord> {
        let user = session.current()?;
        let file_id = file_id.trim();
        if file_id.is_empty() {
            return Err(LockerError::Validation("file id cannot be empty".into()));
        }

        self.metadata
            .find_by_id(user, file_id)?
            .ok_or_else(|| LockerError::NotFound(file_id.to_string()))
    }
}

/// Final path segment of `source` as a validated [`FileName`].
fn original_name_of(source: &Path) -> LockerResult<FileName> {
    let name = source
        .file_name()
        .ok_or_else(|| {
            LockerError::Validation(format!("{} has no file name", source.display()))
        })?
        .to_str()
        .ok_or_else(|| {
            LockerError::Validation(format!("{} is not valid UTF-8", source.display()))
        })?;

    FileName::new(name).map_err(|e| LockerError::Validation(format!("file name {name:?}: {e}")))
}
