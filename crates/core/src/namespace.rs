//! Per-user storage locations.
//!
//! A user's namespace is the pair of their blob directory and their metadata
//! log, both derived from the data directory and the validated username:
//!
//! ```text
//! <data_dir>/
//! ├── users.txt
//! ├── alice_files.txt   # metadata log
//! └── alice/            # blob directory
//! ```
//!
//! Nothing here reads user-supplied paths. The username alphabet excludes `.`,
//! so a blob directory can never coincide with `users.txt` or with any
//! `<name>_files.txt`, and two distinct usernames never share a path.

use crate::config::CoreConfig;
use locker_files::BlobStore;
use locker_types::Username;
use std::path::PathBuf;
use std::sync::Arc;

/// Pure path derivation for user namespaces.
#[derive(Clone, Debug)]
pub struct NamespaceResolver {
    cfg: Arc<CoreConfig>,
}

impl NamespaceResolver {
    pub fn new(cfg: Arc<CoreConfig>) -> Self {
        Self { cfg }
    }

    /// `<data_dir>/<username>`
    pub fn user_directory(&self, username: &Username) -> PathBuf {
        self.cfg.data_dir().join(username.as_str())
    }

    /// `<data_dir>/<username>_files.txt`
    pub fn user_metadata_location(&self, username: &Username) -> PathBuf {
        self.cfg.metadata_file_for(username.as_str())
    }

    /// Blob store bound to the user's directory. Performs no I/O.
    pub fn blob_store(&self, username: &Username) -> BlobStore {
        let directory = self.user_directory(username);
        tracing::debug!(user = %username, directory = %directory.display(), "resolved namespace");
        BlobStore::new(directory)
    }
}
