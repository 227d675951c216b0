//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at process startup and then
//! passed into core services. Operations never read process-wide environment variables; the
//! binaries resolve `LOCKER_DATA_DIR` and hand the result to [`CoreConfig::new`].

use crate::constants::{DEFAULT_DATA_DIR, METADATA_FILENAME_SUFFIX, USERS_FILENAME};
use crate::{LockerError, LockerResult};
use std::fs;
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    data_dir: PathBuf,
}

impl CoreConfig {
    /// Create a new `CoreConfig` rooted at `data_dir`.
    ///
    /// Performs no I/O. Call [`CoreConfig::ensure_data_dir`] before handing the
    /// config to the engine.
    pub fn new(data_dir: PathBuf) -> LockerResult<Self> {
        if data_dir.as_os_str().is_empty() {
            return Err(LockerError::Validation("data_dir cannot be empty".into()));
        }

        Ok(Self { data_dir })
    }

    /// Build a config from an optional `LOCKER_DATA_DIR` value.
    ///
    /// `None`, empty or whitespace-only values select [`DEFAULT_DATA_DIR`].
    pub fn from_env_value(value: Option<String>) -> LockerResult<Self> {
        let dir = value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_DATA_DIR.to_string());

        Self::new(PathBuf::from(dir))
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn users_file(&self) -> PathBuf {
        self.data_dir.join(USERS_FILENAME)
    }

    /// Returns the path of the metadata log for the raw `username` segment.
    ///
    /// Callers pass an already validated username; see `NamespaceResolver`.
    pub(crate) fn metadata_file_for(&self, username: &str) -> PathBuf {
        self.data_dir
            .join(format!("{username}{METADATA_FILENAME_SUFFIX}"))
    }

    /// Create the data directory if needed.
    ///
    /// Failure here is fatal at startup: there is no mode that runs without
    /// durable storage.
    pub fn ensure_data_dir(&self) -> LockerResult<()> {
        fs::create_dir_all(&self.data_dir).map_err(LockerError::StorageDirCreation)?;
        if !self.data_dir.is_dir() {
            return Err(LockerError::StorageDirCreation(std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                format!("{} is not a directory", self.data_dir.display()),
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_from_env_value_defaults() {
        for value in [None, Some(String::new()), Some("   ".into())] {
            let cfg = CoreConfig::from_env_value(value).unwrap();
            assert_eq!(cfg.data_dir(), Path::new(DEFAULT_DATA_DIR));
        }
    }

    #[test]
    fn test_from_env_value_uses_trimmed_override() {
        let cfg = CoreConfig::from_env_value(Some(" /srv/locker ".into())).unwrap();
        assert_eq!(cfg.data_dir(), Path::new("/srv/locker"));
        assert_eq!(cfg.users_file(), Path::new("/srv/locker/users.txt"));
        assert_eq!(
            cfg.metadata_file_for("alice"),
            Path::new("/srv/locker/alice_files.txt")
        );
    }

    #[test]
    fn test_new_rejects_empty_path() {
        assert!(matches!(
            CoreConfig::new(PathBuf::new()),
            Err(LockerError::Validation(_))
        ));
    }

    #[test]
    fn test_ensure_data_dir_creates_nested_directories() {
        let temp = TempDir::new().unwrap();
        let cfg = CoreConfig::new(temp.path().join("a").join("b")).unwrap();
        cfg.ensure_data_dir().unwrap();
        assert!(cfg.data_dir().is_dir());
    }

    #[test]
    fn test_ensure_data_dir_fails_when_path_is_a_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("data");
        fs::write(&path, "x").unwrap();

        let cfg = CoreConfig::new(path).unwrap();
        assert!(matches!(
            cfg.ensure_data_dir(),
            Err(LockerError::StorageDirCreation(_))
        ));
    }
}
