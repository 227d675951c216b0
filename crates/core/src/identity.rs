//! Identity store: username to credential digest.
//!
//! Backed by `<data_dir>/users.txt`, one `username|credentialDigest` line per
//! account. Records are never updated or removed.
//!
//! ## Corrupt lines
//!
//! Blank lines are ignored. Any other line that does not parse is a hard
//! [`LockerError::CorruptRecord`]: with an unreadable entry in the file the
//! store can no longer prove that a username is free, so it refuses to answer
//! rather than risk a duplicate registration.

use crate::models::User;
use crate::persist;
use crate::{LockerError, LockerResult};
use fs4::FileExt;
use locker_types::{Username, FIELD_DELIMITER};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// File-backed store of registered users.
#[derive(Clone, Debug)]
pub struct IdentityStore {
    path: PathBuf,
}

impl IdentityStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Looks up `username`. A missing store file means no users yet.
    ///
    /// # Errors
    ///
    /// - `IdentityRead` if the file exists but cannot be read.
    /// - `CorruptRecord` if a non-blank line before the match is malformed.
    pub fn find(&self, username: &Username) -> LockerResult<Option<User>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(LockerError::IdentityRead(e)),
        };
        self.scan(&contents, username)
    }

    /// Persists a new user unless `username` is already taken.
    ///
    /// The existence check and the append happen under one exclusive lock on
    /// the store file, so two callers racing on the same username cannot both
    /// succeed. The line is synced before the lock is released.
    ///
    /// # Returns
    ///
    /// `Ok(true)` if the user was written, `Ok(false)` if the username exists.
    pub fn create(&self, username: &Username, credential_digest: &str) -> LockerResult<bool> {
        if credential_digest.is_empty()
            || credential_digest.contains(FIELD_DELIMITER)
            || credential_digest.contains(['\r', '\n'])
        {
            return Err(LockerError::Validation(
                "credential digest must be a non-empty single field".into(),
            ));
        }

        let file = persist::open_for_append(&self.path).map_err(LockerError::IdentityWrite)?;
        FileExt::lock_exclusive(&file).map_err(LockerError::IdentityWrite)?;

        let contents = persist::read_all(&file).map_err(LockerError::IdentityRead)?;
        if self.scan(&contents, username)?.is_some() {
            return Ok(false);
        }

        let user = User::new(username.clone(), credential_digest.to_string());
        persist::append_line(&file, &user.to_line()).map_err(LockerError::IdentityWrite)?;

        // Dropping the handle releases the lock.
        Ok(true)
    }

    fn scan(&self, contents: &str, username: &Username) -> LockerResult<Option<User>> {
        for (index, raw) in contents.lines().enumerate() {
            let line = raw.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }

            let user = User::parse_line(line).map_err(|reason| LockerError::CorruptRecord {
                path: self.path.clone(),
                line: index + 1,
                reason,
            })?;

            if user.username() == username {
                return Ok(Some(user));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Barrier};
    use std::thread;
    use tempfile::TempDir;

    fn user(name: &str) -> Username {
        Username::parse(name).unwrap()
    }

    fn store(temp: &TempDir) -> IdentityStore {
        IdentityStore::new(temp.path().join("users.txt"))
    }

    #[test]
    fn test_find_on_missing_file_is_none() {
        let temp = TempDir::new().unwrap();
        assert_eq!(store(&temp).find(&user("alice")).unwrap(), None);
    }

    #[test]
    fn test_create_then_find() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);

        assert!(store.create(&user("alice"), "digest-a").unwrap());
        assert!(store.create(&user("bob"), "digest-b").unwrap());

        let alice = store.find(&user("alice")).unwrap().unwrap();
        assert_eq!(alice.username().as_str(), "alice");
        assert_eq!(alice.credential_digest(), "digest-a");
        assert_eq!(store.find(&user("carol")).unwrap(), None);

        assert_eq!(
            fs::read_to_string(store.path()).unwrap(),
            "alice|digest-a\nbob|digest-b\n"
        );
    }

    #[test]
    fn test_duplicate_create_is_rejected_and_keeps_original_digest() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);

        assert!(store.create(&user("alice"), "first").unwrap());
        assert!(!store.create(&user("alice"), "second").unwrap());

        let alice = store.find(&user("alice")).unwrap().unwrap();
        assert_eq!(alice.credential_digest(), "first");
        assert_eq!(fs::read_to_string(store.path()).unwrap().lines().count(), 1);
    }

    #[test]
    fn test_concurrent_creates_admit_exactly_one() {
        let temp = TempDir::new().unwrap();
        let store = Arc::new(store(&temp));
        let barrier = Arc::new(Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    store.create(&user("alice"), &format!("digest-{i}")).unwrap()
                })
            })
            .collect();

        let successes = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|created| *created)
            .count();

        assert_eq!(successes, 1);
        assert_eq!(fs::read_to_string(store.path()).unwrap().lines().count(), 1);
    }

    #[test]
    fn test_blank_lines_are_tolerated() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        fs::write(store.path(), "alice|a\n\n   \nbob|b\n\n").unwrap();

        assert!(store.find(&user("bob")).unwrap().is_some());
        assert!(store.create(&user("carol"), "c").unwrap());
        assert!(store.find(&user("carol")).unwrap().is_some());
    }

    #[test]
    fn test_corrupt_line_fails_hard() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        fs::write(store.path(), "alice|a\nthis line is broken\nbob|b\n").unwrap();

        match store.find(&user("bob")) {
            Err(LockerError::CorruptRecord { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected CorruptRecord, got {other:?}"),
        }
        assert!(matches!(
            store.create(&user("carol"), "c"),
            Err(LockerError::CorruptRecord { .. })
        ));
    }

    #[test]
    fn test_digest_with_delimiter_is_rejected() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);

        for digest in ["", "a|b", "a\nb"] {
            assert!(matches!(
                store.create(&user("alice"), digest),
                Err(LockerError::Validation(_))
            ));
        }
        assert!(!store.path().exists());
    }
}
