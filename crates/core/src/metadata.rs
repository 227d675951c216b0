//! Metadata store: per-user log of [`FileRecord`]s.
//!
//! Each user owns `<data_dir>/<username>_files.txt`. Uploads append; `update`
//! and `remove` rewrite the whole log through a temp file and rename. Every
//! operation takes the owning [`User`], and the log location is derived only
//! from that user, so a record id is never resolved outside its owner's scope.
//!
//! ## Corrupt lines
//!
//! A line that does not parse, including one that is not valid UTF-8, is
//! logged with `tracing::warn!` and skipped. One damaged entry must not lock a
//! user out of the rest of their files. `update` and `remove` write skipped
//! lines back byte for byte, so an edit never destroys data that could still be
//! recovered by hand.

use crate::models::{FileRecord, User};
use crate::namespace::NamespaceResolver;
use crate::persist;
use crate::{LockerError, LockerResult};
use std::fs;
use std::io;
use std::path::PathBuf;

/// A metadata line that was skipped while reading a log.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CorruptLine {
    pub line: usize,
    /// The raw line, lossily decoded for display.
    pub content: String,
    pub reason: String,
}

/// Result of reading a user's log: the good records plus what was skipped.
#[derive(Clone, Debug, Default)]
pub struct MetadataListing {
    pub records: Vec<FileRecord>,
    pub corrupt: Vec<CorruptLine>,
}

/// One non-blank line of a log, in file order.
enum LogEntry {
    Record(FileRecord),
    Corrupt { raw: Vec<u8> },
}

impl LogEntry {
    fn into_bytes(self) -> Vec<u8> {
        match self {
            LogEntry::Record(record) => record.to_line().into_bytes(),
            LogEntry::Corrupt { raw } => raw,
        }
    }
}

/// File-backed per-user metadata store.
#[derive(Clone, Debug)]
pub struct MetadataStore {
    namespaces: NamespaceResolver,
}

impl MetadataStore {
    pub fn new(namespaces: NamespaceResolver) -> Self {
        Self { namespaces }
    }

    fn log_path(&self, user: &User) -> PathBuf {
        self.namespaces.user_metadata_location(user.username())
    }

    /// All readable records for `user`, in insertion order.
    pub fn list(&self, user: &User) -> LockerResult<Vec<FileRecord>> {
        Ok(self.read(user)?.records)
    }

    /// Reads the user's log, reporting skipped lines alongside the records.
    ///
    /// A log that does not exist yet yields an empty listing.
    pub fn read(&self, user: &User) -> LockerResult<MetadataListing> {
        let (entries, corrupt) = self.entries(user)?;
        let records = entries
            .into_iter()
            .filter_map(|entry| match entry {
                LogEntry::Record(record) => Some(record),
                LogEntry::Corrupt { .. } => None,
            })
            .collect();
        Ok(MetadataListing { records, corrupt })
    }

    /// Durably appends `record` to the user's log.
    ///
    /// Ids are not deduplicated; callers generate them randomly.
    pub fn append(&self, user: &User, record: &FileRecord) -> LockerResult<()> {
        let path = self.log_path(user);
        let file = persist::open_for_append(&path).map_err(LockerError::MetadataWrite)?;
        persist::append_line(&file, &record.to_line()).map_err(LockerError::MetadataWrite)
    }

    /// First record with `id` in the user's log.
    pub fn find_by_id(&self, user: &User, id: &str) -> LockerResult<Option<FileRecord>> {
        Ok(self.list(user)?.into_iter().find(|r| r.id == id))
    }

    /// Replaces the record whose id matches `record.id`.
    ///
    /// Returns `false` and leaves the log untouched if no record matches.
    pub fn update(&self, user: &User, record: &FileRecord) -> LockerResult<bool> {
        let (mut entries, _) = self.entries(user)?;
        let mut matched = false;
        for entry in entries.iter_mut() {
            if let LogEntry::Record(existing) = entry {
                if existing.id == record.id {
                    *existing = record.clone();
                    matched = true;
                }
            }
        }

        if matched {
            self.rewrite(user, entries)?;
        }
        Ok(matched)
    }

    /// Removes every record with `id`. Returns whether anything was removed.
    pub fn remove(&self, user: &User, id: &str) -> LockerResult<bool> {
        let (entries, _) = self.entries(user)?;
        let before = entries.len();
        let remaining: Vec<LogEntry> = entries
            .into_iter()
            .filter(|entry| !matches!(entry, LogEntry::Record(r) if r.id == id))
            .collect();

        if remaining.len() == before {
            return Ok(false);
        }
        self.rewrite(user, remaining)?;
        Ok(true)
    }

    /// Splits the log on `\n` and parses each non-blank line on its own.
    fn entries(&self, user: &User) -> LockerResult<(Vec<LogEntry>, Vec<CorruptLine>)> {
        let path = self.log_path(user);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Default::default()),
            Err(e) => return Err(LockerError::MetadataRead(e)),
        };

        let mut entries = Vec::new();
        let mut corrupt = Vec::new();
        for (index, raw) in bytes.split(|b| *b == b'\n').enumerate() {
            let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
            if raw.iter().all(u8::is_ascii_whitespace) {
                continue;
            }

            let parsed = std::str::from_utf8(raw)
                .map_err(|e| format!("invalid UTF-8: {e}"))
                .and_then(FileRecord::parse_line);
            match parsed {
                Ok(record) => entries.push(LogEntry::Record(record)),
                Err(reason) => {
                    tracing::warn!(
                        user = %user.username(),
                        path = %path.display(),
                        line = index + 1,
                        %reason,
                        "skipping corrupt file metadata line"
                    );
                    corrupt.push(CorruptLine {
                        line: index + 1,
                        content: String::from_utf8_lossy(raw).into_owned(),
                        reason,
                    });
                    entries.push(LogEntry::Corrupt { raw: raw.to_vec() });
                }
            }
        }

        Ok((entries, corrupt))
    }

    fn rewrite(&self, user: &User, entries: Vec<LogEntry>) -> LockerResult<()> {
        persist::rewrite_lines(
            &self.log_path(user),
            entries.into_iter().map(LogEntry::into_bytes),
        )
        .map_err(LockerError::MetadataWrite)
    }
}
