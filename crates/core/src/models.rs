//! Locker domain records and their line formats.
//!
//! Both stores persist one record per line with fields joined by
//! [`FIELD_DELIMITER`]:
//!
//! ```text
//! users.txt          username|credentialDigest
//! <user>_files.txt   id|originalName|storedName|uploadTimestamp|sizeBytes
//! ```
//!
//! The validated field types guarantee that nothing written by [`User::to_line`]
//! or [`FileRecord::to_line`] contains the delimiter or a line break.

use crate::constants::{FILE_RECORD_FIELD_COUNT, USER_FIELD_COUNT};
use locker_types::{FileName, Username, FIELD_DELIMITER};
use serde::Serialize;

/// A registered account.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    username: Username,
    credential_digest: String,
}

impl User {
    pub(crate) fn new(username: Username, credential_digest: String) -> Self {
        Self {
            username,
            credential_digest,
        }
    }

    pub fn username(&self) -> &Username {
        &self.username
    }

    pub fn credential_digest(&self) -> &str {
        &self.credential_digest
    }

    pub(crate) fn to_line(&self) -> String {
        format!(
            "{}{FIELD_DELIMITER}{}",
            self.username, self.credential_digest
        )
    }

    /// Parses one identity line. The error string describes what is wrong.
    pub(crate) fn parse_line(line: &str) -> Result<Self, String> {
        let parts: Vec<&str> = line.split(FIELD_DELIMITER).collect();
        if parts.len() != USER_FIELD_COUNT {
            return Err(format!(
                "expected {USER_FIELD_COUNT} fields, found {}",
                parts.len()
            ));
        }

        let username = Username::parse(parts[0]).map_err(|e| format!("username: {e}"))?;
        if parts[1].is_empty() {
            return Err("credential digest is empty".into());
        }

        Ok(Self::new(username, parts[1].to_string()))
    }
}

/// Metadata for one file held in a user's locker.
///
/// `id` is unique only within its owner's log; it must never be resolved
/// without the owning user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FileRecord {
    pub id: String,
    pub original_name: FileName,
    pub stored_name: FileName,
    pub upload_timestamp: String,
    pub size_bytes: u64,
}

impl FileRecord {
    pub(crate) fn to_line(&self) -> String {
        let d = FIELD_DELIMITER;
        format!(
            "{}{d}{}{d}{}{d}{}{d}{}",
            self.id, self.original_name, self.stored_name, self.upload_timestamp, self.size_bytes
        )
    }

    /// Parses one metadata line. The error string describes what is wrong.
    pub(crate) fn parse_line(line: &str) -> Result<Self, String> {
        let parts: Vec<&str> = line.split(FIELD_DELIMITER).collect();
        if parts.len() != FILE_RECORD_FIELD_COUNT {
            return Err(format!(
                "expected {FILE_RECORD_FIELD_COUNT} fields, found {}",
                parts.len()
            ));
        }

        let id = parts[0].trim();
        if id.is_empty() {
            return Err("id is empty".into());
        }
        let original_name =
            FileName::new(parts[1]).map_err(|e| format!("original name: {e}"))?;
        let stored_name = FileName::new(parts[2]).map_err(|e| format!("stored name: {e}"))?;
        let size_bytes = parts[4]
            .trim()
            .parse::<u64>()
            .map_err(|e| format!("size {:?}: {e}", parts[4]))?;

        Ok(Self {
            id: id.to_string(),
            original_name,
            stored_name,
            upload_timestamp: parts[3].to_string(),
            size_bytes,
        })
    }
}
