//! Constants used throughout the locker core crate.
//!
//! This module contains all path and filename constants to ensure
//! consistency across the codebase and make maintenance easier.

/// Default directory for locker data when no explicit directory is configured.
pub const DEFAULT_DATA_DIR: &str = "data";

/// Environment variable naming the data directory.
pub const DATA_DIR_ENV: &str = "LOCKER_DATA_DIR";

/// Filename of the identity store inside the data directory.
pub const USERS_FILENAME: &str = "users.txt";

/// Suffix appended to a username to form that user's metadata log filename.
pub const METADATA_FILENAME_SUFFIX: &str = "_files.txt";

/// Separator between a stored-name token and the original filename.
pub const STORED_NAME_SEPARATOR: char = '_';

/// Timestamp layout written into file records.
pub const UPLOAD_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Number of `|`-separated fields in an identity line.
pub const USER_FIELD_COUNT: usize = 2;

/// Number of `|`-separated fields in a file record line.
pub const FILE_RECORD_FIELD_COUNT: usize = 5;
