//! Random identifiers for locker records and stored blobs.
//!
//! The locker needs two kinds of unguessable token: the id that names a file
//! record inside a user's metadata log, and the prefix that makes a stored blob
//! name unique on disk. Both use the same canonical form: **32 lowercase
//! hexadecimal characters** (a v4 UUID in simple form, no hyphens).
//!
//! ## Canonical form
//! - Length: 32
//! - Characters: `0-9` and `a-f` only
//! - Example: `550e8400e29b41d4a716446655440000`
//!
//! Identifiers only flow outwards from here. Record ids read back from older
//! metadata logs may be hyphenated; the stores keep those as plain strings.

mod id;

pub use id::LockerId;
