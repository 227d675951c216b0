//! # Locker Core
//!
//! Core business logic for the multi-user file locker.
//!
//! This crate owns everything that touches the data directory:
//! - Registration and authentication against the identity store (`users.txt`)
//! - Per-user metadata logs (`<username>_files.txt`)
//! - Per-user blob directories, through [`locker_files::BlobStore`]
//!
//! **No terminal I/O**: menus, prompts and argument parsing belong in the runner
//! binary and `locker-cli`; [`report`] only renders listings to strings. Every
//! fallible operation here returns a [`LockerError`].

pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod hasher;
pub mod identity;
pub mod metadata;
pub mod models;
pub mod namespace;
pub mod report;
pub mod session;

mod persist;

pub use config::CoreConfig;
pub use engine::LockerEngine;
pub use error::{LockerError, LockerResult};
pub use hasher::{CredentialHasher, Sha256Hasher};
pub use metadata::{CorruptLine, MetadataListing};
pub use models::{FileRecord, User};
pub use session::Session;

pub use locker_types::{FileName, TextError, Username};
