//! Plain-text rendering of a user's file listing.

use crate::models::FileRecord;
use std::fmt::Write;

pub const EMPTY_LOCKER_MESSAGE: &str = "Your locker is empty.";

const ID_WIDTH: usize = 32;
const NAME_WIDTH: usize = 30;
const DATE_WIDTH: usize = 20;

/// Renders `records` as a fixed-width table, or [`EMPTY_LOCKER_MESSAGE`].
///
/// Names longer than the column are printed in full and push the row wider.
pub fn file_table(records: &[FileRecord]) -> String {
    if records.is_empty() {
        return format!("{EMPTY_LOCKER_MESSAGE}\n");
    }

    let rule = "-".repeat(ID_WIDTH + NAME_WIDTH + DATE_WIDTH + 15);
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<ID_WIDTH$} {:<NAME_WIDTH$} {:<DATE_WIDTH$} {}",
        "ID", "Original Filename", "Upload Date", "Size (bytes)"
    );
    let _ = writeln!(out, "{rule}");
    for record in records {
        let _ = writeln!(
            out,
            "{:<ID_WIDTH$} {:<NAME_WIDTH$} {:<DATE_WIDTH$} {}",
            record.id,
            record.original_name.as_str(),
            record.upload_timestamp,
            record.size_bytes
        );
    }
    let _ = writeln!(out, "{rule}");
    out
}
