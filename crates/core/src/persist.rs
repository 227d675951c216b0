//! Durable line-file primitives shared by the identity and metadata stores.
//!
//! Every function here has completed an `fsync` before it returns `Ok`, so a
//! store operation never reports success while a write is still buffered.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Opens `path` for reading and appending, creating it if absent.
pub(crate) fn open_for_append(path: &Path) -> io::Result<File> {
    OpenOptions::new()
        .read(true)
        .append(true)
        .create(true)
        .open(path)
}

/// Appends `line` plus a newline to `file` and syncs it.
///
/// If the file's last byte is not a newline (for example after a hand edit),
/// one is written first so the new record starts on its own line.
pub(crate) fn append_line(file: &File, line: &str) -> io::Result<()> {
    let mut buf = String::with_capacity(line.len() + 2);
    if !ends_with_newline(file)? {
        buf.push('\n');
    }
    buf.push_str(line);
    buf.push('\n');

    let mut writer = file;
    writer.write_all(buf.as_bytes())?;
    writer.flush()?;
    file.sync_all()
}

/// Replaces the contents of `path` with `lines`, one per line.
///
/// The new contents are written to a temp file in the same directory, synced
/// and renamed over `path`, so a reader sees either the old file or the new
/// one and never a partial write.
pub(crate) fn rewrite_lines<I, S>(path: &Path, lines: I) -> io::Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<[u8]>,
{
    let directory = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut temp = NamedTempFile::new_in(directory)?;
    for line in lines {
        temp.write_all(line.as_ref())?;
        temp.write_all(b"\n")?;
    }
    temp.flush()?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Reads the whole of `file` from the start.
pub(crate) fn read_all(file: &File) -> io::Result<String> {
    let mut reader = file;
    reader.seek(SeekFrom::Start(0))?;
    let mut contents = String::new();
    reader.read_to_string(&mut contents)?;
    Ok(contents)
}

fn ends_with_newline(file: &File) -> io::Result<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(true);
    }
    let mut reader = file;
    reader.seek(SeekFrom::End(-1))?;
    let mut last = [0u8; 1];
    reader.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_append_creates_and_appends() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("log.txt");

        append_line(&open_for_append(&path).unwrap(), "one").unwrap();
        append_line(&open_for_append(&path).unwrap(), "two").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "one\ntwo\n");
    }

    #[test]
    fn test_append_repairs_missing_trailing_newline() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("log.txt");
        fs::write(&path, "hand-edited").unwrap();

        append_line(&open_for_append(&path).unwrap(), "next").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "hand-edited\nnext\n");
    }

    #[test]
    fn test_rewrite_replaces_contents_and_leaves_no_temp_files() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("log.txt");
        fs::write(&path, "a\nb\nc\n").unwrap();

        rewrite_lines(&path, ["c", "a"]).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "c\na\n");
        assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_rewrite_to_empty() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("log.txt");
        fs::write(&path, "a\n").unwrap();

        rewrite_lines(&path, Vec::<String>::new()).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn test_read_all_starts_from_beginning() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("log.txt");
        let file = open_for_append(&path).unwrap();
        append_line(&file, "x").unwrap();

        assert_eq!(read_all(&file).unwrap(), "x\n");
    }
}
