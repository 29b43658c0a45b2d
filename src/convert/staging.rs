//! Temp-file-plus-rename writes
//!
//! Every artifact this crate writes is staged in a temporary file next to
//! its final path and renamed into place once complete. A crashed or failed
//! write leaves no file at the final path, so an existing file is always a
//! finished one.

use std::fs;
use std::io;
use std::path::Path;
use tempfile::NamedTempFile;

/// Create a temporary file in the directory that will hold `target`.
///
/// The directory is created if missing. The file is deleted on drop unless
/// committed.
pub(crate) fn staging_file(target: &Path) -> io::Result<NamedTempFile> {
    staging_file_with_suffix(target, ".part")
}

/// Like [`staging_file`], with a caller-chosen suffix (some tools infer the
/// format to write from the file extension).
pub(crate) fn staging_file_with_suffix(target: &Path, suffix: &str) -> io::Result<NamedTempFile> {
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;
    tempfile::Builder::new()
        .prefix(".kg-enp-")
        .suffix(suffix)
        .tempfile_in(dir)
}

/// Atomically move a staged file to `target`, replacing any existing file.
pub(crate) fn commit(staged: NamedTempFile, target: &Path) -> io::Result<()> {
    staged.persist(target).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn committed_file_appears_at_target() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested").join("out.txt");

        let mut staged = staging_file(&target).unwrap();
        staged.write_all(b"hello").unwrap();
        assert!(!target.exists());

        commit(staged, &target).unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "hello");
    }

    #[test]
    fn dropped_file_leaves_nothing_behind() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.txt");

        {
            let mut staged = staging_file(&target).unwrap();
            staged.write_all(b"partial").unwrap();
        }

        assert!(!target.exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
