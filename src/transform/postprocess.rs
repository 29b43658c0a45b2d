//! Post-Processor: in-place de-duplication of emitted tables
//!
//! Whole-file-in-memory: the table is read completely before rewriting.
//! Fine for per-source KGX tables; not suitable for streaming arbitrarily
//! large files.

use crate::convert::staging::{commit, staging_file};
use std::collections::HashSet;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PostProcessError {
    #[error("cannot de-duplicate {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Data row counts (header excluded) around a de-duplication pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DedupReport {
    pub rows_before: usize,
    pub rows_after: usize,
}

impl DedupReport {
    pub fn removed(&self) -> usize {
        self.rows_before - self.rows_after
    }
}

/// Remove exact duplicate rows from the table at `path`.
///
/// The header line is kept, survivors keep their first-occurrence order and
/// blank lines are dropped. Rows are split on `\n` alone, so a `\r` stays
/// part of its row and line endings are never rewritten. The file is
/// rewritten (atomically) only if its content changes, so a second pass
/// leaves it untouched.
pub fn deduplicate(path: &Path) -> Result<DedupReport, PostProcessError> {
    let io_err = |source| PostProcessError::Io {
        path: path.to_path_buf(),
        source,
    };
    let original = fs::read_to_string(path).map_err(io_err)?;

    let mut lines = original.split_terminator('\n');
    let mut output = String::with_capacity(original.len());
    let mut report = DedupReport::default();

    if let Some(header) = lines.next() {
        output.push_str(header);
        output.push('\n');
    }

    let mut seen = HashSet::new();
    for line in lines.filter(|l| !l.trim().is_empty()) {
        report.rows_before += 1;
        if seen.insert(line) {
            report.rows_after += 1;
            output.push_str(line);
            output.push('\n');
        }
    }

    if output != original {
        let mut staged = staging_file(path).map_err(io_err)?;
        staged.write_all(output.as_bytes()).map_err(io_err)?;
        commit(staged, path).map_err(io_err)?;
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(content: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("edges.tsv");
        fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn removes_duplicates_keeping_first_order() {
        let (_dir, path) = table("id\tname\nb\t2\na\t1\nb\t2\nc\t3\na\t1\n");
        let report = deduplicate(&path).unwrap();

        assert_eq!(report, DedupReport { rows_before: 5, rows_after: 3 });
        assert_eq!(report.removed(), 2);
        assert_eq!(fs::read_to_string(&path).unwrap(), "id\tname\nb\t2\na\t1\nc\t3\n");
    }

    #[test]
    fn rows_equal_to_the_header_are_data() {
        let (_dir, path) = table("id\nid\nid\n");
        let report = deduplicate(&path).unwrap();
        assert_eq!(report.rows_after, 1);
        assert_eq!(fs::read_to_string(&path).unwrap(), "id\nid\n");
    }

    #[test]
    fn rows_differing_in_one_column_survive() {
        let (_dir, path) = table("s\tp\to\na\tx\tb\na\ty\tb\n");
        assert_eq!(deduplicate(&path).unwrap().removed(), 0);
    }

    #[test]
    fn carriage_returns_are_part_of_the_row() {
        let (_dir, path) = table("id\r\na\r\na\r\na\n");
        let report = deduplicate(&path).unwrap();

        assert_eq!(report, DedupReport { rows_before: 3, rows_after: 2 });
        assert_eq!(fs::read_to_string(&path).unwrap(), "id\r\na\r\na\n");
    }

    #[test]
    fn crlf_table_without_duplicates_is_byte_identical() {
        let content = "id\tname\r\nX:1\tone\r\nX:2\ttwo\r\n";
        let (_dir, path) = table(content);

        assert_eq!(deduplicate(&path).unwrap().removed(), 0);
        assert_eq!(fs::read(&path).unwrap(), content.as_bytes());
    }

    #[test]
    fn clean_table_is_not_rewritten() {
        let (_dir, path) = table("id\na\nb\n");
        let before = fs::metadata(&path).unwrap().modified().unwrap();
        std::thread::sleep(std::time::Duration::from_millis(20));

        let report = deduplicate(&path).unwrap();
        assert_eq!(report.removed(), 0);
        assert_eq!(fs::metadata(&path).unwrap().modified().unwrap(), before);
    }

    #[test]
    fn empty_and_header_only_tables() {
        let (_dir, path) = table("");
        assert_eq!(deduplicate(&path).unwrap(), DedupReport::default());
        assert_eq!(fs::read_to_string(&path).unwrap(), "");

        let (_dir, path) = table("id\tname\n");
        assert_eq!(deduplicate(&path).unwrap(), DedupReport::default());
    }

    #[test]
    fn missing_table_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(deduplicate(&dir.path().join("nodes.tsv")).is_err());
    }
}
