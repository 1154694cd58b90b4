// src/backup.rs
// =============================================================================
// This module reads and writes the backup file.
//
// Format: one post per line, each line a compact JSON object exactly as the
// feed returned it. One record per line means a broken line can be skipped
// without losing the rest of the file.
//
// Functions:
// - BackupWriter: appends raw posts while the feed is being read
// - load_posts: reads the file back into typed Posts
// - print_backup: pretty-prints every record (for --show-backup)
// =============================================================================

use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

use crate::model::Post;

/// Errors while reading or writing the backup file
#[derive(Debug, Error)]
pub enum BackupError {
    #[error("cannot find backup file '{0}'")]
    NotFound(PathBuf),

    #[error("backup file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot serialize post: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl BackupError {
    fn io(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            BackupError::NotFound(path.to_path_buf())
        } else {
            BackupError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }
}

/// Appends posts to the backup file, one JSON object per line
pub struct BackupWriter {
    path: PathBuf,
    out: BufWriter<File>,
    written: usize,
}

impl BackupWriter {
    /// Opens `path` for appending, creating it if needed
    pub fn append_to(path: &Path) -> Result<Self, BackupError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| BackupError::io(path, e))?;

        Ok(Self {
            path: path.to_path_buf(),
            out: BufWriter::new(file),
            written: 0,
        })
    }

    /// Writes one record as a single compact line
    pub fn append<T: Serialize + ?Sized>(&mut self, record: &T) -> Result<(), BackupError> {
        // serde_json writes UTF-8 as-is and never emits raw newlines,
        // so every record stays on its own line
        let line = serde_json::to_string(record)?;
        writeln!(self.out, "{}", line).map_err(|e| BackupError::io(&self.path, e))?;
        self.written += 1;
        Ok(())
    }

    /// Flushes buffered lines to disk
    pub fn finish(mut self) -> Result<usize, BackupError> {
        self.out.flush().map_err(|e| BackupError::io(&self.path, e))?;
        Ok(self.written)
    }
}

/// A backup line that could not be turned into a Post
#[derive(Debug)]
pub struct SkippedLine {
    /// 1-based line number
    pub line: usize,
    pub error: String,
}

/// The posts read from a backup file, plus the lines that were skipped
#[derive(Debug, Default)]
pub struct LoadedPosts {
    pub posts: Vec<Post>,
    pub skipped: Vec<SkippedLine>,
}

/// Loads every well-formed post from the backup file.
///
/// Malformed lines are skipped with a warning; only failing to open or read
/// the file is an error.
pub fn load_posts(path: &Path) -> Result<LoadedPosts, BackupError> {
    let file = File::open(path).map_err(|e| BackupError::io(path, e))?;
    read_posts(BufReader::new(file)).map_err(|e| BackupError::io(path, e))
}

fn read_posts<R: BufRead>(reader: R) -> io::Result<LoadedPosts> {
    let mut loaded = LoadedPosts::default();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<Post>(&line) {
            Ok(post) => loaded.posts.push(post),
            Err(e) => {
                warn!(line = index + 1, error = %e, "skipping malformed backup line");
                loaded.skipped.push(SkippedLine {
                    line: index + 1,
                    error: e.to_string(),
                });
            }
        }
    }

    Ok(loaded)
}

/// Pretty-prints every record of the backup file to `out`.
///
/// Records are printed as generic JSON, so fields we don't model are shown
/// too. Returns how many records were printed.
pub fn print_backup<W: Write>(path: &Path, out: &mut W) -> Result<usize, BackupError> {
    let file = File::open(path).map_err(|e| BackupError::io(path, e))?;
    let mut printed = 0;

    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|e| BackupError::io(path, e))?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<serde_json::Value>(&line) {
            Ok(record) => {
                let pretty = serde_json::to_string_pretty(&record)?;
                writeln!(out, "{}", pretty).map_err(|e| BackupError::io(path, e))?;
                printed += 1;
            }
            Err(e) => warn!(line = index + 1, error = %e, "skipping malformed backup line"),
        }
    }

    Ok(printed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PostId;
    use serde_json::json;

    fn raw_post(id: u64, text: &str) -> serde_json::Value {
        json!({
            "id": id,
            "created_at": "Wed Oct 10 20:19:24 +0000 2018",
            "text": text,
            "retweeted": false,
            "favorite_count": 3,
            "entities": {"urls": [{"expanded_url": "https://example.com"}]}
        })
    }

    #[test]
    fn test_written_posts_load_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tweet_dump.json");

        let mut writer = BackupWriter::append_to(&path).unwrap();
        writer.append(&raw_post(1, "first")).unwrap();
        writer.append(&raw_post(2, "zweite Zeile: äöü")).unwrap();
        assert_eq!(writer.finish().unwrap(), 2);

        let loaded = load_posts(&path).unwrap();
        assert!(loaded.skipped.is_empty());
        let ids: Vec<PostId> = loaded.posts.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![PostId(1), PostId(2)]);
        assert_eq!(loaded.posts[1].text, "zweite Zeile: äöü");
    }

    #[test]
    fn test_lines_are_compact_and_not_ascii_escaped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dump.json");

        let mut writer = BackupWriter::append_to(&path).unwrap();
        writer.append(&raw_post(1, "héllo\nworld")).unwrap();
        writer.finish().unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 1);
        assert!(contents.contains("héllo\\nworld"));
        assert!(!contents.contains(": "));
    }

    #[test]
    fn test_append_keeps_existing_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dump.json");

        for id in [1, 2] {
            let mut writer = BackupWriter::append_to(&path).unwrap();
            writer.append(&raw_post(id, "x")).unwrap();
            writer.finish().unwrap();
        }

        assert_eq!(load_posts(&path).unwrap().posts.len(), 2);
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let input = format!(
            "{}\nnot json at all\n\n{}\n{{\"id\": 3}}\n",
            raw_post(1, "a"),
            raw_post(2, "b")
        );
        let loaded = read_posts(input.as_bytes()).unwrap();

        assert_eq!(loaded.posts.len(), 2);
        let skipped: Vec<usize> = loaded.skipped.iter().map(|s| s.line).collect();
        assert_eq!(skipped, vec![2, 5]);
    }

    #[test]
    fn test_missing_backup_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_posts(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, BackupError::NotFound(_)));
    }

    #[test]
    fn test_print_backup_pretty_prints() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dump.json");
        let mut writer = BackupWriter::append_to(&path).unwrap();
        writer.append(&raw_post(1, "a")).unwrap();
        writer.finish().unwrap();

        let mut out = Vec::new();
        assert_eq!(print_backup(&path, &mut out).unwrap(), 1);
        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains("\n  \"favorite_count\": 3"));
    }
}
