// src/lock/store.rs
// =============================================================================
// Reading and writing the lock file (check_links.lock by default).
//
// The lock file is TOML:
//
//   [[locks]]
//   uri = "https://example.com"
//   hash_version = "h1"
//   hash_of_content = "0a1b..."
//
// A missing file is the same as an empty one. The whole document is read,
// changed in memory and written back, so two processes must not update the
// same lock file at once.
// =============================================================================

use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_LOCK_PATH: &str = "./check_links.lock";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read lock file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse lock file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("failed to serialize lock file: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("failed to write lock file {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockFile {
    #[serde(default)]
    pub locks: Vec<Lock>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lock {
    pub uri: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub hash_version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub hash_of_content: String,
}

impl LockFile {
    // Index of the entry pinning `uri`
    pub fn position(&self, uri: &str) -> Option<usize> {
        self.locks.iter().position(|lock| lock.uri == uri)
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }

    // Byte-wise ascending by uri, so the file diffs cleanly
    pub fn sort(&mut self) {
        self.locks.sort_by(|a, b| a.uri.cmp(&b.uri));
    }
}

pub fn read_lock_file(path: &Path) -> Result<LockFile, StoreError> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(LockFile::default()),
        Err(source) => {
            return Err(StoreError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    toml::from_str(&text).map_err(|source| StoreError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

pub fn write_lock_file(path: &Path, lock_file: &LockFile) -> Result<(), StoreError> {
    let text = toml::to_string(lock_file)?;
    std::fs::write(path, text).map_err(|source| StoreError::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lock(uri: &str, digest: &str) -> Lock {
        Lock {
            uri: uri.to_string(),
            hash_version: "h1".to_string(),
            hash_of_content: digest.to_string(),
        }
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let lock_file = read_lock_file(&dir.path().join("check_links.lock")).unwrap();
        assert!(lock_file.is_empty());
    }

    #[test]
    fn test_read_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("check_links.lock");
        std::fs::write(
            &path,
            r#"
[[locks]]
uri = "https://example.com"
hash_version = "h1"
hash_of_content = "abc123"

[[locks]]
uri = "https://example.org"
"#,
        )
        .unwrap();

        let lock_file = read_lock_file(&path).unwrap();

        assert_eq!(lock_file.len(), 2);
        assert_eq!(lock_file.locks[0], lock("https://example.com", "abc123"));
        assert_eq!(lock_file.position("https://example.org"), Some(1));
        assert_eq!(lock_file.position("https://example.net"), None);
        let bare = &lock_file.locks[1];
        assert!(bare.hash_version.is_empty());
        assert!(bare.hash_of_content.is_empty());
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("check_links.lock");
        let lock_file = LockFile {
            locks: vec![lock("https://example.com", "def456")],
        };

        write_lock_file(&path, &lock_file).unwrap();

        assert_eq!(read_lock_file(&path).unwrap(), lock_file);
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("[[locks]]"));
    }

    #[test]
    fn test_empty_fields_are_omitted() {
        let lock_file = LockFile {
            locks: vec![Lock {
                uri: "https://example.com".to_string(),
                hash_version: String::new(),
                hash_of_content: String::new(),
            }],
        };
        let text = toml::to_string(&lock_file).unwrap();
        assert!(!text.contains("hash_version"));
        assert!(!text.contains("hash_of_content"));
    }

    #[test]
    fn test_garbage_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("check_links.lock");
        std::fs::write(&path, "locks = 3").unwrap();
        assert!(matches!(read_lock_file(&path), Err(StoreError::Parse { .. })));
    }

    #[test]
    fn test_sort_by_uri() {
        let mut lock_file = LockFile {
            locks: vec![lock("https://b.example", "2"), lock("https://a.example", "1")],
        };
        lock_file.sort();
        assert_eq!(lock_file.locks[0].uri, "https://a.example");
    }
}
