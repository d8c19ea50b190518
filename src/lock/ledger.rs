// src/lock/ledger.rs
// =============================================================================
// Adding URLs to the lock file and verifying the pinned content.
//
// add_entry:
// - refuses a URI that is already pinned unless updating is allowed
// - downloads the content and hashes it with the current hash version
// - keeps the entries sorted by URI
//
// verify_entries:
// - re-downloads every pinned URI and compares digests
// - checks every entry, collecting one error per bad entry
//
// Both work on an in-memory LockFile; add_to_lock_file / verify_lock_file
// wrap them with reading and writing the file on disk.
//
// Rust concepts:
// - thiserror: Derives Display and Error for LedgerError
// - Clone before modifying: the caller's LockFile is never changed
// =============================================================================

use super::fetch::ContentFetcher;
use super::hash::HashVersion;
use super::store::{read_lock_file, write_lock_file, Lock, LockFile, StoreError};
use std::path::Path;
use thiserror::Error;
use tracing::info;
use url::Url;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("URI {0} already exists in lock file")]
    DuplicateEntry(String),

    #[error("{uri} is not an http(s) URL: {reason}")]
    InvalidUri { uri: String, reason: String },

    #[error("{uri}: unsupported hash version {version:?}")]
    UnsupportedHashVersion { uri: String, version: String },

    #[error("{uri}: hash mismatch (expected {expected}, got {actual})")]
    HashMismatch {
        uri: String,
        expected: String,
        actual: String,
    },

    #[error("{uri}: failed to fetch content: {cause:#}")]
    Fetch { uri: String, cause: anyhow::Error },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What add_entry did to the lock file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    Added,
    Updated,
    Unchanged,
}

// Pins `uri` in a copy of `lock_file` and returns the copy
//
// On error `lock_file` is untouched and nothing needs to be written.
pub async fn add_entry(
    lock_file: &LockFile,
    uri: &str,
    allow_update: bool,
    fetcher: &dyn ContentFetcher,
) -> Result<(LockFile, Change), LedgerError> {
    let index = lock_file.position(uri);
    if index.is_some() && !allow_update {
        return Err(LedgerError::DuplicateEntry(uri.to_string()));
    }
    validate_uri(uri)?;

    let version = HashVersion::CURRENT;
    let digest = fetch_digest(uri, version, fetcher).await?;
    let new_lock = Lock {
        uri: uri.to_string(),
        hash_version: version.as_str().to_string(),
        hash_of_content: digest,
    };

    let mut updated = lock_file.clone();
    let change = match index {
        Some(i) if updated.locks[i].hash_of_content == new_lock.hash_of_content => {
            info!(uri, "no change in content, skipping update");
            return Ok((updated, Change::Unchanged));
        }
        Some(i) => {
            info!(uri, "content changed, updating hash");
            updated.locks[i] = new_lock;
            Change::Updated
        }
        None => {
            info!(uri, "pinned new entry");
            updated.locks.push(new_lock);
            Change::Added
        }
    };
    updated.sort();
    Ok((updated, change))
}

// Checks every entry against freshly downloaded content
//
// Returns one error per failing entry, in lock file order; empty means all
// pins still hold.
pub async fn verify_entries(lock_file: &LockFile, fetcher: &dyn ContentFetcher) -> Vec<LedgerError> {
    let mut errors = Vec::new();
    for lock in &lock_file.locks {
        let Some(version) = HashVersion::parse(&lock.hash_version) else {
            errors.push(LedgerError::UnsupportedHashVersion {
                uri: lock.uri.clone(),
                version: lock.hash_version.clone(),
            });
            continue;
        };

        match fetch_digest(&lock.uri, version, fetcher).await {
            Ok(actual) if actual == lock.hash_of_content => {
                info!(uri = %lock.uri, "content matches pinned hash");
            }
            Ok(actual) => errors.push(LedgerError::HashMismatch {
                uri: lock.uri.clone(),
                expected: lock.hash_of_content.clone(),
                actual,
            }),
            Err(err) => errors.push(err),
        }
    }
    errors
}

// Reads the lock file at `path`, pins `uri`, and writes it back
//
// The file is only rewritten when something changed.
pub async fn add_to_lock_file(
    path: &Path,
    uri: &str,
    allow_update: bool,
    fetcher: &dyn ContentFetcher,
) -> Result<Change, LedgerError> {
    let lock_file = read_lock_file(path)?;
    let (updated, change) = add_entry(&lock_file, uri, allow_update, fetcher).await?;
    if change != Change::Unchanged {
        write_lock_file(path, &updated)?;
    }
    Ok(change)
}

pub async fn verify_lock_file(
    path: &Path,
    fetcher: &dyn ContentFetcher,
) -> Result<(usize, Vec<LedgerError>), LedgerError> {
    let lock_file = read_lock_file(path)?;
    let errors = verify_entries(&lock_file, fetcher).await;
    Ok((lock_file.len(), errors))
}

async fn fetch_digest(
    uri: &str,
    version: HashVersion,
    fetcher: &dyn ContentFetcher,
) -> Result<String, LedgerError> {
    let content = fetcher
        .fetch(uri)
        .await
        .map_err(|cause| LedgerError::Fetch {
            uri: uri.to_string(),
            cause,
        })?;
    Ok(version.digest(&content))
}

fn validate_uri(uri: &str) -> Result<(), LedgerError> {
    let invalid = |reason: String| LedgerError::InvalidUri {
        uri: uri.to_string(),
        reason,
    };
    let parsed = Url::parse(uri).map_err(|e| invalid(e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(invalid(format!("unsupported scheme {other}"))),
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why return a new LockFile instead of changing the old one?
//    - If the download fails, nothing has been modified
//    - The caller decides whether to write the result to disk
//
// 2. Why does verify collect errors instead of using `?`?
//    - `?` returns on the first error
//    - We want to report every broken pin in a single run
//
// 3. Why sort the entries?
//    - The lock file is committed to git
//    - A stable order keeps diffs small and readable
// -----------------------------------------------------------------------------
