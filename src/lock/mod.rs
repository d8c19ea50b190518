// src/lock/mod.rs
// =============================================================================
// The lock file: URLs pinned to a digest of their content.
//
// Submodules:
// - hash: Hash versions ("h1" = SHA-384) and digest computation
// - fetch: Downloads content for hashing (GET, capped at 100 MiB)
// - store: Reads and writes the TOML lock file
// - ledger: add / verify on top of the three above
// =============================================================================

mod fetch;
mod hash;
mod ledger;
mod store;

pub use fetch::ContentFetcher;
pub use hash::{HashVersion, MAX_CONTENT_BYTES};
pub use ledger::{
    add_entry, add_to_lock_file, verify_entries, verify_lock_file, Change, LedgerError,
};
pub use store::{read_lock_file, write_lock_file, Lock, LockFile, StoreError, DEFAULT_LOCK_PATH};
