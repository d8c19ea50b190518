// src/lib.rs
// =============================================================================
// link-lock as a library: everything except printing results and exit codes,
// which live in main.rs.
//
// Modules:
// - checker: URL extraction, ignore rules, HEAD probes, retry state machine
// - scan: runs the checker over files and collects reports
// - files: which files to scan (git ls-files + extension filter)
// - lock: the lock file (pin content digests, verify them later)
// - config: the TOML configuration for scans
// - cli: the clap definitions of the command line
// =============================================================================

pub mod checker;
pub mod cli;
pub mod config;
pub mod files;
pub mod lock;
pub mod scan;
