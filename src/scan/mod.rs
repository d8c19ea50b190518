// src/scan/mod.rs
// =============================================================================
// This module ties extraction, ignore rules and liveness checks together
// for whole files.
//
// Features:
// - Scans files one after another, URLs in the order they were found
// - Optional concurrency within a file
// - Per-URL and per-file reports, errors collected instead of aborting
// =============================================================================

mod report;
mod scanner;

pub use report::{FileReport, RunReport, ScanError, UrlReport, UrlStatus};
pub use scanner::Scanner;
