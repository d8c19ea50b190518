// src/files/mod.rs
// =============================================================================
// This module finds the files a scan should look at.
//
// Currently implements:
// - Listing tracked files with `git ls-files`
// - Filtering them by the configured text file extensions
// =============================================================================

mod list;

pub use list::{has_text_extension, list_tracked_files};
