// src/files/list.rs
// =============================================================================
// This module decides which files get scanned.
//
// Strategy:
// - Ask git for every tracked file (`git ls-files -z`), so build output and
//   other ignored files are never scanned. With -z git prints raw
//   NUL-terminated paths instead of quoting unusual ones like "caf\303\251.md".
// - Keep only files whose extension is listed in text_file_extensions
//
// Rust concepts:
// - tokio::process::Command: Runs a child process without blocking the runtime
// - Path::file_name: Gets "README.md" out of "docs/README.md"
// - str::rfind: Finds the last '.' so ".tar.gz" files end in ".gz"
// =============================================================================

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use tokio::process::Command;

// Lists the files tracked by git in the current directory
//
// Returns: paths relative to the repository root, in git's order
pub async fn list_tracked_files() -> Result<Vec<PathBuf>> {
    let output = Command::new("git")
        .args(["ls-files", "-z"])
        .output()
        .await
        .context("failed to run git ls-files")?;

    if !output.status.success() {
        bail!(
            "git ls-files failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(parse_ls_files(&stdout).into_iter().map(PathBuf::from).collect())
}

// Splits `git ls-files -z` output into paths
//
// Every path ends with a NUL, so the last piece is always empty.
fn parse_ls_files(output: &str) -> Vec<String> {
    output
        .split('\0')
        .filter(|path| !path.is_empty())
        .map(str::to_string)
        .collect()
}

// Checks whether `path` ends in one of `extensions`
//
// Extensions are written with their dot, like ".md". The extension is
// everything from the last '.' of the file name, so a dotfile's whole name
// is its extension and a name without a dot never matches.
//
// Example:
//   has_text_extension("docs/guide.md", [".md", ".txt"]) -> true
//   has_text_extension(".gitignore", [".gitignore"])      -> true
//   has_text_extension("Makefile", [".md"])               -> false
pub fn has_text_extension(path: &Path, extensions: &[String]) -> bool {
    let Some(name) = path.file_name() else {
        return false;
    };
    let name = name.to_string_lossy();
    let Some(dot) = name.rfind('.') else {
        return false;
    };
    let ext = &name[dot..];
    extensions.iter().any(|wanted| wanted.as_str() == ext)
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why `git ls-files` instead of walking the directory?
//    - Only tracked files matter; build output and vendored files are skipped
//    - .gitignore rules are applied for free
//
// 2. Why -z?
//    - Without it git puts unusual file names in quotes with escapes
//    - With it every path is printed as-is and ends with a NUL byte
//
// 3. What is let-else?
//    - `let Some(x) = ... else { return false; };`
//    - Binds x if the pattern matches, otherwise runs the else block
// -----------------------------------------------------------------------------
