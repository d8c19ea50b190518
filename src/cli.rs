// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Running `link-lock` with no subcommand scans the repository. The `add` and
// `verify` subcommands work on the lock file instead.
//
// Rust concepts:
// - Derive macros: clap generates the parser from the struct definition
// - Option<Commands>: The subcommand is optional
// - global = true: The flag is accepted before or after the subcommand
// =============================================================================

use crate::config::DEFAULT_CONFIG_PATH;
use crate::lock::DEFAULT_LOCK_PATH;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "link-lock",
    version,
    about = "Check the links in a repository's text files and pin linked content",
    long_about = "link-lock scans every file tracked by git for http:// and https:// links \
                  and reports the ones that no longer answer. It can also pin the content \
                  behind a URL in a lock file and later verify that it has not changed."
)]
pub struct Cli {
    /// What to do; scans the repository when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path of the checker configuration
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Path of the lock file
    #[arg(long, global = true, default_value = DEFAULT_LOCK_PATH)]
    pub lock_file: PathBuf,

    /// Print the scan report as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Pin the content of a URL in the lock file
    ///
    /// Example: link-lock add https://example.com/spec.pdf
    Add {
        /// URL whose content should be pinned
        url: String,

        /// Re-download and update the hash if the URL is already pinned
        #[arg(long)]
        update: bool,
    },

    /// Re-download every pinned URL and compare its hash
    Verify,
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why is the subcommand an Option?
//    - `link-lock` alone should scan, like the tool always did
//    - `link-lock add URL` and `link-lock verify` work on the lock file
//    - Option<Commands> = "maybe a subcommand"; None means scan
//
// 2. What does `global = true` do?
//    - Normally a flag must come before the subcommand
//    - Global flags also work after it: `link-lock verify --lock-file x.lock`
//
// 3. Why PathBuf instead of String?
//    - PathBuf is the owned type for file system paths
//    - Paths are not always valid UTF-8, PathBuf handles that
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand_means_scan() {
        let cli = Cli::parse_from(["link-lock"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG_PATH));
        assert_eq!(cli.lock_file, PathBuf::from(DEFAULT_LOCK_PATH));
    }

    #[test]
    fn test_add_with_update() {
        let cli = Cli::parse_from(["link-lock", "add", "https://example.com", "--update"]);
        match cli.command {
            Some(Commands::Add { url, update }) => {
                assert_eq!(url, "https://example.com");
                assert!(update);
            }
            other => panic!("expected add, got {other:?}"),
        }
    }

    #[test]
    fn test_global_lock_file_after_subcommand() {
        let cli = Cli::parse_from(["link-lock", "verify", "--lock-file", "pins.lock"]);
        assert!(matches!(cli.command, Some(Commands::Verify)));
        assert_eq!(cli.lock_file, PathBuf::from("pins.lock"));
    }
}
