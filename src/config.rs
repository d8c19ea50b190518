// src/config.rs
// =============================================================================
// Loading and validating the checker configuration.
//
// The configuration is a TOML document (check_links_config.toml by default):
//
//   retry_count = 3
//   text_file_extensions = [".md", ".txt"]
//
//   [[ignores]]
//   url = "https://example.com/flaky"
//   codes = [403]
//   reason = "..."
//   considered_alternatives = ["..."]
//
//   [[prefix_ignores]]
//   prefix = "https://x.com/"
//   reason = "..."
//
// It is read once at the start of a scan and never changes afterwards.
//
// Rust concepts:
// - #[serde(default)]: Missing keys get their type's default value
// - BTreeSet: Sorted set, so duplicate codes collapse
// - u32::try_from: Converts without silently wrapping
// =============================================================================

use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Where the scan looks for its configuration unless `--config` says otherwise
pub const DEFAULT_CONFIG_PATH: &str = "./check_links_config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("text_file_extensions cannot be empty")]
    NoTextFileExtensions,
    #[error("ignores: url cannot be empty")]
    EmptyIgnoreUrl,
    #[error("ignores ({url}): codes cannot be empty when has_tls_error = false")]
    MissingCodes { url: String },
    #[error("ignores ({url}): reason cannot be empty")]
    MissingIgnoreReason { url: String },
    #[error("ignores ({url}): considered_alternatives cannot be empty")]
    MissingAlternatives { url: String },
    #[error("prefix_ignores: prefix cannot be empty")]
    EmptyPrefix,
    #[error("prefix_ignores ({prefix}): reason cannot be empty")]
    MissingPrefixReason { prefix: String },
    #[error("concurrency must be at least 1")]
    ZeroConcurrency,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// How many HEAD attempts a URL gets before it is reported broken;
    /// zero or less means links are never probed
    #[serde(default)]
    pub retry_count: i64,

    /// Extensions (with the leading dot) of the files worth scanning
    #[serde(default)]
    pub text_file_extensions: Vec<String>,

    #[serde(default)]
    pub ignores: Vec<Ignore>,

    /// Checked in order, first match wins
    #[serde(default)]
    pub prefix_ignores: Vec<PrefixIgnore>,

    /// How many URLs of one file may be checked at the same time
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

/// An exception for one exact URL.
///
/// Either the status codes listed in `codes` count as success for this URL
/// instead of 2xx, or (with `has_tls_error`) a failed connection is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Ignore {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub has_tls_error: bool,
    #[serde(default)]
    pub codes: BTreeSet<u16>,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub considered_alternatives: Vec<String>,
}

/// Every URL starting with `prefix` is skipped without any network access.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PrefixIgnore {
    #[serde(default)]
    pub prefix: String,
    #[serde(default)]
    pub reason: String,
}

fn default_concurrency() -> usize {
    1
}

impl Config {
    // Reads, parses and validates the config at `path`
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text, path)
    }

    // `origin` only labels parse errors
    fn from_toml_str(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    // HEAD attempts per URL as the checker counts them
    //
    // Example:
    //   retry_count = 3  -> 3
    //   retry_count = -1 -> 0 (never probe)
    pub fn attempts(&self) -> u32 {
        u32::try_from(self.retry_count.max(0)).unwrap_or(u32::MAX)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.text_file_extensions.is_empty() {
            return Err(ConfigError::NoTextFileExtensions);
        }
        for ignore in &self.ignores {
            if ignore.url.is_empty() {
                return Err(ConfigError::EmptyIgnoreUrl);
            }
            if ignore.codes.is_empty() && !ignore.has_tls_error {
                return Err(ConfigError::MissingCodes {
                    url: ignore.url.clone(),
                });
            }
            if ignore.reason.is_empty() {
                return Err(ConfigError::MissingIgnoreReason {
                    url: ignore.url.clone(),
                });
            }
            if ignore.considered_alternatives.is_empty() {
                return Err(ConfigError::MissingAlternatives {
                    url: ignore.url.clone(),
                });
            }
        }
        for prefix_ignore in &self.prefix_ignores {
            if prefix_ignore.prefix.is_empty() {
                return Err(ConfigError::EmptyPrefix);
            }
            if prefix_ignore.reason.is_empty() {
                return Err(ConfigError::MissingPrefixReason {
                    prefix: prefix_ignore.prefix.clone(),
                });
            }
        }
        if self.concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why do required strings have #[serde(default)]?
//    - Without it, a missing `reason` is a generic TOML parse error
//    - With it, the field is "" and validate() says exactly what is missing
//
// 2. Why is retry_count an i64?
//    - Users may write 0 or a negative number to turn probing off
//    - attempts() turns that into the u32 the checker works with
//
// 3. Why validate right after parsing?
//    - A bad config should stop the tool before any network request
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<Config, ConfigError> {
        Config::from_toml_str(text, Path::new("check_links_config.toml"))
    }

    const FULL: &str = r#"
retry_count = 3
text_file_extensions = [".md", ".txt"]

[[ignores]]
url = "https://example.com/forbidden"
codes = [403, 429]
reason = "blocks bots"
considered_alternatives = ["https://example.org/mirror"]

[[ignores]]
url = "https://broken-tls.example.com/"
has_tls_error = true
reason = "certificate chain is incomplete"
considered_alternatives = ["none found"]

[[prefix_ignores]]
prefix = "https://x.com/"
reason = "requires login"
"#;

    #[test]
    fn test_parse_full_config() {
        let config = parse(FULL).unwrap();
        assert_eq!(config.retry_count, 3);
        assert_eq!(config.text_file_extensions, vec![".md", ".txt"]);
        assert_eq!(config.ignores.len(), 2);
        assert!(config.ignores[0].codes.contains(&403));
        assert!(config.ignores[0].codes.contains(&429));
        assert!(!config.ignores[0].has_tls_error);
        assert!(config.ignores[1].has_tls_error);
        assert!(config.ignores[1].codes.is_empty());
        assert_eq!(config.prefix_ignores[0].prefix, "https://x.com/");
        assert_eq!(config.concurrency, 1);
    }

    #[test]
    fn test_empty_extensions_rejected() {
        let err = parse("retry_count = 1\ntext_file_extensions = []").unwrap_err();
        assert!(matches!(err, ConfigError::NoTextFileExtensions));
    }

    #[test]
    fn test_ignore_without_codes_rejected() {
        let text = r#"
retry_count = 1
text_file_extensions = [".md"]
[[ignores]]
url = "https://example.com"
reason = "r"
considered_alternatives = ["a"]
"#;
        let err = parse(text).unwrap_err();
        assert!(err.to_string().contains("codes cannot be empty"));
    }

    #[test]
    fn test_ignore_without_alternatives_rejected() {
        let text = r#"
retry_count = 1
text_file_extensions = [".md"]
[[ignores]]
url = "https://example.com"
codes = [403]
reason = "r"
"#;
        let err = parse(text).unwrap_err();
        assert!(matches!(err, ConfigError::MissingAlternatives { .. }));
    }

    #[test]
    fn test_prefix_ignore_without_reason_rejected() {
        let text = r#"
retry_count = 1
text_file_extensions = [".md"]
[[prefix_ignores]]
prefix = "https://x.com/"
reason = ""
"#;
        let err = parse(text).unwrap_err();
        assert!(matches!(err, ConfigError::MissingPrefixReason { .. }));
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let text = "retry_count = 1\ntext_file_extensions = [\".md\"]\nconcurrency = 0";
        let err = parse(text).unwrap_err();
        assert!(matches!(err, ConfigError::ZeroConcurrency));
    }

    #[test]
    fn test_missing_reason_reported_by_validation() {
        let text = r#"
retry_count = 1
text_file_extensions = [".md"]
[[ignores]]
url = "https://example.com"
codes = [403]
considered_alternatives = ["a"]
"#;
        let err = parse(text).unwrap_err();
        assert!(matches!(err, ConfigError::MissingIgnoreReason { .. }));
        assert!(err.to_string().contains("reason cannot be empty"));
    }

    #[test]
    fn test_missing_prefix_reported_by_validation() {
        let text = r#"
retry_count = 1
text_file_extensions = [".md"]
[[prefix_ignores]]
reason = "requires login"
"#;
        let err = parse(text).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyPrefix));
    }

    #[test]
    fn test_negative_retry_count_means_no_probes() {
        let config = parse("retry_count = -2\ntext_file_extensions = [\".md\"]").unwrap();
        assert_eq!(config.retry_count, -2);
        assert_eq!(config.attempts(), 0);
    }

    #[test]
    fn test_attempts_follow_retry_count() {
        let config = parse("retry_count = 3\ntext_file_extensions = [\".md\"]").unwrap();
        assert_eq!(config.attempts(), 3);

        let config = parse("text_file_extensions = [\".md\"]").unwrap();
        assert_eq!(config.attempts(), 0);
    }

    #[test]
    fn test_syntax_error_names_the_file() {
        let err = parse("retry_count = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("check_links_config.toml"));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("check_links_config.toml");
        std::fs::write(&path, FULL).unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config.ignores.len(), 2);
    }
}
