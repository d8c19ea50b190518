// src/scan/scanner.rs
// =============================================================================
// This module runs a scan over a set of files.
//
// How it works:
// 1. Skip paths that are directories or don't have a text extension
// 2. Read the file
// 3. Extract every http:// URL, then every https:// URL
// 4. Strip ":title" annotations and look up the ignore rules
// 5. Check each URL that isn't prefix-ignored (at most once per run)
// 6. Count broken links per file; a file with any broken link is an error
//
// A broken link never stops the scan: every URL of every file is tried, so
// one run reports all problems at once.
//
// Rust concepts:
// - Lifetimes: Scanner<'a> borrows its rules, probe and sleeper
// - Streams: `buffered(n)` checks up to n URLs at once but keeps their order
// =============================================================================

use super::report::{FileReport, RunReport, ScanError, UrlReport};
use crate::checker::{
    check_url, extract_urls, strip_title_suffix, IgnoreMatch, IgnoreRules, Scheme, SeenSet,
    Sleeper, StatusProbe,
};
use crate::files::has_text_extension;
use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

pub struct Scanner<'a> {
    rules: &'a IgnoreRules,
    retry_count: u32,
    concurrency: usize,
    probe: &'a dyn StatusProbe,
    sleeper: &'a dyn Sleeper,
    // Lives exactly as long as the scanner, i.e. one run
    seen: SeenSet,
}

impl<'a> Scanner<'a> {
    pub fn new(
        rules: &'a IgnoreRules,
        retry_count: u32,
        probe: &'a dyn StatusProbe,
        sleeper: &'a dyn Sleeper,
    ) -> Self {
        Self {
            rules,
            retry_count,
            concurrency: 1,
            probe,
            sleeper,
            seen: SeenSet::new(),
        }
    }

    // How many URLs of one file may be checked at once (minimum 1)
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn seen(&self) -> &SeenSet {
        &self.seen
    }

    // Scans every path with a matching extension, one file after another
    pub async fn scan_paths(&self, paths: &[PathBuf], extensions: &[String]) -> RunReport {
        let mut report = RunReport::default();

        for path in paths {
            let metadata = match tokio::fs::metadata(path).await {
                Ok(metadata) => metadata,
                Err(source) => {
                    let err = ScanError::FileAccess {
                        path: path.clone(),
                        source,
                    };
                    error!("{err}");
                    report.errors.push(err);
                    continue;
                }
            };
            if metadata.is_dir() || !has_text_extension(path, extensions) {
                continue;
            }

            match self.scan_file(path).await {
                Ok(file_report) => {
                    if let Some(err) = file_report.error() {
                        error!("{err}");
                        report.errors.push(err);
                    }
                    report.files.push(file_report);
                }
                Err(err) => {
                    error!("{err}");
                    report.errors.push(err);
                }
            }
        }

        report
    }

    pub async fn scan_file(&self, path: &Path) -> Result<FileReport, ScanError> {
        let content = tokio::fs::read(path)
            .await
            .map_err(|source| ScanError::FileAccess {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(self.scan_content(path, &content).await)
    }

    // Checks every URL in `content`; `path` is only used for reporting
    pub async fn scan_content(&self, path: &Path, content: &[u8]) -> FileReport {
        let mut urls = Vec::new();

        for scheme in Scheme::ALL {
            let found = extract_urls(content, scheme);
            let checked: Vec<UrlReport> = stream::iter(found)
                .map(|raw| self.check_candidate(path, scheme, raw))
                .buffered(self.concurrency)
                .collect()
                .await;
            urls.extend(checked);
        }

        FileReport {
            path: path.to_path_buf(),
            urls,
        }
    }

    async fn check_candidate(&self, path: &Path, scheme: Scheme, raw: String) -> UrlReport {
        let url = strip_title_suffix(&raw).to_string();

        let ignore = match self.rules.classify(&url) {
            IgnoreMatch::Prefix(rule) => {
                debug!(
                    path = %path.display(),
                    url = %url,
                    prefix = %rule.prefix,
                    reason = %rule.reason,
                    "{} link ignored by prefix",
                    scheme.label()
                );
                return UrlReport::prefix_ignored(url, scheme, rule);
            }
            other => other.exact(),
        };

        info!(path = %path.display(), url = %url, "{} link", scheme.label());
        match check_url(
            &url,
            self.retry_count,
            ignore,
            &self.seen,
            self.probe,
            self.sleeper,
        )
        .await
        {
            Ok(acceptance) => UrlReport::accepted(url, scheme, acceptance),
            Err(err) => {
                error!(path = %path.display(), url = %url, error = %err, "not alive");
                UrlReport::broken(url, scheme, &err)
            }
        }
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What is buffered(n)?
//    - Like buffer_unordered(n), it runs up to n futures at once
//    - Unlike buffer_unordered, results come out in the original order
//    - The report therefore lists URLs in the order they appear in the file
//
// 2. Why does Scanner hold references (&'a) instead of owning things?
//    - main owns the rules, client and sleeper
//    - The scanner only borrows them for the duration of the scan
//
// 3. Why read files as bytes?
//    - Text files are not always valid UTF-8
//    - URLs are ASCII, so matching on bytes finds them anyway
// -----------------------------------------------------------------------------
