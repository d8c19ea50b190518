// src/scan/report.rs
// =============================================================================
// What a scan found: one UrlReport per extracted URL, grouped per file.
//
// These structs derive Serialize so `--json` can print them as-is.
// =============================================================================

use crate::checker::{Acceptance, LivenessError, Scheme, Verdict};
use crate::config::PrefixIgnore;
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UrlStatus {
    /// Answered 2xx
    Ok,
    /// Answered with a code its ignore rule allows
    Excepted,
    /// Request failed, but the ignore rule tolerates TLS errors
    TlsTolerated,
    /// retry_count is zero
    Unchecked,
    /// Already checked earlier in the run
    Duplicate,
    /// Matched a prefix ignore, never contacted
    PrefixIgnored,
    /// Dead link
    Broken,
}

#[derive(Debug, Clone, Serialize)]
pub struct UrlReport {
    pub url: String,
    pub scheme: Scheme,
    pub status: UrlStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl UrlReport {
    pub(crate) fn accepted(url: String, scheme: Scheme, acceptance: Acceptance) -> Self {
        let (status, message) = match acceptance {
            Acceptance::Alive { status, attempts } => (
                UrlStatus::Ok,
                Some(format!("HTTP {status} (attempt {attempts})")),
            ),
            Acceptance::Excepted { status, .. } => (
                UrlStatus::Excepted,
                Some(format!("HTTP {status} allowed by ignore rule")),
            ),
            Acceptance::TlsTolerated => (
                UrlStatus::TlsTolerated,
                Some("request failed, tolerated by ignore rule".to_string()),
            ),
            Acceptance::Unchecked => (UrlStatus::Unchecked, None),
            Acceptance::AlreadySeen(verdict) => {
                let earlier = match verdict {
                    Verdict::Accepted => "alive",
                    Verdict::Rejected => "broken",
                };
                (
                    UrlStatus::Duplicate,
                    Some(format!("already checked in this run ({earlier})")),
                )
            }
        };
        Self {
            url,
            scheme,
            status,
            message,
        }
    }

    pub(crate) fn broken(url: String, scheme: Scheme, error: &LivenessError) -> Self {
        Self {
            url,
            scheme,
            status: UrlStatus::Broken,
            message: Some(error.to_string()),
        }
    }

    pub(crate) fn prefix_ignored(url: String, scheme: Scheme, rule: &PrefixIgnore) -> Self {
        Self {
            url,
            scheme,
            status: UrlStatus::PrefixIgnored,
            message: Some(format!("prefix {}: {}", rule.prefix, rule.reason)),
        }
    }

    pub fn is_broken(&self) -> bool {
        self.status == UrlStatus::Broken
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub urls: Vec<UrlReport>,
}

impl FileReport {
    pub fn failures(&self) -> usize {
        self.urls.iter().filter(|u| u.is_broken()).count()
    }

    // The per-file error, if any link in the file is broken
    pub fn error(&self) -> Option<ScanError> {
        match self.failures() {
            0 => None,
            failures => Some(ScanError::LivenessFailed {
                path: self.path.clone(),
                failures,
            }),
        }
    }
}

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("path = {}: {source}", .path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("liveness check failed: path = {}, broken links = {failures}", .path.display())]
    LivenessFailed { path: PathBuf, failures: usize },
}

/// Everything one run produced
#[derive(Debug, Default, Serialize)]
pub struct RunReport {
    pub files: Vec<FileReport>,
    #[serde(skip)]
    pub errors: Vec<ScanError>,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn urls(&self) -> impl Iterator<Item = &UrlReport> {
        self.files.iter().flat_map(|f| f.urls.iter())
    }
}
