// src/checker/extract.rs
// =============================================================================
// This module pulls HTTP and HTTPS URLs out of raw file content.
//
// There is no Markdown or HTML parsing here. Any text file can hold links,
// so we run two regular expressions over the bytes:
// - http://...  and  https://...
// followed by characters that commonly appear in paths and query strings.
// A match stops at whitespace, quotes, brackets, parentheses and so on.
//
// Some blog tools append a ":title" or ":title=Page Title" annotation to
// links. That annotation is not part of the URL and is stripped before the
// URL is looked up in the ignore lists or checked.
// =============================================================================

use once_cell::sync::Lazy;
use regex::bytes::Regex as BytesRegex;
use regex::Regex;
use serde::Serialize;

// [:alnum:] is ASCII-only, so every match is valid UTF-8
static HTTP_URL: Lazy<BytesRegex> = Lazy::new(|| {
    BytesRegex::new(r"http://[-._%/[:alnum:]?:=+~@#&]+").expect("HTTP URL pattern is valid")
});

static HTTPS_URL: Lazy<BytesRegex> = Lazy::new(|| {
    BytesRegex::new(r"https://[-._%/[:alnum:]?:=+~@#&]+").expect("HTTPS URL pattern is valid")
});

static TITLE_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r":title(=\S*)?$").expect("title suffix pattern is valid"));

/// The two URL schemes we look for, in the order files are scanned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    /// Scan order: every http:// link of a file before any https:// link
    pub const ALL: [Scheme; 2] = [Scheme::Http, Scheme::Https];

    fn pattern(self) -> &'static BytesRegex {
        match self {
            Scheme::Http => &*HTTP_URL,
            Scheme::Https => &*HTTPS_URL,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Scheme::Http => "HTTP",
            Scheme::Https => "HTTPS",
        }
    }
}

// Returns every URL of the given scheme in `content`, in order of appearance
//
// The matches are returned exactly as found; use strip_title_suffix before
// checking them.
pub fn extract_urls(content: &[u8], scheme: Scheme) -> Vec<String> {
    scheme
        .pattern()
        .find_iter(content)
        .map(|m| String::from_utf8_lossy(m.as_bytes()).into_owned())
        .collect()
}

// Removes a trailing ":title" / ":title=..." annotation
//
// Examples:
//   "https://example.com:title"           -> "https://example.com"
//   "https://example.com:title=PageTitle" -> "https://example.com"
//   "https://example.com:8080/path"       -> unchanged
pub fn strip_title_suffix(url: &str) -> &str {
    match TITLE_SUFFIX.find(url) {
        Some(suffix) => &url[..suffix.start()],
        None => url,
    }
}
