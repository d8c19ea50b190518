// src/lock/hash.rs
// Content digests stored in the lock file, tagged with a hash version so the
// algorithm can change later without invalidating old entries silently.

use sha2::{Digest, Sha384};

/// Downloads are hashed up to this many bytes; the rest is ignored
pub const MAX_CONTENT_BYTES: usize = 100 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashVersion {
    /// SHA-384, lowercase hex
    H1,
}

impl HashVersion {
    /// The version written for new and updated entries
    pub const CURRENT: HashVersion = HashVersion::H1;

    // None for tags this build does not know
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "h1" => Some(HashVersion::H1),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HashVersion::H1 => "h1",
        }
    }

    pub fn digest(self, content: &[u8]) -> String {
        let content = &content[..content.len().min(MAX_CONTENT_BYTES)];
        match self {
            HashVersion::H1 => hex::encode(Sha384::digest(content)),
        }
    }
}
