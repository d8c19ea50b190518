// src/lock/fetch.rs
// =============================================================================
// Downloads the content that lock file entries pin.
//
// Unlike the liveness check (HEAD only), pinning needs the body. We read it
// chunk by chunk and stop at MAX_CONTENT_BYTES so a huge download cannot
// exhaust memory; anything past the limit is simply not hashed.
//
// Rust concepts:
// - while let Some(..): Loops until the response has no more chunks
// - Slicing: &chunk[..room] takes only the bytes that still fit
// =============================================================================

use super::hash::MAX_CONTENT_BYTES;
use crate::checker::{describe_failure, HttpClient};
use anyhow::{bail, Result};
use async_trait::async_trait;
use reqwest::StatusCode;

// Anything that can return the body of a URL
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    // At most MAX_CONTENT_BYTES of the body; non-200 answers are errors
    async fn fetch(&self, uri: &str) -> Result<Vec<u8>>;
}

#[async_trait]
impl ContentFetcher for HttpClient {
    async fn fetch(&self, uri: &str) -> Result<Vec<u8>> {
        let mut response = self.client().get(uri).send().await.map_err(|error| {
            let summary = describe_failure("GET", uri, &error);
            anyhow::Error::new(error).context(summary)
        })?;

        if response.status() != StatusCode::OK {
            bail!(
                "HTTP request to {} failed with status code: {}",
                uri,
                response.status().as_u16()
            );
        }

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            let room = MAX_CONTENT_BYTES - body.len();
            if chunk.len() >= room {
                body.extend_from_slice(&chunk[..room]);
                break;
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why read the body in chunks?
//    - response.bytes() would load everything into memory first
//    - chunk() gives us the body piece by piece so we can stop early
//
// 2. Why only 200 and not any 2xx?
//    - 204 No Content or 206 Partial Content do not carry the full document
//    - Hashing them would pin something other than the real content
// -----------------------------------------------------------------------------
