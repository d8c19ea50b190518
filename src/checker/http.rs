// src/checker/http.rs
// =============================================================================
// This module talks to the network.
//
// Key functionality:
// - One shared reqwest client (connection pooling, 30s timeout, user agent)
// - HEAD requests that report nothing but the status code
// - The StatusProbe trait, so the liveness checker can be tested with fakes
//
// The GET side (downloading content for the lock file) lives in
// src/lock/fetch.rs and reuses the same client.
//
// Rust concepts:
// - async_trait: Lets traits have async methods (and be used as &dyn)
// - anyhow::Context: Attaches a human-readable message to an error
// =============================================================================

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Sent with every request so site owners can tell who is knocking
pub const USER_AGENT: &str = concat!("link-lock/", env!("CARGO_PKG_VERSION"));

/// Upper bound for a single request, connect to last byte
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// Anything that can tell us the HTTP status code of a URL
//
// Errors mean the request never produced a response (DNS, TCP, TLS, timeout).
// A response with a bad status code is NOT an error here.
#[async_trait]
pub trait StatusProbe: Send + Sync {
    async fn status(&self, url: &str) -> Result<u16>;
}

// reqwest-backed client used for both HEAD probes and GET downloads
//
// reqwest::Client is an Arc internally, so cloning HttpClient shares the
// connection pool.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: Client,
}

impl HttpClient {
    pub fn new() -> Result<Self> {
        let inner = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .context("failed to create HTTP client")?;
        Ok(Self { inner })
    }

    pub(crate) fn client(&self) -> &Client {
        &self.inner
    }
}

#[async_trait]
impl StatusProbe for HttpClient {
    async fn status(&self, url: &str) -> Result<u16> {
        let response = self.inner.head(url).send().await.map_err(|error| {
            let summary = describe_failure("HEAD", url, &error);
            anyhow::Error::new(error).context(summary)
        })?;
        Ok(response.status().as_u16())
    }
}

// Turns a failed request into something a human can act on
//
// reqwest errors can happen for many reasons and its Display output is
// rather terse, so we prefix the likely category.
pub(crate) fn describe_failure(method: &str, url: &str, error: &reqwest::Error) -> String {
    let what = if error.is_timeout() {
        "timed out"
    } else if error.is_redirect() {
        "hit too many redirects"
    } else if error.is_connect() {
        "could not connect"
    } else {
        "failed"
    };
    format!("{method} {url} {what}")
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why HEAD and not GET?
//    - HEAD asks for the headers only, no body
//    - We only need the status code to know if a link is alive
//
// 2. Why a trait (StatusProbe) around the client?
//    - Tests must not touch the internet
//    - A fake that returns fixed status codes implements the same trait
//    - The checker takes &dyn StatusProbe and does not care which one it gets
//
// 3. Why limit redirects?
//    - Some sites redirect in circles
//    - After 10 hops we give up and report the link as failed
// -----------------------------------------------------------------------------
