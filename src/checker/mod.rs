// src/checker/mod.rs
// =============================================================================
// This module contains all link liveness logic.
//
// Submodules:
// - extract: Pulls http:// and https:// URLs out of raw file bytes
// - ignore: Resolves the configured exact / prefix exceptions for a URL
// - http: Makes HEAD requests to learn a URL's status code
// - liveness: The retry/backoff state machine for one URL
// - seen: Remembers which URLs this run already checked
//
// Rust concepts:
// - mod / pub use: Submodules stay private, only the re-exported items are API
// - pub(crate): Visible inside this crate only
// =============================================================================

mod extract;
mod http;
mod ignore;
mod liveness;
mod seen;

pub use extract::{extract_urls, strip_title_suffix, Scheme};
pub use http::{HttpClient, StatusProbe, REQUEST_TIMEOUT, USER_AGENT};
pub(crate) use http::describe_failure;
pub use ignore::{IgnoreMatch, IgnoreRules};
pub use liveness::{check_url, Acceptance, LivenessError, Sleeper, TokioSleeper, BACKOFF_UNIT};
pub use seen::{SeenSet, Verdict, Visit};

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why re-export with `pub use`?
//    - Callers write `checker::check_url` instead of `checker::liveness::check_url`
//    - We can move code between submodules without breaking callers
//
// 2. What is pub(crate)?
//    - describe_failure is shared with src/lock/fetch.rs
//    - It is not meant for users of the library, so it stays crate-private
// -----------------------------------------------------------------------------
