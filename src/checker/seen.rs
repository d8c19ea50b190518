// src/checker/seen.rs
// =============================================================================
// The set of URLs already checked during one scan.
//
// The same link often appears in many files. Each distinct URL string is
// probed at most once per run: the first caller runs the probe, and anyone
// asking about the same URL while that probe is still running waits for it
// instead of starting a second one.
//
// A DashMap entry gives us an atomic "insert if absent", and a
// tokio OnceCell per URL makes sure only one probe future ever runs.
//
// Rust concepts:
// - Arc: Shared ownership of one OnceCell between concurrent callers
// - FnOnce: The probe closure runs at most once
// - Generics with trait bounds: visit() accepts any closure returning a future
// =============================================================================

use dashmap::DashMap;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Final result of the one probe made for a URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Accepted,
    Rejected,
}

/// How a call to `SeenSet::visit` went
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    /// This caller ran the probe
    Probed(Verdict),
    /// Somebody else probed (or is probing) this URL; their verdict
    Duplicate(Verdict),
}

impl Visit {
    pub fn verdict(self) -> Verdict {
        match self {
            Visit::Probed(verdict) | Visit::Duplicate(verdict) => verdict,
        }
    }
}

#[derive(Debug, Default)]
pub struct SeenSet {
    entries: DashMap<String, Arc<OnceCell<Verdict>>>,
}

impl SeenSet {
    pub fn new() -> Self {
        Self::default()
    }

    // Runs `probe` unless `url` was already visited during this run
    pub async fn visit<F, Fut>(&self, url: &str, probe: F) -> Visit
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Verdict>,
    {
        // The shard lock is released at the end of this statement, before
        // any await.
        let cell = self
            .entries
            .entry(url.to_owned())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .value()
            .clone();

        let mut probed = false;
        let verdict = *cell
            .get_or_init(|| {
                probed = true;
                probe()
            })
            .await;

        if probed {
            Visit::Probed(verdict)
        } else {
            Visit::Duplicate(verdict)
        }
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, url: &str) -> bool {
        self.entries.contains_key(url)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What is DashMap?
//    - A HashMap that many tasks can use at once without a global Mutex
//    - entry() locks only one shard while it inserts
//
// 2. What is tokio::sync::OnceCell?
//    - A value that is computed once, asynchronously
//    - get_or_init runs the closure for the first caller
//    - Everyone else waits for that value instead of computing it again
//
// 3. Why not hold the DashMap entry while probing?
//    - Holding a shard lock across .await would block other URLs
//    - So we clone the Arc<OnceCell> out and drop the lock first
// -----------------------------------------------------------------------------
