// src/checker/liveness.rs
// =============================================================================
// Checks whether one URL is alive, retrying with exponential backoff.
//
// Every URL goes through the same small state machine:
//
//   Probing(0) --bad status--> BackingOff(0) --sleep 1s--> Probing(1) --> ...
//        |                                                      |
//        +--good status / tolerated error--> Accepted           |
//        +--transport error / last attempt failed--> Rejected <-+
//
// "Good status" means 2xx, unless the URL has an exact ignore rule, in which
// case it means "one of the rule's codes". A transport error (no response at
// all) is never retried; it is only accepted when the rule says the host is
// known to have TLS problems.
//
// Sleeping goes through the Sleeper trait so tests can run the whole retry
// schedule without waiting.
//
// Rust concepts:
// - Enums with data: Each State variant carries what that state needs
// - Loop + match: The state machine is a loop that replaces `state` each turn
// - &dyn Trait: Probe and sleeper are chosen at runtime (real or fake)
// =============================================================================

use super::http::StatusProbe;
use super::seen::{SeenSet, Verdict};
use crate::config::Ignore;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// The first backoff; attempt `i` waits `BACKOFF_UNIT * 2^i` before retrying
pub const BACKOFF_UNIT: Duration = Duration::from_secs(1);

#[derive(Debug, Error)]
pub enum LivenessError {
    /// The request never got a response
    #[error("transport error: {0:#}")]
    Transport(anyhow::Error),
    /// Every attempt got a response, none of them acceptable
    #[error("invalid status code {status} after {attempts} attempt(s)")]
    InvalidStatusCode { status: u16, attempts: u32 },
}

/// Why a URL counts as fine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acceptance {
    /// Answered with 2xx
    Alive { status: u16, attempts: u32 },
    /// Answered with one of the codes its ignore rule allows
    Excepted { status: u16, attempts: u32 },
    /// No response, but its ignore rule tolerates TLS errors
    TlsTolerated,
    /// retry_count is zero, so nothing was sent
    Unchecked,
    /// Checked earlier in this run (the verdict of that check)
    AlreadySeen(Verdict),
}

// Something that can wait. Tokio's timer in production, a recorder in tests.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

enum State {
    Probing { attempt: u32 },
    BackingOff { attempt: u32 },
    Accepted(Acceptance),
    Rejected(LivenessError),
}

// Checks `url` unless it was already checked during this run
//
// Parameters:
//   retry_count: maximum number of HEAD requests for this URL
//   ignore: the exact ignore rule for this URL, if there is one
//   seen: the run's seen-set; the URL is recorded before probing
pub async fn check_url(
    url: &str,
    retry_count: u32,
    ignore: Option<&Ignore>,
    seen: &SeenSet,
    probe: &dyn StatusProbe,
    sleeper: &dyn Sleeper,
) -> Result<Acceptance, LivenessError> {
    let mut outcome = None;
    let slot = &mut outcome;

    let visit = seen
        .visit(url, move || async move {
            let result = probe_url(url, retry_count, ignore, probe, sleeper).await;
            let verdict = match result {
                Ok(_) => Verdict::Accepted,
                Err(_) => Verdict::Rejected,
            };
            *slot = Some(result);
            verdict
        })
        .await;

    if let Some(result) = outcome {
        return result;
    }

    let verdict = visit.verdict();
    debug!(url, ?verdict, "already checked in this run, not checking again");
    Ok(Acceptance::AlreadySeen(verdict))
}

// The retry loop itself, without any dedup
async fn probe_url(
    url: &str,
    retry_count: u32,
    ignore: Option<&Ignore>,
    probe: &dyn StatusProbe,
    sleeper: &dyn Sleeper,
) -> Result<Acceptance, LivenessError> {
    if retry_count == 0 {
        return Ok(Acceptance::Unchecked);
    }

    let mut state = State::Probing { attempt: 0 };
    loop {
        state = match state {
            State::Probing { attempt } => match probe.status(url).await {
                Err(error) => match ignore {
                    Some(rule) if rule.has_tls_error => {
                        warn!(
                            url,
                            reason = %rule.reason,
                            error = %format!("{error:#}"),
                            "request failed, tolerated by ignore rule"
                        );
                        State::Accepted(Acceptance::TlsTolerated)
                    }
                    _ => State::Rejected(LivenessError::Transport(error)),
                },
                Ok(status) => {
                    let attempts = attempt + 1;
                    match ignore {
                        Some(rule) if rule.codes.contains(&status) => {
                            info!(url, status, reason = %rule.reason, "ok via ignore rule");
                            State::Accepted(Acceptance::Excepted { status, attempts })
                        }
                        None if status / 100 == 2 => {
                            State::Accepted(Acceptance::Alive { status, attempts })
                        }
                        _ => {
                            warn!(url, status, attempt = attempts, retry_count, "unexpected status code");
                            if attempts >= retry_count {
                                State::Rejected(LivenessError::InvalidStatusCode { status, attempts })
                            } else {
                                State::BackingOff { attempt }
                            }
                        }
                    }
                }
            },
            State::BackingOff { attempt } => {
                sleeper.sleep(backoff_delay(attempt)).await;
                State::Probing {
                    attempt: attempt + 1,
                }
            }
            State::Accepted(acceptance) => return Ok(acceptance),
            State::Rejected(error) => return Err(error),
        };
    }
}

// 1s, 2s, 4s, ... for attempts 0, 1, 2, ...
fn backoff_delay(attempt: u32) -> Duration {
    let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
    BACKOFF_UNIT.saturating_mul(factor)
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why an explicit State enum instead of a for loop?
//    - Every state and every transition is visible in one match
//    - The compiler makes sure each state is handled
//
// 2. What is exponential backoff?
//    - Wait 1s, then 2s, then 4s... between attempts
//    - Gives an overloaded server time to recover
//    - checked_shl avoids overflow for huge attempt numbers
//
// 3. Why is a transport error not retried?
//    - No response at all usually means DNS or TLS trouble
//    - Retrying rarely helps and only makes the scan slower
//
// 4. What is `slot` in check_url?
//    - The probe runs inside a closure handed to SeenSet::visit
//    - The closure writes the full result into `outcome` through `slot`
//    - If `outcome` stays None, somebody else probed the URL
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;

    // Replies are consumed in order; the last one repeats forever
    #[derive(Default)]
    struct ScriptedProbe {
        replies: Mutex<HashMap<String, VecDeque<Option<u16>>>>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedProbe {
        fn with(self, url: &str, replies: &[Option<u16>]) -> Self {
            self.replies
                .lock()
                .unwrap()
                .insert(url.to_string(), replies.iter().copied().collect());
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl StatusProbe for ScriptedProbe {
        async fn status(&self, url: &str) -> anyhow::Result<u16> {
            self.calls.lock().unwrap().push(url.to_string());
            let mut replies = self.replies.lock().unwrap();
            let queue = replies
                .get_mut(url)
                .ok_or_else(|| anyhow::anyhow!("no route to {url}"))?;
            let reply = if queue.len() > 1 {
                queue.pop_front().flatten()
            } else {
                queue.front().copied().flatten()
            };
            reply.ok_or_else(|| anyhow::anyhow!("tls handshake failed"))
        }
    }

    #[derive(Default)]
    struct RecordingSleeper {
        slept: Mutex<Vec<Duration>>,
    }

    #[async_trait]
    impl Sleeper for RecordingSleeper {
        async fn sleep(&self, duration: Duration) {
            self.slept.lock().unwrap().push(duration);
        }
    }

    impl RecordingSleeper {
        fn slept(&self) -> Vec<Duration> {
            self.slept.lock().unwrap().clone()
        }
    }

    fn rule(codes: &[u16], has_tls_error: bool) -> Ignore {
        Ignore {
            url: "https://flaky.example".to_string(),
            has_tls_error,
            codes: codes.iter().copied().collect(),
            reason: "known flaky".to_string(),
            considered_alternatives: vec!["none".to_string()],
        }
    }

    fn secs(values: &[u64]) -> Vec<Duration> {
        values.iter().map(|s| Duration::from_secs(*s)).collect()
    }

    #[tokio::test]
    async fn test_single_attempt_200_and_404() {
        let probe = ScriptedProbe::default()
            .with("dummy-200", &[Some(200)])
            .with("dummy-404", &[Some(404)]);
        let sleeper = RecordingSleeper::default();
        let seen = SeenSet::new();

        let ok = check_url("dummy-200", 1, None, &seen, &probe, &sleeper).await;
        assert_eq!(ok.unwrap(), Acceptance::Alive { status: 200, attempts: 1 });

        let err = check_url("dummy-404", 1, None, &seen, &probe, &sleeper).await.unwrap_err();
        assert!(err.to_string().contains("invalid status code"));

        assert!(sleeper.slept().is_empty());
        assert!(seen.contains("dummy-200"));
        assert!(seen.contains("dummy-404"));
        assert_eq!(seen.len(), 2);
    }

    #[tokio::test]
    async fn test_exponential_backoff_until_exhausted() {
        let probe = ScriptedProbe::default().with("https://down.example", &[Some(500)]);
        let sleeper = RecordingSleeper::default();
        let seen = SeenSet::new();

        let err = check_url("https://down.example", 4, None, &seen, &probe, &sleeper)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            LivenessError::InvalidStatusCode { status: 500, attempts: 4 }
        ));
        assert_eq!(probe.calls().len(), 4);
        assert_eq!(sleeper.slept(), secs(&[1, 2, 4]));
    }

    #[tokio::test]
    async fn test_recovers_after_retry() {
        let probe = ScriptedProbe::default().with("https://wobbly.example", &[Some(503), Some(204)]);
        let sleeper = RecordingSleeper::default();
        let seen = SeenSet::new();

        let result = check_url("https://wobbly.example", 3, None, &seen, &probe, &sleeper).await;

        assert_eq!(result.unwrap(), Acceptance::Alive { status: 204, attempts: 2 });
        assert_eq!(sleeper.slept(), secs(&[1]));
    }

    #[tokio::test]
    async fn test_transport_error_is_not_retried() {
        let probe = ScriptedProbe::default().with("https://tls.example", &[None]);
        let sleeper = RecordingSleeper::default();
        let seen = SeenSet::new();

        let err = check_url("https://tls.example", 3, None, &seen, &probe, &sleeper)
            .await
            .unwrap_err();

        assert!(matches!(err, LivenessError::Transport(_)));
        assert_eq!(probe.calls().len(), 1);
        assert!(sleeper.slept().is_empty());
    }

    #[tokio::test]
    async fn test_tls_tolerance_accepts_transport_error() {
        let probe = ScriptedProbe::default().with("https://flaky.example", &[None]);
        let sleeper = RecordingSleeper::default();
        let seen = SeenSet::new();
        let ignore = rule(&[], true);

        let result =
            check_url("https://flaky.example", 3, Some(&ignore), &seen, &probe, &sleeper).await;

        assert_eq!(result.unwrap(), Acceptance::TlsTolerated);
        assert_eq!(probe.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_tls_tolerance_does_not_cover_status_mismatch() {
        let probe = ScriptedProbe::default().with("https://flaky.example", &[Some(500)]);
        let sleeper = RecordingSleeper::default();
        let seen = SeenSet::new();
        let ignore = rule(&[403], true);

        let err = check_url("https://flaky.example", 2, Some(&ignore), &seen, &probe, &sleeper)
            .await
            .unwrap_err();

        assert!(matches!(err, LivenessError::InvalidStatusCode { status: 500, .. }));
        assert_eq!(probe.calls().len(), 2);
        assert_eq!(sleeper.slept(), secs(&[1]));
    }

    #[tokio::test]
    async fn test_ignore_codes_replace_2xx_criterion() {
        let probe = ScriptedProbe::default()
            .with("https://forbidden.example", &[Some(403)])
            .with("https://plain.example", &[Some(200)]);
        let sleeper = RecordingSleeper::default();
        let seen = SeenSet::new();
        let ignore = rule(&[403], false);

        let excepted =
            check_url("https://forbidden.example", 1, Some(&ignore), &seen, &probe, &sleeper).await;
        assert_eq!(excepted.unwrap(), Acceptance::Excepted { status: 403, attempts: 1 });

        // With a rule present, 200 is only fine if the rule lists it
        let rejected =
            check_url("https://plain.example", 1, Some(&ignore), &seen, &probe, &sleeper).await;
        assert!(rejected.is_err());
    }

    #[tokio::test]
    async fn test_zero_retry_count_never_probes() {
        let probe = ScriptedProbe::default();
        let sleeper = RecordingSleeper::default();
        let seen = SeenSet::new();

        let result = check_url("https://example.com", 0, None, &seen, &probe, &sleeper).await;

        assert_eq!(result.unwrap(), Acceptance::Unchecked);
        assert!(probe.calls().is_empty());
    }

    #[tokio::test]
    async fn test_seen_url_is_not_probed_again() {
        let probe = ScriptedProbe::default().with("https://gone.example", &[Some(410)]);
        let sleeper = RecordingSleeper::default();
        let seen = SeenSet::new();

        let first = check_url("https://gone.example", 1, None, &seen, &probe, &sleeper).await;
        let second = check_url("https://gone.example", 1, None, &seen, &probe, &sleeper).await;

        assert!(first.is_err());
        assert_eq!(second.unwrap(), Acceptance::AlreadySeen(Verdict::Rejected));
        assert_eq!(probe.calls(), vec!["https://gone.example"]);
    }

    #[test]
    fn test_backoff_delay_doubles() {
        assert_eq!(backoff_delay(0), Duration::from_secs(1));
        assert_eq!(backoff_delay(3), Duration::from_secs(8));
        assert_eq!(backoff_delay(40), BACKOFF_UNIT.saturating_mul(u32::MAX));
    }
}
