//! Generate, validate, retry.
//!
//! Every pipeline stage runs the same bounded loop: produce a candidate, run
//! the stage's validator, and return the first accepted candidate. A producer
//! error is a transient failure and is retried after a fixed backoff; a
//! rejected candidate is discarded and a fresh one is produced immediately.

use crate::error::Result;
use crate::validation::ValidationReport;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::{info, warn};

/// A pipeline stage, used to label logs and failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Narrative,
    Narration,
    Music,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Narrative => write!(f, "narrative"),
            Stage::Narration => write!(f, "narration"),
            Stage::Music => write!(f, "music"),
        }
    }
}

/// How many attempts a stage gets and how long to wait after a transient failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl RetryPolicy {
    pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(2);

    pub const fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts,
            backoff,
        }
    }

    /// Whole story triples: 5 attempts.
    pub const fn narrative() -> Self {
        Self::new(5, Self::DEFAULT_BACKOFF)
    }

    /// One narration section per attempt: 3 attempts.
    pub const fn narration() -> Self {
        Self::new(3, Self::DEFAULT_BACKOFF)
    }

    /// One music clip per attempt: 3 attempts.
    pub const fn music() -> Self {
        Self::new(3, Self::DEFAULT_BACKOFF)
    }

    pub const fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }
}

/// Uniform outcome of a retry loop.
#[derive(Debug, Clone, PartialEq)]
pub struct StageResult<T> {
    pub accepted: bool,
    pub value: Option<T>,
    pub attempts: u32,
}

impl<T> StageResult<T> {
    pub fn accepted(value: T, attempts: u32) -> Self {
        Self {
            accepted: true,
            value: Some(value),
            attempts,
        }
    }

    pub fn exhausted(attempts: u32) -> Self {
        Self {
            accepted: false,
            value: None,
            attempts,
        }
    }

    pub fn into_value(self) -> Option<T> {
        self.value
    }
}

/// Run `produce` until `validate` accepts a candidate or attempts run out.
///
/// `produce` receives the 1-based attempt number. `label` names the slot in
/// logs (e.g. "story", "ending", "transition1").
pub async fn run_with_retry<T, P, Fut, V>(
    stage: Stage,
    label: &str,
    policy: RetryPolicy,
    mut produce: P,
    validate: V,
) -> StageResult<T>
where
    P: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T>>,
    V: Fn(&T) -> ValidationReport,
{
    for attempt in 1..=policy.max_attempts {
        info!(
            %stage,
            label,
            attempt,
            max_attempts = policy.max_attempts,
            "generating candidate"
        );

        let candidate = match produce(attempt).await {
            Ok(candidate) => candidate,
            Err(e) => {
                warn!(%stage, label, attempt, "generation failed: {}", e);
                if attempt < policy.max_attempts && !policy.backoff.is_zero() {
                    tokio::time::sleep(policy.backoff).await;
                }
                continue;
            }
        };

        let report = validate(&candidate);
        report.log(label);
        if report.passed() {
            info!(%stage, label, attempt, "candidate accepted");
            return StageResult::accepted(candidate, attempt);
        }

        warn!(
            %stage,
            label,
            attempt,
            failed = ?report.failures(),
            "candidate rejected, regenerating"
        );
    }

    warn!(
        %stage,
        label,
        attempts = policy.max_attempts,
        "stage exhausted without an accepted candidate"
    );
    StageResult::exhausted(policy.max_attempts)
}
