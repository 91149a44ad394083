//! Acceptance checks for generated stories and audio.
//!
//! Each validator is a pure function of its input that returns a
//! [`ValidationReport`]: one [`CriterionCheck`] per gate. A candidate is
//! accepted only if every check passes.

mod audio;
mod text;

pub use audio::{validate_music, validate_narration, MusicThresholds, NarrationThresholds};
pub use text::{
    count_syllables, Denylist, TextMetrics, TextThresholds, TextValidator, DEFAULT_PROHIBITED_TERMS,
};

use tracing::{info, warn};

/// Outcome of one acceptance criterion.
#[derive(Debug, Clone, PartialEq)]
pub struct CriterionCheck {
    pub criterion: &'static str,
    /// Measured value, formatted for display.
    pub value: String,
    /// Acceptable range, formatted for display.
    pub target: String,
    pub passed: bool,
}

/// Pass/fail result for every criterion applied to one candidate.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValidationReport {
    pub checks: Vec<CriterionCheck>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check(
        mut self,
        criterion: &'static str,
        value: impl Into<String>,
        target: impl Into<String>,
        passed: bool,
    ) -> Self {
        self.checks.push(CriterionCheck {
            criterion,
            value: value.into(),
            target: target.into(),
            passed,
        });
        self
    }

    /// True when every criterion passed.
    pub fn passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    /// Names of the criteria that failed.
    pub fn failures(&self) -> Vec<&'static str> {
        self.checks
            .iter()
            .filter(|c| !c.passed)
            .map(|c| c.criterion)
            .collect()
    }

    /// Emit one structured event per criterion.
    pub fn log(&self, subject: &str) {
        for c in &self.checks {
            if c.passed {
                info!(
                    subject,
                    criterion = c.criterion,
                    value = %c.value,
                    target = %c.target,
                    passed = true,
                    "validation check passed"
                );
            } else {
                warn!(
                    subject,
                    criterion = c.criterion,
                    value = %c.value,
                    target = %c.target,
                    passed = false,
                    "validation check failed"
                );
            }
        }
    }
}
