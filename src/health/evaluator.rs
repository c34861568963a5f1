//! Replication health evaluation
//!
//! Checks run in a fixed order so findings are reproducible: the optional
//! group size check first, then each protocol indicator in table order.
//! The verdict is the most severe finding. The group size comes from the
//! extracted counters, so the data line and the findings agree.

use std::fmt;

use tracing::debug;

use crate::config::GroupSize;
use crate::status::RawStatus;

use super::extractor::GroupSizeReading;
use super::verdict::Verdict;

/// A status variable that must hold one exact value on a healthy node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Indicator {
    pub key: String,
    pub expected: String,
}

impl Indicator {
    pub fn new(key: impl Into<String>, expected: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            expected: expected.into(),
        }
    }
}

/// Connectivity, readiness and sync state of a Galera node
pub fn galera_indicators() -> Vec<Indicator> {
    vec![
        Indicator::new("wsrep_connected", "ON"),
        Indicator::new("wsrep_ready", "ON"),
        Indicator::new("wsrep_local_state_comment", "Synced"),
    ]
}

/// One observation that lowers the node's health
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Finding {
    /// Group size differs from the configured expectation
    GroupSizeMismatch {
        key: String,
        actual: u64,
        expected: u32,
    },
    /// A protocol indicator is missing or holds the wrong value
    IndicatorMismatch {
        key: String,
        actual: Option<String>,
        expected: String,
    },
}

impl Finding {
    pub fn severity(&self) -> Verdict {
        match self {
            Finding::GroupSizeMismatch { .. } => Verdict::Warning,
            Finding::IndicatorMismatch { .. } => Verdict::Critical,
        }
    }

    /// Status variable the finding is about
    pub fn key(&self) -> &str {
        match self {
            Finding::GroupSizeMismatch { key, .. } | Finding::IndicatorMismatch { key, .. } => key,
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Finding::GroupSizeMismatch {
                key,
                actual,
                expected,
            } => write!(
                f,
                "degraded cluster: {key} == {actual} (expected {expected})"
            ),
            Finding::IndicatorMismatch {
                key,
                actual: Some(actual),
                expected,
            } => write!(f, "ERROR: {key} = '{actual}' (expected '{expected}')"),
            Finding::IndicatorMismatch {
                key,
                actual: None,
                expected,
            } => write!(f, "ERROR: {key} is missing (expected '{expected}')"),
        }
    }
}

/// Verdict plus the findings that produced it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Evaluation {
    pub verdict: Verdict,
    pub findings: Vec<Finding>,
}

impl Evaluation {
    fn record(&mut self, finding: Finding) {
        debug!(key = finding.key(), severity = %finding.severity(), "Recorded finding");
        self.verdict.escalate(finding.severity());
        self.findings.push(finding);
    }
}

/// Evaluates a status snapshot against an indicator table
#[derive(Debug, Clone)]
pub struct HealthEvaluator {
    indicators: Vec<Indicator>,
}

impl Default for HealthEvaluator {
    fn default() -> Self {
        Self::new(galera_indicators())
    }
}

impl HealthEvaluator {
    pub fn new(indicators: Vec<Indicator>) -> Self {
        Self { indicators }
    }

    /// Evaluate one snapshot.
    ///
    /// `group_size` is only compared when `expected` is set. Indicators are
    /// exact string matches against `raw`.
    pub fn evaluate(
        &self,
        raw: &RawStatus,
        group_size: GroupSizeReading<'_>,
        expected: Option<GroupSize>,
    ) -> Evaluation {
        let mut evaluation = Evaluation::default();

        if let Some(expected) = expected {
            if group_size.value != u64::from(expected.get()) {
                evaluation.record(Finding::GroupSizeMismatch {
                    key: group_size.key.to_string(),
                    actual: group_size.value,
                    expected: expected.get(),
                });
            }
        }

        for indicator in &self.indicators {
            let actual = raw.get(&indicator.key);
            if actual != Some(indicator.expected.as_str()) {
                evaluation.record(Finding::IndicatorMismatch {
                    key: indicator.key.clone(),
                    actual: actual.map(str::to_string),
                    expected: indicator.expected.clone(),
                });
            }
        }

        debug!(
            verdict = %evaluation.verdict,
            findings = evaluation.findings.len(),
            "Evaluated status snapshot"
        );
        evaluation
    }
}
