//! One probe run: fetch, extract, evaluate, format

use tracing::{info, warn};

use crate::config::GroupSize;
use crate::health::{Evaluation, ExtractError, HealthEvaluator, MetricExtractor, Verdict};
use crate::metrics::{format_line, Tags};
use crate::status::{RawStatus, SourceError, StatusSource};

/// Errors that end a run before a report exists
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Extract(#[from] ExtractError),
}

impl ProbeError {
    /// Every failed run is reported as critical
    pub fn verdict(&self) -> Verdict {
        Verdict::Critical
    }
}

/// Outcome of a completed run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub line: String,
    pub evaluation: Evaluation,
}

impl Report {
    pub fn verdict(&self) -> Verdict {
        self.evaluation.verdict
    }

    /// Output lines: the data line, then one line per finding
    pub fn render(&self) -> Vec<String> {
        std::iter::once(self.line.clone())
            .chain(self.evaluation.findings.iter().map(ToString::to_string))
            .collect()
    }
}

/// Probe pipeline for one node
#[derive(Debug, Clone)]
pub struct Probe {
    extractor: MetricExtractor,
    evaluator: HealthEvaluator,
    measurement: String,
    tags: Tags,
}

impl Probe {
    pub fn new(measurement: impl Into<String>, tags: Tags) -> Self {
        Self::with_parts(
            MetricExtractor::default(),
            HealthEvaluator::default(),
            measurement,
            tags,
        )
    }

    pub fn with_parts(
        extractor: MetricExtractor,
        evaluator: HealthEvaluator,
        measurement: impl Into<String>,
        tags: Tags,
    ) -> Self {
        Self {
            extractor,
            evaluator,
            measurement: measurement.into(),
            tags,
        }
    }

    /// Judge an already fetched snapshot
    pub fn evaluate(
        &self,
        raw: &RawStatus,
        expected: Option<GroupSize>,
    ) -> Result<Report, ExtractError> {
        let counters = self.extractor.extract(raw)?;
        let group_size = self.extractor.group_size(&counters);
        let evaluation = self.evaluator.evaluate(raw, group_size, expected);
        let line = format_line(&self.measurement, &self.tags, &counters);
        Ok(Report { line, evaluation })
    }

    /// Fetch a snapshot from `source` and judge it
    pub async fn run<S: StatusSource>(
        &self,
        source: &S,
        expected: Option<GroupSize>,
    ) -> Result<Report, ProbeError> {
        let raw = source.fetch().await.inspect_err(|e| {
            warn!(error = %e, "Status source failed, skipping evaluation");
        })?;

        let report = self.evaluate(&raw, expected)?;
        info!(
            verdict = %report.verdict(),
            findings = report.evaluation.findings.len(),
            "Probe complete"
        );
        Ok(report)
    }
}
