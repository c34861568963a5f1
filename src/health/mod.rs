//! Health derivation for a single node snapshot
//!
//! This module provides:
//! - Counter extraction into a typed `CounterRecord`
//! - Replication health evaluation producing findings and a `Verdict`
//! - The `Verdict` severity scale and its exit code mapping

pub mod evaluator;
pub mod extractor;
pub mod verdict;

pub use evaluator::{Evaluation, HealthEvaluator};
pub use extractor::{CounterRecord, ExtractError, MetricExtractor};
pub use verdict::Verdict;
