//! Defect classification
//!
//! Assigns exactly one primary-issue label per query from an ordered decision
//! list (first match wins; the conditions are not mutually exclusive).
//!
//! The classifier's thresholds are deliberately stricter than the scorer's:
//! the scorer penalizes moderate problems, the classifier only labels a
//! category once the problem is severe enough to be the dominant explanation.
//! This asymmetry is intentional.

use super::metrics::NormalizedMetrics;
use crate::models::QueryExecutionRecord;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Primary performance defect category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DefectLabel {
    MemorySpillCritical,
    ExecutionTooSlow,
    PoorCacheUtilization,
    DataInefficient,
    ShuffleHeavy,
    InfrastructureBottleneck,
    GeneralPerformance,
}

impl DefectLabel {
    /// Human-readable description for display layers
    pub fn description(&self) -> &'static str {
        match self {
            Self::MemorySpillCritical => "Critical memory spill to local disk",
            Self::ExecutionTooSlow => "Execution time far beyond acceptable range",
            Self::PoorCacheUtilization => "Poor cache utilization",
            Self::DataInefficient => "Inefficient data access (wide reads per row)",
            Self::ShuffleHeavy => "Heavy network shuffle during processing",
            Self::InfrastructureBottleneck => "Long wait for compute capacity",
            Self::GeneralPerformance => "General performance degradation",
        }
    }
}

/// Trigger thresholds for the classifier decision list.
/// Tunable configuration with the documented values as defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClassifierThresholds {
    /// Spill volume that marks a spill as the dominant problem (1 GiB)
    pub spill_critical_bytes: i64,
    /// Execution duration that marks a query as too slow (30 min)
    pub slow_execution_ms: i64,
    /// Cache-hit ratio below which cache is the dominant problem
    pub cache_hit_floor: f64,
    /// Bytes-per-row above which data access is the dominant problem
    pub bytes_per_row_ceiling: f64,
    /// Shuffle ratio above which shuffle is the dominant problem
    pub shuffle_ratio_ceiling: f64,
    /// Compute-wait duration that marks infrastructure as the problem (1 min)
    pub compute_wait_ms: i64,
}

impl Default for ClassifierThresholds {
    fn default() -> Self {
        Self {
            spill_critical_bytes: 1_073_741_824,
            slow_execution_ms: 1_800_000,
            cache_hit_floor: 0.3,
            bytes_per_row_ceiling: 50_000.0,
            shuffle_ratio_ceiling: 0.5,
            compute_wait_ms: 60_000,
        }
    }
}

/// Ordered threshold classifier. Pure and idempotent: the same input always
/// produces the same single label.
#[derive(Debug, Clone, Default)]
pub struct DefectClassifier {
    thresholds: ClassifierThresholds,
}

impl DefectClassifier {
    pub fn new(thresholds: ClassifierThresholds) -> Self {
        Self { thresholds }
    }

    /// Walk the decision list in order and return the first matching label
    pub fn classify(
        &self,
        record: &QueryExecutionRecord,
        metrics: &NormalizedMetrics,
    ) -> DefectLabel {
        let t = &self.thresholds;

        if record.spilled_bytes > t.spill_critical_bytes {
            DefectLabel::MemorySpillCritical
        } else if record.execution_duration_ms > t.slow_execution_ms {
            DefectLabel::ExecutionTooSlow
        } else if metrics.cache_hit_ratio < t.cache_hit_floor {
            DefectLabel::PoorCacheUtilization
        } else if metrics.bytes_per_row > t.bytes_per_row_ceiling {
            DefectLabel::DataInefficient
        } else if metrics.shuffle_ratio > t.shuffle_ratio_ceiling {
            DefectLabel::ShuffleHeavy
        } else if record.compute_wait_ms > t.compute_wait_ms {
            DefectLabel::InfrastructureBottleneck
        } else {
            DefectLabel::GeneralPerformance
        }
    }
}
