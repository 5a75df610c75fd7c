//! ROI estimation
//!
//! Maps the defect label (plus raw metrics and statement shape for the
//! fallback tiers) to an estimated savings percentage and a qualitative
//! implementation-effort tier. This is a static lookup table, not a learned
//! model; reproducibility requires exact threshold and value preservation.

use super::classifier::DefectLabel;
use crate::models::QueryExecutionRecord;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Qualitative implementation-effort tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum ImplementationEffort {
    Low,
    Medium,
    High,
}

/// Estimated optimization return for one query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoiEstimate {
    /// Estimated savings percentage, 0..=100
    pub savings_percent: u8,
    pub effort: ImplementationEffort,
}

/// `SELECT *` projection (select-all antipattern)
static SELECT_ALL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)\bSELECT\s+\*").expect("select-all regex"));

/// ORDER BY present anywhere in the statement
static ORDER_BY_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)\bORDER\s+BY\b").expect("order-by regex"));

/// LIMIT clause present anywhere in the statement
static LIMIT_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)\bLIMIT\s+\d").expect("limit regex"));

/// Statement sorts its full result set (ORDER BY without LIMIT)
pub fn has_unbounded_sort(statement: &str) -> bool {
    ORDER_BY_REGEX.is_match(statement) && !LIMIT_REGEX.is_match(statement)
}

/// Statement projects every column (SELECT *)
pub fn has_select_all(statement: &str) -> bool {
    SELECT_ALL_REGEX.is_match(statement)
}

/// Static label-driven ROI estimator
#[derive(Debug, Clone, Copy, Default)]
pub struct RoiEstimator;

impl RoiEstimator {
    /// Walk the savings table in its documented order; first match wins.
    pub fn estimate(&self, label: DefectLabel, record: &QueryExecutionRecord) -> RoiEstimate {
        let savings_percent = if label == DefectLabel::MemorySpillCritical {
            70
        } else if label == DefectLabel::ShuffleHeavy {
            60
        } else if has_unbounded_sort(&record.statement) {
            55
        } else if label == DefectLabel::DataInefficient {
            45
        } else if has_select_all(&record.statement) {
            40
        } else if record.execution_duration_ms > 1_800_000 {
            35
        } else if record.execution_duration_ms > 900_000 {
            25
        } else if label == DefectLabel::PoorCacheUtilization {
            30
        } else {
            15
        };

        RoiEstimate { savings_percent, effort: self.effort_for(label, record) }
    }

    /// Low for surface fixes (select-all / unbounded-sort statement shapes),
    /// High for the structural failure modes, Medium otherwise.
    fn effort_for(&self, label: DefectLabel, record: &QueryExecutionRecord) -> ImplementationEffort {
        match label {
            DefectLabel::MemorySpillCritical | DefectLabel::ShuffleHeavy => {
                ImplementationEffort::High
            },
            DefectLabel::DataInefficient | DefectLabel::PoorCacheUtilization => {
                ImplementationEffort::Medium
            },
            _ => {
                if has_unbounded_sort(&record.statement) || has_select_all(&record.statement) {
                    ImplementationEffort::Low
                } else {
                    ImplementationEffort::Medium
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(statement: &str, execution_ms: i64) -> QueryExecutionRecord {
        QueryExecutionRecord {
            query_id: "q".to_string(),
            workspace_id: String::new(),
            warehouse_id: String::new(),
            user_name: String::new(),
            start_time: String::new(),
            end_time: String::new(),
            total_duration_ms: execution_ms,
            execution_duration_ms: execution_ms,
            compute_wait_ms: 0,
            compilation_ms: 0,
            read_rows: 0,
            read_bytes: 0,
            spilled_bytes: 0,
            shuffle_bytes: 0,
            cache_hit_ratio: None,
            statement: statement.to_string(),
            execution_status: "FINISHED".to_string(),
            cost: None,
        }
    }

    #[test]
    fn test_pattern_detection() {
        assert!(has_select_all("select * from t"));
        assert!(has_select_all("SELECT\n  *\nFROM t"));
        assert!(!has_select_all("SELECT id FROM t"));

        assert!(has_unbounded_sort("SELECT id FROM t ORDER BY id"));
        assert!(!has_unbounded_sort("SELECT id FROM t ORDER BY id LIMIT 100"));
        assert!(!has_unbounded_sort("SELECT id FROM t"));
    }

    #[test]
    fn test_spill_row() {
        let est = RoiEstimator.estimate(
            DefectLabel::MemorySpillCritical,
            &record("SELECT * FROM t ORDER BY x", 10_000),
        );
        assert_eq!(est.savings_percent, 70);
        assert_eq!(est.effort, ImplementationEffort::High);
    }

    #[test]
    fn test_shuffle_row() {
        let est = RoiEstimator.estimate(DefectLabel::ShuffleHeavy, &record("SELECT a FROM t", 0));
        assert_eq!(est.savings_percent, 60);
        assert_eq!(est.effort, ImplementationEffort::High);
    }

    #[test]
    fn test_unbounded_sort_row() {
        let est = RoiEstimator.estimate(
            DefectLabel::GeneralPerformance,
            &record("SELECT a FROM t ORDER BY a", 60_000),
        );
        assert_eq!(est.savings_percent, 55);
        assert_eq!(est.effort, ImplementationEffort::Low);
    }

    #[test]
    fn test_data_inefficient_row() {
        let est =
            RoiEstimator.estimate(DefectLabel::DataInefficient, &record("SELECT a FROM t", 0));
        assert_eq!(est.savings_percent, 45);
        assert_eq!(est.effort, ImplementationEffort::Medium);
    }

    #[test]
    fn test_select_all_row() {
        let est = RoiEstimator.estimate(
            DefectLabel::GeneralPerformance,
            &record("SELECT * FROM t WHERE x = 1", 60_000),
        );
        assert_eq!(est.savings_percent, 40);
        assert_eq!(est.effort, ImplementationEffort::Low);
    }

    #[test]
    fn test_duration_tiers() {
        let very_slow = RoiEstimator.estimate(
            DefectLabel::ExecutionTooSlow,
            &record("SELECT a FROM t", 2_000_000),
        );
        assert_eq!(very_slow.savings_percent, 35);
        assert_eq!(very_slow.effort, ImplementationEffort::Medium);

        let slow = RoiEstimator.estimate(
            DefectLabel::GeneralPerformance,
            &record("SELECT a FROM t", 1_000_000),
        );
        assert_eq!(slow.savings_percent, 25);
    }

    #[test]
    fn test_poor_cache_row() {
        let est = RoiEstimator.estimate(
            DefectLabel::PoorCacheUtilization,
            &record("SELECT a FROM t", 60_000),
        );
        assert_eq!(est.savings_percent, 30);
        assert_eq!(est.effort, ImplementationEffort::Medium);
    }

    #[test]
    fn test_fallback_row() {
        let est = RoiEstimator.estimate(
            DefectLabel::InfrastructureBottleneck,
            &record("SELECT a FROM t", 60_000),
        );
        assert_eq!(est.savings_percent, 15);
        assert_eq!(est.effort, ImplementationEffort::Medium);
    }

    #[test]
    fn test_savings_within_bounds() {
        let labels = [
            DefectLabel::MemorySpillCritical,
            DefectLabel::ExecutionTooSlow,
            DefectLabel::PoorCacheUtilization,
            DefectLabel::DataInefficient,
            DefectLabel::ShuffleHeavy,
            DefectLabel::InfrastructureBottleneck,
            DefectLabel::GeneralPerformance,
        ];
        for label in labels {
            let est = RoiEstimator.estimate(label, &record("SELECT * FROM t ORDER BY x", 2_000_000));
            assert!(est.savings_percent <= 100);
        }
    }
}
