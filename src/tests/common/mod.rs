// Common test utilities and helpers

use crate::models::{CostInfo, QueryExecutionRecord};
use crate::services::advisor::{AdvisorConfig, AdvisorEngine};

/// A finished, healthy baseline record. Individual tests mutate the fields
/// relevant to the behavior under test.
pub fn finished_record(query_id: &str) -> QueryExecutionRecord {
    QueryExecutionRecord {
        query_id: query_id.to_string(),
        workspace_id: "ws-1".to_string(),
        warehouse_id: "wh-analytics".to_string(),
        user_name: "etl_user".to_string(),
        start_time: "2026-08-29 10:00:00".to_string(),
        end_time: "2026-08-29 10:00:30".to_string(),
        total_duration_ms: 30_000,
        execution_duration_ms: 30_000,
        compute_wait_ms: 0,
        compilation_ms: 120,
        read_rows: 1_000_000,
        read_bytes: 500_000_000,
        spilled_bytes: 0,
        shuffle_bytes: 0,
        cache_hit_ratio: Some(0.9),
        statement: "SELECT id, amount FROM orders WHERE day = '2026-08-29'".to_string(),
        execution_status: "FINISHED".to_string(),
        cost: None,
    }
}

/// A record dominated by disk spill (2 GiB spilled)
pub fn spilling_record(query_id: &str) -> QueryExecutionRecord {
    let mut record = finished_record(query_id);
    record.spilled_bytes = 2 * 1024 * 1024 * 1024;
    record.execution_duration_ms = 120_000;
    record
}

/// A record dominated by raw execution time (~33 minutes)
pub fn slow_record(query_id: &str) -> QueryExecutionRecord {
    let mut record = finished_record(query_id);
    record.execution_duration_ms = 2_000_000;
    record.total_duration_ms = 2_000_000;
    record
}

pub fn with_cost(mut record: QueryExecutionRecord, actual_cost_usd: f64) -> QueryExecutionRecord {
    record.cost = Some(CostInfo {
        usage_units: actual_cost_usd / 0.1,
        unit_price_usd: 0.1,
        actual_cost_usd,
    });
    record
}

/// Engine with default weights, thresholds, floor, and score cutoff
pub fn default_engine() -> AdvisorEngine {
    AdvisorEngine::new(AdvisorConfig::default())
}
