//! Wire-format tests for the HTTP request and response payloads.

use crate::handlers::analysis::{BatchAnalysisRequest, WorstQueriesParams};
use crate::models::QueryExecutionRecord;
use crate::services::advisor::RankingMode;
use crate::tests::common::{default_engine, spilling_record};

#[test]
fn test_worst_queries_params_defaults() {
    let params: WorstQueriesParams = serde_json::from_str("{}").unwrap();
    assert_eq!(params.hours, 24);
    assert_eq!(params.limit, None);
    assert_eq!(params.mode, RankingMode::Badness);
    assert_eq!(params.min_duration_seconds, None);
}

#[test]
fn test_worst_queries_params_full() {
    let json = r#"{"hours": 48, "limit": 25, "mode": "priority", "min_duration_seconds": 30}"#;
    let params: WorstQueriesParams = serde_json::from_str(json).unwrap();
    assert_eq!(params.hours, 48);
    assert_eq!(params.limit, Some(25));
    assert_eq!(params.mode, RankingMode::Priority);
    assert_eq!(params.min_duration_seconds, Some(30));
}

#[test]
fn test_batch_request_minimal_records() {
    // Callers may omit everything except query_id per record
    let json = r#"{"records": [{"query_id": "q-1"}]}"#;
    let request: BatchAnalysisRequest = serde_json::from_str(json).unwrap();
    assert_eq!(request.records.len(), 1);
    assert_eq!(request.records[0].query_id, "q-1");
    assert_eq!(request.records[0].execution_status, "FINISHED");
    assert_eq!(request.records[0].cache_hit_ratio, None);
    assert_eq!(request.mode, RankingMode::Badness);
    assert_eq!(request.limit, None);
    assert_eq!(request.min_execution_ms, None);
}

#[test]
fn test_record_parses_cost_fields() {
    let json = r#"{
        "query_id": "q-7",
        "execution_duration_ms": 600000,
        "spilled_bytes": 2147483648,
        "cache_hit_ratio": 0.1,
        "cost": {"usage_units": 40.0, "unit_price_usd": 0.25, "actual_cost_usd": 10.0}
    }"#;
    let record: QueryExecutionRecord = serde_json::from_str(json).unwrap();
    assert_eq!(record.spilled_bytes, 2_147_483_648);
    assert_eq!(record.actual_cost_usd(), Some(10.0));
}

#[test]
fn test_analysis_result_serialization_shape() {
    let engine = default_engine();
    let batch = engine.analyze_batch(vec![spilling_record("q-json")], 10, RankingMode::Badness);
    let value = serde_json::to_value(&batch.results[0]).unwrap();

    assert_eq!(value["rank"], 1);
    assert_eq!(value["query_id"], "q-json");
    assert_eq!(value["primary_issue"], "MEMORY_SPILL_CRITICAL");
    assert_eq!(value["implementation_effort"], "High");
    assert_eq!(value["estimated_savings_percent"], 70);
    // badness mode never emits a priority score
    assert!(value.get("priority_score").is_none());
}
