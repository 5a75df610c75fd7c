//! Raw query-execution telemetry as supplied by the warehouse history table.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Execution status value that marks a record as analyzable
pub const STATUS_FINISHED: &str = "FINISHED";

/// Cost attribution for a single query, present only when billing data
/// has been joined upstream.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CostInfo {
    /// Usage units consumed by this query (warehouse billing units)
    pub usage_units: f64,
    /// Matched unit price in USD
    pub unit_price_usd: f64,
    /// Derived monetary cost in USD (usage_units * unit_price_usd)
    pub actual_cost_usd: f64,
}

/// One completed query execution, as read from the warehouse's query
/// history system table. Immutable input to the advisor engine.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QueryExecutionRecord {
    /// Query identifier (required, non-empty)
    pub query_id: String,
    #[serde(default)]
    pub workspace_id: String,
    #[serde(default)]
    pub warehouse_id: String,
    /// Executing user
    #[serde(default)]
    pub user_name: String,

    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub end_time: String,
    /// Wall-clock duration from submission to completion, milliseconds
    #[serde(default)]
    pub total_duration_ms: i64,
    /// Pure execution duration, milliseconds
    #[serde(default)]
    pub execution_duration_ms: i64,
    /// Time spent waiting for compute capacity, milliseconds
    #[serde(default)]
    pub compute_wait_ms: i64,
    /// Compilation/planning duration, milliseconds
    #[serde(default)]
    pub compilation_ms: i64,

    #[serde(default)]
    pub read_rows: i64,
    #[serde(default)]
    pub read_bytes: i64,
    /// Bytes spilled to local disk during execution
    #[serde(default)]
    pub spilled_bytes: i64,
    /// Bytes shuffled over the network during execution
    #[serde(default)]
    pub shuffle_bytes: i64,

    /// Fraction of read data served from cache, in [0, 1].
    /// None means the warehouse doesn't track cache hits for this query;
    /// the engine treats missing values as 1.0 (best case, no penalty) so
    /// untracked warehouses never produce cache false positives.
    #[serde(default)]
    pub cache_hit_ratio: Option<f64>,

    /// Full SQL statement (may already be truncated by the warehouse)
    #[serde(default)]
    pub statement: String,

    /// Execution status; only FINISHED records are analyzable
    #[serde(default = "default_status")]
    pub execution_status: String,

    /// Billing data, present only in cost-aware mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<CostInfo>,
}

fn default_status() -> String {
    STATUS_FINISHED.to_string()
}

impl QueryExecutionRecord {
    /// Check structural validity. A malformed record is rejected individually
    /// at ingestion and must never abort the whole batch.
    pub fn validate(&self) -> Result<(), String> {
        if self.query_id.trim().is_empty() {
            return Err("query_id is empty".to_string());
        }
        if self.total_duration_ms < 0
            || self.execution_duration_ms < 0
            || self.compute_wait_ms < 0
            || self.compilation_ms < 0
        {
            return Err(format!("query {} has a negative duration", self.query_id));
        }
        if self.read_rows < 0 || self.read_bytes < 0 || self.spilled_bytes < 0 || self.shuffle_bytes < 0
        {
            return Err(format!("query {} has a negative volume counter", self.query_id));
        }
        if let Some(ratio) = self.cache_hit_ratio {
            if !(0.0..=1.0).contains(&ratio) {
                return Err(format!(
                    "query {} cache_hit_ratio {} outside [0, 1]",
                    self.query_id, ratio
                ));
            }
        }
        Ok(())
    }

    pub fn is_finished(&self) -> bool {
        self.execution_status.eq_ignore_ascii_case(STATUS_FINISHED)
    }

    /// Verified monetary cost, if billing data was joined
    pub fn actual_cost_usd(&self) -> Option<f64> {
        self.cost.as_ref().map(|c| c.actual_cost_usd)
    }

    /// Statement preview for display, truncated at a char boundary
    pub fn statement_preview(&self, max_chars: usize) -> String {
        if self.statement.chars().count() <= max_chars {
            self.statement.clone()
        } else {
            let truncated: String = self.statement.chars().take(max_chars).collect();
            format!("{}...", truncated)
        }
    }
}
