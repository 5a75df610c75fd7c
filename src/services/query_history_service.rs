//! Query history fetch
//!
//! Reads finished-query telemetry from the warehouse's query history system
//! table, bounded by a time window and a row limit. Individual rows that fail
//! to parse are counted and skipped; one bad row never aborts the batch.

use crate::config::QueryHistoryConfig;
use crate::models::{CostInfo, QueryExecutionRecord};
use crate::services::warehouse_client::{NULL_SENTINEL, WarehouseClient};
use crate::utils::error::ApiResult;
use std::sync::Arc;

/// Fetch parameters for one batch
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Look-back window in hours
    pub window_hours: u32,
    /// Noise floor applied server-side: only queries with
    /// execution_duration_ms strictly above this are fetched
    pub min_execution_ms: i64,
    /// Hard cap on fetched rows
    pub max_rows: usize,
    /// Join billing data for cost-aware ranking (requires a configured
    /// billing table; silently skipped otherwise)
    pub with_cost: bool,
}

/// Fetched batch plus the number of rows dropped at parse time
#[derive(Debug, Default)]
pub struct FetchResult {
    pub records: Vec<QueryExecutionRecord>,
    pub skipped: usize,
}

/// Column order of the history SELECT; parse_row depends on it
const BASE_COLUMNS: [&str; 17] = [
    "query_id",
    "workspace_id",
    "warehouse_id",
    "executed_by",
    "start_time",
    "end_time",
    "total_duration_ms",
    "execution_duration_ms",
    "waiting_for_compute_duration_ms",
    "compilation_duration_ms",
    "read_rows",
    "read_bytes",
    "spilled_local_bytes",
    "shuffle_read_bytes",
    "read_from_cache_ratio",
    "execution_status",
    "statement_text",
];

pub struct QueryHistoryService {
    client: Arc<WarehouseClient>,
    config: QueryHistoryConfig,
}

impl QueryHistoryService {
    pub fn new(client: Arc<WarehouseClient>, config: QueryHistoryConfig) -> Self {
        Self { client, config }
    }

    /// Fetch finished queries in the window, newest first.
    pub async fn fetch_finished_queries(&self, opts: &FetchOptions) -> ApiResult<FetchResult> {
        let with_cost = opts.with_cost && self.config.billing_table.is_some();
        let sql = self.build_sql(opts, with_cost);

        tracing::info!(
            "Fetching query history: window={}h floor={}ms limit={} cost={}",
            opts.window_hours,
            opts.min_execution_ms,
            opts.max_rows,
            with_cost
        );

        let (_, rows) = self.client.query_raw(&sql).await?;

        let mut result = FetchResult::default();
        for row in &rows {
            match parse_row(row, with_cost) {
                Ok(record) => result.records.push(record),
                Err(reason) => {
                    tracing::warn!("Skipping unparseable history row: {}", reason);
                    result.skipped += 1;
                },
            }
        }

        tracing::info!(
            "Fetched {} history records ({} skipped at parse)",
            result.records.len(),
            result.skipped
        );
        Ok(result)
    }

    fn build_sql(&self, opts: &FetchOptions, with_cost: bool) -> String {
        let table = self.config.full_table_name();
        let select_list = BASE_COLUMNS
            .iter()
            .map(|c| format!("q.`{}`", c))
            .collect::<Vec<_>>()
            .join(", ");

        let where_clause = format!(
            "q.`execution_status` = 'FINISHED' \
             AND q.`execution_duration_ms` > {} \
             AND q.`end_time` >= DATE_SUB(NOW(), INTERVAL {} HOUR)",
            opts.min_execution_ms, opts.window_hours
        );

        if with_cost {
            // billing_table presence is checked by the caller
            let billing = self.config.billing_table.as_deref().unwrap_or_default();
            format!(
                "SELECT {select_list}, b.`usage_units`, b.`unit_price_usd` \
                 FROM {table} q \
                 LEFT JOIN {billing} b ON b.`query_id` = q.`query_id` \
                 WHERE {where_clause} \
                 ORDER BY q.`end_time` DESC \
                 LIMIT {limit}",
                limit = opts.max_rows
            )
        } else {
            format!(
                "SELECT {select_list} \
                 FROM {table} q \
                 WHERE {where_clause} \
                 ORDER BY q.`end_time` DESC \
                 LIMIT {limit}",
                limit = opts.max_rows
            )
        }
    }
}

/// Parse one raw row in BASE_COLUMNS order (plus two billing columns when
/// with_cost). Counters default to 0 on NULL; the record itself re-validates
/// in the engine.
fn parse_row(row: &[String], with_cost: bool) -> Result<QueryExecutionRecord, String> {
    let expected = BASE_COLUMNS.len() + if with_cost { 2 } else { 0 };
    if row.len() < expected {
        return Err(format!("expected {} columns, got {}", expected, row.len()));
    }

    let cost = if with_cost {
        match (opt_f64(&row[17])?, opt_f64(&row[18])?) {
            (Some(usage_units), Some(unit_price_usd)) => Some(CostInfo {
                usage_units,
                unit_price_usd,
                actual_cost_usd: usage_units * unit_price_usd,
            }),
            _ => None,
        }
    } else {
        None
    };

    Ok(QueryExecutionRecord {
        query_id: row[0].clone(),
        workspace_id: null_to_empty(&row[1]),
        warehouse_id: null_to_empty(&row[2]),
        user_name: null_to_empty(&row[3]),
        start_time: null_to_empty(&row[4]),
        end_time: null_to_empty(&row[5]),
        total_duration_ms: i64_or_zero(&row[6])?,
        execution_duration_ms: i64_or_zero(&row[7])?,
        compute_wait_ms: i64_or_zero(&row[8])?,
        compilation_ms: i64_or_zero(&row[9])?,
        read_rows: i64_or_zero(&row[10])?,
        read_bytes: i64_or_zero(&row[11])?,
        spilled_bytes: i64_or_zero(&row[12])?,
        shuffle_bytes: i64_or_zero(&row[13])?,
        cache_hit_ratio: opt_f64(&row[14])?,
        execution_status: null_to_empty(&row[15]),
        statement: null_to_empty(&row[16]),
        cost,
    })
}

fn null_to_empty(s: &str) -> String {
    if s == NULL_SENTINEL { String::new() } else { s.to_string() }
}

fn i64_or_zero(s: &str) -> Result<i64, String> {
    if s == NULL_SENTINEL || s.is_empty() {
        return Ok(0);
    }
    s.parse::<i64>().map_err(|_| format!("not an integer: {}", s))
}

fn opt_f64(s: &str) -> Result<Option<f64>, String> {
    if s == NULL_SENTINEL || s.is_empty() {
        return Ok(None);
    }
    s.parse::<f64>()
        .map(Some)
        .map_err(|_| format!("not a number: {}", s))
}
