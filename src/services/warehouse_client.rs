//! Warehouse client over the MySQL wire protocol
//!
//! Thin data-source collaborator: one bounded synchronous fetch per batch,
//! no retries (retrying is the caller's concern, not the engine's).

use crate::config::WarehouseConfig;
use crate::utils::error::ApiError;
use mysql_async::prelude::Queryable;
use mysql_async::{Pool, Row, Value};
use std::sync::Arc;

/// String rendering of SQL NULL in raw result rows
pub const NULL_SENTINEL: &str = "NULL";

#[derive(Clone)]
pub struct WarehouseClient {
    pool: Arc<Pool>,
}

impl WarehouseClient {
    pub fn new(config: &WarehouseConfig) -> Result<Self, ApiError> {
        let pool_max = config.pool_max.max(1);
        let constraints = mysql_async::PoolConstraints::new(1, pool_max).ok_or_else(|| {
            ApiError::internal_error("Failed to create pool constraints: invalid min/max values")
        })?;

        let opts = mysql_async::OptsBuilder::default()
            .ip_or_hostname(&config.host)
            .tcp_port(config.port)
            .user(Some(&config.user))
            .pass(Some(&config.password))
            .db_name(None::<String>)
            .prefer_socket(false)
            .tcp_keepalive(Some(30_000_u32))
            .tcp_nodelay(true)
            .pool_opts(
                mysql_async::PoolOpts::default()
                    .with_constraints(constraints)
                    .with_inactive_connection_ttl(std::time::Duration::from_secs(300))
                    .with_ttl_check_interval(std::time::Duration::from_secs(60)),
            );

        Ok(Self { pool: Arc::new(Pool::new(opts)) })
    }

    pub fn from_pool(pool: Pool) -> Self {
        Self { pool: Arc::new(pool) }
    }

    /// Execute a query and return results as (column_names, rows), every
    /// value rendered as a string (NULL becomes the NULL sentinel)
    pub async fn query_raw(&self, sql: &str) -> Result<(Vec<String>, Vec<Vec<String>>), ApiError> {
        let mut conn = self.pool.get_conn().await.map_err(|e| {
            tracing::error!("Failed to get connection from pool: {}", e);
            ApiError::warehouse_connection_failed(format!("Failed to get connection: {}", e))
        })?;

        let rows: Vec<Row> = conn.query(sql).await.map_err(|e| {
            tracing::error!("Warehouse query execution failed: {}", e);
            ApiError::warehouse_connection_failed(format!("SQL execution failed: {}", e))
        })?;

        tracing::debug!("Query returned {} rows", rows.len());
        drop(conn);

        Ok(process_query_result(rows))
    }

    /// Test connectivity with a trivial round trip
    pub async fn ping(&self) -> Result<(), ApiError> {
        self.query_raw("SELECT 1").await.map(|_| ())
    }
}

fn process_query_result(rows: Vec<Row>) -> (Vec<String>, Vec<Vec<String>>) {
    if rows.is_empty() {
        return (Vec::new(), Vec::new());
    }

    let col_count = rows[0].columns_ref().len();
    let mut columns = Vec::with_capacity(col_count);
    for col in rows[0].columns_ref().iter() {
        columns.push(col.name_str().to_string());
    }

    let mut result_rows = Vec::with_capacity(rows.len());
    for row in rows.iter() {
        let mut row_data = Vec::with_capacity(col_count);
        for col_idx in 0..col_count {
            row_data.push(value_to_string(&row[col_idx]));
        }
        result_rows.push(row_data);
    }

    (columns, result_rows)
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::NULL => NULL_SENTINEL.to_string(),
        Value::Bytes(bytes) => String::from_utf8_lossy(bytes).to_string(),
        Value::Int(i) => i.to_string(),
        Value::UInt(u) => u.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Double(d) => d.to_string(),
        Value::Date(year, month, day, hour, minute, second, _micros) => {
            format!(
                "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
                year, month, day, hour, minute, second
            )
        },
        Value::Time(negative, days, hours, minutes, seconds, _micros) => {
            let sign = if *negative { "-" } else { "" };
            format!("{}{:02}:{:02}:{:02}", sign, u32::from(*days) * 24 + u32::from(*hours), minutes, seconds)
        },
    }
}
