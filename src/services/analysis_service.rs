//! Analysis service
//!
//! Glue between the query-history collaborator and the advisor engine:
//! fetch one bounded batch, analyze it, return ranked results.

use crate::services::advisor::{AdvisorEngine, BatchAnalysis, RankingMode};
use crate::services::query_history_service::{FetchOptions, QueryHistoryService};
use crate::utils::error::ApiResult;
use std::sync::Arc;

/// Parameters for one analysis request
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub window_hours: u32,
    pub limit: usize,
    pub mode: RankingMode,
    /// Per-request override of the configured noise floor, milliseconds
    pub min_execution_ms: Option<i64>,
}

pub struct AnalysisService {
    history: Arc<QueryHistoryService>,
    engine: Arc<AdvisorEngine>,
    max_fetch_rows: usize,
}

impl AnalysisService {
    pub fn new(
        history: Arc<QueryHistoryService>,
        engine: Arc<AdvisorEngine>,
        max_fetch_rows: usize,
    ) -> Self {
        Self { history, engine, max_fetch_rows }
    }

    /// Fetch the window from the warehouse and run the advisor over it.
    pub async fn analyze_window(&self, request: &AnalysisRequest) -> ApiResult<BatchAnalysis> {
        let floor = request
            .min_execution_ms
            .unwrap_or_else(|| self.engine.min_execution_ms());

        let fetched = self
            .history
            .fetch_finished_queries(&FetchOptions {
                window_hours: request.window_hours,
                min_execution_ms: floor,
                max_rows: self.max_fetch_rows,
                with_cost: request.mode == RankingMode::Priority,
            })
            .await?;

        let parse_skipped = fetched.skipped;
        let mut batch = self.engine.analyze_batch_with_floor(
            fetched.records,
            request.limit,
            request.mode,
            floor,
        );
        batch.skipped += parse_skipped;

        tracing::info!(
            "Window analysis complete: {} surfaced, {} analyzed, {} skipped",
            batch.results.len(),
            batch.analyzed,
            batch.skipped
        );
        Ok(batch)
    }
}
