//! Analysis endpoints

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::models::QueryExecutionRecord;
use crate::services::advisor::{AnalysisResult, RankingMode};
use crate::services::analysis_service::AnalysisRequest;
use crate::utils::error::{ApiError, ApiResult};

/// Hard ceiling on per-request result limits
const MAX_LIMIT: usize = 500;

#[derive(Deserialize)]
pub struct WorstQueriesParams {
    /// Look-back window in hours
    #[serde(default = "default_hours")]
    pub hours: u32,
    /// Maximum number of results
    pub limit: Option<usize>,
    /// Ranking mode: badness (default) or priority (cost-aware)
    #[serde(default)]
    pub mode: RankingMode,
    /// Override of the configured noise floor, in seconds
    pub min_duration_seconds: Option<i64>,
}

fn default_hours() -> u32 {
    24
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AnalysisResponse {
    /// Ranked results, worst first
    pub results: Vec<AnalysisResult>,
    /// Number of records scored and classified
    pub analyzed: usize,
    /// Records rejected at ingestion (malformed, unfinished, or under the
    /// noise floor)
    pub skipped: usize,
    pub mode: RankingMode,
}

#[utoipa::path(
    get,
    path = "/api/analysis/worst-queries",
    params(
        ("hours" = Option<u32>, Query, description = "Look-back window in hours (default 24)"),
        ("limit" = Option<usize>, Query, description = "Maximum results (default from config)"),
        ("mode" = Option<String>, Query, description = "Ranking mode: badness or priority"),
        ("min_duration_seconds" = Option<i64>, Query, description = "Noise floor override in seconds"),
    ),
    responses((status = 200, description = "Ranked worst-performing queries", body = AnalysisResponse)),
    tag = "Analysis"
)]
pub async fn worst_queries(
    State(state): State<Arc<crate::AppState>>,
    axum::extract::Query(params): axum::extract::Query<WorstQueriesParams>,
) -> ApiResult<Json<AnalysisResponse>> {
    if params.hours == 0 || params.hours > 24 * 30 {
        return Err(ApiError::validation_error("hours must be between 1 and 720"));
    }
    let limit = params.limit.unwrap_or(state.default_limit);
    if limit == 0 || limit > MAX_LIMIT {
        return Err(ApiError::validation_error(format!(
            "limit must be between 1 and {}",
            MAX_LIMIT
        )));
    }
    if let Some(seconds) = params.min_duration_seconds
        && seconds < 0
    {
        return Err(ApiError::validation_error("min_duration_seconds must be non-negative"));
    }

    let request = AnalysisRequest {
        window_hours: params.hours,
        limit,
        mode: params.mode,
        min_execution_ms: params.min_duration_seconds.map(|s| s.saturating_mul(1_000)),
    };

    let batch = state.analysis_service.analyze_window(&request).await?;
    Ok(Json(AnalysisResponse {
        results: batch.results,
        analyzed: batch.analyzed,
        skipped: batch.skipped,
        mode: params.mode,
    }))
}

#[derive(Deserialize, ToSchema)]
pub struct BatchAnalysisRequest {
    /// Records to analyze (no warehouse fetch)
    pub records: Vec<QueryExecutionRecord>,
    pub limit: Option<usize>,
    #[serde(default)]
    pub mode: RankingMode,
    /// Override of the configured noise floor, milliseconds
    pub min_execution_ms: Option<i64>,
}

#[utoipa::path(
    post,
    path = "/api/analysis/batch",
    request_body = BatchAnalysisRequest,
    responses((status = 200, description = "Analysis of a caller-supplied batch", body = AnalysisResponse)),
    tag = "Analysis"
)]
pub async fn analyze_batch(
    State(state): State<Arc<crate::AppState>>,
    Json(request): Json<BatchAnalysisRequest>,
) -> ApiResult<Json<AnalysisResponse>> {
    let limit = request.limit.unwrap_or(state.default_limit);
    if limit == 0 || limit > MAX_LIMIT {
        return Err(ApiError::validation_error(format!(
            "limit must be between 1 and {}",
            MAX_LIMIT
        )));
    }

    let floor = request
        .min_execution_ms
        .unwrap_or_else(|| state.engine.min_execution_ms());
    if floor < 0 {
        return Err(ApiError::validation_error("min_execution_ms must be non-negative"));
    }

    let batch = state
        .engine
        .analyze_batch_with_floor(request.records, limit, request.mode, floor);
    Ok(Json(AnalysisResponse {
        results: batch.results,
        analyzed: batch.analyzed,
        skipped: batch.skipped,
        mode: request.mode,
    }))
}
