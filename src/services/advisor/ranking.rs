//! Ranking and filtering
//!
//! Discards sub-threshold queries, orders the rest by score descending with a
//! stable sort (ties keep input order), assigns dense 1-based ranks, and
//! truncates to the requested limit. Filtering happens before sorting so the
//! output carries only meaningful impact.

use super::classifier::DefectLabel;
use super::metrics::{NormalizedMetrics, bytes_to_gb};
use super::roi::{ImplementationEffort, RoiEstimator};
use super::scoring::priority_multiplier;
use crate::models::QueryExecutionRecord;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Display preview length for SQL statements
const STATEMENT_PREVIEW_CHARS: usize = 200;

/// Ranking strategy for a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RankingMode {
    /// Rank by the composite badness score alone
    #[default]
    Badness,
    /// Multiply badness by the log-scaled cost factor, letting expensive
    /// queries outrank cheap-but-slightly-worse ones. Records without
    /// verified cost keep a 1.0 multiplier.
    Priority,
}

/// An analyzed query awaiting ranking
#[derive(Debug, Clone)]
pub struct ScoredQuery {
    pub record: QueryExecutionRecord,
    pub metrics: NormalizedMetrics,
    pub score: f64,
    pub label: DefectLabel,
}

/// One ranked analysis result. Produced fresh on every engine invocation;
/// never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AnalysisResult {
    /// 1-based dense rank after sorting by score descending
    pub rank: u32,
    /// Composite badness score (non-negative, unbounded)
    pub badness_score: f64,
    /// Cost-weighted priority score; equal to the badness score when no
    /// verified cost is available or badness mode was requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority_score: Option<f64>,
    pub primary_issue: DefectLabel,
    /// Estimated savings percentage, 0..=100
    pub estimated_savings_percent: u8,
    pub implementation_effort: ImplementationEffort,

    // Pass-through display fields
    pub query_id: String,
    pub duration_seconds: f64,
    pub spill_gb: f64,
    pub cache_hit_percent: f64,
    pub data_read_gb: f64,
    pub statement_preview: String,
    pub user_name: String,
    pub warehouse_id: String,
    pub end_time: String,
}

/// Filter, sort, rank, and truncate a batch of scored queries.
///
/// - discards entries with score <= min_score
/// - stable sort by the ranking key descending (ties keep input order)
/// - dense 1-based ranks
/// - truncates to `limit`
pub fn rank_and_filter(
    entries: Vec<ScoredQuery>,
    min_score: f64,
    limit: usize,
    mode: RankingMode,
) -> Vec<AnalysisResult> {
    let estimator = RoiEstimator;

    // Filter first, then sort: sub-threshold queries are not worth surfacing
    let mut surfaced: Vec<(ScoredQuery, f64)> = entries
        .into_iter()
        .filter(|entry| entry.score > min_score)
        .map(|entry| {
            let ranking_key = match mode {
                RankingMode::Badness => entry.score,
                RankingMode::Priority => {
                    entry.score * priority_multiplier(entry.record.actual_cost_usd())
                },
            };
            (entry, ranking_key)
        })
        .collect();

    // sort_by is stable, so equal keys keep their input order
    surfaced.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    surfaced.truncate(limit);

    surfaced
        .into_iter()
        .enumerate()
        .map(|(idx, (entry, ranking_key))| {
            let roi = estimator.estimate(entry.label, &entry.record);
            AnalysisResult {
                rank: (idx + 1) as u32,
                badness_score: entry.score,
                priority_score: match mode {
                    RankingMode::Badness => None,
                    RankingMode::Priority => Some(ranking_key),
                },
                primary_issue: entry.label,
                estimated_savings_percent: roi.savings_percent,
                implementation_effort: roi.effort,
                query_id: entry.record.query_id.clone(),
                duration_seconds: entry.metrics.duration_seconds,
                spill_gb: entry.metrics.spill_gigabytes(),
                cache_hit_percent: entry.metrics.cache_hit_ratio * 100.0,
                data_read_gb: bytes_to_gb(entry.record.read_bytes),
                statement_preview: entry.record.statement_preview(STATEMENT_PREVIEW_CHARS),
                user_name: entry.record.user_name.clone(),
                warehouse_id: entry.record.warehouse_id.clone(),
                end_time: entry.record.end_time.clone(),
            }
        })
        .collect()
}
