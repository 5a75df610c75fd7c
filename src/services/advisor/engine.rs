//! Batch analysis engine
//!
//! Orchestrates one pass over a batch of execution records:
//! validate → normalize → {score, classify} → rank/filter → ROI.
//! Stateless: every invocation processes an independent batch.

use super::classifier::{ClassifierThresholds, DefectClassifier};
use super::metrics::NormalizedMetrics;
use super::ranking::{AnalysisResult, RankingMode, ScoredQuery, rank_and_filter};
use super::scoring::{BadnessScorer, ScoringWeights};
use crate::models::QueryExecutionRecord;
use serde::Deserialize;

/// Engine construction parameters. The weight and threshold tables carry the
/// documented reference values as defaults; deployments override them from
/// configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AdvisorConfig {
    pub weights: ScoringWeights,
    pub thresholds: ClassifierThresholds,
    /// Noise floor: records with execution_duration_ms at or below this are
    /// not analyzable (also applied upstream in the fetch SQL)
    pub min_execution_ms: i64,
    /// Minimum badness score a result must exceed to be surfaced
    pub min_score: f64,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            weights: ScoringWeights::default(),
            thresholds: ClassifierThresholds::default(),
            min_execution_ms: 5_000,
            min_score: 10.0,
        }
    }
}

impl AdvisorConfig {
    pub fn with_floors(min_execution_ms: i64, min_score: f64) -> Self {
        Self { min_execution_ms, min_score, ..Default::default() }
    }
}

/// Outcome of analyzing one batch
#[derive(Debug, Clone)]
pub struct BatchAnalysis {
    /// Ranked results, score descending, at most the requested limit
    pub results: Vec<AnalysisResult>,
    /// Records that were scored and classified
    pub analyzed: usize,
    /// Records rejected at ingestion: malformed, not finished, or under the
    /// noise floor. Never aborts the batch.
    pub skipped: usize,
}

/// Stateless analysis engine. Normalizer, scorer, and classifier are pure
/// functions of each record, so records are independent; the single
/// sequential pass here is the ranker, which needs the full batch.
pub struct AdvisorEngine {
    config: AdvisorConfig,
    scorer: BadnessScorer,
    classifier: DefectClassifier,
}

impl AdvisorEngine {
    pub fn new(config: AdvisorConfig) -> Self {
        let scorer = BadnessScorer::new(config.weights.clone());
        let classifier = DefectClassifier::new(config.thresholds.clone());
        Self { config, scorer, classifier }
    }

    pub fn min_execution_ms(&self) -> i64 {
        self.config.min_execution_ms
    }

    /// Analyze a batch with the configured noise floor.
    pub fn analyze_batch(
        &self,
        records: Vec<QueryExecutionRecord>,
        limit: usize,
        mode: RankingMode,
    ) -> BatchAnalysis {
        self.analyze_batch_with_floor(records, limit, mode, self.config.min_execution_ms)
    }

    /// Analyze a batch with an explicit noise floor (per-request override).
    pub fn analyze_batch_with_floor(
        &self,
        records: Vec<QueryExecutionRecord>,
        limit: usize,
        mode: RankingMode,
        min_execution_ms: i64,
    ) -> BatchAnalysis {
        let mut skipped = 0usize;
        let mut scored = Vec::with_capacity(records.len());

        for record in records {
            if let Err(reason) = record.validate() {
                tracing::debug!("Skipping malformed record: {}", reason);
                skipped += 1;
                continue;
            }
            if !record.is_finished() || record.execution_duration_ms <= min_execution_ms {
                skipped += 1;
                continue;
            }

            let metrics = NormalizedMetrics::from_record(&record);
            let score = self.scorer.score(&record, &metrics);
            let label = self.classifier.classify(&record, &metrics);
            scored.push(ScoredQuery { record, metrics, score, label });
        }

        let analyzed = scored.len();
        let results = rank_and_filter(scored, self.config.min_score, limit, mode);

        tracing::debug!(
            "Batch analysis: analyzed={} surfaced={} skipped={}",
            analyzed,
            results.len(),
            skipped
        );

        BatchAnalysis { results, analyzed, skipped }
    }
}

impl Default for AdvisorEngine {
    fn default() -> Self {
        Self::new(AdvisorConfig::default())
    }
}
