//! Badness scoring
//!
//! Sums six independent penalty terms into one composite score per query.
//! Each term isolates one failure mode, so a query with several simultaneous
//! problems accumulates a correspondingly higher score. The total is not
//! capped: a massive spill plus a long duration can score well above 100.

use super::metrics::NormalizedMetrics;
use crate::models::QueryExecutionRecord;
use serde::Deserialize;

/// Penalty weights and trigger thresholds for the badness scorer.
///
/// These are process-wide tunables, not hardcoded literals: the defaults
/// below are the reference behavior, but a deployment can override any of
/// them from configuration without touching the scoring control flow.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    /// Base penalty for any disk spill. Spill is the single worst observed
    /// failure mode, so the base guarantees it dominates the score; the
    /// logarithmic tail keeps a 1 GB spill from scoring 1000x a 1 MB one.
    pub spill_base: f64,
    /// Base penalty for executions above `duration_threshold_ms`
    pub duration_base: f64,
    /// Execution duration above which the logarithmic penalty applies (ms)
    pub duration_threshold_ms: f64,
    /// Divisor for the linear sub-threshold duration ramp
    pub duration_linear_divisor: f64,
    /// Multiplier for the cache-miss penalty
    pub cache_miss_base: f64,
    /// Cache-hit ratio below which the cache-miss penalty applies
    pub cache_hit_threshold: f64,
    /// Flat penalty when bytes-per-row exceeds its threshold
    pub bytes_per_row_penalty: f64,
    pub bytes_per_row_threshold: f64,
    /// Flat penalty when the shuffle ratio exceeds its threshold
    pub shuffle_penalty: f64,
    pub shuffle_ratio_threshold: f64,
    /// Flat penalty when compute-wait exceeds its threshold
    pub queue_penalty: f64,
    pub queue_threshold_ms: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            spill_base: 50.0,
            duration_base: 30.0,
            duration_threshold_ms: 300_000.0,
            duration_linear_divisor: 10_000.0,
            cache_miss_base: 20.0,
            cache_hit_threshold: 0.5,
            bytes_per_row_penalty: 15.0,
            bytes_per_row_threshold: 10_000.0,
            shuffle_penalty: 10.0,
            shuffle_ratio_threshold: 0.3,
            queue_penalty: 10.0,
            queue_threshold_ms: 30_000.0,
        }
    }
}

/// Deterministic badness scorer. Pure function of the record and its
/// normalized metrics; no randomness, no external state.
#[derive(Debug, Clone, Default)]
pub struct BadnessScorer {
    weights: ScoringWeights,
}

impl BadnessScorer {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    /// Compute the composite badness score (always >= 0)
    pub fn score(&self, record: &QueryExecutionRecord, metrics: &NormalizedMetrics) -> f64 {
        self.spill_penalty(record, metrics)
            + self.duration_penalty(record, metrics)
            + self.cache_miss_penalty(metrics)
            + self.data_inefficiency_penalty(metrics)
            + self.shuffle_penalty(metrics)
            + self.queue_penalty(record)
    }

    /// 0 when nothing spilled; else base + log2 of the spilled megabytes
    fn spill_penalty(&self, record: &QueryExecutionRecord, metrics: &NormalizedMetrics) -> f64 {
        if record.spilled_bytes <= 0 {
            return 0.0;
        }
        self.weights.spill_base + metrics.spill_megabytes.max(1.0).log2()
    }

    /// Logarithmic above the threshold, linear ramp below it so a two-minute
    /// query still registers (~12) instead of scoring zero
    fn duration_penalty(&self, record: &QueryExecutionRecord, metrics: &NormalizedMetrics) -> f64 {
        let execution_ms = record.execution_duration_ms.max(0) as f64;
        if execution_ms > self.weights.duration_threshold_ms {
            self.weights.duration_base + metrics.duration_minutes.max(1.0).log2()
        } else {
            execution_ms / self.weights.duration_linear_divisor
        }
    }

    fn cache_miss_penalty(&self, metrics: &NormalizedMetrics) -> f64 {
        if metrics.cache_hit_ratio < self.weights.cache_hit_threshold {
            self.weights.cache_miss_base * (1.0 - metrics.cache_hit_ratio)
        } else {
            0.0
        }
    }

    fn data_inefficiency_penalty(&self, metrics: &NormalizedMetrics) -> f64 {
        if metrics.bytes_per_row > self.weights.bytes_per_row_threshold {
            self.weights.bytes_per_row_penalty
        } else {
            0.0
        }
    }

    fn shuffle_penalty(&self, metrics: &NormalizedMetrics) -> f64 {
        if metrics.shuffle_ratio > self.weights.shuffle_ratio_threshold {
            self.weights.shuffle_penalty
        } else {
            0.0
        }
    }

    fn queue_penalty(&self, record: &QueryExecutionRecord) -> f64 {
        if record.compute_wait_ms.max(0) as f64 > self.weights.queue_threshold_ms {
            self.weights.queue_penalty
        } else {
            0.0
        }
    }
}

/// Cost-aware priority multiplier: `1 + log10(max(1, cost + 0.01))`.
///
/// Lets expensive queries outrank cheap-but-slightly-worse ones without
/// recomputing the base score. Only applied when verified monetary cost is
/// available; otherwise the multiplier is 1.0 (rank by badness alone).
pub fn priority_multiplier(actual_cost_usd: Option<f64>) -> f64 {
    match actual_cost_usd {
        Some(cost) => 1.0 + (cost + 0.01).max(1.0).log10(),
        None => 1.0,
    }
}
