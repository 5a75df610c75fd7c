//! Query performance advisor engine
//!
//! Turns raw per-query execution telemetry into ranked optimization advice:
//!
//! ```text
//! QueryExecutionRecord
//!   -> NormalizedMetrics         (metrics.rs, zero-guarded derived ratios)
//!   -> BadnessScorer             (scoring.rs, six summed penalty terms)
//!   -> DefectClassifier          (classifier.rs, ordered first-match labels)
//!   -> rank_and_filter           (ranking.rs, floor + stable sort + limit)
//!   -> RoiEstimator              (roi.rs, static savings/effort table)
//! ```
//!
//! Every stage is a pure function of its input; the engine holds no state
//! across batches.

pub mod classifier;
pub mod engine;
pub mod metrics;
pub mod ranking;
pub mod roi;
pub mod scoring;

pub use classifier::{ClassifierThresholds, DefectClassifier, DefectLabel};
pub use engine::{AdvisorConfig, AdvisorEngine, BatchAnalysis};
pub use metrics::NormalizedMetrics;
pub use ranking::{AnalysisResult, RankingMode, ScoredQuery, rank_and_filter};
pub use roi::{ImplementationEffort, RoiEstimate, RoiEstimator};
pub use scoring::{BadnessScorer, ScoringWeights, priority_multiplier};
