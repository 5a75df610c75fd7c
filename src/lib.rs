//! QueryLens Library
//!
//! Analyzes query-execution telemetry from a data-warehouse platform to
//! surface the worst-performing queries, classify their dominant performance
//! defect, and estimate optimization savings.

use std::sync::Arc;

pub mod config;
pub mod handlers;
pub mod models;
pub mod services;
pub mod utils;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use config::Config;
pub use services::advisor::{
    AdvisorConfig, AdvisorEngine, AnalysisResult, DefectLabel, ImplementationEffort, RankingMode,
};
pub use services::{AnalysisService, QueryHistoryService, WarehouseClient};
pub use utils::{ApiError, ApiResult};

/// Application shared state
///
/// Design Philosophy: Keep it simple - Rust's type system IS our DI container.
/// All services are wrapped in Arc for cheap cloning and thread safety.
#[derive(Clone)]
pub struct AppState {
    pub warehouse: Arc<WarehouseClient>,
    pub engine: Arc<AdvisorEngine>,
    pub analysis_service: Arc<AnalysisService>,
    /// Default result limit for requests that don't supply one
    pub default_limit: usize,
}
