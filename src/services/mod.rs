pub mod advisor;
pub mod analysis_service;
pub mod query_history_service;
pub mod warehouse_client;

pub use advisor::{AdvisorConfig, AdvisorEngine, AnalysisResult, DefectLabel, RankingMode};
pub use analysis_service::{AnalysisRequest, AnalysisService};
pub use query_history_service::QueryHistoryService;
pub use warehouse_client::WarehouseClient;
