use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use querylens::config::Config;
use querylens::services::advisor::{AdvisorConfig, AdvisorEngine};
use querylens::services::{AnalysisService, QueryHistoryService, WarehouseClient};
use querylens::{AppState, handlers, models, services};

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::analysis::worst_queries,
        handlers::analysis::analyze_batch,
        handlers::system::health,
    ),
    components(
        schemas(
            models::QueryExecutionRecord,
            models::CostInfo,
            services::advisor::AnalysisResult,
            services::advisor::DefectLabel,
            services::advisor::ImplementationEffort,
            services::advisor::RankingMode,
            handlers::analysis::AnalysisResponse,
            handlers::analysis::BatchAnalysisRequest,
            handlers::system::HealthResponse,
        )
    ),
    tags(
        (name = "Analysis", description = "Query performance analysis"),
        (name = "System", description = "Service health")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // .env is optional; real deployments use config.toml or APP_* variables
    dotenvy::dotenv().ok();

    // Load configuration first
    let config = Config::load()?;

    // Initialize logging
    let log_filter = tracing_subscriber::EnvFilter::new(&config.logging.level);
    let registry = tracing_subscriber::registry().with(log_filter);

    // Add file logging if configured; the guard must outlive main or the
    // background writer shuts down
    let mut _log_guard = None;
    if let Some(log_file) = &config.logging.file {
        let log_path = std::path::Path::new(log_file);
        if let Some(parent) = log_path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }

        let log_dir = log_path.parent().and_then(|p| p.to_str()).unwrap_or("logs");
        let file_name = log_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("querylens.log");
        // Rolling appender adds its own date suffix
        let file_prefix = file_name.strip_suffix(".log").unwrap_or(file_name);

        let file_appender = tracing_appender::rolling::daily(log_dir, file_prefix);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        _log_guard = Some(guard);
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(non_blocking))
            .with(tracing_subscriber::fmt::layer())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
    tracing::info!("QueryLens starting up");

    // Warehouse collaborator and advisor engine
    let warehouse = Arc::new(WarehouseClient::new(&config.warehouse)?);
    tracing::info!(
        "Warehouse client configured for {}:{}",
        config.warehouse.host,
        config.warehouse.port
    );

    let history = Arc::new(QueryHistoryService::new(
        Arc::clone(&warehouse),
        config.history.clone(),
    ));

    let engine = Arc::new(AdvisorEngine::new(AdvisorConfig {
        weights: config.analyzer.weights.clone(),
        thresholds: config.analyzer.thresholds.clone(),
        min_execution_ms: config.analyzer.min_execution_ms,
        min_score: config.analyzer.min_score,
    }));

    let analysis_service = Arc::new(AnalysisService::new(
        history,
        Arc::clone(&engine),
        config.analyzer.max_fetch_rows,
    ));

    let app_state = Arc::new(AppState {
        warehouse,
        engine,
        analysis_service,
        default_limit: config.analyzer.default_limit,
    });

    let api_routes = Router::new()
        .route("/api/health", get(handlers::system::health))
        .route("/api/analysis/worst-queries", get(handlers::analysis::worst_queries))
        .route("/api/analysis/batch", post(handlers::analysis::analyze_batch))
        .with_state(Arc::clone(&app_state));

    let app = Router::new()
        .merge(SwaggerUi::new("/api-docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(api_routes)
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .layer(tower_http::cors::CorsLayer::permissive());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("QueryLens listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
