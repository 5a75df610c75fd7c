//! System endpoints

use axum::Json;
use axum::extract::State;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub name: &'static str,
    pub version: &'static str,
    /// Whether the warehouse endpoint answered a probe query
    pub warehouse_reachable: bool,
}

#[utoipa::path(
    get,
    path = "/api/health",
    responses((status = 200, description = "Service liveness and warehouse reachability", body = HealthResponse)),
    tag = "System"
)]
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let warehouse_reachable = state.warehouse.ping().await.is_ok();
    Json(HealthResponse {
        status: "ok",
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        warehouse_reachable,
    })
}
