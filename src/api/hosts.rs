//! Host endpoints

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::{
    db::HostRepository,
    models::Host,
    services::{HostDebug, Integration},
    utils::{validation::validate_hostname, AppError},
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_hosts))
        .route("/{hostname}", get(get_host))
        .route("/{hostname}/debug/{integration}", get(debug_host))
}

#[derive(Serialize)]
pub struct HostSummary {
    pub hostname: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locked_folder: Option<String>,
    pub last_update: String,
}

/// List all hosts
async fn list_hosts(State(state): State<AppState>) -> Result<Json<Vec<HostSummary>>, AppError> {
    let hosts = HostRepository::new(state.db.clone()).get_all().await?;

    Ok(Json(
        hosts
            .into_iter()
            .map(|h| HostSummary {
                hostname: h.hostname,
                locked_folder: h.locked_folder,
                last_update: h.last_update.to_rfc3339(),
            })
            .collect(),
    ))
}

async fn load_host(state: &AppState, hostname: &str) -> Result<Host, AppError> {
    if !validate_hostname(hostname) {
        return Err(AppError::bad_request("Invalid hostname"));
    }
    HostRepository::new(state.db.clone())
        .get(hostname)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Host '{}' not found", hostname)))
}

/// Get a host record
async fn get_host(
    State(state): State<AppState>,
    Path(hostname): Path<String>,
) -> Result<Json<Host>, AppError> {
    Ok(Json(load_host(&state, &hostname).await?))
}

/// Evaluate one integration for a host without side effects
async fn debug_host(
    State(state): State<AppState>,
    Path((hostname, integration)): Path<(String, String)>,
) -> Result<Json<HostDebug>, AppError> {
    let integration: Integration = integration.parse()?;
    let host = load_host(&state, &hostname).await?;

    let debug = state.sync.debug_host(&host, integration).map_err(|e| {
        tracing::warn!("Debug evaluation of '{}' failed: {}", hostname, e);
        e
    })?;

    Ok(Json(debug))
}
