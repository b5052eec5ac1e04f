//! Folder pool endpoints

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::{
    db::{FolderPoolRepository, HostRepository},
    models::FolderPoolEntry,
    utils::{validation::validate_folder_path, AppError},
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_pools).put(upsert_pool))
        .route("/{*path}", get(get_pool).delete(delete_pool))
}

#[derive(Debug, Deserialize)]
pub struct UpsertPoolRequest {
    pub folder_path: String,
    pub total_seats: i64,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

fn folder_path(raw: &str) -> String {
    format!("/{}", raw.trim_start_matches('/'))
}

/// List pool folders with their current seat counters
async fn list_pools(State(state): State<AppState>) -> Json<Vec<FolderPoolEntry>> {
    Json(state.pool.snapshot())
}

async fn get_pool(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Result<Json<FolderPoolEntry>, AppError> {
    let path = folder_path(&path);
    state
        .pool
        .snapshot()
        .into_iter()
        .find(|e| e.matches_name(&path))
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("Pool folder '{}' not found", path)))
}

/// Add a pool folder or change its seats
async fn upsert_pool(
    State(state): State<AppState>,
    Json(payload): Json<UpsertPoolRequest>,
) -> Result<Json<FolderPoolEntry>, AppError> {
    if !validate_folder_path(&payload.folder_path) {
        return Err(AppError::validation("Invalid folder path"));
    }

    let mut entry = FolderPoolEntry::new(payload.folder_path, payload.total_seats);
    entry.enabled = payload.enabled;
    let (stored, previous) = state.pool.upsert(entry)?;

    if let Err(e) = FolderPoolRepository::new(state.db.clone())
        .upsert(&stored)
        .await
    {
        state.pool.undo_upsert(&stored.folder_path, previous);
        return Err(e);
    }

    Ok(Json(stored))
}

/// Delete a pool folder no host is locked to
async fn delete_pool(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Result<Json<FolderPoolEntry>, AppError> {
    let path = folder_path(&path);

    let locked = HostRepository::new(state.db.clone())
        .count_locked_to(&path)
        .await?;
    if locked > 0 {
        return Err(AppError::validation(format!(
            "Pool folder '{}' is still used by {} hosts",
            path, locked
        )));
    }

    let (position, removed) = state.pool.remove(&path)?;
    if let Err(e) = FolderPoolRepository::new(state.db.clone())
        .delete(&removed.folder_path)
        .await
    {
        state.pool.restore(position, removed);
        return Err(e);
    }

    tracing::info!("Deleted pool folder '{}'", removed.folder_path);
    Ok(Json(removed))
}
