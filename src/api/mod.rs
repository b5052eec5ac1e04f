//! API routes and handlers
//!
//! This module defines all API endpoints and their routing.

use axum::{routing::get, Router};

use crate::AppState;

mod folder_pools;
mod health;
mod hosts;

pub use health::*;

/// All routes, mounted under `/api/v1`
pub fn routes() -> Router<AppState> {
    Router::new()
        // Health check endpoints
        .route("/health", get(health::health_check))
        .route("/health/detailed", get(health::health_check_detailed))
        // Resource endpoints
        .nest("/hosts", hosts::routes())
        .nest("/folder-pools", folder_pools::routes())
}

/// Router with the API mounted and state attached
pub fn create_router(state: AppState) -> Router {
    Router::new().nest("/api/v1", routes()).with_state(state)
}
