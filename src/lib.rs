//! hostsync library
//!
//! Rule matching and outcome composition for syncing host metadata to
//! Checkmk, Netbox and i-doit.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
pub mod utils;

pub use config::{AppConfig, RulesConfig};
pub use db::DbPool;

use db::FolderPoolRepository;
use services::{FolderPool, RuleEngine, RuleMatcher, SyncService, TemplateResolver};
use utils::AppResult;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,
    /// Database connection pool
    pub db: DbPool,
    /// Seats shared by every evaluation
    pub pool: Arc<FolderPool>,
    /// Rule engine front end
    pub sync: Arc<SyncService>,
}

impl AppState {
    /// Seed and load the folder pool, then wire up the rule engine
    pub async fn init(config: AppConfig, db: DbPool, rules: RulesConfig) -> AppResult<Self> {
        let repo = FolderPoolRepository::new(db.clone());
        repo.seed_if_empty(&config.folder_pools).await?;
        let pool = Arc::new(FolderPool::from_entries(repo.get_all().await?));

        let engine = RuleEngine::new(
            RuleMatcher::default(),
            TemplateResolver::new(config.engine.template_mode),
        );
        let sync = Arc::new(SyncService::new(
            Arc::new(rules),
            engine,
            Arc::clone(&pool),
            config.engine.workers,
        ));

        Ok(Self {
            config,
            db,
            pool,
            sync,
        })
    }
}
