//! Configuration management
//!
//! This module provides YAML-based configuration management with support for:
//! - Environment variable overrides
//! - Multiple configuration file locations
//! - Default values for all settings
//! - Folder pool seed definitions
//! - Rule sets (loaded from separate file)

mod rules;

pub use rules::{CheckmkRules, IdoitRules, NetboxRules, RulesConfig};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

use crate::models::FolderPoolEntry;

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    /// Seed data for the folder pool store
    #[serde(default)]
    pub folder_pools: Vec<FolderPoolDefinition>,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8180
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

fn default_database_url() -> String {
    "sqlite://./data/hostsync.db".to_string()
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_connect_timeout() -> u64 {
    30
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
    /// Log output target (console or file)
    #[serde(default)]
    pub target: LogTarget,
    /// Directory for log files (used when target is "file")
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
    /// Log file name prefix
    #[serde(default = "default_log_prefix")]
    pub log_prefix: String,
    #[serde(default = "default_log_rotation")]
    pub daily_rotation: bool,
    /// Maximum number of log files to keep (0 = unlimited)
    #[serde(default = "default_max_log_files")]
    pub max_log_files: usize,
}

/// Log output target
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogTarget {
    #[default]
    Console,
    File,
    Both,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("/var/log/hostsync")
}

fn default_log_prefix() -> String {
    "hostsync".to_string()
}

fn default_log_rotation() -> bool {
    true
}

fn default_max_log_files() -> usize {
    14
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
            target: LogTarget::default(),
            log_dir: default_log_dir(),
            log_prefix: default_log_prefix(),
            daily_rotation: default_log_rotation(),
            max_log_files: default_max_log_files(),
        }
    }
}

/// How templates treat references to unknown attributes
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TemplateMode {
    /// Unknown names render as empty text
    #[default]
    Nullify,
    /// Unknown names fail the action
    Strict,
}

/// Rule engine configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub template_mode: TemplateMode,
    /// Hosts evaluated in parallel during a sync
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Rules file; searched in standard locations when unset
    #[serde(default)]
    pub rules_path: Option<PathBuf>,
}

fn default_workers() -> usize {
    num_cpus::get()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            template_mode: TemplateMode::default(),
            workers: default_workers(),
            rules_path: None,
        }
    }
}

/// Folder pool entry as configured
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FolderPoolDefinition {
    pub folder_path: String,
    pub total_seats: i64,
    #[serde(default = "default_pool_enabled")]
    pub enabled: bool,
}

fn default_pool_enabled() -> bool {
    true
}

impl From<&FolderPoolDefinition> for FolderPoolEntry {
    fn from(def: &FolderPoolDefinition) -> Self {
        FolderPoolEntry {
            folder_path: def.folder_path.clone(),
            total_seats: def.total_seats,
            taken_seats: 0,
            enabled: def.enabled,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            logging: LoggingConfig::default(),
            engine: EngineConfig::default(),
            folder_pools: vec![],
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values
    /// 2. Configuration file (YAML)
    /// 3. Environment variables (prefixed with HOSTSYNC_)
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let config_path = std::env::var("HOSTSYNC_CONFIG")
            .map(PathBuf::from)
            .ok()
            .or_else(Self::find_config_file);

        let mut config = match config_path {
            Some(ref path) if path.exists() => {
                eprintln!("[CONFIG] Loading configuration from: {:?}", path);
                Self::from_file(path)?
            }
            Some(ref path) => {
                eprintln!("[CONFIG] Config file not found: {:?}, using defaults", path);
                AppConfig::default()
            }
            None => {
                eprintln!("[CONFIG] No config file found, using defaults");
                AppConfig::default()
            }
        };

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Parse a configuration file without env overrides
    pub fn from_file(path: &PathBuf) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        serde_norway::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Find the configuration file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        let paths = [
            PathBuf::from("config.yaml"),
            PathBuf::from("config/config.yaml"),
            PathBuf::from("/etc/hostsync/config.yaml"),
            dirs::config_dir()
                .map(|p| p.join("hostsync/config.yaml"))
                .unwrap_or_default(),
        ];

        paths.into_iter().find(|p| p.exists())
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("HOSTSYNC_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("HOSTSYNC_PORT") {
            if let Ok(p) = port.parse() {
                self.server.port = p;
            }
        }

        if let Ok(url) = std::env::var("DATABASE_URL") {
            self.database.url = url;
        }

        if let Ok(level) = std::env::var("RUST_LOG") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("HOSTSYNC_LOG_FORMAT") {
            self.logging.format = match format.to_lowercase().as_str() {
                "json" => LogFormat::Json,
                "compact" => LogFormat::Compact,
                _ => LogFormat::Pretty,
            };
        }
        if let Ok(target) = std::env::var("HOSTSYNC_LOG_TARGET") {
            self.logging.target = match target.to_lowercase().as_str() {
                "file" => LogTarget::File,
                "both" => LogTarget::Both,
                _ => LogTarget::Console,
            };
        }

        if let Ok(path) = std::env::var("HOSTSYNC_RULES") {
            self.engine.rules_path = Some(PathBuf::from(path));
        }
        if let Ok(mode) = std::env::var("HOSTSYNC_TEMPLATE_MODE") {
            self.engine.template_mode = match mode.to_lowercase().as_str() {
                "strict" => TemplateMode::Strict,
                _ => TemplateMode::Nullify,
            };
        }
        if let Ok(workers) = std::env::var("HOSTSYNC_WORKERS") {
            if let Ok(w) = workers.parse() {
                self.engine.workers = w;
            }
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("Server port cannot be 0");
        }

        if self.database.url.is_empty() {
            anyhow::bail!("Database URL cannot be empty");
        }

        if self.engine.workers == 0 {
            anyhow::bail!("Engine workers must be at least 1");
        }

        let mut seen = HashSet::new();
        for pool in &self.folder_pools {
            if !crate::utils::validation::validate_folder_path(&pool.folder_path) {
                anyhow::bail!("Invalid pool folder path: {:?}", pool.folder_path);
            }
            if pool.total_seats <= 0 {
                anyhow::bail!("Pool folder {} must have at least one seat", pool.folder_path);
            }
            if !seen.insert(pool.folder_path.as_str()) {
                anyhow::bail!("Pool folder {} is defined twice", pool.folder_path);
            }
        }

        Ok(())
    }

    /// Load the rules file named by the engine config or found in standard locations
    pub fn load_rules(&self) -> Result<RulesConfig> {
        match self.engine.rules_path.clone().or_else(RulesConfig::find_config_file) {
            Some(path) => RulesConfig::load(&path),
            None => {
                tracing::warn!("No rules file found, every rule set is empty");
                Ok(RulesConfig::default())
            }
        }
    }
}
