//! Folder pool data model

use serde::{Deserialize, Serialize};

/// A folder with a finite number of host seats
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct FolderPoolEntry {
    /// Destination folder (absolute, e.g. `/pool/a`)
    pub folder_path: String,

    /// Seats available in total
    pub total_seats: i64,

    /// Seats currently granted
    #[serde(default)]
    pub taken_seats: i64,

    /// Disabled folders are never handed out
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl FolderPoolEntry {
    pub fn new(folder_path: impl Into<String>, total_seats: i64) -> Self {
        Self {
            folder_path: folder_path.into(),
            total_seats,
            taken_seats: 0,
            enabled: true,
        }
    }

    /// Whether a seat can be granted from this folder
    pub fn is_eligible(&self) -> bool {
        self.enabled && self.taken_seats < self.total_seats
    }

    pub fn free_seats(&self) -> i64 {
        (self.total_seats - self.taken_seats).max(0)
    }

    /// Whether `name` designates this folder, with or without the leading slash
    pub fn matches_name(&self, name: &str) -> bool {
        let name = name.trim();
        self.folder_path == name || self.folder_path.trim_start_matches('/') == name.trim_start_matches('/')
    }
}
