//! Host data model

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A synchronized host as read from the central inventory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Host {
    /// Host name (unique)
    pub hostname: String,

    /// Labels reported by the source system
    #[serde(default)]
    pub labels: BTreeMap<String, Value>,

    /// Inventory data collected for the host
    #[serde(default)]
    pub inventory: BTreeMap<String, Value>,

    /// Per-integration cached snapshots
    #[serde(default)]
    pub cache: BTreeMap<String, Value>,

    /// Pool folder granted to this host, if any
    #[serde(default)]
    pub locked_folder: Option<String>,

    /// Last modification time
    #[serde(default = "Utc::now")]
    pub last_update: DateTime<Utc>,

    #[serde(skip)]
    changed: bool,
}

impl Host {
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            labels: BTreeMap::new(),
            inventory: BTreeMap::new(),
            cache: BTreeMap::new(),
            locked_folder: None,
            last_update: Utc::now(),
            changed: false,
        }
    }

    pub fn with_labels(mut self, labels: BTreeMap<String, Value>) -> Self {
        self.labels = labels;
        self
    }

    pub fn with_inventory(mut self, inventory: BTreeMap<String, Value>) -> Self {
        self.inventory = inventory;
        self
    }

    /// Pool folder this host is locked to
    pub fn get_folder(&self) -> Option<&str> {
        self.locked_folder.as_deref()
    }

    /// Lock the host to a pool folder, or clear the lock with `None`
    pub fn lock_to_folder(&mut self, folder: Option<String>) {
        if self.locked_folder != folder {
            self.locked_folder = folder;
            self.mark_changed();
        }
    }

    pub fn cache_get(&self, key: &str) -> Option<&Value> {
        self.cache.get(key)
    }

    pub fn cache_set(&mut self, key: impl Into<String>, value: Value) {
        self.cache.insert(key.into(), value);
        self.mark_changed();
    }

    /// Replace labels; drops cached snapshots when they differ
    pub fn update_labels(&mut self, labels: BTreeMap<String, Value>) {
        if self.labels != labels {
            self.labels = labels;
            self.invalidate_cache();
        }
    }

    /// Replace inventory data; drops cached snapshots when it differs
    pub fn update_inventory(&mut self, inventory: BTreeMap<String, Value>) {
        if self.inventory != inventory {
            self.inventory = inventory;
            self.invalidate_cache();
        }
    }

    pub fn invalidate_cache(&mut self) {
        self.cache.clear();
        self.mark_changed();
    }

    /// Whether the record was modified since it was loaded
    pub fn needs_save(&self) -> bool {
        self.changed
    }

    /// Reset the modification flag after persisting
    pub fn mark_saved(&mut self) {
        self.changed = false;
    }

    fn mark_changed(&mut self) {
        self.changed = true;
        self.last_update = Utc::now();
    }
}
