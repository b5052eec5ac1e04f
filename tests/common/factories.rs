//! Test factories for generating test data
//!
//! Factories create unique test data, useful when every test needs its own
//! hosts or pool folders.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::Value;

use hostsync::models::{FolderPoolEntry, Host};

/// Factory for creating test hosts
pub struct HostFactory {
    counter: AtomicU64,
}

impl Default for HostFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl HostFactory {
    pub fn new() -> Self {
        Self {
            counter: AtomicU64::new(0),
        }
    }

    /// Create a unique test host
    pub fn create(&self) -> HostBuilder {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        HostBuilder {
            hostname: format!("host{}.example.com", n),
            labels: BTreeMap::new(),
            inventory: BTreeMap::new(),
            locked_folder: None,
        }
    }
}

/// Builder for test hosts
pub struct HostBuilder {
    hostname: String,
    labels: BTreeMap<String, Value>,
    inventory: BTreeMap<String, Value>,
    locked_folder: Option<String>,
}

impl HostBuilder {
    pub fn with_hostname(mut self, hostname: &str) -> Self {
        self.hostname = hostname.to_string();
        self
    }

    pub fn with_label(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.labels.insert(name.to_string(), value.into());
        self
    }

    pub fn with_inventory(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.inventory.insert(name.to_string(), value.into());
        self
    }

    pub fn locked_to(mut self, folder: &str) -> Self {
        self.locked_folder = Some(folder.to_string());
        self
    }

    pub fn build(self) -> Host {
        let mut host = Host::new(self.hostname)
            .with_labels(self.labels)
            .with_inventory(self.inventory);
        host.locked_folder = self.locked_folder;
        host
    }
}

/// Factory for folder pool entries with unique paths
pub struct PoolFactory {
    counter: AtomicU64,
}

impl Default for PoolFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl PoolFactory {
    pub fn new() -> Self {
        Self {
            counter: AtomicU64::new(0),
        }
    }

    pub fn create(&self, total_seats: i64) -> FolderPoolEntry {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        FolderPoolEntry::new(format!("/pool/p{}", n), total_seats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_factory_creates_unique_hosts() {
        let factory = HostFactory::new();
        let a = factory.create().build();
        let b = factory.create().build();
        assert_ne!(a.hostname, b.hostname);
    }

    #[test]
    fn test_host_builder() {
        let host = HostFactory::new()
            .create()
            .with_hostname("web01")
            .with_label("os", "linux")
            .with_inventory("cpus", 8)
            .locked_to("/pool/a")
            .build();
        assert_eq!(host.hostname, "web01");
        assert_eq!(host.labels["os"], "linux");
        assert_eq!(host.get_folder(), Some("/pool/a"));
    }
}
