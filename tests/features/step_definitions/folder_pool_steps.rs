//! Folder pool step definitions

use std::sync::Arc;

use cucumber::{given, then};

use crate::features::support::TestWorld;
use hostsync::models::FolderPoolEntry;
use hostsync::services::FolderPool;
use hostsync::utils::AppError;

#[given(expr = "a folder pool {string} with {int} seat(s)")]
async fn folder_pool(world: &mut TestWorld, folder: String, seats: i64) {
    let mut entries = world.pool.snapshot();
    entries.push(FolderPoolEntry::new(folder, seats));
    world.pool = Arc::new(FolderPool::from_entries(entries));
}

#[then(expr = "the pool folder {string} has {int} taken seat(s)")]
async fn taken_seats(world: &mut TestWorld, folder: String, taken: i64) {
    let entry = world
        .pool
        .snapshot()
        .into_iter()
        .find(|e| e.folder_path == folder)
        .unwrap_or_else(|| panic!("Pool folder {} not found", folder));
    assert_eq!(entry.taken_seats, taken);
}

#[then(expr = "host {string} is locked to {string}")]
async fn host_locked(world: &mut TestWorld, hostname: String, folder: String) {
    assert_eq!(world.hosts[&hostname].get_folder(), Some(folder.as_str()));
}

#[then(expr = "host {string} is not locked to a pool folder")]
async fn host_not_locked(world: &mut TestWorld, hostname: String) {
    assert_eq!(world.hosts[&hostname].get_folder(), None);
}

#[then("the evaluation failed because the pool is exhausted")]
async fn pool_exhausted(world: &mut TestWorld) {
    assert!(matches!(
        world.last_error,
        Some(AppError::ResourceExhausted(_))
    ));
}
