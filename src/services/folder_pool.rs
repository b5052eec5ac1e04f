//! Folder pool seat allocation
//!
//! The pool is the only state shared between concurrently evaluated hosts.
//! Every read-modify-write of the seat counters happens under one lock.

use std::sync::{Mutex, MutexGuard};

use tracing::{debug, info, warn};

use crate::models::{FolderPoolEntry, Host};
use crate::utils::{AppError, AppResult};

/// Hands out exclusive folder seats to hosts
#[derive(Debug, Default)]
pub struct FolderPool {
    entries: Mutex<Vec<FolderPoolEntry>>,
}

impl FolderPool {
    /// Build a pool; entry order is the allocation order
    pub fn from_entries(entries: Vec<FolderPoolEntry>) -> Self {
        Self {
            entries: Mutex::new(entries),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<FolderPoolEntry>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Take one seat and return the folder path
    ///
    /// With a filter only the named folders are candidates. The first eligible
    /// candidate in pool order wins.
    pub fn acquire(&self, filter: Option<&[String]>) -> AppResult<String> {
        let filter = filter.filter(|names| !names.is_empty());
        let mut entries = self.lock();

        let candidate = entries.iter_mut().find(|entry| {
            entry.is_eligible()
                && filter.map_or(true, |names| names.iter().any(|n| entry.matches_name(n)))
        });

        match candidate {
            Some(entry) => {
                entry.taken_seats += 1;
                debug!(
                    "Granted seat in pool folder '{}' ({}/{})",
                    entry.folder_path, entry.taken_seats, entry.total_seats
                );
                Ok(entry.folder_path.clone())
            }
            None => Err(AppError::exhausted(match filter {
                Some(names) => format!("No pool folder left among [{}]", names.join(", ")),
                None => "No pool folder left".to_string(),
            })),
        }
    }

    /// Give a seat back; returns false for folders unknown to the pool
    pub fn release(&self, folder_path: &str) -> bool {
        let mut entries = self.lock();
        match entries.iter_mut().find(|e| e.matches_name(folder_path)) {
            Some(entry) => {
                if entry.taken_seats > 0 {
                    entry.taken_seats -= 1;
                }
                info!(
                    "Released seat in pool folder '{}' ({}/{})",
                    entry.folder_path, entry.taken_seats, entry.total_seats
                );
                true
            }
            None => {
                warn!("Cannot release seat, pool folder '{}' unknown", folder_path);
                false
            }
        }
    }

    /// Unlock the host and give its seat back, if it holds one
    ///
    /// Returns the folder the host was locked to.
    pub fn reclaim(&self, host: &mut Host) -> Option<String> {
        let folder = host.get_folder()?.to_string();
        info!(
            "Host '{}' no longer matches a pool rule, releasing '{}'",
            host.hostname, folder
        );
        host.lock_to_folder(None);
        self.release(&folder);
        Some(folder)
    }

    /// Add a folder or update its seat limit and state
    ///
    /// Returns the stored entry and, for an existing folder, its state
    /// before the change so the caller can [`undo_upsert`](Self::undo_upsert).
    pub fn upsert(
        &self,
        entry: FolderPoolEntry,
    ) -> AppResult<(FolderPoolEntry, Option<FolderPoolEntry>)> {
        if entry.total_seats < 0 {
            return Err(AppError::validation("total_seats must not be negative"));
        }
        let mut entries = self.lock();
        match entries
            .iter_mut()
            .find(|e| e.matches_name(&entry.folder_path))
        {
            Some(existing) => {
                if entry.total_seats < existing.taken_seats {
                    return Err(AppError::validation(format!(
                        "Pool folder '{}' has {} seats taken, cannot shrink to {}",
                        existing.folder_path, existing.taken_seats, entry.total_seats
                    )));
                }
                let previous = existing.clone();
                existing.total_seats = entry.total_seats;
                existing.enabled = entry.enabled;
                Ok((existing.clone(), Some(previous)))
            }
            None => {
                entries.push(entry.clone());
                Ok((entry, None))
            }
        }
    }

    /// Revert an [`upsert`](Self::upsert) whose persistence failed
    pub fn undo_upsert(&self, folder_path: &str, previous: Option<FolderPoolEntry>) {
        let mut entries = self.lock();
        let Some(idx) = entries.iter().position(|e| e.matches_name(folder_path)) else {
            return;
        };
        match previous {
            Some(previous) => {
                let entry = &mut entries[idx];
                entry.total_seats = previous.total_seats.max(entry.taken_seats);
                entry.enabled = previous.enabled;
            }
            None if entries[idx].taken_seats == 0 => {
                entries.remove(idx);
            }
            None => warn!(
                "Pool folder '{}' already has seats taken, keeping it",
                folder_path
            ),
        }
    }

    /// Remove a folder that no host holds a seat in
    ///
    /// Returns the removed entry with its position in the pool.
    pub fn remove(&self, folder_path: &str) -> AppResult<(usize, FolderPoolEntry)> {
        let mut entries = self.lock();
        let idx = entries
            .iter()
            .position(|e| e.matches_name(folder_path))
            .ok_or_else(|| AppError::not_found(format!("Pool folder '{}' not found", folder_path)))?;

        if entries[idx].taken_seats > 0 {
            return Err(AppError::validation(format!(
                "Pool folder '{}' still has {} seats in use",
                entries[idx].folder_path, entries[idx].taken_seats
            )));
        }
        Ok((idx, entries.remove(idx)))
    }

    /// Put back an entry taken out by [`remove`](Self::remove)
    pub fn restore(&self, position: usize, entry: FolderPoolEntry) {
        let mut entries = self.lock();
        if entries.iter().any(|e| e.matches_name(&entry.folder_path)) {
            return;
        }
        let position = position.min(entries.len());
        entries.insert(position, entry);
    }

    pub fn snapshot(&self) -> Vec<FolderPoolEntry> {
        self.lock().clone()
    }

    /// Independent copy; seats taken from it never touch this pool
    pub fn dry_run(&self) -> FolderPool {
        FolderPool::from_entries(self.snapshot())
    }
}
