//! Host repository - database operations for host records

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{Executor, Pool, Sqlite};
use std::collections::BTreeMap;

use crate::db::FolderPoolRepository;
use crate::models::{FolderPoolEntry, Host};
use crate::utils::AppError;

/// Row returned from hosts table
#[derive(Debug, sqlx::FromRow)]
struct HostRow {
    hostname: String,
    labels: String,
    inventory: String,
    cache: String,
    locked_folder: Option<String>,
    last_update: String,
}

pub struct HostRepository {
    pool: Pool<Sqlite>,
}

impl HostRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Get all hosts ordered by name
    pub async fn get_all(&self) -> Result<Vec<Host>, AppError> {
        let rows = sqlx::query_as::<_, HostRow>(
            r#"
            SELECT hostname, labels, inventory, cache, locked_folder, last_update
            FROM hosts
            ORDER BY hostname
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(row_to_host).collect())
    }

    /// Get a host by name
    pub async fn get(&self, hostname: &str) -> Result<Option<Host>, AppError> {
        let row = sqlx::query_as::<_, HostRow>(
            r#"
            SELECT hostname, labels, inventory, cache, locked_folder, last_update
            FROM hosts
            WHERE hostname = ?
            "#,
        )
        .bind(hostname)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(row_to_host))
    }

    /// Insert or replace a host record
    pub async fn upsert(&self, host: &Host) -> Result<(), AppError> {
        upsert_host(&self.pool, host).await
    }

    /// Persist a host when it carries unsaved changes
    ///
    /// Returns whether anything was written.
    pub async fn save(&self, host: &mut Host) -> Result<bool, AppError> {
        if !host.needs_save() {
            return Ok(false);
        }
        host.last_update = Utc::now();
        self.upsert(host).await?;
        host.mark_saved();
        Ok(true)
    }

    /// Persist changed hosts and the pool seat counters in one transaction
    ///
    /// Host locks and seat counters are only ever committed together. The
    /// hosts keep their unsaved state when the transaction fails.
    pub async fn save_with_seats(
        &self,
        hosts: &mut [Host],
        seats: &[FolderPoolEntry],
    ) -> Result<usize, AppError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let mut saved = 0;
        for host in hosts.iter_mut().filter(|h| h.needs_save()) {
            host.last_update = now;
            upsert_host(&mut *tx, host).await?;
            saved += 1;
        }
        FolderPoolRepository::save_seats_in_tx(&mut tx, seats).await?;
        tx.commit().await?;

        for host in hosts.iter_mut() {
            host.mark_saved();
        }
        Ok(saved)
    }

    /// Number of hosts locked to a folder
    pub async fn count_locked_to(&self, folder_path: &str) -> Result<i64, AppError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM hosts WHERE locked_folder = ?")
            .bind(folder_path)
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }
}

async fn upsert_host<'e, E>(executor: E, host: &Host) -> Result<(), AppError>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO hosts (hostname, labels, inventory, cache, locked_folder, last_update)
        VALUES (?, ?, ?, ?, ?, ?)
        ON CONFLICT(hostname) DO UPDATE SET
            labels = excluded.labels,
            inventory = excluded.inventory,
            cache = excluded.cache,
            locked_folder = excluded.locked_folder,
            last_update = excluded.last_update
        "#,
    )
    .bind(&host.hostname)
    .bind(serde_json::to_string(&host.labels)?)
    .bind(serde_json::to_string(&host.inventory)?)
    .bind(serde_json::to_string(&host.cache)?)
    .bind(&host.locked_folder)
    .bind(host.last_update.to_rfc3339())
    .execute(executor)
    .await?;

    Ok(())
}

fn parse_map(raw: &str) -> BTreeMap<String, Value> {
    serde_json::from_str(raw).unwrap_or_default()
}

fn row_to_host(row: HostRow) -> Host {
    let mut host = Host::new(row.hostname);
    host.labels = parse_map(&row.labels);
    host.inventory = parse_map(&row.inventory);
    host.cache = parse_map(&row.cache);
    host.locked_folder = row.locked_folder;
    host.last_update = DateTime::parse_from_rfc3339(&row.last_update)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now());
    host
}
