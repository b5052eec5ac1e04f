//! Folder pool repository - database operations for pool seats

use sqlx::{Pool, Sqlite, Transaction};
use tracing::info;

use crate::config::FolderPoolDefinition;
use crate::models::FolderPoolEntry;
use crate::utils::AppError;

pub struct FolderPoolRepository {
    pool: Pool<Sqlite>,
}

impl FolderPoolRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Get all entries in allocation order
    pub async fn get_all(&self) -> Result<Vec<FolderPoolEntry>, AppError> {
        let entries = sqlx::query_as::<_, FolderPoolEntry>(
            r#"
            SELECT folder_path, total_seats, taken_seats, enabled
            FROM folder_pools
            ORDER BY position, folder_path
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Insert the configured entries when the table is empty
    ///
    /// Returns the number of entries inserted.
    pub async fn seed_if_empty(&self, definitions: &[FolderPoolDefinition]) -> Result<usize, AppError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM folder_pools")
            .fetch_one(&self.pool)
            .await?;
        if count.0 > 0 || definitions.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;
        for (position, def) in definitions.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO folder_pools (folder_path, total_seats, taken_seats, enabled, position)
                VALUES (?, ?, 0, ?, ?)
                "#,
            )
            .bind(&def.folder_path)
            .bind(def.total_seats)
            .bind(def.enabled)
            .bind(position as i64)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        info!("Seeded {} folder pool entries", definitions.len());
        Ok(definitions.len())
    }

    /// Add an entry or update its seat limit and state
    pub async fn upsert(&self, entry: &FolderPoolEntry) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO folder_pools (folder_path, total_seats, taken_seats, enabled, position)
            VALUES (?, ?, ?, ?, (SELECT COALESCE(MAX(position), -1) + 1 FROM folder_pools))
            ON CONFLICT(folder_path) DO UPDATE SET
                total_seats = excluded.total_seats,
                enabled = excluded.enabled
            "#,
        )
        .bind(&entry.folder_path)
        .bind(entry.total_seats)
        .bind(entry.taken_seats)
        .bind(entry.enabled)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Write back the seat counters of every entry inside a caller's transaction
    pub async fn save_seats_in_tx(
        tx: &mut Transaction<'_, Sqlite>,
        entries: &[FolderPoolEntry],
    ) -> Result<(), AppError> {
        for entry in entries {
            sqlx::query("UPDATE folder_pools SET taken_seats = ? WHERE folder_path = ?")
                .bind(entry.taken_seats)
                .bind(&entry.folder_path)
                .execute(&mut **tx)
                .await?;
        }

        Ok(())
    }

    /// Delete an entry; returns false when it did not exist
    pub async fn delete(&self, folder_path: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM folder_pools WHERE folder_path = ?")
            .bind(folder_path)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
