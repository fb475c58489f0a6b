use super::models::{Dataset, StorageStats};
use super::{Database, DbError, Result, DATASET_KEY};
use rusqlite::{params, OptionalExtension};

impl Database {
    /// Insert or replace a value.
    pub fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO storage (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = datetime('now')",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn get_item(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM storage WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    /// Remove a key. Returns whether it existed.
    pub fn remove_item(&self, key: &str) -> Result<bool> {
        let n = self
            .conn
            .execute("DELETE FROM storage WHERE key = ?1", params![key])?;
        Ok(n > 0)
    }

    /// Replace the stored dataset in a single transaction.
    pub fn store_dataset(&self, ds: &Dataset) -> Result<()> {
        let json = serde_json::to_string(ds).map_err(|source| DbError::Json {
            key: DATASET_KEY.to_string(),
            source,
        })?;

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO storage (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = datetime('now')",
            params![DATASET_KEY, json],
        )?;
        tx.commit()?;

        log::info!("Stored {} songs under '{}' ({} bytes)", ds.len(), DATASET_KEY, json.len());
        Ok(())
    }

    /// The dataset from the last successful upload, if any.
    pub fn load_dataset(&self) -> Result<Option<Dataset>> {
        let Some(json) = self.get_item(DATASET_KEY)? else {
            return Ok(None);
        };
        let ds: Dataset = serde_json::from_str(&json).map_err(|source| DbError::Json {
            key: DATASET_KEY.to_string(),
            source,
        })?;
        log::debug!("Loaded {} songs from '{}'", ds.len(), DATASET_KEY);
        Ok(Some(ds))
    }

    pub fn clear_dataset(&self) -> Result<bool> {
        self.remove_item(DATASET_KEY)
    }

    pub fn storage_stats(&self) -> Result<StorageStats> {
        let keys: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM storage", [], |row| row.get(0))?;

        let dataset: Option<(i64, String)> = self
            .conn
            .query_row(
                "SELECT LENGTH(value), updated_at FROM storage WHERE key = ?1",
                params![DATASET_KEY],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        Ok(StorageStats {
            keys,
            dataset_bytes: dataset.as_ref().map(|(n, _)| *n).unwrap_or(0),
            dataset_updated_at: dataset.map(|(_, t)| t),
        })
    }
}
