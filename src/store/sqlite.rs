use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::Connection;
use tracing::{debug, info};

use crate::error::StorageError;
use crate::store::kv::KeyValueStore;

/// SQLite-backed preference store
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new(db_path: &Path) -> Result<Self, StorageError> {
        info!("Opening preference database at {:?}", db_path);

        let conn = Connection::open(db_path)?;

        // WAL lets a second process read while a prompt is being recorded
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;

        let store = Self {
            conn: Mutex::new(conn),
        };

        store.create_schema()?;
        debug!("Preference database ready");

        Ok(store)
    }

    /// Acquire database connection lock with proper error handling
    fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>, StorageError> {
        self.conn.lock().map_err(|_| StorageError::LockPoisoned)
    }

    fn current_timestamp_ms() -> i64 {
        chrono::Utc::now().timestamp_millis()
    }

    fn create_schema(&self) -> Result<(), StorageError> {
        let conn = self.lock_conn()?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS preferences (
                key TEXT PRIMARY KEY NOT NULL,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            )
            "#,
            [],
        )?;

        Ok(())
    }

    fn upsert(conn: &Connection, key: &str, value: &str, now: i64) -> rusqlite::Result<usize> {
        conn.execute(
            r#"
            INSERT INTO preferences (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
            (key, value, now),
        )
    }
}

#[async_trait::async_trait]
impl KeyValueStore for SqliteStore {
    async fn get_string(&self, key: &str) -> Result<Option<String>, StorageError> {
        let conn = self.lock_conn()?;
        let result = conn.query_row(
            "SELECT value FROM preferences WHERE key = ?1",
            [key],
            |row| row.get(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set_string(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let conn = self.lock_conn()?;
        Self::upsert(&conn, key, value, Self::current_timestamp_ms())?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let conn = self.lock_conn()?;
        conn.execute("DELETE FROM preferences WHERE key = ?1", [key])?;
        Ok(())
    }

    async fn set_many(&self, entries: Vec<(String, String)>) -> Result<(), StorageError> {
        let now = Self::current_timestamp_ms();

        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;
        for (key, value) in &entries {
            Self::upsert(&tx, key, value, now)?;
        }
        tx.commit()?;

        debug!("Saved {} preferences", entries.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store() -> (TempDir, SqliteStore) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let store = SqliteStore::new(&db_path).unwrap();
        (temp_dir, store)
    }

    #[tokio::test]
    async fn get_string_returns_none_for_missing_key() {
        let (_temp_dir, store) = create_test_store();

        assert_eq!(store.get_string("userIgnoredVersion").await.unwrap(), None);
    }

    #[tokio::test]
    async fn set_string_overwrites_existing_value() {
        let (_temp_dir, store) = create_test_store();

        store.set_string("userIgnoredVersion", "1.0.0").await.unwrap();
        store.set_string("userIgnoredVersion", "1.1.0").await.unwrap();

        assert_eq!(
            store.get_string("userIgnoredVersion").await.unwrap(),
            Some("1.1.0".to_string())
        );
    }

    #[tokio::test]
    async fn set_many_writes_all_entries() {
        let (_temp_dir, store) = create_test_store();

        store
            .set_many(vec![
                ("lastTimeAlerted".to_string(), "2024-01-01T00:00:00+00:00".to_string()),
                ("lastVersionAlerted".to_string(), "2.0.0".to_string()),
            ])
            .await
            .unwrap();

        assert_eq!(
            store.get_string("lastTimeAlerted").await.unwrap(),
            Some("2024-01-01T00:00:00+00:00".to_string())
        );
        assert_eq!(
            store.get_string("lastVersionAlerted").await.unwrap(),
            Some("2.0.0".to_string())
        );
    }

    #[tokio::test]
    async fn remove_deletes_only_the_given_key() {
        let (_temp_dir, store) = create_test_store();
        store.set_string("a", "1").await.unwrap();
        store.set_string("b", "2").await.unwrap();

        store.remove("a").await.unwrap();

        assert_eq!(store.get_string("a").await.unwrap(), None);
        assert_eq!(store.get_string("b").await.unwrap(), Some("2".to_string()));
    }

    #[tokio::test]
    async fn values_survive_reopening_the_database() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");

        {
            let store = SqliteStore::new(&db_path).unwrap();
            store.set_string("lastVersionAlerted", "3.0.0").await.unwrap();
        }

        let reopened = SqliteStore::new(&db_path).unwrap();
        assert_eq!(
            reopened.get_string("lastVersionAlerted").await.unwrap(),
            Some("3.0.0".to_string())
        );
    }
}
