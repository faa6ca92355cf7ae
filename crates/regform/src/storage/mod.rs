//! Storage layer for regform.
//!
//! This module provides a `SQLite`-backed [`RecordStore`]. Records are kept
//! as JSON documents grouped into collections, so the table behaves like a
//! small document database with generated ids and server-side timestamps.

pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use crate::backend::RecordStore;
use crate::error::{Error, Result};
use crate::record::{RecordId, Stamp, StoredRecord, SubmissionRecord, Timestamps};

/// Raw row as read from the records table.
type RecordRow = (String, String, Option<String>, Option<String>);

/// `SQLite` document store for registrant records.
///
/// The inherent methods block on the database. The [`RecordStore`] impl
/// runs them on tokio's blocking pool. Clones share one connection.
#[derive(Debug, Clone)]
pub struct SqliteRecordStore {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Arc<Mutex<Connection>>,
}

impl SqliteRecordStore {
    /// Open or create a store at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        migrations::initialize_schema(&conn)?;

        info!("Database opened successfully at {}", path.display());
        Ok(Self {
            path,
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Create an in-memory store, mainly for tests.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::internal("database connection lock poisoned"))
    }

    /// Insert a new record and return its generated id.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be encoded or written.
    pub fn insert(&self, collection: &str, record: &SubmissionRecord) -> Result<RecordId> {
        let id = RecordId::generate();
        let document = serde_json::to_string(record)?;
        let now = Utc::now();

        self.conn()?.execute(
            r"
            INSERT INTO records (collection, id, document, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ",
            params![
                collection,
                id.as_str(),
                document,
                resolve_stamp(record.timestamps.created_at, now),
                resolve_stamp(record.timestamps.updated_at, now),
            ],
        )?;

        debug!(collection, id = %id, "Inserted record");
        Ok(id)
    }

    /// Replace the document of an existing record.
    ///
    /// Timestamps left as `None` keep their stored value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RecordNotFound`] if the record does not exist.
    pub fn replace(&self, collection: &str, id: &RecordId, record: &SubmissionRecord) -> Result<()> {
        let document = serde_json::to_string(record)?;
        let now = Utc::now();

        let affected = self.conn()?.execute(
            r"
            UPDATE records
            SET document = ?3,
                created_at = COALESCE(?4, created_at),
                updated_at = COALESCE(?5, updated_at)
            WHERE collection = ?1 AND id = ?2
            ",
            params![
                collection,
                id.as_str(),
                document,
                resolve_stamp(record.timestamps.created_at, now),
                resolve_stamp(record.timestamps.updated_at, now),
            ],
        )?;

        if affected == 0 {
            return Err(Error::record_not_found(collection, id.as_str()));
        }
        debug!(collection, id = %id, "Updated record");
        Ok(())
    }

    /// Fetch one record, or `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the document is corrupt.
    pub fn find(&self, collection: &str, id: &RecordId) -> Result<Option<StoredRecord>> {
        let row: Option<RecordRow> = self
            .conn()?
            .query_row(
                r"
                SELECT id, document, created_at, updated_at
                FROM records WHERE collection = ?1 AND id = ?2
                ",
                params![collection, id.as_str()],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .optional()?;

        row.map(decode_row).transpose()
    }

    /// Fetch every record in a collection, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a document is corrupt.
    pub fn all(&self, collection: &str) -> Result<Vec<StoredRecord>> {
        let rows: Vec<RecordRow> = {
            let conn = self.conn()?;
            let mut stmt = conn.prepare(
                r"
                SELECT id, document, created_at, updated_at
                FROM records WHERE collection = ?1
                ORDER BY created_at DESC
                ",
            )?;
            let rows = stmt
                .query_map([collection], |row| {
                    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            rows
        };

        rows.into_iter().map(decode_row).collect()
    }

    /// Delete a record by id.
    ///
    /// Returns `true` if a record was deleted, `false` if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn remove(&self, collection: &str, id: &RecordId) -> Result<bool> {
        let affected = self.conn()?.execute(
            "DELETE FROM records WHERE collection = ?1 AND id = ?2",
            params![collection, id.as_str()],
        )?;
        Ok(affected > 0)
    }

    /// Count records in a collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn count(&self, collection: &str) -> Result<i64> {
        let count: i64 = self.conn()?.query_row(
            "SELECT COUNT(*) FROM records WHERE collection = ?1",
            [collection],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Run `op` against a clone of this store on the blocking pool.
    async fn blocking<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&SqliteRecordStore) -> Result<T> + Send + 'static,
    {
        let store = self.clone();
        tokio::task::spawn_blocking(move || op(&store))
            .await
            .map_err(|e| Error::internal(format!("database task failed: {e}")))?
    }
}

#[async_trait::async_trait]
impl RecordStore for SqliteRecordStore {
    async fn create(&self, collection: &str, record: &SubmissionRecord) -> Result<RecordId> {
        let collection = collection.to_string();
        let record = record.clone();
        self.blocking(move |store| store.insert(&collection, &record))
            .await
    }

    async fn update(
        &self,
        collection: &str,
        id: &RecordId,
        record: &SubmissionRecord,
    ) -> Result<()> {
        let collection = collection.to_string();
        let id = id.clone();
        let record = record.clone();
        self.blocking(move |store| store.replace(&collection, &id, &record))
            .await
    }

    async fn get(&self, collection: &str, id: &RecordId) -> Result<StoredRecord> {
        let collection = collection.to_string();
        let id = id.clone();
        self.blocking(move |store| {
            store
                .find(&collection, &id)?
                .ok_or_else(|| Error::record_not_found(&collection, id.as_str()))
        })
        .await
    }

    async fn list(&self, collection: &str) -> Result<Vec<StoredRecord>> {
        let collection = collection.to_string();
        self.blocking(move |store| store.all(&collection)).await
    }

    async fn delete(&self, collection: &str, id: &RecordId) -> Result<()> {
        let collection = collection.to_string();
        let id = id.clone();
        self.blocking(move |store| {
            if !store.remove(&collection, &id)? {
                debug!(collection = %collection, id = %id, "Delete of missing record ignored");
            }
            Ok(())
        })
        .await
    }
}

fn format_instant(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn resolve_stamp(stamp: Option<Stamp>, now: DateTime<Utc>) -> Option<String> {
    stamp.map(|s| format_instant(s.resolve(now)))
}

fn parse_instant(value: Option<String>) -> Option<Stamp> {
    value
        .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
        .map(|dt| Stamp::At(dt.with_timezone(&Utc)))
}

fn decode_row((id, document, created_at, updated_at): RecordRow) -> Result<StoredRecord> {
    let mut record: SubmissionRecord =
        serde_json::from_str(&document).map_err(|e| Error::CorruptRecord {
            id: id.clone(),
            message: e.to_string(),
        })?;
    record.timestamps = Timestamps {
        created_at: parse_instant(created_at),
        updated_at: parse_instant(updated_at),
    };
    Ok(StoredRecord {
        id: RecordId::from(id),
        record,
    })
}
