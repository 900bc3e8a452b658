//! SQLite-based diary storage.
//!
//! Each night is stored as its JSON export form in `entries.payload`, keyed
//! by `id`, with `date` copied out for ordering. Keeping the payload as
//! JSON means fields this version does not model survive a round trip.

use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashSet;
use std::path::Path;

use super::data_dir;
use crate::entry::{sorted_by_date, NightlyEntry};
use crate::error::{Result, StorageError, ValidationError};

/// File name of the diary database inside the data directory.
pub const DB_FILE_NAME: &str = "sleeplog.db";

/// SQLite store of diary nights.
pub struct DiaryDb {
    conn: Connection,
}

impl DiaryDb {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `~/.config/sleeplog/sleeplog.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        Self::open_at(data_dir()?.join(DB_FILE_NAME))
    }

    /// Open (or create) the database at `path`.
    ///
    /// # Errors
    /// Returns [`StorageError::OpenFailed`] if SQLite cannot open the file.
    pub fn open_at(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|source| StorageError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        tracing::debug!(path = %path.display(), "opened diary database");
        Ok(db)
    }

    /// Open an in-memory database.
    ///
    /// # Errors
    /// Returns an error if the schema cannot be created.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS entries (
                id       TEXT PRIMARY KEY,
                date     TEXT NOT NULL,
                payload  TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_entries_date ON entries(date);",
        )?;
        Ok(())
    }

    /// Insert a night, or replace the stored night with the same id.
    ///
    /// # Errors
    /// Returns an error if the entry cannot be encoded or written.
    pub fn upsert_entry(&self, entry: &NightlyEntry) -> Result<()> {
        Self::upsert_on(&self.conn, entry)
    }

    fn upsert_on(conn: &Connection, entry: &NightlyEntry) -> Result<()> {
        let payload = serde_json::to_string(entry)?;
        conn.execute(
            "INSERT INTO entries (id, date, payload) VALUES (?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET date = excluded.date, payload = excluded.payload",
            params![entry.id, entry.date, payload],
        )?;
        Ok(())
    }

    fn decode(id: &str, payload: &str) -> Result<NightlyEntry> {
        serde_json::from_str(payload).map_err(|e| {
            StorageError::CorruptEntry {
                id: id.to_string(),
                message: e.to_string(),
            }
            .into()
        })
    }

    /// Fetch one night by id.
    ///
    /// # Errors
    /// Returns an error if the query fails or the stored payload is corrupt.
    pub fn get_entry(&self, id: &str) -> Result<Option<NightlyEntry>> {
        let payload: Option<String> = self
            .conn
            .query_row(
                "SELECT payload FROM entries WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;
        payload.map(|p| Self::decode(id, &p)).transpose()
    }

    /// Delete one night. Returns whether anything was deleted.
    ///
    /// # Errors
    /// Returns an error if the delete fails.
    pub fn delete_entry(&self, id: &str) -> Result<bool> {
        let n = self
            .conn
            .execute("DELETE FROM entries WHERE id = ?1", params![id])?;
        Ok(n > 0)
    }

    /// Every stored night, date ascending.
    ///
    /// # Errors
    /// Returns an error if the query fails or any payload is corrupt.
    pub fn list_entries(&self) -> Result<Vec<NightlyEntry>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, payload FROM entries ORDER BY date, rowid")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut entries = Vec::new();
        for row in rows {
            let (id, payload) = row?;
            entries.push(Self::decode(&id, &payload)?);
        }
        Ok(sorted_by_date(&entries).into_iter().cloned().collect())
    }

    /// Number of stored nights.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn count(&self) -> Result<usize> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM entries", [], |row| row.get(0))?;
        Ok(usize::try_from(n).unwrap_or(0))
    }

    /// Replace the whole diary with `entries` in one transaction.
    ///
    /// Returns the number of nights stored afterwards. Nights sharing an id
    /// collapse into the last one.
    ///
    /// # Errors
    /// Returns an error if any write fails; the previous diary is kept.
    pub fn replace_all(&mut self, entries: &[NightlyEntry]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM entries", [])?;
        for entry in entries {
            Self::upsert_on(&tx, entry)?;
        }
        let stored: i64 = tx.query_row("SELECT COUNT(*) FROM entries", [], |row| row.get(0))?;
        tx.commit()?;
        let stored = usize::try_from(stored).unwrap_or(0);
        if stored != entries.len() {
            tracing::warn!(given = entries.len(), stored, "duplicate ids collapsed");
        }
        tracing::info!(count = stored, "replaced diary");
        Ok(stored)
    }

    /// Delete every night. Returns how many were removed.
    ///
    /// # Errors
    /// Returns an error if the delete fails.
    pub fn clear(&self) -> Result<usize> {
        let n = self.conn.execute("DELETE FROM entries", [])?;
        tracing::info!(count = n, "cleared diary");
        Ok(n)
    }

    /// The diary as a pretty-printed JSON array, date ascending.
    ///
    /// # Errors
    /// Returns an error if reading or encoding fails.
    pub fn export_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.list_entries()?)?)
    }

    /// Replace the diary with the nights in a JSON export.
    ///
    /// # Errors
    /// See [`parse_entries_json`] and [`DiaryDb::replace_all`].
    pub fn import_json(&mut self, json: &str) -> Result<usize> {
        let entries = parse_entries_json(json)?;
        self.replace_all(&entries)
    }
}

/// Parse a diary export.
///
/// Accepts current and legacy entry shapes. Nights without an id, and
/// nights repeating an id already seen earlier in the array, get a fresh
/// one, so every night in the export is kept.
///
/// # Errors
/// Returns [`ValidationError::InvalidValue`] unless the document is a JSON
/// array, or a JSON error if an element is not a diary night.
pub fn parse_entries_json(json: &str) -> Result<Vec<NightlyEntry>> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    if !value.is_array() {
        return Err(ValidationError::InvalidValue {
            field: "import".to_string(),
            message: "expected a JSON array of diary entries".to_string(),
        }
        .into());
    }

    let mut entries: Vec<NightlyEntry> = serde_json::from_value(value)?;
    let mut seen = HashSet::with_capacity(entries.len());
    for entry in &mut entries {
        if entry.id.trim().is_empty() || !seen.insert(entry.id.clone()) {
            entry.id = uuid::Uuid::new_v4().to_string();
            seen.insert(entry.id.clone());
        }
    }
    Ok(entries)
}
