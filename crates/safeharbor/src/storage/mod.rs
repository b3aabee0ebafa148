//! Draft persistence for safeharbor.
//!
//! The form controller only sees the [`DraftStore`] trait: one named slot per
//! form identity, last write wins. [`Storage`] backs that slot with `SQLite`.

pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use crate::draft::DraftRecord;
use crate::error::{Error, Result};

/// What a [`DraftStore::save`] call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The record was written, replacing any previous one.
    Written,
    /// The stored record already had identical content; nothing was written.
    Unchanged,
}

/// Persistence facility for form drafts.
///
/// Keyed by form identity. There is no schema versioning of records and no
/// merging: a save replaces whatever was stored for that identity.
pub trait DraftStore {
    /// Replace the draft stored for `form_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be serialized or written.
    fn save(&self, form_id: &str, record: &DraftRecord) -> Result<SaveOutcome>;

    /// Load the draft stored for `form_id`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails or the stored record is corrupt.
    fn load(&self, form_id: &str) -> Result<Option<DraftRecord>>;

    /// Remove the draft stored for `form_id`.
    ///
    /// Returns `true` if a draft was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    fn clear(&self, form_id: &str) -> Result<bool>;
}

/// Metadata about one stored draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftSummary {
    /// Form identity the draft belongs to.
    pub form_id: String,
    /// When the draft was last written.
    pub updated_at: DateTime<Utc>,
    /// BLAKE3 hash of the stored record.
    pub record_hash: String,
}

/// `SQLite`-backed draft store.
#[derive(Debug)]
pub struct Storage {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl Storage {
    /// Open or create a draft database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening draft database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        // Enable WAL mode
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        // Create or upgrade the schema
        migrations::initialize_schema(&conn)?;

        info!("Draft database opened at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory store, for tests and throwaway sessions.
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
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// List all stored drafts, most recently updated first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list(&self) -> Result<Vec<DraftSummary>> {
        let mut stmt = self.conn.prepare(
            r"
            SELECT form_id, updated_at, record_hash
            FROM drafts ORDER BY updated_at DESC
            ",
        )?;

        let drafts = stmt
            .query_map([], |row| {
                let form_id: String = row.get(0)?;
                let updated_at: String = row.get(1)?;
                let record_hash: String = row.get(2)?;
                Ok(DraftSummary {
                    form_id,
                    updated_at: parse_timestamp(&updated_at),
                    record_hash,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(drafts)
    }

    /// Count stored drafts.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn count(&self) -> Result<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM drafts", [], |row| row.get(0))?;
        Ok(count)
    }

    fn stored_hash(&self, form_id: &str) -> Result<Option<String>> {
        let hash = self
            .conn
            .query_row(
                "SELECT record_hash FROM drafts WHERE form_id = ?1",
                [form_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(hash)
    }
}

impl DraftStore for Storage {
    fn save(&self, form_id: &str, record: &DraftRecord) -> Result<SaveOutcome> {
        let json = record.to_json()?;
        let hash = record.content_hash()?;

        // Skip the write if the stored snapshot is identical
        if self.stored_hash(form_id)?.as_deref() == Some(hash.as_str()) {
            debug!(form_id, "Draft unchanged, skipping write");
            return Ok(SaveOutcome::Unchanged);
        }

        self.conn.execute(
            r"
            INSERT OR REPLACE INTO drafts (form_id, record, record_hash, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ",
            params![form_id, json, hash, Utc::now().to_rfc3339()],
        )?;

        debug!(form_id, fields = record.len(), "Saved draft");
        Ok(SaveOutcome::Written)
    }

    fn load(&self, form_id: &str) -> Result<Option<DraftRecord>> {
        let json: Option<String> = self
            .conn
            .query_row(
                "SELECT record FROM drafts WHERE form_id = ?1",
                [form_id],
                |row| row.get(0),
            )
            .optional()?;

        // Undecodable records surface as CorruptDraft rather than a JSON error
        json.map(|json| {
            DraftRecord::from_json(&json).map_err(|e| Error::corrupt_draft(form_id, e.to_string()))
        })
        .transpose()
    }

    fn clear(&self, form_id: &str) -> Result<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM drafts WHERE form_id = ?1", [form_id])?;
        if affected > 0 {
            debug!(form_id, "Cleared draft");
        }
        Ok(affected > 0)
    }
}

fn parse_timestamp(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value).map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc))
}
