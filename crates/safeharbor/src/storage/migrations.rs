//! Schema versioning for the draft database.
//!
//! Draft records themselves are unversioned; only the table layout is. A fresh
//! database is created at the latest layout directly. An existing one is
//! brought forward by replaying the [`MIGRATIONS`] newer than its stored
//! version, inside one transaction.

use rusqlite::{Connection, OptionalExtension};
use tracing::info;

use crate::error::{Error, Result};

use super::schema::{CREATE_DRAFTS_TABLE, CREATE_METADATA_TABLE, MIGRATIONS};

/// The current schema version.
pub const CURRENT_VERSION: i32 = 1;

const VERSION_KEY: &str = "schema_version";

/// Create or upgrade the schema.
///
/// # Errors
///
/// Returns an error if the stored version is unreadable or newer than this
/// build understands, or if a statement fails.
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    conn.execute(CREATE_METADATA_TABLE, [])?;

    match stored_version(conn)? {
        // Fresh database: create the latest layout directly
        None => {
            conn.execute(CREATE_DRAFTS_TABLE, [])?;
            write_version(conn, CURRENT_VERSION)
        }
        Some(version) if version > CURRENT_VERSION => Err(Error::DatabaseMigration {
            message: format!(
                "database schema version {version} is newer than supported version {CURRENT_VERSION}"
            ),
        }),
        Some(version) if version < CURRENT_VERSION => {
            upgrade(conn, version, CURRENT_VERSION, MIGRATIONS)
        }
        Some(_) => Ok(()),
    }
}

/// The stored schema version, or `None` for a database never initialized.
fn stored_version(conn: &Connection) -> Result<Option<i32>> {
    let value: Option<String> = conn
        .query_row(
            "SELECT value FROM metadata WHERE key = ?1",
            [VERSION_KEY],
            |row| row.get(0),
        )
        .optional()?;

    value
        .map(|value| {
            value.parse().map_err(|_| Error::DatabaseMigration {
                message: format!("invalid schema version: {value}"),
            })
        })
        .transpose()
}

fn write_version(conn: &Connection, version: i32) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO metadata (key, value) VALUES (?1, ?2)",
        (VERSION_KEY, version.to_string()),
    )?;
    Ok(())
}

/// Replay the steps in `migrations` newer than `from`, then record `to`.
fn upgrade(conn: &Connection, from: i32, to: i32, migrations: &[(i32, &str)]) -> Result<()> {
    // All steps and the version bump commit together or not at all
    let tx = conn.unchecked_transaction()?;

    for (version, statement) in migrations.iter().filter(|(v, _)| *v > from && *v <= to) {
        tx.execute(statement, []).map_err(|e| Error::DatabaseMigration {
            message: format!("migration to version {version} failed: {e}"),
        })?;
    }
    write_version(&tx, to)?;
    tx.commit()?;

    info!(from, to, "Upgraded draft database schema");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_db() -> Connection {
        Connection::open_in_memory().expect("failed to create in-memory database")
    }

    fn columns(conn: &Connection, table: &str) -> Vec<String> {
        let mut stmt = conn
            .prepare(&format!("SELECT name FROM pragma_table_info('{table}')"))
            .unwrap();
        stmt.query_map([], |row| row.get::<_, String>(0))
            .unwrap()
            .collect::<std::result::Result<_, _>>()
            .unwrap()
    }

    const ADD_NOTE: &[(i32, &str)] = &[
        (2, "ALTER TABLE drafts ADD COLUMN note TEXT NOT NULL DEFAULT ''"),
        (3, "CREATE INDEX drafts_updated ON drafts (updated_at)"),
    ];

    fn create_initialized_db() -> Connection {
        let conn = create_test_db();
        initialize_schema(&conn).unwrap();
        conn.execute(
            "INSERT INTO drafts (form_id, record, record_hash, updated_at) \
             VALUES ('reportForm', '{}', 'h', '2026-01-01T00:00:00Z')",
            [],
        )
        .unwrap();
        conn
    }

    #[test]
    fn test_fresh_database_gets_latest_layout() {
        let conn = create_test_db();
        initialize_schema(&conn).unwrap();

        assert_eq!(stored_version(&conn).unwrap(), Some(CURRENT_VERSION));
        assert_eq!(
            columns(&conn, "drafts"),
            vec!["form_id", "record", "record_hash", "updated_at"]
        );
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let conn = create_initialized_db();
        initialize_schema(&conn).unwrap();

        assert_eq!(stored_version(&conn).unwrap(), Some(CURRENT_VERSION));
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM drafts", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_upgrade_replays_newer_steps_and_keeps_drafts() {
        let conn = create_initialized_db();
        upgrade(&conn, 1, 3, ADD_NOTE).unwrap();

        assert_eq!(stored_version(&conn).unwrap(), Some(3));
        assert!(columns(&conn, "drafts").contains(&"note".to_string()));
        let note: String = conn
            .query_row(
                "SELECT note FROM drafts WHERE form_id = 'reportForm'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(note, "");
    }

    #[test]
    fn test_upgrade_skips_steps_already_applied() {
        let conn = create_initialized_db();
        conn.execute("ALTER TABLE drafts ADD COLUMN note TEXT", [])
            .unwrap();
        write_version(&conn, 2).unwrap();

        upgrade(&conn, 2, 3, ADD_NOTE).unwrap();
        assert_eq!(stored_version(&conn).unwrap(), Some(3));
    }

    #[test]
    fn test_failed_upgrade_rolls_back() {
        let conn = create_initialized_db();
        // Makes step 3 fail after step 2 succeeded
        conn.execute("CREATE INDEX drafts_updated ON drafts (form_id)", [])
            .unwrap();

        let err = upgrade(&conn, 1, 3, ADD_NOTE).unwrap_err();
        assert!(err.to_string().contains("migration to version 3 failed"));
        assert_eq!(stored_version(&conn).unwrap(), Some(1));
        assert!(!columns(&conn, "drafts").contains(&"note".to_string()));
    }

    #[test]
    fn test_invalid_schema_version() {
        let conn = create_test_db();
        initialize_schema(&conn).unwrap();
        conn.execute(
            "UPDATE metadata SET value = 'abc' WHERE key = ?1",
            [VERSION_KEY],
        )
        .unwrap();

        let err = initialize_schema(&conn).unwrap_err();
        assert!(err.to_string().contains("invalid schema version"));
    }

    #[test]
    fn test_newer_schema_rejected() {
        let conn = create_test_db();
        initialize_schema(&conn).unwrap();
        write_version(&conn, CURRENT_VERSION + 1).unwrap();

        let err = initialize_schema(&conn).unwrap_err();
        assert!(err.to_string().contains("newer than supported"));
    }
}
