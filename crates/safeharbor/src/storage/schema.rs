//! `SQLite` schema definitions for the draft store.

/// One row per form identity; saving a draft replaces the row.
///
/// This is the latest layout. Databases created by an older release reach it
/// through [`MIGRATIONS`].
pub const CREATE_DRAFTS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS drafts (
    form_id TEXT PRIMARY KEY,
    record TEXT NOT NULL,
    record_hash TEXT NOT NULL DEFAULT '',
    updated_at TEXT NOT NULL
)
";

/// Key-value pairs about the database itself, such as its schema version.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// Statements upgrading a database to each version after the first, in
/// order. Empty until the layout changes.
pub const MIGRATIONS: &[(i32, &str)] = &[];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drafts_table_columns() {
        for column in [
            "form_id TEXT PRIMARY KEY",
            "record TEXT NOT NULL",
            "record_hash TEXT",
            "updated_at TEXT NOT NULL",
        ] {
            assert!(CREATE_DRAFTS_TABLE.contains(column), "missing {column}");
        }
    }

    #[test]
    fn test_migrations_ascending() {
        assert!(MIGRATIONS.windows(2).all(|pair| pair[0].0 < pair[1].0));
        assert!(MIGRATIONS.iter().all(|(version, _)| *version > 1));
    }
}
