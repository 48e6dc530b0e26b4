//! SQLite-backed store for the directory.
//!
//! The database lives at `~/.talentdir/talentdir.db` unless configured
//! otherwise. One `DirectoryDb` owns one connection; per-table operations
//! live in the sibling modules as further `impl DirectoryDb` blocks.
//! Multi-step workflows run through `with_transaction`.

use std::path::PathBuf;

use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

pub mod types;
pub use types::*;

mod address_links;
mod addresses;
mod companies;
mod company_types;
mod people;
mod plays;
mod privacy;
mod productions;

pub use company_types::{
    Agency, CastingCompany, CompanyExtension, ExtensionRecord, RentalSpace, RentalStudio, School,
    Theater,
};

pub struct DirectoryDb {
    conn: Connection,
}

impl DirectoryDb {
    /// Execute a closure within a SQLite transaction.
    /// Commits on Ok, rolls back on Err.
    ///
    /// Not re-entrant: the closure must not call `with_transaction` again.
    pub fn with_transaction<F, T, E>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&Self) -> Result<T, E>,
        E: From<DbError>,
    {
        self.conn
            .execute_batch("BEGIN IMMEDIATE")
            .map_err(DbError::from)?;
        match f(self) {
            Ok(val) => {
                if let Err(e) = self.conn.execute_batch("COMMIT") {
                    let _ = self.conn.execute_batch("ROLLBACK");
                    return Err(DbError::from(e).into());
                }
                Ok(val)
            }
            Err(e) => {
                if let Err(rollback_err) = self.conn.execute_batch("ROLLBACK") {
                    log::error!("Rollback failed: {rollback_err}");
                }
                Err(e)
            }
        }
    }

    /// Open a database at an explicit path.
    pub fn open_at(path: PathBuf) -> Result<Self, DbError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(DbError::CreateDir)?;
            }
        }

        let conn = Connection::open(&path)?;

        // WAL for concurrent readers alongside the single writer.
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;

        crate::migrations::run_migrations(&conn).map_err(DbError::Migration)?;

        // Links and extensions rely on ON DELETE CASCADE / SET NULL.
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        log::info!("Opened directory database at {}", path.display());
        Ok(Self { conn })
    }

    /// Resolve the default database path: `~/.talentdir/talentdir.db`.
    pub fn default_path() -> Result<PathBuf, DbError> {
        let home = dirs::home_dir().ok_or(DbError::HomeDirNotFound)?;
        Ok(home.join(".talentdir").join("talentdir.db"))
    }

    /// True when a row with `key_column = id` exists in `table`.
    ///
    /// Table and column names come from the `entity` enums, never from input.
    pub(crate) fn row_exists(&self, table: &str, key_column: &str, id: i64) -> Result<bool, DbError> {
        Ok(self.conn.query_row(
            &format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE {key_column} = ?1)"),
            params![id],
            |row| row.get(0),
        )?)
    }
}

/// Read an INTEGER 0/1 column as bool.
fn get_flag(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<bool> {
    Ok(row.get::<_, i32>(idx)? != 0)
}

#[cfg(test)]
pub mod test_utils {
    use super::*;

    /// Create a temporary database for testing.
    ///
    /// We leak the `TempDir` so the directory persists for the duration of the test.
    /// Test temp dirs are cleaned up by the OS. Foreign keys stay on so cascade
    /// behavior is exercised exactly as in production.
    pub fn test_db() -> DirectoryDb {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("test.db");
        std::mem::forget(dir);
        DirectoryDb::open_at(path).expect("Failed to open test database")
    }

    /// Run raw SQL against the test database (triggers, fixtures).
    pub fn execute_sql(db: &DirectoryDb, sql: &str) {
        db.conn.execute_batch(sql).expect("test SQL");
    }

    pub fn seed_company(db: &DirectoryDb, name: &str) -> i64 {
        db.insert_company(&CompanyInput {
            name: name.to_string(),
            ..Default::default()
        })
        .expect("seed company")
    }

    pub fn seed_person(db: &DirectoryDb, first: &str, last: &str) -> i64 {
        db.insert_person(&PersonInput {
            first_name: Some(first.to_string()),
            last_name: Some(last.to_string()),
            ..Default::default()
        })
        .expect("seed person")
    }

    pub fn sample_address(line1: &str) -> AddressInput {
        AddressInput {
            line1: line1.to_string(),
            city: "New York".to_string(),
            state: "NY".to_string(),
            zip: "10036".to_string(),
            country: Some("USA".to_string()),
            ..Default::default()
        }
    }

    pub fn seed_address(db: &DirectoryDb, line1: &str) -> i64 {
        db.insert_address(&sample_address(line1))
            .expect("seed address")
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::test_utils::{seed_company, test_db};
    use super::*;

    #[test]
    fn test_open_creates_tables() {
        let db = test_db();
        let count: i32 = db
            .conn
            .query_row("SELECT COUNT(*) FROM companies", [], |row| row.get(0))
            .expect("companies table should exist");
        assert_eq!(count, 0);
    }

    #[test]
    fn test_foreign_keys_enabled() {
        let db = test_db();
        let fk: i32 = db
            .conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(fk, 1);
    }

    #[test]
    fn test_with_transaction_rolls_back_on_error() {
        let db = test_db();
        let result: Result<(), DbError> = db.with_transaction(|tx| {
            seed_company(tx, "Doomed");
            Err(DbError::Migration("forced".to_string()))
        });
        assert!(result.is_err());
        assert!(db.get_all_companies(true).unwrap().is_empty());
    }

    #[test]
    fn test_with_transaction_commits_on_ok() {
        let db = test_db();
        let id: i64 = db
            .with_transaction(|tx| Ok::<_, DbError>(seed_company(tx, "Kept")))
            .unwrap();
        assert!(db.get_company(id).unwrap().is_some());
    }

    #[test]
    fn test_row_exists() {
        let db = test_db();
        let id = seed_company(&db, "Here");
        assert!(db.row_exists("companies", "company_no", id).unwrap());
        assert!(!db.row_exists("companies", "company_no", id + 100).unwrap());
    }

    #[test]
    fn test_reopen_keeps_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reopen.db");
        let id = {
            let db = DirectoryDb::open_at(path.clone()).unwrap();
            seed_company(&db, "Persistent")
        };
        let db = DirectoryDb::open_at(path).unwrap();
        assert_eq!(db.get_company(id).unwrap().unwrap().name, "Persistent");
    }
}
