//! SQLite storage implementation

use std::path::Path;
use rusqlite::{Connection, OptionalExtension, Params};
use rusqlite::types::Value;
use serde::Serialize;
use tracing::debug;
use crate::Result;
use super::row::RawRow;
use super::schema;

/// Shared SQLite connection used by every repository.
///
/// The connection stays in autocommit mode: each call below is one
/// statement and is committed before it returns.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open a database file (creates if doesn't exist)
    pub fn open(path: &Path) -> Result<Self> {
        debug!("Opening database at {}", path.display());
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    /// Wrap an existing connection. Foreign key enforcement is switched on.
    pub fn from_connection(conn: Connection) -> Result<Self> {
        let store = Self { conn };
        store.set_foreign_keys(true)?;
        Ok(store)
    }

    /// Builder-style toggle for `PRAGMA foreign_keys`
    pub fn with_foreign_keys(self, enabled: bool) -> Result<Self> {
        self.set_foreign_keys(enabled)?;
        Ok(self)
    }

    pub fn set_foreign_keys(&self, enabled: bool) -> Result<()> {
        self.conn.pragma_update(None, "foreign_keys", enabled)?;
        Ok(())
    }

    pub fn foreign_keys_enabled(&self) -> Result<bool> {
        let enabled: i64 = self.conn.pragma_query_value(None, "foreign_keys", |row| row.get(0))?;
        Ok(enabled != 0)
    }

    // ========== Statement Execution ==========

    /// Execute one statement, returning the number of affected rows
    pub fn execute<P: Params>(&self, sql: &str, params: P) -> Result<usize> {
        debug!(sql = sql.trim(), "execute");
        let changed = self.conn.execute(sql, params)?;
        Ok(changed)
    }

    /// Execute an INSERT and return the storage-assigned rowid
    pub fn insert<P: Params>(&self, sql: &str, params: P) -> Result<i64> {
        self.execute(sql, params)?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Fetch the first row of a query, if any
    pub fn fetch_one<P: Params>(&self, sql: &str, params: P) -> Result<Option<RawRow>> {
        debug!(sql = sql.trim(), "fetch_one");
        let mut stmt = self.conn.prepare(sql)?;
        let width = stmt.column_count();
        stmt.query_row(params, |row| Self::read_row(row, width))
            .optional()
            .map_err(Into::into)
    }

    /// Fetch every row of a query, in storage order
    pub fn fetch_all<P: Params>(&self, sql: &str, params: P) -> Result<Vec<RawRow>> {
        debug!(sql = sql.trim(), "fetch_all");
        let mut stmt = self.conn.prepare(sql)?;
        let width = stmt.column_count();
        let rows = stmt.query_map(params, |row| Self::read_row(row, width))?;

        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Into::into)
    }

    fn read_row(row: &rusqlite::Row, width: usize) -> rusqlite::Result<RawRow> {
        (0..width).map(|i| row.get::<_, Value>(i)).collect()
    }

    // ========== Schema Operations ==========

    /// Create every table if missing
    pub fn create_all_tables(&self) -> Result<()> {
        for stmt in schema::all_create_statements() {
            self.execute(stmt, [])?;
        }
        Ok(())
    }

    /// Drop every table if present
    pub fn drop_all_tables(&self) -> Result<()> {
        for stmt in schema::all_drop_statements() {
            self.execute(stmt, [])?;
        }
        Ok(())
    }

    pub fn table_exists(&self, name: &str) -> Result<bool> {
        let found = self.fetch_one(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [name],
        )?;
        Ok(found.is_some())
    }

    // ========== Statistics ==========

    fn count_rows(&self, table: &str) -> Result<usize> {
        if !self.table_exists(table)? {
            return Ok(0);
        }
        let sql = format!("SELECT COUNT(*) FROM {}", table);
        let count: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Get database statistics
    pub fn stats(&self) -> Result<DbStats> {
        Ok(DbStats {
            departments: self.count_rows("departments")?,
            employees: self.count_rows("employees")?,
            reviews: self.count_rows("reviews")?,
        })
    }
}

/// Row counts per table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DbStats {
    pub departments: usize,
    pub employees: usize,
    pub reviews: usize,
}
