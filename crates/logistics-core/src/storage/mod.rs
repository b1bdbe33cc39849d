//! SQLite storage shared by the registry, the ledger and the tracker

mod rows;
mod schema;

pub(crate) use rows::*;

use crate::config::DatabaseConfig;
use crate::error::{LogisticsError, Result};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection, ToSql};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub type DbConnection = PooledConnection<SqliteConnectionManager>;

/// Default page size of operator list views
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Pooled handle to the logistics database. Cheap to clone.
#[derive(Clone)]
pub struct Database {
    pool: Pool<SqliteConnectionManager>,
    path: Option<PathBuf>,
}

impl Database {
    /// Open (creating if needed) the database file and make sure the schema exists
    pub fn open<P: AsRef<Path>>(path: P, config: &DatabaseConfig) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let busy_timeout = config.busy_timeout_ms;
        let manager = SqliteConnectionManager::file(&path).with_init(move |conn| {
            configure_connection(conn, busy_timeout)?;
            conn.execute_batch("PRAGMA journal_mode=WAL;")?;
            Ok(())
        });

        let pool = Pool::builder()
            .max_size(config.pool_size)
            .connection_timeout(Duration::from_secs(5))
            .build(manager)?;

        let db = Self {
            pool,
            path: Some(path),
        };
        db.initialize()?;

        log::info!(
            "Opened database at {} (pool size {})",
            db.path.as_deref().map(|p| p.display().to_string()).unwrap_or_default(),
            config.pool_size
        );
        Ok(db)
    }

    /// Private in-memory database. Every pooled connection to `:memory:` is a
    /// separate database, so the pool holds exactly one.
    pub fn in_memory() -> Result<Self> {
        let manager = SqliteConnectionManager::memory()
            .with_init(|conn| configure_connection(conn, DatabaseConfig::default().busy_timeout_ms));

        let pool = Pool::builder()
            .max_size(1)
            .connection_timeout(Duration::from_secs(5))
            .build(manager)?;

        let db = Self { pool, path: None };
        db.initialize()?;
        Ok(db)
    }

    fn initialize(&self) -> Result<()> {
        let conn = self.connection()?;
        schema::create_schema(&conn)?;
        Ok(())
    }

    /// Borrow a pooled connection. Do not hold one while asking for another:
    /// the in-memory pool has a single connection.
    pub fn connection(&self) -> Result<DbConnection> {
        Ok(self.pool.get()?)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

fn configure_connection(conn: &Connection, busy_timeout_ms: u64) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys=ON; PRAGMA synchronous=NORMAL;")?;
    conn.busy_timeout(Duration::from_millis(busy_timeout_ms))?;
    Ok(())
}

/// 1-based page of a list view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Pagination {
    pub fn page(page: u32) -> Self {
        Self {
            page: page.max(1),
            ..Self::default()
        }
    }

    fn limit_sql(&self) -> String {
        let per_page = self.per_page.max(1);
        let offset = (self.page.max(1) - 1) as u64 * per_page as u64;
        format!(" LIMIT {} OFFSET {}", per_page, offset)
    }
}

/// WHERE clause assembled from optional filters, with positional `?` parameters
#[derive(Default)]
pub(crate) struct SqlFilter {
    clauses: Vec<String>,
    params: Vec<Box<dyn ToSql>>,
}

impl SqlFilter {
    pub(crate) fn push<T: ToSql + 'static>(&mut self, clause: &str, value: T) {
        self.clauses.push(clause.to_string());
        self.params.push(Box::new(value));
    }

    /// Clause using the same value for several `?` placeholders
    pub(crate) fn push_repeated<T: ToSql + Clone + 'static>(&mut self, clause: &str, value: T) {
        let count = clause.matches('?').count();
        self.clauses.push(clause.to_string());
        for _ in 0..count {
            self.params.push(Box::new(value.clone()));
        }
    }

    pub(crate) fn where_sql(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.clauses.join(" AND "))
        }
    }

    pub(crate) fn params(&self) -> impl Iterator<Item = &dyn ToSql> {
        self.params.iter().map(|p| p.as_ref())
    }
}

pub(crate) fn page_sql(page: Option<Pagination>) -> String {
    page.map(|p| p.limit_sql()).unwrap_or_default()
}

/// `%term%` for LIKE searches, with LIKE wildcards in the term escaped
pub(crate) fn like_pattern(term: &str) -> String {
    let escaped = term
        .trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, Some(msg))
            if e.code == rusqlite::ErrorCode::ConstraintViolation && msg.contains("UNIQUE")
    )
}

pub(crate) fn not_found(what: &str, id: impl std::fmt::Display) -> LogisticsError {
    LogisticsError::NotFound(format!("{} {} not found", what, id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_database_enforces_foreign_keys() {
        let db = Database::in_memory().unwrap();
        let conn = db.connection().unwrap();
        let enabled: i64 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(enabled, 1);
    }

    #[test]
    fn test_open_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("logistics.db");

        let db = Database::open(&path, &DatabaseConfig::default()).unwrap();
        assert!(path.exists());
        assert_eq!(db.path(), Some(path.as_path()));
    }

    #[test]
    fn test_pagination_sql() {
        assert_eq!(page_sql(None), "");
        assert_eq!(page_sql(Some(Pagination::page(3))), " LIMIT 20 OFFSET 40");
        assert_eq!(page_sql(Some(Pagination::page(0))), " LIMIT 20 OFFSET 0");
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern(" acme "), "%acme%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }

    #[test]
    fn test_filter_repeats_parameters() {
        let mut filter = SqlFilter::default();
        filter.push("a = ?", 1_i64);
        filter.push_repeated("(b LIKE ? OR c LIKE ?)", "x".to_string());
        assert_eq!(filter.where_sql(), " WHERE a = ? AND (b LIKE ? OR c LIKE ?)");
        assert_eq!(filter.params().count(), 3);
    }
}
