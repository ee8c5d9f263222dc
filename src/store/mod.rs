//! Read access to a local SQLite database.
//!
//! A thin pass-through: list tables, list a table's columns, run ad hoc
//! queries. When the file is missing, [`SqliteStore::open_or_download`]
//! fetches the public sample database first.

pub mod download;

use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub use download::download_database;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database file '{0}' not found.")]
    NotFound(PathBuf),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to download database: {0}")]
    Download(String),
}

/// A table and its column names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableInfo {
    pub table_name: String,
    pub column_names: Vec<String>,
}

/// One result row, columns in select order.
pub type Row = Vec<Value>;

/// Query surface the bot depends on.
pub trait QueryStore: Send + Sync {
    fn table_names(&self) -> Result<Vec<String>, StoreError>;

    fn column_names(&self, table: &str) -> Result<Vec<String>, StoreError>;

    /// Every table with its columns.
    fn database_info(&self) -> Result<Vec<TableInfo>, StoreError> {
        self.table_names()?
            .into_iter()
            .map(|table_name| {
                let column_names = self.column_names(&table_name)?;
                Ok(TableInfo {
                    table_name,
                    column_names,
                })
            })
            .collect()
    }

    fn ask(&self, query: &str) -> Result<Vec<Row>, StoreError>;
}

/// File-backed SQLite store.
pub struct SqliteStore {
    path: PathBuf,
    conn: Mutex<Connection>,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore").field("path", &self.path).finish()
    }
}

impl SqliteStore {
    /// Open an existing database file. A missing file is an error, not a new
    /// empty database.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if !path.exists() {
            log::error!("Error: Database file '{}' not found.", path.display());
            return Err(StoreError::NotFound(path.to_path_buf()));
        }
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        log::info!("Opened database successfully");
        Ok(Self {
            path: path.to_path_buf(),
            conn: Mutex::new(conn),
        })
    }

    /// Open `path`, downloading it from `url` first if it does not exist.
    pub async fn open_or_download(path: impl AsRef<Path>, url: &str) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if !path.exists() {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            download_database(url, path).await?;
        }
        Self::open(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl QueryStore for SqliteStore {
    fn table_names(&self) -> Result<Vec<String>, StoreError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare("SELECT name FROM sqlite_master WHERE type='table'")?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }

    fn column_names(&self, table: &str) -> Result<Vec<String>, StoreError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1)")?;
        let names = stmt
            .query_map([table], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }

    fn ask(&self, query: &str) -> Result<Vec<Row>, StoreError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(query)?;
        let width = stmt.column_count();
        let rows = stmt
            .query_map([], |row| {
                (0..width)
                    .map(|i| row.get_ref(i).map(to_json))
                    .collect::<Result<Row, _>>()
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

fn to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::String(format!("<{} bytes>", b.len())),
    }
}
