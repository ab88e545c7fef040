//! Embedded SQLite store for the workshop
//!
//! The store always lives in memory, the way a page session holds its
//! database. Disk is touched only by explicit snapshots:
//! - `Store::import` restores a database file into a fresh in-memory
//!   connection and validates it before anything is replaced
//! - `Store::export` writes a complete database file through the backup API
//!
//! Stock consistency between `inventory` and `order_parts` is maintained by
//! the transactional writes in `orders` and `writes`.

mod orders;
mod queries;
mod reports;
mod schema;
mod types;
mod writes;

pub use types::*;

use std::fs;
use std::path::Path;

use rusqlite::backup::Progress;
use rusqlite::{Connection, DatabaseName, Params, Row};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::core::error::{ShopError, ShopResult};

/// Schema version stored in `PRAGMA user_version`
pub const SCHEMA_VERSION: i32 = 1;

/// Tables every snapshot must contain, with the columns the store reads
pub(crate) const TABLES: [(&str, &[&str]); 5] = [
    ("clients", &["id", "full_name", "phone", "email"]),
    ("cars", &["id", "client_id", "brand", "model", "vin"]),
    (
        "orders",
        &["id", "car_id", "description", "labor_cost", "status", "created_at"],
    ),
    ("inventory", &["id", "name", "article", "quantity", "price"]),
    (
        "order_parts",
        &["order_id", "part_id", "quantity", "price_at_sale"],
    ),
];

/// The workshop database
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Create an empty in-memory database with the current schema
    pub fn open_in_memory() -> ShopResult<Self> {
        let conn = Connection::open_in_memory()?;
        configure(&conn)?;
        let store = Self { conn };
        store.init_schema()?;
        debug!("created empty in-memory database");
        Ok(store)
    }

    /// Load a database file into memory
    ///
    /// Any failure leaves the caller's current store untouched: the file is
    /// restored into a brand-new connection and only returned once it has
    /// passed the integrity and schema checks.
    pub fn import(path: &Path) -> ShopResult<Self> {
        if !path.is_file() {
            return Err(ShopError::ImportFailed(format!(
                "{} is not a readable file",
                path.display()
            )));
        }

        let mut conn = Connection::open_in_memory()?;
        conn.restore(DatabaseName::Main, path, None::<fn(Progress)>)
            .map_err(|e| ShopError::ImportFailed(e.to_string()))?;
        configure(&conn)?;

        let store = Self { conn };
        if let Err(e) = store.verify() {
            warn!(path = %path.display(), error = %e, "rejected database file");
            return Err(e);
        }

        info!(path = %path.display(), "imported database");
        Ok(store)
    }

    /// Write a complete snapshot of the database to `path`
    ///
    /// The snapshot is written beside the target and renamed over it, so an
    /// interrupted export never leaves a half-written file at `path`.
    pub fn export(&self, path: &Path) -> ShopResult<ExportStats> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut staging = path.as_os_str().to_owned();
        staging.push(".partial");
        let staging = std::path::PathBuf::from(staging);
        if staging.exists() {
            fs::remove_file(&staging)?;
        }

        self.conn.backup(DatabaseName::Main, &staging, None)?;
        fs::rename(&staging, path)?;

        let bytes = fs::read(path)?;
        let digest = Sha256::digest(&bytes);
        let stats = ExportStats {
            path: path.to_path_buf(),
            bytes: bytes.len() as u64,
            sha256: digest.iter().map(|b| format!("{:02x}", b)).collect(),
        };

        info!(path = %path.display(), bytes = stats.bytes, "exported database");
        Ok(stats)
    }

    /// Run a parameterized query, mapping each row
    pub fn query<T, P, F>(&self, sql: &str, params: P, map: F) -> ShopResult<Vec<T>>
    where
        P: Params,
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, map)?;
        rows.collect::<rusqlite::Result<Vec<T>>>()
            .map_err(ShopError::from)
    }

    /// Run a parameterized statement, returning the number of changed rows
    pub fn execute<P: Params>(&self, sql: &str, params: P) -> ShopResult<usize> {
        Ok(self.conn.execute(sql, params)?)
    }

    /// Execute a read-only SQL statement and return every value as text
    pub fn query_raw(&self, sql: &str) -> ShopResult<(Vec<String>, Vec<Vec<String>>)> {
        let mut stmt = self.conn.prepare(sql)?;
        if !stmt.readonly() {
            return Err(ShopError::validation(
                "sql",
                "only read-only statements are allowed",
            ));
        }

        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
        let column_count = columns.len();

        let mut rows = stmt.query([])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut values = Vec::with_capacity(column_count);
            for i in 0..column_count {
                let value = match row.get_ref(i)? {
                    rusqlite::types::ValueRef::Null => String::new(),
                    rusqlite::types::ValueRef::Integer(n) => n.to_string(),
                    rusqlite::types::ValueRef::Real(f) => f.to_string(),
                    rusqlite::types::ValueRef::Text(t) => String::from_utf8_lossy(t).to_string(),
                    rusqlite::types::ValueRef::Blob(b) => format!("<{} bytes>", b.len()),
                };
                values.push(value);
            }
            out.push(values);
        }

        Ok((columns, out))
    }

    /// Row counts of the five workshop tables
    pub fn table_counts(&self) -> ShopResult<Vec<TableCount>> {
        TABLES
            .iter()
            .map(|(table, _)| {
                let rows: i64 = self.conn.query_row(
                    &format!("SELECT COUNT(*) FROM {}", table),
                    [],
                    |row| row.get(0),
                )?;
                Ok(TableCount {
                    table: table.to_string(),
                    rows,
                })
            })
            .collect()
    }

    /// Check integrity, schema version and table layout of a loaded database
    fn verify(&self) -> ShopResult<()> {
        let check: String = self
            .conn
            .query_row("PRAGMA quick_check", [], |row| row.get(0))
            .map_err(|e| ShopError::ImportFailed(e.to_string()))?;
        if check != "ok" {
            return Err(ShopError::ImportFailed(format!(
                "integrity check failed: {}",
                check
            )));
        }

        let version: i32 = self
            .conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))
            .map_err(|e| ShopError::ImportFailed(e.to_string()))?;
        if version != SCHEMA_VERSION {
            return Err(ShopError::ImportFailed(format!(
                "unsupported schema version {} (expected {})",
                version, SCHEMA_VERSION
            )));
        }

        for (table, required) in TABLES {
            let columns = self
                .query(
                    &format!("PRAGMA table_info({})", table),
                    [],
                    |row| row.get::<_, String>(1),
                )
                .map_err(|e| ShopError::ImportFailed(e.to_string()))?;
            if columns.is_empty() {
                return Err(ShopError::ImportFailed(format!("missing table {}", table)));
            }
            if let Some(missing) = required
                .iter()
                .find(|c| !columns.iter().any(|have| have.as_str() == **c))
            {
                return Err(ShopError::ImportFailed(format!(
                    "table {} lacks column {}",
                    table, missing
                )));
            }
        }

        Ok(())
    }
}

/// Per-connection settings; foreign keys are off by default in SQLite
fn configure(conn: &Connection) -> ShopResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    Ok(())
}
