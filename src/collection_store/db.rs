//! Storage handle shared by the collection components.
//!
//! One write connection serialises all mutations; reads are spread over a
//! small round-robin pool of read-only connections. The database runs in WAL
//! mode so readers never block the writer.

use super::errors::CollectionResult;
use super::schema::COLLECTION_VERSIONED_SCHEMAS;
use crate::sqlite_persistence::migrate_if_needed;
use anyhow::{Context, Result};
use rusqlite::functions::FunctionFlags;
use rusqlite::{Connection, OpenFlags, Transaction, TransactionBehavior};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tracing::info;

pub const DEFAULT_READ_POOL_SIZE: usize = 4;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

pub struct CollectionDb {
    write_conn: Mutex<Connection>,
    read_pool: Vec<Mutex<Connection>>,
    read_index: AtomicUsize,
}

/// SQL function lowering text with Unicode case rules. SQLite's own `lower()`
/// and `LIKE` only fold ASCII letters.
pub(crate) const FOLD_CASE_FN: &str = "fold_case";

/// Case folding applied to search text and genre keys.
pub(crate) fn fold_case(value: &str) -> String {
    value.to_lowercase()
}

fn register_functions(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        FOLD_CASE_FN,
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let value = ctx.get::<Option<String>>(0)?;
            Ok(value.map(|v| fold_case(&v)))
        },
    )
}

fn configure_connection(conn: &Connection) -> Result<()> {
    conn.busy_timeout(BUSY_TIMEOUT)?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    register_functions(conn)?;
    Ok(())
}

impl CollectionDb {
    /// Open (or create) the collection database at `db_path`.
    ///
    /// The schema is created or migrated on the write connection before any
    /// read connection is opened. `read_pool_size` is clamped to at least one.
    pub fn open<P: AsRef<Path>>(db_path: P, read_pool_size: usize) -> Result<Self> {
        let db_path = db_path.as_ref();

        let mut write_conn = Connection::open_with_flags(
            db_path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("Failed to open collection database {:?}", db_path))?;
        configure_connection(&write_conn)?;

        migrate_if_needed(&mut write_conn, COLLECTION_VERSIONED_SCHEMAS, "collection")
            .context("Failed to prepare collection schema")?;

        write_conn.pragma_update(None, "journal_mode", "WAL")?;

        let record_count: i64 = write_conn
            .query_row("SELECT COUNT(*) FROM records", [], |r| r.get(0))
            .unwrap_or(0);
        let genre_count: i64 = write_conn
            .query_row("SELECT COUNT(*) FROM genres", [], |r| r.get(0))
            .unwrap_or(0);
        let track_count: i64 = write_conn
            .query_row("SELECT COUNT(*) FROM tracks", [], |r| r.get(0))
            .unwrap_or(0);
        info!(
            "Opened record collection: {} records, {} genres, {} tracks",
            record_count, genre_count, track_count
        );

        let read_pool_size = read_pool_size.max(1);
        let mut read_pool = Vec::with_capacity(read_pool_size);
        for _ in 0..read_pool_size {
            let read_conn = Connection::open_with_flags(
                db_path,
                OpenFlags::SQLITE_OPEN_READ_ONLY
                    | OpenFlags::SQLITE_OPEN_URI
                    | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )
            .context("Failed to open collection read connection")?;
            configure_connection(&read_conn)?;
            read_pool.push(Mutex::new(read_conn));
        }

        Ok(CollectionDb {
            write_conn: Mutex::new(write_conn),
            read_pool,
            read_index: AtomicUsize::new(0),
        })
    }

    /// Run `f` on a read connection.
    ///
    /// The closure sees a single snapshot: it runs inside a deferred
    /// transaction that is released when it returns.
    pub fn read<T, F>(&self, f: F) -> CollectionResult<T>
    where
        F: FnOnce(&Connection) -> CollectionResult<T>,
    {
        let index = self.read_index.fetch_add(1, Ordering::SeqCst) % self.read_pool.len();
        let conn = self.read_pool[index].lock().unwrap();
        let tx = conn.unchecked_transaction()?;
        let value = f(&tx)?;
        tx.commit()?;
        Ok(value)
    }

    /// Run `f` inside a `BEGIN IMMEDIATE` transaction on the write connection.
    ///
    /// The transaction commits only when `f` returns `Ok`; an error rolls it
    /// back. A panic in `f` also rolls back, but poisons the write lock and
    /// every later `write` on this handle panics.
    pub fn write<T, F>(&self, f: F) -> CollectionResult<T>
    where
        F: FnOnce(&Transaction) -> CollectionResult<T>,
    {
        let mut conn = self.write_conn.lock().unwrap();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let value = f(&tx)?;
        tx.commit()?;
        Ok(value)
    }
}

/// Converts an offset/limit pair to SQLite's signed `LIMIT ?, OFFSET ?` values.
pub(crate) fn page_bounds(offset: usize, limit: usize) -> (i64, i64) {
    (
        i64::try_from(offset).unwrap_or(i64::MAX),
        i64::try_from(limit).unwrap_or(i64::MAX),
    )
}
