//! Local SQLite task store.
//!
//! Mirrors the hosted store's tables so the dashboard can run offline and
//! tests can exercise retrieval without a network.

pub mod import;
pub mod query;

use crate::error::{RetrievalError, RetrievalResult};
use crate::store::TaskStore;
use crate::store::query::TableQuery;
use anyhow::Result;
use async_trait::async_trait;
use rusqlite::Connection;
use rusqlite::functions::FunctionFlags;
use serde_json::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("migrations");
}

/// Database handle wrapping a SQLite connection.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open or create the database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA foreign_keys=ON;
             PRAGMA busy_timeout=5000;",
        )?;
        register_functions(&conn)?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        db.run_migrations()?;

        Ok(db)
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;

        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        register_functions(&conn)?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        db.run_migrations()?;

        Ok(db)
    }

    fn run_migrations(&self) -> Result<()> {
        let mut conn = self.conn.lock().unwrap();
        embedded::migrations::runner().run(&mut *conn)?;
        Ok(())
    }

    /// Execute a function with exclusive access to the connection.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.conn.lock().unwrap();
        f(&conn)
    }

    /// Execute a function with mutable access to the connection (for transactions).
    pub fn with_conn_mut<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T>,
    {
        let mut conn = self.conn.lock().unwrap();
        f(&mut conn)
    }
}

/// Install the SQL functions the compiled queries rely on.
///
/// `casefold` lowercases with full Unicode rules; the built-in `LIKE` only
/// folds ASCII letters.
fn register_functions(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        "casefold",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let value: Option<String> = ctx.get(0)?;
            Ok(value.map(|v| v.to_lowercase()))
        },
    )
}

#[async_trait]
impl TaskStore for Database {
    async fn select(&self, query: &TableQuery) -> RetrievalResult<Vec<Value>> {
        let table = query.table;
        let db = self.clone();
        let query = query.clone();

        tokio::task::spawn_blocking(move || db.run_query(&query))
            .await
            .map_err(|e| RetrievalError::from_display(table, e))?
            .map_err(|e| RetrievalError::from_display(table, e))
    }
}
