//! Backing table manager.
//!
//! The accounts table is a hash-key table named `<prefix>_users`: one row
//! per account, keyed on `uid`, with four further string attributes
//! (`key`, `info`, `logs`, `enabled`). It is rendered over SQLite here,
//! but all access goes through [`AccountTable`]'s item operations
//! (`put_item` / `get_item` / `scan`) so the engine stays swappable.
//!
//! The [`rusqlite::Connection`] sits behind an `Arc<Mutex<>>` and every
//! call dispatches onto the blocking thread pool via
//! `tokio::task::spawn_blocking`, keeping the async runtime unblocked.
//! Reads are strongly consistent: a `get_item` always reflects the most
//! recent `put_item`.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use rusqlite::Connection;
use tracing::{debug, error, info};

use crate::config::{StoreConfig, StoreLocation};
use crate::error::{AccountError, AccountResult};

/// Suffix appended to the configured prefix to form the table name.
const TABLE_SUFFIX: &str = "users";

/// Interval between table-status polls during [`AccountTable::attach`].
const ACTIVE_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// One stored account record, exactly as it sits in the table: the hash
/// key plus four string attributes.
///
/// `info` and `logs` are JSON blobs; `enabled` is `"1"` or `"0"`. The
/// codec module is the only place that interprets them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountItem {
    /// Hash key: the account id.
    pub uid: String,
    /// Credential digest.
    pub key: String,
    /// Public-fields JSON blob.
    pub info: String,
    /// Activity-log JSON blob.
    pub logs: String,
    /// Enabled flag, `"1"` or `"0"`.
    pub enabled: String,
}

/// Thread-safe handle to the accounts table.
#[derive(Clone)]
pub struct AccountTable {
    conn: Arc<Mutex<Connection>>,
    name: String,
}

impl AccountTable {
    /// Attach to the accounts table, creating it if it does not exist.
    ///
    /// After issuing the create, polls the table status once per second
    /// until it reports active, logging each pending or failed check.
    /// There is no timeout and no retry ceiling: on persistent failure
    /// this blocks store initialization indefinitely.
    pub async fn attach(config: &StoreConfig) -> AccountResult<Self> {
        let name = format!("{}_{}", config.prefix, TABLE_SUFFIX);
        let location = config.location.clone();

        let conn = tokio::task::spawn_blocking(move || -> AccountResult<Connection> {
            let conn = match &location {
                StoreLocation::Disk(path) => {
                    info!(path = %path.display(), "opening backing database");
                    Connection::open(path)?
                }
                StoreLocation::Memory => {
                    debug!("opening in-memory backing database");
                    Connection::open_in_memory()?
                }
            };
            apply_pragmas(&conn)?;
            Ok(conn)
        })
        .await??;

        let table = Self {
            conn: Arc::new(Mutex::new(conn)),
            name,
        };
        table.ensure_active().await;

        Ok(table)
    }

    /// The derived table name, `<prefix>_users`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Store one full account item, overwriting any existing row with
    /// the same `uid`. There is no partial/field-level update.
    pub async fn put_item(&self, item: AccountItem) -> AccountResult<()> {
        let sql = format!(
            r#"INSERT OR REPLACE INTO "{}" (uid, "key", info, logs, enabled)
               VALUES (?1, ?2, ?3, ?4, ?5)"#,
            self.name
        );
        self.execute(move |conn| {
            conn.execute(
                &sql,
                rusqlite::params![item.uid, item.key, item.info, item.logs, item.enabled],
            )
            .map_err(|e| AccountError::PersistFailed(e.to_string()))?;
            Ok(())
        })
        .await
    }

    /// Strongly-consistent read of one item by raw `uid`.
    pub async fn get_item(&self, uid: &str) -> AccountResult<Option<AccountItem>> {
        let sql = format!(
            r#"SELECT uid, "key", info, logs, enabled FROM "{}" WHERE uid = ?1"#,
            self.name
        );
        let uid = uid.to_string();
        self.execute(move |conn| {
            let result = conn.query_row(&sql, rusqlite::params![uid], |row| {
                Ok(AccountItem {
                    uid: row.get(0)?,
                    key: row.get(1)?,
                    info: row.get(2)?,
                    logs: row.get(3)?,
                    enabled: row.get(4)?,
                })
            });
            match result {
                Ok(item) => Ok(Some(item)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(AccountError::Sqlite(e)),
            }
        })
        .await
    }

    /// Unbounded, unpaginated scan of every item in the table.
    pub async fn scan(&self) -> AccountResult<Vec<AccountItem>> {
        let sql = format!(
            r#"SELECT uid, "key", info, logs, enabled FROM "{}""#,
            self.name
        );
        self.execute(move |conn| {
            let mut stmt = conn.prepare(&sql)?;
            let items = stmt
                .query_map([], |row| {
                    Ok(AccountItem {
                        uid: row.get(0)?,
                        key: row.get(1)?,
                        info: row.get(2)?,
                        logs: row.get(3)?,
                        enabled: row.get(4)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(items)
        })
        .await
    }

    /// Drop the table. Administrative/test use only; every account row
    /// is lost.
    pub async fn delete_table(&self) -> AccountResult<()> {
        let sql = format!(r#"DROP TABLE IF EXISTS "{}""#, self.name);
        let name = self.name.clone();
        self.execute(move |conn| {
            conn.execute_batch(&sql)?;
            info!(table = %name, "table dropped");
            Ok(())
        })
        .await
    }

    /// Whether the table currently exists and is queryable.
    pub async fn is_active(&self) -> AccountResult<bool> {
        let name = self.name.clone();
        self.execute(move |conn| {
            let count: i64 = conn.query_row(
                "SELECT count(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                rusqlite::params![name],
                |row| row.get(0),
            )?;
            Ok(count > 0)
        })
        .await
    }

    // ── lifecycle internals ──────────────────────────────────────────

    /// Create the table if missing, then poll until it reports active.
    async fn ensure_active(&self) {
        loop {
            if let Err(err) = self.create_if_missing().await {
                error!(table = %self.name, %err, "table creation failed");
            }

            match self.is_active().await {
                Ok(true) => {
                    info!(table = %self.name, "table active");
                    return;
                }
                Ok(false) => {
                    debug!(table = %self.name, "waiting for active table");
                }
                Err(err) => {
                    error!(table = %self.name, %err, "table status check failed");
                }
            }

            tokio::time::sleep(ACTIVE_POLL_INTERVAL).await;
        }
    }

    async fn create_if_missing(&self) -> AccountResult<()> {
        let sql = format!(
            r#"CREATE TABLE IF NOT EXISTS "{}" (
                uid     TEXT PRIMARY KEY,
                "key"   TEXT NOT NULL,
                info    TEXT NOT NULL,
                logs    TEXT NOT NULL,
                enabled TEXT NOT NULL
            )"#,
            self.name
        );
        self.execute(move |conn| {
            conn.execute_batch(&sql)?;
            Ok(())
        })
        .await
    }

    /// Run a closure against the connection on the blocking pool.
    async fn execute<F, T>(&self, f: F) -> AccountResult<T>
    where
        F: FnOnce(&Connection) -> AccountResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|e| AccountError::TaskJoin(format!("mutex poisoned: {e}")))?;
            f(&conn)
        })
        .await?
    }
}

/// Apply pragmas to a fresh connection.
fn apply_pragmas(conn: &Connection) -> AccountResult<()> {
    // WAL mode: concurrent readers, non-blocking writes.
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    // Concurrent writers wait instead of failing immediately.
    conn.pragma_update(None, "busy_timeout", 5_000_i32)?;
    Ok(())
}

// ── tests ────────────────────────────────────────────────────────────
