//! DuckDB wallet store implementation

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Utc};
use duckdb::{params, Connection};
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::domain::result::{Error, Result};
use crate::domain::Wallet;
use crate::ports::WalletStore;
use crate::services::{MigrationResult, MigrationService};

/// Maximum number of attempts when the database file is locked
const MAX_RETRIES: u32 = 5;

/// Initial retry delay in milliseconds (doubles each retry: 50, 100, 200, 400ms)
const INITIAL_RETRY_DELAY_MS: u64 = 50;

/// Check if an error message indicates a file locking issue that should be retried
fn is_retryable_error(err_msg: &str) -> bool {
    let lower = err_msg.to_lowercase();
    // Windows error messages
    lower.contains("being used by another process")
        || lower.contains("cannot access the file")
        // Unix/macOS error messages
        || lower.contains("resource temporarily unavailable")
        || lower.contains("database is locked")
        || lower.contains("file is already open")
}

const SELECT_WALLET: &str = "SELECT wallet_id, owner_email, balance, created_at, updated_at
     FROM sys_wallets";

/// DuckDB-backed wallet store
pub struct DuckDbWalletStore {
    conn: Mutex<Connection>,
    db_path: Option<PathBuf>,
}

impl DuckDbWalletStore {
    /// Open (or create) the wallet database at `db_path`
    ///
    /// Retries with exponential backoff while another process holds the
    /// file lock. Does not touch the schema; call `ensure_schema` next.
    pub fn new(db_path: &Path) -> Result<Self> {
        let mut attempt = 0;
        loop {
            match Self::try_open_connection(db_path) {
                Ok(conn) => {
                    return Ok(Self {
                        conn: Mutex::new(conn),
                        db_path: Some(db_path.to_path_buf()),
                    });
                }
                Err(e) => {
                    let err_msg = e.to_string();
                    attempt += 1;
                    if !is_retryable_error(&err_msg) || attempt >= MAX_RETRIES {
                        return Err(e);
                    }
                    let delay = Duration::from_millis(INITIAL_RETRY_DELAY_MS * 2u64.pow(attempt - 1));
                    warn!(
                        attempt,
                        max = MAX_RETRIES,
                        delay_ms = delay.as_millis() as u64,
                        "wallet database busy, retrying: {}",
                        err_msg
                    );
                    thread::sleep(delay);
                }
            }
        }
    }

    /// Open a private in-memory database with the schema applied
    pub fn open_in_memory() -> Result<Self> {
        let config = duckdb::Config::default().enable_autoload_extension(false)?;
        let conn = Connection::open_in_memory_with_flags(config)?;
        let store = Self {
            conn: Mutex::new(conn),
            db_path: None,
        };
        store.ensure_schema()?;
        Ok(store)
    }

    fn try_open_connection(db_path: &Path) -> Result<Connection> {
        // Extension autoloading stays off; nothing here needs extensions
        let config = duckdb::Config::default().enable_autoload_extension(false)?;
        Ok(Connection::open_with_flags(db_path, config)?)
    }

    /// Database file path, `None` for in-memory stores
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| Error::database(format!("Lock poisoned: {}", e)))
    }

    /// Run database migrations
    pub fn run_migrations(&self) -> Result<MigrationResult> {
        let conn = self.lock()?;
        let migration_service = MigrationService::new(&conn);
        let pending = migration_service.get_pending()?;
        if !pending.is_empty() {
            debug!(?pending, "applying wallet schema migrations");
        }
        migration_service.run_pending()
    }

    /// Ensure database schema exists (runs pending migrations)
    pub fn ensure_schema(&self) -> Result<()> {
        self.run_migrations()?;
        Ok(())
    }

    /// Number of stored wallets
    pub fn count(&self) -> Result<i64> {
        let conn = self.lock()?;
        let count = conn.query_row("SELECT COUNT(*) FROM sys_wallets", [], |row| row.get(0))?;
        Ok(count)
    }

    fn row_to_wallet(row: &duckdb::Row) -> duckdb::Result<(String, String, String, String, String)> {
        // 0: wallet_id, 1: owner_email, 2: balance, 3: created_at, 4: updated_at
        Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
    }
}

impl WalletStore for DuckDbWalletStore {
    fn save(&self, wallet: Wallet) -> Result<Wallet> {
        let conn = self.lock()?;
        let balance = wallet.balance().to_string();

        // Update first; the owner and creation time never change after insert
        let updated = conn.execute(
            "UPDATE sys_wallets
             SET balance = ?, updated_at = ?
             WHERE wallet_id = ?",
            params![balance, wallet.updated_at().to_rfc3339(), wallet.id()],
        )?;

        if updated == 0 {
            conn.execute(
                "INSERT INTO sys_wallets (wallet_id, owner_email, balance, created_at, updated_at)
                 VALUES (?, ?, ?, ?, ?)",
                params![
                    wallet.id(),
                    wallet.owner_email(),
                    balance,
                    wallet.created_at().to_rfc3339(),
                    wallet.updated_at().to_rfc3339(),
                ],
            )?;
        }

        Ok(wallet)
    }

    fn find_by_id(&self, id: &str) -> Result<Option<Wallet>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!("{} WHERE wallet_id = ?", SELECT_WALLET))?;
        let mut rows = stmt.query_map([id], Self::row_to_wallet)?;

        let Some(row) = rows.next() else {
            return Ok(None);
        };
        let (wallet_id, owner_email, balance, created_at, updated_at) = row?;

        let balance = Decimal::from_str(balance.trim())
            .map_err(|e| Error::database(format!("corrupt balance for wallet {}: {}", wallet_id, e)))?;

        Ok(Some(Wallet::restore(
            wallet_id,
            owner_email,
            balance,
            parse_timestamp(&created_at)?,
            parse_timestamp(&updated_at)?,
        )))
    }

    fn exists_by_owner_email(&self, email: &str) -> Result<bool> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM sys_wallets WHERE owner_email = ?",
            [email],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::database(format!("corrupt timestamp '{}': {}", s, e)))
}
