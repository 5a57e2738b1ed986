// ABOUTME: SQLite-backed credential validator reading the auth_tokens table written by the login flow.
// ABOUTME: Validation is a single COUNT query; this layer never inserts or deletes tokens.

use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use ngxui_core::{Credential, CredentialValidator, ValidatorError};
use rusqlite::{Connection, params};
use thiserror::Error;

/// Errors that can occur while opening the token store.
#[derive(Debug, Error)]
pub enum TokenStoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Counts live session tokens in the application database.
///
/// The connection sits behind a mutex that is held for exactly one query, so
/// concurrent requests serialize only on the lookup itself.
pub struct SqliteTokenStore {
    conn: Mutex<Connection>,
}

impl SqliteTokenStore {
    /// Open or create the database at the given path and make sure the
    /// `auth_tokens` table exists so lookups on a fresh install return zero.
    pub fn open(path: &Path) -> Result<Self, TokenStoreError> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// In-memory store, mostly useful in tests.
    pub fn open_in_memory() -> Result<Self, TokenStoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, TokenStoreError> {
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS auth_tokens (
                token TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_auth_tokens_token ON auth_tokens (token);",
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Number of stored sessions for `token`.
    pub fn count(&self, token: &str) -> Result<i64, TokenStoreError> {
        let conn = self
            .conn
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let n = conn.query_row(
            "SELECT COUNT(*) FROM auth_tokens WHERE token = ?1",
            params![token],
            |row| row.get(0),
        )?;
        Ok(n)
    }
}

#[async_trait]
impl CredentialValidator for SqliteTokenStore {
    async fn validate(&self, credential: &Credential) -> Result<i64, ValidatorError> {
        self.count(credential.as_str()).map_err(|e| {
            tracing::error!("token lookup failed: {}", e);
            ValidatorError::Backend(e.to_string())
        })
    }
}
