//! Process-wide application state.
//!
//! Built once in `main`, wrapped in `Arc`, and treated as immutable for
//! the lifetime of the process. Each request opens its own SQLite
//! connection; there is no shared mutable state between requests.

use std::path::PathBuf;

use rusqlite::Connection;

use crate::auth::TokenSigner;
use crate::db::{self, DatabaseError};
use crate::ledger::LedgerClient;
use crate::storage::LocalBlobStore;

pub struct AppState {
    pub db_path: PathBuf,
    pub blobs: LocalBlobStore,
    pub ledger: LedgerClient,
    pub tokens: TokenSigner,
}

impl AppState {
    /// Open a database connection for one request.
    pub fn open_db(&self) -> Result<Connection, DatabaseError> {
        db::open_database(&self.db_path)
    }
}
