#![forbid(unsafe_code)]

mod associations;
mod catalog;
mod error;
mod items;
mod ledger;
mod prune;
mod requests;
mod schema;
mod score;
mod types;
mod voting;

pub use error::StoreError;
pub use requests::*;
pub use types::*;

use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tv_core::{ItemId, RawSum, ScoreRule, TagId, UserId};

pub const DB_FILE_NAME: &str = "tagvote.db";
pub const DEFAULT_TAG_LIST_LIMIT: usize = 50;
pub const MAX_TAG_LIST_LIMIT: usize = 100;

const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone, Debug)]
pub struct StoreOptions {
    pub busy_timeout: Duration,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }
}

/// One connection to the shared tag-voting database.
///
/// Each execution context opens its own store; all coordination between contexts
/// happens inside SQLite transactions.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
    storage_dir: PathBuf,
    score_rule: Arc<dyn ScoreRule>,
}

impl SqliteStore {
    pub fn open(storage_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::open_with(storage_dir, StoreOptions::default())
    }

    pub fn open_with(
        storage_dir: impl AsRef<Path>,
        options: StoreOptions,
    ) -> Result<Self, StoreError> {
        let storage_dir = storage_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&storage_dir)?;

        let db_path = storage_dir.join(DB_FILE_NAME);
        let mut conn = Connection::open(db_path)?;
        conn.busy_timeout(options.busy_timeout)?;
        conn.execute_batch(
            "PRAGMA journal_mode=WAL;\n\
             PRAGMA synchronous=NORMAL;\n\
             PRAGMA foreign_keys = ON;",
        )?;

        // Gate and install share one writer lock so a concurrent opener never sees a
        // half-installed schema.
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        schema::preflight_gate(&tx)?;
        schema::install_schema(&tx)?;
        tx.commit()?;

        Ok(Self {
            conn,
            storage_dir,
            score_rule: Arc::new(RawSum),
        })
    }

    /// Replaces the rule used to fold ballots into a score. Defaults to [`RawSum`].
    pub fn with_score_rule(mut self, rule: Arc<dyn ScoreRule>) -> Self {
        self.score_rule = rule;
        self
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    pub fn db_path(&self) -> PathBuf {
        self.storage_dir.join(DB_FILE_NAME)
    }

    fn write_tx(&mut self) -> Result<Transaction<'_>, StoreError> {
        Ok(self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?)
    }
}

fn now_ms() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(duration) => duration,
        Err(_) => return 0,
    };

    i64::try_from(now.as_millis()).unwrap_or(i64::MAX)
}

fn to_sqlite_i64(value: usize) -> Result<i64, StoreError> {
    i64::try_from(value).map_err(|_| StoreError::InvalidInput("numeric overflow"))
}

fn item_id_from_row(value: i64) -> Result<ItemId, StoreError> {
    ItemId::try_new(value).map_err(|_| StoreError::InvalidInput("invalid item row"))
}

fn tag_id_from_row(value: i64) -> Result<TagId, StoreError> {
    TagId::try_new(value).map_err(|_| StoreError::InvalidInput("invalid tag row"))
}

fn user_id_from_row(value: i64) -> Result<UserId, StoreError> {
    UserId::try_new(value).map_err(|_| StoreError::InvalidInput("invalid vote row"))
}
