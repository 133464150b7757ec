//! The remote `transactions` table and the seam that lets the whole program run without it.
//!
//! `Store` is implemented by `RestStore`, which talks to a PostgREST-style table API, and by
//! `TestStore`, which keeps records in memory so the program can run top-to-bottom offline.

mod credentials;
mod rest_store;
mod test_store;

use crate::model::Transaction;
use crate::{Config, Result};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use credentials::Credentials;
pub use test_store::{TestStore, TestStoreState};

/// When this environment variable is set to a non-empty value, `Mode::from_env` returns
/// `Mode::Testing`.
pub const TEST_MODE_ENV: &str = "XMONEY_IN_TEST_MODE";

/// Whether to use the real remote table or the in-memory stand-in.
#[derive(
    Debug, Default, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Remote,
    Testing,
}

serde_plain::derive_display_from_serialize!(Mode);
serde_plain::derive_fromstr_from_deserialize!(Mode);

impl Mode {
    pub fn from_env() -> Self {
        match std::env::var(TEST_MODE_ENV) {
            Ok(value) if !value.is_empty() => Mode::Testing,
            _ => Mode::Remote,
        }
    }
}

/// The operations the ledger needs from the remote table. Every call is scoped to the owner the
/// store was created for.
#[async_trait::async_trait]
pub trait Store: Send {
    /// The user id that owns every record this store reads or writes.
    fn owner(&self) -> &str;

    /// All records of the owner, newest date first.
    async fn fetch(&mut self) -> Result<Vec<Transaction>>;

    /// Creates a record and returns it as stored, with its new id.
    async fn insert(&mut self, transaction: &Transaction) -> Result<Transaction>;

    /// Overwrites every field of the record with the same id.
    async fn update(&mut self, transaction: &Transaction) -> Result<Transaction>;

    /// Removes the record with `id`.
    async fn delete(&mut self, id: &str) -> Result<()>;

    /// Writes `records` in one request. Records with an id overwrite the stored record with that
    /// id, or are created with it if it is unknown; records without an id are created. Returns
    /// the number of records written.
    async fn upsert(&mut self, records: &[Transaction]) -> Result<usize>;
}

/// Creates the `Store` for `mode`, authenticated with the credentials found through `config`.
pub async fn store(config: &Config, mode: Mode) -> Result<Box<dyn Store>> {
    let credentials = Credentials::load(config.credentials_path())
        .await
        .context("Unable to load the credentials file")?;
    debug!("Opening the {mode} store for user {}", credentials.user_id());
    match mode {
        Mode::Remote => Ok(Box::new(rest_store::RestStore::new(
            config.api_url(),
            credentials,
        )?)),
        Mode::Testing => Ok(Box::new(TestStore::new(
            config.api_url(),
            credentials.user_id(),
        )?)),
    }
}
