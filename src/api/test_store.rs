//! Implements the `Store` trait with in-memory data for testing purposes.
//!
//! Note: this is compiled even in the "production" version of this app so that we can run the whole
//! app, top-to-bottom, without a remote table.

use crate::api::Store;
use crate::model::Transaction;
use crate::Result;
use anyhow::{bail, Context};
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::{Mutex, OnceLock};
use tracing::trace;
use uuid::Uuid;

/// The records held for one test table.
pub type TestStoreState = Vec<Transaction>;

/// Every test table in this process, keyed by the API URL it stands in for.
fn tables() -> &'static Mutex<HashMap<String, TestStoreState>> {
    static TABLES: OnceLock<Mutex<HashMap<String, TestStoreState>>> = OnceLock::new();
    TABLES.get_or_init(|| Mutex::new(HashMap::new()))
}

/// An implementation of `Store` that does not leave the process. Stores created for the same key
/// share their records. A key seen for the first time is seeded with a few records owned by the
/// store's owner.
pub struct TestStore {
    key: String,
    owner: String,
}

impl TestStore {
    pub fn new(key: impl Into<String>, owner: impl Into<String>) -> Result<Self> {
        let key = key.into();
        let owner = owner.into();
        let mut tables = lock();
        if !tables.contains_key(&key) {
            let seed = seed_data(SEED_DATA, &owner)?;
            tables.insert(key.clone(), seed);
        }
        drop(tables);
        Ok(Self { key, owner })
    }

    /// A copy of every record in this table, of any owner.
    pub fn get_state(&self) -> TestStoreState {
        lock().get(&self.key).cloned().unwrap_or_default()
    }

    /// Replaces every record in this table.
    pub fn set_state(&self, state: TestStoreState) {
        lock().insert(self.key.clone(), state);
    }

    fn with_table<T>(&self, f: impl FnOnce(&mut TestStoreState) -> T) -> T {
        let mut tables = lock();
        let table = tables.entry(self.key.clone()).or_default();
        f(table)
    }
}

/// A panic while holding the lock cannot leave a table half-written, so a poisoned lock is reused.
fn lock() -> std::sync::MutexGuard<'static, HashMap<String, TestStoreState>> {
    tables()
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

#[async_trait::async_trait]
impl Store for TestStore {
    fn owner(&self) -> &str {
        &self.owner
    }

    async fn fetch(&mut self) -> Result<Vec<Transaction>> {
        let owner = self.owner.clone();
        let mut records: Vec<Transaction> = self.with_table(|table| {
            table
                .iter()
                .filter(|t| t.owner() == owner)
                .cloned()
                .collect()
        });
        records.sort_by(|a, b| b.date().cmp(a.date()));
        trace!("Fetched {} records", records.len());
        Ok(records)
    }

    async fn insert(&mut self, transaction: &Transaction) -> Result<Transaction> {
        let mut stored = transaction.clone().with_owner(self.owner.as_str());
        stored.id = Some(new_id());
        let out = stored.clone();
        self.with_table(|table| table.push(stored));
        Ok(out)
    }

    async fn update(&mut self, transaction: &Transaction) -> Result<Transaction> {
        let id = transaction
            .id()
            .context("Cannot update a transaction that has no id")?;
        let stored = transaction.clone().with_owner(self.owner.as_str());
        let owner = self.owner.clone();
        let found = self.with_table(|table| {
            match table
                .iter_mut()
                .find(|t| t.id() == Some(id) && t.owner() == owner)
            {
                Some(existing) => {
                    *existing = stored.clone();
                    true
                }
                None => false,
            }
        });
        if !found {
            bail!("No transaction with id '{id}'");
        }
        Ok(stored)
    }

    async fn delete(&mut self, id: &str) -> Result<()> {
        let owner = self.owner.clone();
        let removed = self.with_table(|table| {
            let before = table.len();
            table.retain(|t| !(t.id() == Some(id) && t.owner() == owner));
            before - table.len()
        });
        if removed == 0 {
            bail!("No transaction with id '{id}'");
        }
        Ok(())
    }

    async fn upsert(&mut self, records: &[Transaction]) -> Result<usize> {
        let owner = self.owner.clone();
        self.with_table(|table| {
            for id in records.iter().filter_map(Transaction::id) {
                if table.iter().any(|t| t.id() == Some(id) && t.owner() != owner) {
                    bail!("Transaction '{id}' belongs to another user");
                }
            }
            for record in records {
                let mut stored = record.clone().with_owner(owner.as_str());
                let existing = stored
                    .id()
                    .and_then(|id| table.iter().position(|t| t.id() == Some(id)));
                match existing {
                    Some(ix) => table[ix] = stored,
                    None => {
                        if stored.id.is_none() {
                            stored.id = Some(new_id());
                        }
                        table.push(stored);
                    }
                }
            }
            Ok(records.len())
        })
    }
}

/// Parses the seed records in `csv` and gives them to `owner`.
fn seed_data(csv: &str, owner: &str) -> Result<TestStoreState> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(Cursor::new(csv.as_bytes()));
    let mut records = Vec::new();
    for result in reader.deserialize::<Transaction>() {
        let record = result.context("Invalid seed record")?;
        records.push(record.with_owner(owner));
    }
    Ok(records)
}

/// Seed transaction data.
const SEED_DATA: &str = r##"id,date,amount,category,description,type,paid
seed-001,2024-03-05,50.00,Transporte,,EXPENSE,true
seed-002,2024-03-02,1200.00,Aluguel,Março,EXPENSE,true
seed-003,2024-03-01,5000.00,Salário,Empresa,INCOME,true
seed-004,2024-02-25,89.90,Lazer,Cinema e jantar,EXPENSE,false
seed-005,2024-02-20,2000.00,Salário,Pagamento,INCOME,true
seed-006,2024-02-11,39.90,Assinaturas,Streaming,EXPENSE,true
seed-007,2024-02-03,312.47,Alimentação,Mercado,EXPENSE,true
"##;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Amount, TransactionType};
    use std::str::FromStr;

    fn key() -> String {
        format!("test://{}", new_id())
    }

    fn t(amount: &str, date: &str) -> Transaction {
        Transaction::new(
            Amount::from_str(amount).unwrap(),
            date,
            "Lazer",
            "",
            TransactionType::Expense,
            true,
        )
    }

    #[test]
    fn test_seed_data() {
        let records = seed_data(SEED_DATA, "u-1").unwrap();
        assert_eq!(records.len(), 7);
        assert!(records.iter().all(|t| t.owner() == "u-1" && t.id().is_some()));
        assert_eq!(records[0].description(), "");
        assert!(!records[3].paid());
        assert_eq!(records[2].transaction_type(), TransactionType::Income);
    }

    #[test]
    fn test_malformed_seed_is_an_error() {
        let csv = "id,date,amount,category,description,type,paid\nx,2024-03-05,fifty,Lazer,,EXPENSE,true\n";
        let err = seed_data(csv, "u-1").unwrap_err();
        assert!(err.to_string().contains("Invalid seed record"));
    }

    #[tokio::test]
    async fn test_new_key_is_seeded_once() {
        let key = key();
        let mut store = TestStore::new(&key, "u-1").unwrap();
        assert_eq!(store.fetch().await.unwrap().len(), 7);
        store.set_state(Vec::new());
        let mut again = TestStore::new(&key, "u-1").unwrap();
        assert!(again.fetch().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_insert_update_delete() {
        let mut store = TestStore::new(key(), "u-1").unwrap();
        store.set_state(Vec::new());

        let stored = store.insert(&t("10", "2024-01-01")).await.unwrap();
        let id = stored.id().unwrap().to_string();
        assert_eq!(stored.owner(), "u-1");

        let mut changed = stored.clone();
        changed.amount = Amount::from_str("20").unwrap();
        store.update(&changed).await.unwrap();
        let records = store.fetch().await.unwrap();
        assert_eq!(records, vec![changed]);

        store.delete(&id).await.unwrap();
        assert!(store.fetch().await.unwrap().is_empty());
        assert!(store.delete(&id).await.is_err());
        assert!(store.update(&stored).await.is_err());
    }

    #[tokio::test]
    async fn test_owners_are_isolated() {
        let key = key();
        let mut alice = TestStore::new(&key, "alice").unwrap();
        alice.set_state(Vec::new());
        let mut bob = TestStore::new(&key, "bob").unwrap();
        let stored = alice.insert(&t("10", "2024-01-01")).await.unwrap();
        assert!(bob.fetch().await.unwrap().is_empty());
        assert!(bob.delete(stored.id().unwrap()).await.is_err());
        assert!(bob.upsert(&[stored]).await.is_err());
    }

    #[tokio::test]
    async fn test_upsert_updates_known_ids_and_inserts_the_rest() {
        let mut store = TestStore::new(key(), "u-1").unwrap();
        store.set_state(vec![t("10", "2024-01-01").with_id("a1").with_owner("u-1")]);

        let records = vec![
            t("15", "2024-01-01").with_id("a1"),
            t("30", "2024-01-02"),
            t("40", "2024-01-03").with_id("from-another-ledger"),
        ];
        assert_eq!(store.upsert(&records).await.unwrap(), 3);

        let state = store.get_state();
        assert_eq!(state.len(), 3);
        let a1 = state.iter().find(|t| t.id() == Some("a1")).unwrap();
        assert_eq!(a1.amount(), Amount::from_str("15").unwrap());
        assert!(state.iter().any(|t| t.id() == Some("from-another-ledger")));
        assert!(state.iter().all(|t| t.id().is_some() && t.owner() == "u-1"));
    }

    #[tokio::test]
    async fn test_fetch_is_newest_first() {
        let mut store = TestStore::new(key(), "u-1").unwrap();
        store.set_state(vec![
            t("1", "2024-01-01").with_owner("u-1"),
            t("2", "2024-03-01").with_owner("u-1"),
            t("3", "2024-02-01").with_owner("u-1"),
        ]);
        let dates: Vec<String> = store
            .fetch()
            .await
            .unwrap()
            .iter()
            .map(|t| t.date().to_string())
            .collect();
        assert_eq!(dates, vec!["2024-03-01", "2024-02-01", "2024-01-01"]);
    }
}
