//! Import command handler.

use crate::api::{self, Mode};
use crate::args::ImportArgs;
use crate::backup::IMPORT_PRE;
use crate::commands::{today, Out};
use crate::error::{ErrorType, IntoResult};
use crate::ledger::import_workbook;
use crate::{utils, Config, Result};
use serde::Serialize;
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::{debug, info};

/// What an import did to the store.
#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    /// Rows read from the workbook and sent to the store.
    pub processed: usize,
    /// Rows whose id matched a stored transaction, which was overwritten.
    pub updated: usize,
    /// Rows without a known id, stored as new transactions.
    pub inserted: usize,
    /// The snapshot of the store taken before anything was written.
    pub backup: PathBuf,
}

/// Reads a spreadsheet and upserts every row into the store: rows that carry the id of a stored
/// transaction overwrite it, every other row becomes a new transaction. All rows are assigned to
/// the current user.
///
/// Before the upsert, the current records are saved as a JSON backup in the backups directory.
///
/// # Errors
///
/// - A file that cannot be read or is not a workbook fails with a workbook error and leaves the
///   store untouched.
pub async fn import(config: Config, mode: Mode, args: ImportArgs) -> Result<Out<ImportReport>> {
    let bytes = utils::read_bytes(&args.file)
        .await
        .pub_result(ErrorType::Workbook)?;
    let mut store = api::store(&config, mode)
        .await
        .pub_result(ErrorType::Config)?;
    let records = import_workbook(bytes, store.owner(), config.locale(), today())?;
    debug!(
        "Read {} rows from {}",
        records.len(),
        args.file.display()
    );

    let current = store.fetch().await.pub_result(ErrorType::Store)?;
    let backup = config
        .backup()
        .save_json(IMPORT_PRE, &current)
        .await
        .pub_result(ErrorType::Config)?;
    info!("Saved the current records to {}", backup.display());

    let known: HashSet<&str> = current.iter().filter_map(|t| t.id()).collect();
    let updated = records
        .iter()
        .filter(|t| t.id().is_some_and(|id| known.contains(id)))
        .count();
    let processed = store.upsert(&records).await.pub_result(ErrorType::Store)?;

    let report = ImportReport {
        processed,
        updated,
        inserted: processed.saturating_sub(updated),
        backup,
    };
    Ok(Out::new(
        format!("{processed} records processed"),
        report,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::error_type;
    use crate::ledger::{export_workbook, Locale};
    use crate::model::{Amount, Transaction, TransactionType};
    use crate::test::{transaction, TestEnv, TEST_USER};
    use std::str::FromStr;

    async fn write_workbook(env: &TestEnv, records: &[Transaction]) -> PathBuf {
        write_workbook_in(env, records, env.config().locale()).await
    }

    async fn write_workbook_in(env: &TestEnv, records: &[Transaction], locale: Locale) -> PathBuf {
        let bytes = export_workbook(records, locale, env.config().sheet_order()).unwrap();
        let path = env.scratch().join("import.xlsx");
        utils::write(&path, bytes).await.unwrap();
        path
    }

    #[tokio::test]
    async fn test_import_updates_and_inserts() {
        let env = TestEnv::new().await;
        let stored = transaction("a1", "50", "2024-03-05", "Transporte", TransactionType::Expense);
        let untouched = transaction("a2", "10", "2024-02-06", "Lazer", TransactionType::Expense);
        env.set_state(vec![stored.clone(), untouched.clone()]);

        let mut edited = stored.clone();
        edited.amount = Amount::from_str("75").unwrap();
        let new = Transaction::new(
            Amount::from_str("3000").unwrap(),
            "2024-03-01",
            "Salário",
            "",
            TransactionType::Income,
            true,
        );
        let file = write_workbook(&env, &[edited.clone(), new]).await;

        let out = import(env.config(), env.mode(), ImportArgs { file })
            .await
            .unwrap();
        assert_eq!(out.message(), "2 records processed");
        let report = out.structure().unwrap();
        assert_eq!((report.processed, report.updated, report.inserted), (2, 1, 1));

        let state = env.get_state();
        assert_eq!(state.len(), 3);
        assert_eq!(state.iter().find(|t| t.id() == Some("a1")), Some(&edited));
        assert!(state.contains(&untouched));
        let inserted = state
            .iter()
            .find(|t| t.category() == "Salário")
            .unwrap();
        assert!(inserted.id().is_some());
        assert_eq!(inserted.owner(), TEST_USER);
    }

    #[tokio::test]
    async fn test_import_portuguese_backup_into_english_home() {
        let env = TestEnv::with_locale(Locale::En).await;
        let stored = transaction("a1", "50", "2024-03-05", "Transporte", TransactionType::Income);
        let pending = Transaction {
            paid: false,
            ..transaction("a2", "12.5", "2024-02-10", "Lazer", TransactionType::Expense)
        };
        env.set_state(vec![stored.clone(), pending.clone()]);
        let file = write_workbook_in(&env, &[stored.clone(), pending.clone()], Locale::PtBr).await;

        let out = import(env.config(), env.mode(), ImportArgs { file })
            .await
            .unwrap();
        let report = out.structure().unwrap();
        assert_eq!((report.processed, report.updated, report.inserted), (2, 2, 0));

        let state = env.get_state();
        assert_eq!(state.len(), 2);
        assert!(state.contains(&stored));
        assert!(state.contains(&pending));
    }

    #[tokio::test]
    async fn test_import_saves_backup() {
        let env = TestEnv::new().await;
        let stored = transaction("a1", "50", "2024-03-05", "Transporte", TransactionType::Expense);
        env.set_state(vec![stored.clone()]);
        let file = write_workbook(&env, &[]).await;

        let out = import(env.config(), env.mode(), ImportArgs { file })
            .await
            .unwrap();
        let report = out.structure().unwrap();
        assert_eq!(report.processed, 0);
        assert!(report.backup.starts_with(env.config().backups()));

        let saved: Vec<Transaction> = utils::deserialize(&report.backup).await.unwrap();
        assert_eq!(saved, vec![stored.clone()]);
        assert_eq!(env.get_state(), vec![stored]);
    }

    #[tokio::test]
    async fn test_import_unreadable_file() {
        let env = TestEnv::new().await;
        let stored = transaction("a1", "50", "2024-03-05", "Transporte", TransactionType::Expense);
        env.set_state(vec![stored.clone()]);
        let file = env.scratch().join("notes.xlsx");
        utils::write(&file, "not a workbook").await.unwrap();

        let err = import(env.config(), env.mode(), ImportArgs { file })
            .await
            .unwrap_err();
        assert_eq!(error_type(&err), Some(ErrorType::Workbook));
        assert_eq!(env.get_state(), vec![stored]);

        let missing = env.scratch().join("missing.xlsx");
        let err = import(env.config(), env.mode(), ImportArgs { file: missing })
            .await
            .unwrap_err();
        assert_eq!(error_type(&err), Some(ErrorType::Workbook));
    }
}
