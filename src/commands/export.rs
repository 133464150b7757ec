//! Export command handler.

use crate::api::{self, Mode};
use crate::args::ExportArgs;
use crate::commands::{today, Out};
use crate::error::{ErrorType, IntoResult};
use crate::ledger::{export_workbook, file_name};
use crate::{utils, Config, Result};
use std::path::PathBuf;
use tracing::debug;

/// Writes every transaction of the current user to a spreadsheet with one sheet per month.
/// Returns the path of the written file.
///
/// `args.output` may name a file or an existing directory. A directory, or no output at all
/// (which means `$XMONEY_HOME`), gets a file named `XMONEY_BACKUP_DD-MM-YYYY.xlsx`.
pub async fn export(config: Config, mode: Mode, args: ExportArgs) -> Result<Out<PathBuf>> {
    let mut store = api::store(&config, mode)
        .await
        .pub_result(ErrorType::Config)?;
    let records = store.fetch().await.pub_result(ErrorType::Store)?;
    debug!("Exporting {} records", records.len());

    let bytes = export_workbook(&records, config.locale(), config.sheet_order())?;
    let path = write_output(&config, args.output, &file_name(today()), &bytes).await?;

    Ok(Out::new(
        format!(
            "Exported {} transactions to {}",
            records.len(),
            path.display()
        ),
        path,
    ))
}

/// Writes `bytes` to `output`, or to `default_name` inside it when `output` is a directory, or
/// inside `$XMONEY_HOME` when there is no output. Returns the written path.
pub(super) async fn write_output(
    config: &Config,
    output: Option<PathBuf>,
    default_name: &str,
    bytes: &[u8],
) -> Result<PathBuf> {
    let path = match output {
        Some(path) if !path.is_dir() => path,
        Some(dir) => dir.join(default_name),
        None => config.root().join(default_name),
    };

    // Written beside the target, then moved into place.
    let partial = path.with_extension("xlsx.partial");
    utils::write(&partial, bytes)
        .await
        .pub_result(ErrorType::Workbook)?;
    utils::rename(&partial, &path)
        .await
        .pub_result(ErrorType::Workbook)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::error_type;
    use crate::ledger::import_workbook;
    use crate::model::TransactionType;
    use crate::test::{transaction, TestEnv, TEST_USER};

    #[tokio::test]
    async fn test_export_to_directory() {
        let env = TestEnv::new().await;
        env.set_state(vec![
            transaction("a1", "50", "2024-03-05", "Transporte", TransactionType::Expense),
            transaction("a2", "2000", "2024-02-01", "Salário", TransactionType::Income),
        ]);
        let args = ExportArgs {
            output: Some(env.scratch().to_path_buf()),
        };
        let out = export(env.config(), env.mode(), args).await.unwrap();
        let path = out.structure().unwrap();
        assert_eq!(path, &env.scratch().join(file_name(today())));
        assert!(out.message().starts_with("Exported 2 transactions"));

        let bytes = utils::read_bytes(path).await.unwrap();
        let records = import_workbook(bytes, TEST_USER, env.config().locale(), today()).unwrap();
        let mut ids: Vec<_> = records.iter().filter_map(|t| t.id()).collect();
        ids.sort();
        assert_eq!(ids, vec!["a1", "a2"]);
        assert!(!path.with_extension("xlsx.partial").exists());
    }

    #[tokio::test]
    async fn test_export_to_file_and_default() {
        let env = TestEnv::new().await;
        let file = env.scratch().join("ledger.xlsx");
        let args = ExportArgs {
            output: Some(file.clone()),
        };
        let out = export(env.config(), env.mode(), args).await.unwrap();
        assert_eq!(out.structure(), Some(&file));
        assert!(file.is_file());

        let out = export(env.config(), env.mode(), ExportArgs::default())
            .await
            .unwrap();
        let path = out.structure().unwrap();
        assert_eq!(path.parent(), Some(env.config().root()));
        assert!(path.is_file());
    }

    #[tokio::test]
    async fn test_export_to_missing_directory() {
        let env = TestEnv::new().await;
        let args = ExportArgs {
            output: Some(env.scratch().join("nope").join("ledger.xlsx")),
        };
        let err = export(env.config(), env.mode(), args).await.unwrap_err();
        assert_eq!(error_type(&err), Some(ErrorType::Workbook));
    }
}
