use crate::api::{self, Mode};
use crate::args::ReportArgs;
use crate::commands::export::write_output;
use crate::commands::list::select;
use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::ledger::{export_report, ReportKind};
use crate::model::SettingsStore;
use crate::{Config, Result};
use std::path::PathBuf;
use tracing::debug;

/// Writes the transactions selected by `args.filter` to a one-sheet report, newest first, and
/// returns the path of the written file.
///
/// A filter with both month and year gives a monthly statement, which names the currency in its
/// amount header and shows `N/A` for a missing description. Anything else gives a full report.
pub async fn report(config: Config, mode: Mode, args: ReportArgs) -> Result<Out<PathBuf>> {
    let settings = SettingsStore::load(config.settings_path())
        .await
        .pub_result(ErrorType::Config)?;
    let mut store = api::store(&config, mode)
        .await
        .pub_result(ErrorType::Config)?;
    let mut records = store.fetch().await.pub_result(ErrorType::Store)?;
    select(&mut records, &args.filter);

    let kind = match (args.filter.year, args.filter.month) {
        (Some(year), Some(month)) => ReportKind::Statement { year, month },
        _ => ReportKind::Full,
    };
    debug!("Writing {kind:?} with {} records", records.len());
    let bytes = export_report(
        &records,
        kind,
        config.locale(),
        settings.settings().currency(),
    )?;
    let path = write_output(&config, args.output, &kind.file_name(), &bytes).await?;

    Ok(Out::new(
        format!(
            "Wrote {} transactions to {}",
            records.len(),
            path.display()
        ),
        path,
    ))
}
