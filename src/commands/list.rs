use crate::api::{self, Mode};
use crate::args::ListArgs;
use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::model::{SettingsStore, Transaction};
use crate::{Config, Result};

/// Lists the transactions of the current user, newest first, narrowed by `args`.
///
/// - `search` matches the description or the category, ignoring case.
/// - `type` keeps only income or only expenses.
/// - `month` and `year` keep a single calendar month; `year` alone keeps a whole year.
///
/// The message holds one line per transaction with the amount in the configured currency.
pub async fn list(config: Config, mode: Mode, args: ListArgs) -> Result<Out<Vec<Transaction>>> {
    let settings = SettingsStore::load(config.settings_path())
        .await
        .pub_result(ErrorType::Config)?;
    let mut store = api::store(&config, mode)
        .await
        .pub_result(ErrorType::Config)?;
    let mut records = store.fetch().await.pub_result(ErrorType::Store)?;

    select(&mut records, &args);

    let currency = settings.settings().currency();
    let mut message = format!("Found {} transactions", records.len());
    for t in &records {
        let sign = if t.is_income() { "+" } else { "-" };
        let status = if t.paid() { "" } else { " (pending)" };
        message.push_str(&format!(
            "\n{}  {}{:>14}  {:<14}  {}{}  [{}]",
            t.date(),
            sign,
            t.amount().to_currency_string(currency),
            t.category(),
            t.description(),
            status,
            t.id().unwrap_or_default(),
        ));
    }
    Ok(Out::new(message, records))
}

/// Keeps the records that match `args`, newest first.
pub(super) fn select(records: &mut Vec<Transaction>, args: &ListArgs) {
    let search = args.search.as_deref().map(str::to_lowercase);
    records.retain(|t| {
        let text_ok = search.as_deref().map_or(true, |s| {
            t.description().to_lowercase().contains(s) || t.category().to_lowercase().contains(s)
        });
        let month_ok = match (args.year, args.month) {
            (Some(year), Some(month)) => t.year_month() == Some((year, month)),
            (Some(year), None) => t.year_month().is_some_and(|(y, _)| y == year),
            _ => true,
        };
        text_ok && month_ok && args.r#type.matches(t.transaction_type())
    });
    // Stable, so transactions on the same day keep the store's order.
    records.sort_by(|a, b| b.date().cmp(a.date()));
}
