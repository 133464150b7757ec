//! Summary command handler.

use crate::api::{self, Mode};
use crate::args::SummaryArgs;
use crate::commands::{today, Out};
use crate::error::{ErrorType, IntoResult};
use crate::model::{SettingsStore, Summary};
use crate::{Config, Result};
use chrono::Datelike;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Totals one calendar month of the current user: income, expenses, balance, expenses by
/// category (largest first) and, when a budget goal is set, how much of it has been spent.
/// Month and year default to the current ones.
pub async fn summary(config: Config, mode: Mode, args: SummaryArgs) -> Result<Out<Summary>> {
    let now = today();
    let year = args.year.unwrap_or_else(|| now.year());
    let month = args.month.unwrap_or_else(|| now.month());

    let settings = SettingsStore::load(config.settings_path())
        .await
        .pub_result(ErrorType::Config)?;
    let settings = settings.settings();
    let mut store = api::store(&config, mode)
        .await
        .pub_result(ErrorType::Config)?;
    let records = store.fetch().await.pub_result(ErrorType::Store)?;
    let summary = Summary::for_month(&records, year, month, settings.budget_goal());

    let currency = settings.currency();
    let mut message = format!(
        "{month:02}/{year}\n  income:  {}\n  expense: {}\n  balance: {}",
        summary.income().to_currency_string(currency),
        summary.expense().to_currency_string(currency),
        summary.balance().to_currency_string(currency),
    );
    for category in summary.categories() {
        message.push_str(&format!(
            "\n  {:<16} {:>14} {:>6}",
            category.name(),
            category.total().to_currency_string(currency),
            percent(category.share()),
        ));
    }
    if let Some(budget) = summary.budget() {
        message.push_str(&format!(
            "\n  budget: {} of {} spent ({}), {} left",
            budget.spent().to_currency_string(currency),
            budget.goal().to_currency_string(currency),
            percent(budget.used()),
            budget.remaining().to_currency_string(currency),
        ));
    }
    Ok(Out::new(message, summary))
}

/// Formats a percentage such as `12.5` as `12.5%`.
fn percent(value: Decimal) -> String {
    format_num::format_num!(".1%", value.to_f64().unwrap_or_default() / 100.0)
}
