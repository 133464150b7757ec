//! Insert command handler.

use crate::api::{self, Mode};
use crate::args::InsertArgs;
use crate::commands::{today, Out};
use crate::error::{ErrorType, IntoResult};
use crate::model::{Amount, Transaction};
use crate::{Config, Result};
use anyhow::{ensure, Context};
use chrono::NaiveDate;

/// The category of a new transaction when none is given.
const DEFAULT_CATEGORY: &str = "Alimentação";

/// Records a new transaction for the current user. The store assigns its id, which is returned
/// along with the stored record.
///
/// Unset fields default to: today, `Alimentação`, no description, expense, paid.
///
/// # Errors
///
/// - Returns an error if the amount is negative or the date is not `YYYY-MM-DD`.
/// - Returns an error if the store rejects the record.
pub async fn insert(config: Config, mode: Mode, args: InsertArgs) -> Result<Out<Transaction>> {
    check_amount(args.amount).pub_result(ErrorType::Request)?;
    let date = match args.date {
        Some(date) => validate_date(&date).pub_result(ErrorType::Request)?,
        None => today().format("%Y-%m-%d").to_string(),
    };
    let transaction = Transaction::new(
        args.amount,
        date,
        args.category
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
        args.description.unwrap_or_default(),
        args.r#type.into(),
        !args.pending,
    );

    let mut store = api::store(&config, mode)
        .await
        .pub_result(ErrorType::Config)?;
    let stored = store
        .insert(&transaction)
        .await
        .pub_result(ErrorType::Store)?;

    let message = format!(
        "Inserted transaction with ID: {}",
        stored.id().unwrap_or_default()
    );
    Ok(Out::new(message, stored))
}

pub(super) fn check_amount(amount: Amount) -> Result<()> {
    ensure!(
        !amount.is_negative(),
        "The amount must not be negative, use --type to record income or expense"
    );
    Ok(())
}

/// Checks that `date` is a real `YYYY-MM-DD` date and returns it in that form.
pub(super) fn validate_date(date: &str) -> Result<String> {
    let parsed = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{date}', expected YYYY-MM-DD"))?;
    Ok(parsed.format("%Y-%m-%d").to_string())
}
