//! Update command handler.

use crate::api::{self, Mode};
use crate::args::UpdateArgs;
use crate::commands::insert::{check_amount, validate_date};
use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::model::Transaction;
use crate::{Config, Result};
use anyhow::anyhow;

/// Changes the transaction with `args.id`. Fields given in `args` replace the stored values, the
/// others are kept, and the whole record is written back.
///
/// # Errors
///
/// - Returns an error if no transaction of the current user has that id.
/// - Returns an error if a given field is invalid or the store rejects the write.
pub async fn update(config: Config, mode: Mode, args: UpdateArgs) -> Result<Out<Transaction>> {
    if let Some(amount) = args.amount {
        check_amount(amount).pub_result(ErrorType::Request)?;
    }
    let date = match &args.date {
        Some(date) => Some(validate_date(date).pub_result(ErrorType::Request)?),
        None => None,
    };

    let mut store = api::store(&config, mode)
        .await
        .pub_result(ErrorType::Config)?;
    let mut transaction = store
        .fetch()
        .await
        .pub_result(ErrorType::Store)?
        .into_iter()
        .find(|t| t.id() == Some(args.id.as_str()))
        .ok_or_else(|| anyhow!("No transaction with id '{}'", args.id))
        .pub_result(ErrorType::Request)?;

    if let Some(amount) = args.amount {
        transaction.amount = amount;
    }
    if let Some(date) = date {
        transaction.date = date;
    }
    if let Some(category) = args.category {
        transaction.category = category;
    }
    if let Some(description) = args.description {
        transaction.description = description;
    }
    if let Some(r#type) = args.r#type {
        transaction.r#type = r#type.into();
    }
    if let Some(paid) = args.paid {
        transaction.paid = paid;
    }

    let stored = store
        .update(&transaction)
        .await
        .pub_result(ErrorType::Store)?;
    Ok(Out::new(format!("Updated transaction {}", args.id), stored))
}
