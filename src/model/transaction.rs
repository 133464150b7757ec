use crate::model::Amount;
use serde::{Deserialize, Serialize};

/// Whether money came in or went out. The sign of a transaction lives here, never in `amount`.
#[derive(
    Debug, Default, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    Income,
    #[default]
    Expense,
}

serde_plain::derive_display_from_serialize!(TransactionType);
serde_plain::derive_fromstr_from_deserialize!(TransactionType);

/// A single row of the remote `transactions` table.
///
/// A transaction with `id == None` has never been persisted; sending it to the store creates a new
/// row. A transaction with an `id` overwrites the row with that id.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) id: Option<String>,
    #[serde(rename = "user_id", default)]
    pub(crate) owner: String,
    pub(crate) amount: Amount,
    /// Always `YYYY-MM-DD`. Kept as a string so that no time zone can shift the day.
    pub(crate) date: String,
    pub(crate) category: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub(crate) description: String,
    #[serde(rename = "type")]
    pub(crate) r#type: TransactionType,
    #[serde(default = "default_paid")]
    pub(crate) paid: bool,
}

fn default_paid() -> bool {
    true
}

/// The store returns `null` for descriptions that were never filled in.
fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl Transaction {
    pub fn new(
        amount: Amount,
        date: impl Into<String>,
        category: impl Into<String>,
        description: impl Into<String>,
        r#type: TransactionType,
        paid: bool,
    ) -> Self {
        Self {
            id: None,
            owner: String::new(),
            amount,
            date: date.into(),
            category: category.into(),
            description: description.into(),
            r#type,
            paid,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = owner.into();
        self
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn transaction_type(&self) -> TransactionType {
        self.r#type
    }

    pub fn paid(&self) -> bool {
        self.paid
    }

    pub fn is_income(&self) -> bool {
        self.r#type == TransactionType::Income
    }

    /// Splits `date` into `(year, month, day)` strings without validating them.
    pub(crate) fn date_parts(&self) -> (&str, &str, &str) {
        let mut parts = self.date.splitn(3, '-');
        let year = parts.next().unwrap_or_default();
        let month = parts.next().unwrap_or_default();
        let day = parts.next().unwrap_or_default();
        (year, month, day)
    }

    /// Returns `(year, month)` as numbers, or `None` when `date` is not `YYYY-MM-...`.
    pub(crate) fn year_month(&self) -> Option<(i32, u32)> {
        let (year, month, _) = self.date_parts();
        Some((year.parse().ok()?, month.parse().ok()?))
    }
}
