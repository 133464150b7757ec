//! Types that represent the core data model, such as `Transaction` and `Settings`.
mod amount;
mod settings;
mod summary;
mod transaction;

pub use amount::{Amount, AmountError};
pub use settings::{Settings, SettingsStore, Theme, DEFAULT_CATEGORIES};
pub use summary::{BudgetProgress, CategoryTotal, Summary};
pub use transaction::{Transaction, TransactionType};
