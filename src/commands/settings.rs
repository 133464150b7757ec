//! Settings command handlers.

use crate::args::SettingsSetArgs;
use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::model::{Settings, SettingsStore};
use crate::{Config, Result};
use anyhow::anyhow;
use tracing::debug;

async fn load(config: &Config) -> Result<SettingsStore> {
    SettingsStore::load(config.settings_path())
        .await
        .pub_result(ErrorType::Config)
}

fn describe(settings: &Settings) -> String {
    let budget_goal = match settings.budget_goal() {
        Some(goal) => goal.to_currency_string(settings.currency()),
        None => "not set".to_string(),
    };
    format!(
        "theme: {}\ncurrency: {}\nbudget goal: {}\nmonth start day: {}\ncategories: {}",
        settings.theme(),
        settings.currency(),
        budget_goal,
        settings.month_start_day(),
        settings.categories().join(", "),
    )
}

/// Prints the current preferences.
pub async fn settings_show(config: Config) -> Result<Out<Settings>> {
    let store = load(&config).await?;
    let settings = store.settings().clone();
    Ok(Out::new(describe(&settings), settings))
}

/// Changes every preference given in `args` and leaves the others alone.
///
/// # Errors
///
/// - Returns a request error if nothing was given or a value is out of range. Values are applied
///   in order, so the ones before an invalid value are already saved.
pub async fn settings_set(config: Config, args: SettingsSetArgs) -> Result<Out<Settings>> {
    let SettingsSetArgs {
        theme,
        currency,
        budget_goal,
        clear_budget_goal,
        month_start_day,
    } = args;
    if theme.is_none()
        && currency.is_none()
        && budget_goal.is_none()
        && !clear_budget_goal
        && month_start_day.is_none()
    {
        return request_error("Nothing to change, see --help".to_string());
    }

    let mut store = load(&config).await?;
    if let Some(theme) = theme {
        store.set_theme(theme).await.pub_result(ErrorType::Config)?;
    }
    if let Some(currency) = currency {
        store
            .set_currency(&currency)
            .await
            .pub_result(ErrorType::Request)?;
    }
    if clear_budget_goal {
        store
            .set_budget_goal(None)
            .await
            .pub_result(ErrorType::Config)?;
    } else if let Some(goal) = budget_goal {
        store
            .set_budget_goal(Some(goal))
            .await
            .pub_result(ErrorType::Request)?;
    }
    if let Some(day) = month_start_day {
        store
            .set_month_start_day(day)
            .await
            .pub_result(ErrorType::Request)?;
    }
    debug!("Saved settings to {}", store.path().display());

    let settings = store.settings().clone();
    Ok(Out::new(describe(&settings), settings))
}

/// Adds a category to the list offered when recording transactions.
pub async fn settings_add_category(config: Config, name: &str) -> Result<Out<Vec<String>>> {
    let mut store = load(&config).await?;
    let added = store.add_category(name).await.pub_result(ErrorType::Config)?;
    let message = if added {
        format!("Added category '{}'", name.trim())
    } else {
        format!("Category '{}' was not added, it is blank or already exists", name.trim())
    };
    Ok(Out::new(message, store.settings().categories().to_vec()))
}

/// Removes a category from the list. Transactions already recorded with it are not changed.
pub async fn settings_remove_category(config: Config, name: &str) -> Result<Out<Vec<String>>> {
    let mut store = load(&config).await?;
    if store.settings().categories().len() == 1
        && store.settings().categories().iter().any(|c| c == name)
    {
        return request_error(format!("'{name}' is the last category and cannot be removed"));
    }
    let removed = store
        .remove_category(name)
        .await
        .pub_result(ErrorType::Config)?;
    if !removed {
        return request_error(format!("There is no category named '{name}'"));
    }
    Ok(Out::new(
        format!("Removed category '{name}'"),
        store.settings().categories().to_vec(),
    ))
}

fn request_error<T>(message: String) -> Result<T> {
    Err(anyhow!(message)).pub_result(ErrorType::Request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::error_type;
    use crate::model::{Amount, Theme, DEFAULT_CATEGORIES};
    use crate::test::TestEnv;
    use std::str::FromStr;

    #[tokio::test]
    async fn test_show_defaults() {
        let env = TestEnv::new().await;
        let out = settings_show(env.config()).await.unwrap();
        let settings = out.structure().unwrap();
        assert_eq!(settings.currency(), "BRL");
        assert_eq!(settings.categories().len(), DEFAULT_CATEGORIES.len());
        assert!(out.message().contains("budget goal: not set"));
    }

    #[tokio::test]
    async fn test_set() {
        let env = TestEnv::new().await;
        let args = SettingsSetArgs {
            theme: Some(Theme::Dark),
            currency: Some("usd".to_string()),
            budget_goal: Some(Amount::from_str("1500").unwrap()),
            month_start_day: Some(5),
            ..SettingsSetArgs::default()
        };
        settings_set(env.config(), args).await.unwrap();

        let out = settings_show(env.config()).await.unwrap();
        let settings = out.structure().unwrap();
        assert_eq!(settings.theme(), Theme::Dark);
        assert_eq!(settings.currency(), "USD");
        assert_eq!(settings.budget_goal(), Some(Amount::from_str("1500").unwrap()));
        assert_eq!(settings.month_start_day(), 5);
        assert!(out.message().contains("$1,500.00"));

        let args = SettingsSetArgs {
            clear_budget_goal: true,
            ..SettingsSetArgs::default()
        };
        let out = settings_set(env.config(), args).await.unwrap();
        assert_eq!(out.structure().unwrap().budget_goal(), None);
    }

    #[tokio::test]
    async fn test_set_invalid() {
        let env = TestEnv::new().await;
        let err = settings_set(env.config(), SettingsSetArgs::default())
            .await
            .unwrap_err();
        assert_eq!(error_type(&err), Some(ErrorType::Request));

        let args = SettingsSetArgs {
            month_start_day: Some(31),
            ..SettingsSetArgs::default()
        };
        let err = settings_set(env.config(), args).await.unwrap_err();
        assert_eq!(error_type(&err), Some(ErrorType::Request));
    }

    #[tokio::test]
    async fn test_categories() {
        let env = TestEnv::new().await;
        let out = settings_add_category(env.config(), " Educação ").await.unwrap();
        assert_eq!(out.structure().unwrap().last().map(String::as_str), Some("Educação"));

        let out = settings_add_category(env.config(), "Educação").await.unwrap();
        assert!(out.message().contains("was not added"));

        let out = settings_remove_category(env.config(), "Lazer").await.unwrap();
        assert!(!out.structure().unwrap().iter().any(|c| c == "Lazer"));

        let err = settings_remove_category(env.config(), "Lazer")
            .await
            .unwrap_err();
        assert_eq!(error_type(&err), Some(ErrorType::Request));
    }
}
