//! User preferences and the store that persists them.
//!
//! Preferences are loaded once when a command starts and every mutation is written back
//! immediately, so there is never a window where the in-memory `Settings` and `settings.json`
//! disagree.

use crate::model::Amount;
use crate::{utils, Result};
use anyhow::{ensure, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Categories offered to a new user.
pub const DEFAULT_CATEGORIES: &[&str] = &[
    "Alimentação",
    "Lazer",
    "Aluguel",
    "Transporte",
    "Saúde",
    "Salário",
    "Assinaturas",
    "Outros",
];

const DEFAULT_CURRENCY: &str = "BRL";

#[derive(
    Debug, Default, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    System,
    Light,
    Dark,
}

serde_plain::derive_display_from_serialize!(Theme);
serde_plain::derive_fromstr_from_deserialize!(Theme);

/// The preferences of the person using the ledger.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    theme: Theme,
    currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    budget_goal: Option<Amount>,
    month_start_day: u8,
    categories: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            currency: DEFAULT_CURRENCY.to_string(),
            budget_goal: None,
            month_start_day: 1,
            categories: DEFAULT_CATEGORIES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Settings {
    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn budget_goal(&self) -> Option<Amount> {
        self.budget_goal
    }

    pub fn month_start_day(&self) -> u8 {
        self.month_start_day
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }
}

/// Owns the `Settings` and the path of the file they live in.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
    settings: Settings,
}

impl SettingsStore {
    /// Loads `settings.json` from `path`. A missing file yields the default settings; a file that
    /// exists but cannot be parsed is an error.
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let settings = if path.is_file() {
            utils::deserialize(&path)
                .await
                .context("Unable to load the settings file")?
        } else {
            debug!("No settings at {}, using defaults", path.display());
            Settings::default()
        };
        Ok(Self { path, settings })
    }

    /// Writes the default settings to `path` and returns the store.
    pub(crate) async fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let store = Self {
            path: path.into(),
            settings: Settings::default(),
        };
        store.save().await?;
        Ok(store)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn set_theme(&mut self, theme: Theme) -> Result<()> {
        self.settings.theme = theme;
        self.save().await
    }

    pub async fn set_currency(&mut self, currency: &str) -> Result<()> {
        let currency = currency.trim().to_ascii_uppercase();
        ensure!(
            currency.len() == 3 && currency.chars().all(|c| c.is_ascii_alphabetic()),
            "A currency must be a three letter code such as BRL, got '{currency}'"
        );
        self.settings.currency = currency;
        self.save().await
    }

    pub async fn set_budget_goal(&mut self, goal: Option<Amount>) -> Result<()> {
        if let Some(goal) = goal {
            ensure!(!goal.is_negative(), "The budget goal cannot be negative");
        }
        self.settings.budget_goal = goal;
        self.save().await
    }

    pub async fn set_month_start_day(&mut self, day: u8) -> Result<()> {
        ensure!(
            (1..=28).contains(&day),
            "The month start day must be between 1 and 28, got {day}"
        );
        self.settings.month_start_day = day;
        self.save().await
    }

    /// Adds a category. Returns false, and writes nothing, if it already exists or is blank.
    pub async fn add_category(&mut self, name: &str) -> Result<bool> {
        let name = name.trim();
        if name.is_empty() || self.settings.categories.iter().any(|c| c == name) {
            return Ok(false);
        }
        self.settings.categories.push(name.to_string());
        self.save().await?;
        Ok(true)
    }

    /// Removes a category. Returns false, and writes nothing, if it was not present.
    pub async fn remove_category(&mut self, name: &str) -> Result<bool> {
        let before = self.settings.categories.len();
        self.settings.categories.retain(|c| c != name);
        if self.settings.categories.len() == before {
            return Ok(false);
        }
        self.save().await?;
        Ok(true)
    }

    async fn save(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.settings)
            .context("Unable to serialize settings")?;
        utils::write(&self.path, json)
            .await
            .context("Unable to write the settings file")
    }
}
