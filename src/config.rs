//! Configuration file handling for xmoney.
//!
//! The configuration file is stored at `$XMONEY_HOME/config.json` and contains the URL of the
//! remote table API, backup settings, workbook preferences and the path of the credentials file.

use crate::api::Credentials;
use crate::backup::Backup;
use crate::ledger::{Locale, SheetOrder};
use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

const APP_NAME: &str = "xmoney";
const CONFIG_VERSION: u8 = 1;
const BACKUP_COPIES: u32 = 5;
const SECRETS: &str = ".secrets";
const BACKUPS: &str = ".backups";
const CREDENTIALS_JSON: &str = "credentials.json";
const CONFIG_JSON: &str = "config.json";
const SETTINGS_JSON: &str = "settings.json";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$XMONEY_HOME` and from there it loads `$XMONEY_HOME/config.json`. It provides
/// paths to other items that are either configurable or are expected in a certain location within
/// the home directory.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    backups: PathBuf,
    secrets: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
}

impl Config {
    /// Creates the data directory, its subdirectories and:
    /// - Creates an initial `config.json` file using `api_url` along with default settings
    /// - Moves `credentials_file` into `.secrets/credentials.json`, readable by the owner only.
    ///
    /// # Errors
    /// - Returns an error if `api_url` is not a URL or the credentials file is invalid.
    /// - Returns an error if any file operations fail.
    pub async fn create(
        dir: impl Into<PathBuf>,
        credentials_file: &Path,
        api_url: &str,
        locale: Locale,
        sheet_order: SheetOrder,
    ) -> Result<Self> {
        Url::parse(api_url).with_context(|| format!("Invalid API URL '{api_url}'"))?;
        let credentials = Credentials::load(credentials_file)
            .await
            .context("Unable to read the credentials file")?;

        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the xmoney home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let backups = root.join(BACKUPS);
        utils::make_dir(&backups).await?;
        let secrets = root.join(SECRETS);
        utils::make_dir(&secrets).await?;

        let config_file = ConfigFile {
            api_url: api_url.trim_end_matches('/').to_string(),
            locale,
            sheet_order,
            ..ConfigFile::default()
        };
        let config = Self {
            config_path: root.join(CONFIG_JSON),
            root,
            backups,
            secrets,
            config_file,
        };

        credentials.save(config.credentials_path()).await?;
        if utils::canonicalize(credentials_file).await? != config.credentials_path() {
            utils::remove(credentials_file).await?;
        }
        config.config_file.save(&config.config_path).await?;
        Ok(config)
    }

    /// This will
    /// - validate that `xmoney_home` exists and that the config file exists
    /// - load the config file
    /// - validate that the backups and secrets directories exist
    /// - return the loaded configuration object
    pub async fn load(xmoney_home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = xmoney_home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("xmoney home is missing, run 'xmoney init' first")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;

        let config = Self {
            backups: root.join(BACKUPS),
            secrets: root.join(SECRETS),
            root,
            config_path,
            config_file,
        };
        if !config.backups.is_dir() {
            bail!(
                "The backups directory is missing '{}'",
                config.backups.display()
            )
        }
        if !config.secrets.is_dir() {
            bail!(
                "The secrets directory is missing '{}'",
                config.secrets.display()
            )
        }
        Ok(config)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn backups(&self) -> &Path {
        &self.backups
    }

    pub fn secrets(&self) -> &Path {
        &self.secrets
    }

    pub fn api_url(&self) -> &str {
        &self.config_file.api_url
    }

    pub fn backup_copies(&self) -> u32 {
        self.config_file.backup_copies
    }

    pub fn locale(&self) -> Locale {
        self.config_file.locale
    }

    pub fn sheet_order(&self) -> SheetOrder {
        self.config_file.sheet_order
    }

    pub fn settings_path(&self) -> PathBuf {
        self.root.join(SETTINGS_JSON)
    }

    /// Creates a new `Backup` instance for managing backup files.
    pub fn backup(&self) -> Backup {
        Backup::new(self)
    }

    /// Returns the stored `credentials_path` if it is absolute, otherwise resolves it against the
    /// home directory.
    pub fn credentials_path(&self) -> PathBuf {
        let p = self.config_file.credentials_path();
        if p.is_absolute() {
            return p;
        }
        self.root.join(p)
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "xmoney",
///   "config_version": 1,
///   "api_url": "https://abcdefghijklmnop.supabase.co",
///   "backup_copies": 5,
///   "locale": "pt-br",
///   "sheet_order": "chronological",
///   "credentials_path": ".secrets/credentials.json"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "xmoney"
    app_name: String,

    config_version: u8,

    /// Base URL of the hosted project; the table lives at `{api_url}/rest/v1/transactions`
    api_url: String,

    /// Number of backup copies to keep per prefix
    backup_copies: u32,

    /// Language of exported workbooks, also the language expected on import
    #[serde(default)]
    locale: Locale,

    #[serde(default)]
    sheet_order: SheetOrder,

    /// Path to the credentials file (optional, relative to the home directory or absolute).
    /// Defaults to $XMONEY_HOME/.secrets/credentials.json if not specified
    #[serde(default, skip_serializing_if = "Option::is_none")]
    credentials_path: Option<PathBuf>,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            api_url: String::new(),
            backup_copies: BACKUP_COPIES,
            locale: Locale::default(),
            sheet_order: SheetOrder::default(),
            credentials_path: None,
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile from `path` and checks that it belongs to this app.
    async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config: ConfigFile = utils::deserialize(path)
            .await
            .with_context(|| format!("Failed to load config file at {}", path.display()))?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        Ok(config)
    }

    async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(path.as_ref(), data)
            .await
            .context("Unable to write config file")
    }

    fn credentials_path(&self) -> PathBuf {
        self.credentials_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(SECRETS).join(CREDENTIALS_JSON))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn credentials_file(dir: &Path) -> PathBuf {
        let path = dir.join("downloaded.json");
        Credentials::new("key", "token", "u-1")
            .save(&path)
            .await
            .unwrap();
        path
    }

    #[tokio::test]
    async fn test_config_create() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("xmoney_home");
        let source = credentials_file(dir.path()).await;

        let config = Config::create(
            &home,
            &source,
            "https://abc.supabase.co/",
            Locale::En,
            SheetOrder::Lexical,
        )
        .await
        .unwrap();

        assert_eq!(config.api_url(), "https://abc.supabase.co");
        assert_eq!(config.locale(), Locale::En);
        assert_eq!(config.sheet_order(), SheetOrder::Lexical);
        assert_eq!(config.backup_copies(), BACKUP_COPIES);
        assert!(config.backups().is_dir());
        assert!(config.secrets().is_dir());
        assert!(!source.exists(), "the credentials file is moved");
        let credentials = Credentials::load(config.credentials_path()).await.unwrap();
        assert_eq!(credentials.user_id(), "u-1");

        let loaded = Config::load(&home).await.unwrap();
        assert_eq!(loaded.api_url(), config.api_url());
        assert_eq!(loaded.locale(), Locale::En);
        assert_eq!(loaded.credentials_path(), config.credentials_path());
    }

    #[tokio::test]
    async fn test_config_create_rejects_bad_input() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("home");
        let source = credentials_file(dir.path()).await;
        let bad_url = Config::create(&home, &source, "nope", Locale::PtBr, SheetOrder::default());
        assert!(bad_url.await.is_err());

        let missing = dir.path().join("missing.json");
        let url = "https://abc.supabase.co";
        let result = Config::create(&home, &missing, url, Locale::PtBr, SheetOrder::default());
        assert!(result.await.is_err());
        assert!(!home.exists());
    }

    #[tokio::test]
    async fn test_load_missing_home() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(dir.path().join("nothing")).await.unwrap_err();
        assert!(format!("{err:#}").contains("xmoney init"));
    }

    #[tokio::test]
    async fn test_config_file_load_with_minimal_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_JSON);
        let json = r#"{
            "app_name": "xmoney",
            "config_version": 1,
            "api_url": "https://abc.supabase.co",
            "backup_copies": 3
        }"#;
        utils::write(&path, json).await.unwrap();

        let config = ConfigFile::load(&path).await.unwrap();
        assert_eq!(config.backup_copies, 3);
        assert_eq!(config.locale, Locale::PtBr);
        assert_eq!(config.sheet_order, SheetOrder::Chronological);
        assert_eq!(
            config.credentials_path(),
            PathBuf::from(SECRETS).join(CREDENTIALS_JSON)
        );
    }

    #[tokio::test]
    async fn test_config_file_load_invalid_app_name() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_JSON);
        let json = r#"{
            "app_name": "someapp",
            "config_version": 1,
            "api_url": "https://abc.supabase.co",
            "backup_copies": 5
        }"#;
        utils::write(&path, json).await.unwrap();

        let result = ConfigFile::load(&path).await;
        assert!(result.unwrap_err().to_string().contains("Invalid app_name"));
    }

    #[tokio::test]
    async fn test_config_file_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_JSON);
        let original = ConfigFile {
            api_url: "https://abc.supabase.co".to_string(),
            backup_copies: 7,
            locale: Locale::En,
            sheet_order: SheetOrder::Lexical,
            credentials_path: Some(PathBuf::from("/etc/xmoney/credentials.json")),
            ..ConfigFile::default()
        };
        original.save(&path).await.unwrap();
        assert_eq!(original, ConfigFile::load(&path).await.unwrap());
    }

    #[test]
    fn test_config_file_serialization_omits_none_fields() {
        let json = serde_json::to_string(&ConfigFile::default()).unwrap();
        assert!(!json.contains("credentials_path"));
    }
}
