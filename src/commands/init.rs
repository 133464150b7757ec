use crate::args::InitArgs;
use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::model::SettingsStore;
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the data directory, its subdirectories and:
/// - Creates an initial `config.json` file from `args` along with default settings
/// - Moves the credentials file into its default location in the data dir
/// - Writes a default `settings.json`
///
/// # Arguments
/// - `xmoney_home` - The directory that will be the root of data directory, e.g. `$HOME/xmoney`
/// - `args` - The API URL, the credentials file and the workbook preferences.
///
/// # Errors
/// - Returns an error if the URL or credentials are invalid or if any file operations fail.
pub async fn init(xmoney_home: &Path, args: &InitArgs) -> Result<Out<()>> {
    let config = Config::create(
        xmoney_home,
        args.credentials(),
        args.api_url(),
        args.locale(),
        args.sheet_order(),
    )
    .await
    .context("Unable to create the data directory and configs")
    .pub_result(ErrorType::Config)?;
    SettingsStore::create(config.settings_path())
        .await
        .pub_result(ErrorType::Config)?;
    Ok("Successfully created the xmoney directory and config".into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Credentials;
    use crate::error::error_type;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init() {
        let dir = TempDir::new().unwrap();
        let credentials = dir.path().join("c.json");
        Credentials::new("k", "t", "u-1")
            .save(&credentials)
            .await
            .unwrap();
        let home = dir.path().join("home");
        let args = InitArgs::new("https://abc.supabase.co", &credentials);

        let out = init(&home, &args).await.unwrap();
        assert!(out.message().contains("Successfully"));
        let config = Config::load(&home).await.unwrap();
        assert!(config.settings_path().is_file());
    }

    #[tokio::test]
    async fn test_init_without_credentials_is_a_config_error() {
        let dir = TempDir::new().unwrap();
        let args = InitArgs::new("https://abc.supabase.co", dir.path().join("missing.json"));
        let err = init(&dir.path().join("home"), &args).await.unwrap_err();
        assert_eq!(error_type(&err), Some(ErrorType::Config));
    }
}
