//! The credentials file issued by the hosted provider, stored at `.secrets/credentials.json`.
//!
//! Logging in happens elsewhere. This program only consumes what the provider handed out: the
//! project's public API key, a user access token and the id of that user.

use crate::{utils, Result};
use anyhow::{ensure, Context};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::path::{Path, PathBuf};

/// A JSON file held in memory together with the path it came from, written back with owner-only
/// permissions.
#[derive(Default, Debug, Clone)]
pub(crate) struct File<F>
where
    F: Serialize + DeserializeOwned + Clone + Debug,
{
    path: PathBuf,
    data: F,
}

impl<F> File<F>
where
    F: Serialize + DeserializeOwned + Clone + Debug,
{
    pub(crate) async fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let data: F = utils::deserialize(&path).await?;
        Ok(Self { path, data })
    }

    pub(crate) fn new(path: impl Into<PathBuf>, data: F) -> Self {
        Self {
            path: path.into(),
            data,
        }
    }

    pub(crate) async fn save(&self) -> Result<()> {
        let json =
            serde_json::to_string_pretty(&self.data).context("Failed to serialize data to JSON")?;
        utils::write(&self.path, json).await?;

        #[cfg(unix)]
        {
            use std::fs::Permissions;
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(&self.path, Permissions::from_mode(0o600))
                .await
                .context("Failed to set file permissions")?;
        }

        Ok(())
    }

    pub(crate) fn data(&self) -> &F {
        &self.data
    }

    pub(crate) fn into_data(self) -> F {
        self.data
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }
}

/// The contents of `credentials.json`.
///
/// ```json
/// {
///   "api_key": "eyJhbGciOi...",
///   "access_token": "eyJhbGciOi...",
///   "user_id": "9f1c2d4e-0000-4000-8000-000000000001"
/// }
/// ```
#[derive(Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    api_key: String,
    access_token: String,
    user_id: String,
}

impl Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("access_token", &"<redacted>")
            .field("user_id", &self.user_id)
            .finish()
    }
}

impl Credentials {
    pub fn new(
        api_key: impl Into<String>,
        access_token: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            access_token: access_token.into(),
            user_id: user_id.into(),
        }
    }

    /// Loads and validates a credentials file.
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let file: File<Credentials> = File::load(path).await?;
        file.data()
            .validate()
            .with_context(|| format!("Invalid credentials in '{}'", file.path().display()))?;
        Ok(file.into_data())
    }

    /// Writes the credentials to `path`, readable by the owner only.
    pub async fn save(&self, path: impl Into<PathBuf>) -> Result<()> {
        File::new(path, self.clone()).save().await
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    fn validate(&self) -> Result<()> {
        ensure!(!self.api_key.trim().is_empty(), "api_key is empty");
        ensure!(!self.access_token.trim().is_empty(), "access_token is empty");
        ensure!(!self.user_id.trim().is_empty(), "user_id is empty");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("credentials.json");
        let credentials = Credentials::new("key", "token", "u-1");
        credentials.save(&path).await.unwrap();
        let loaded = Credentials::load(&path).await.unwrap();
        assert_eq!(credentials, loaded);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[tokio::test]
    async fn test_empty_fields_are_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("credentials.json");
        Credentials::new("key", "token", " ").save(&path).await.unwrap();
        let err = Credentials::load(&path).await.unwrap_err();
        assert!(format!("{err:#}").contains("user_id is empty"));
    }

    #[test]
    fn test_debug_hides_secrets() {
        let s = format!("{:?}", Credentials::new("key-123", "token-456", "u-1"));
        assert!(!s.contains("key-123"));
        assert!(!s.contains("token-456"));
        assert!(s.contains("u-1"));
    }
}
