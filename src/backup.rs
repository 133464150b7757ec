//! Snapshots of the remote records, taken before an import overwrites them.

use crate::{utils, Config, Result};
use anyhow::Context;
use chrono::Local;
use serde::Serialize;
use std::path::PathBuf;
use tracing::debug;

/// Prefix for the snapshot taken before an import.
pub const IMPORT_PRE: &str = "import-pre";

const EXTENSION: &str = "json";

/// Manages backup file creation and rotation.
///
/// The `Backup` struct is immutable and owns copies of the paths and settings it needs.
/// Create a new instance via `Config::backup()` or `Backup::new()`.
#[derive(Debug, Clone)]
pub struct Backup {
    backups_dir: PathBuf,
    backup_copies: u32,
}

impl Backup {
    pub fn new(config: &Config) -> Self {
        Self {
            backups_dir: config.backups().to_path_buf(),
            backup_copies: config.backup_copies(),
        }
    }

    /// Saves `data` as a pretty-printed JSON backup file named `{prefix}.YYYY-MM-DD-NNN.json`,
    /// where NNN counts up within a day. Old files with the same prefix are then deleted so that
    /// at most `backup_copies` remain.
    ///
    /// Returns the path to the created backup file.
    pub async fn save_json<T>(&self, prefix: &str, data: &T) -> Result<PathBuf>
    where
        T: Serialize + ?Sized,
    {
        let date = Local::now().format("%Y-%m-%d").to_string();
        let seq = self.next_sequence_number(prefix, &date).await?;
        let path = self
            .backups_dir
            .join(format!("{prefix}.{date}-{seq:03}.{EXTENSION}"));

        let json = serde_json::to_string_pretty(data).context("Failed to serialize the backup")?;
        utils::write(&path, json).await?;
        debug!("Saved backup {}", path.display());

        self.rotate(prefix).await?;
        Ok(path)
    }

    /// Names of the backup files with `prefix`, oldest first.
    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let mut names = Vec::new();
        let mut dir = utils::read_dir(&self.backups_dir).await?;
        while let Some(entry) = dir
            .next_entry()
            .await
            .context("Failed to read directory entry")?
        {
            let name = entry.file_name().to_string_lossy().to_string();
            if parse_backup_name(&name, prefix).is_some() {
                names.push(name);
            }
        }
        // The name format makes lexical order chronological.
        names.sort();
        Ok(names)
    }

    async fn next_sequence_number(&self, prefix: &str, date: &str) -> Result<u32> {
        let max = self
            .list(prefix)
            .await?
            .iter()
            .filter_map(|name| parse_backup_name(name, prefix))
            .filter(|(d, _)| d == date)
            .map(|(_, seq)| seq)
            .max()
            .unwrap_or(0);
        Ok(max + 1)
    }

    async fn rotate(&self, prefix: &str) -> Result<()> {
        let names = self.list(prefix).await?;
        let to_delete = names.len().saturating_sub(self.backup_copies as usize);
        for name in names.into_iter().take(to_delete) {
            utils::remove(self.backups_dir.join(&name)).await?;
            debug!("Rotated out backup {name}");
        }
        Ok(())
    }
}

/// Splits `{prefix}.YYYY-MM-DD-NNN.json` into its date and sequence number.
fn parse_backup_name(name: &str, prefix: &str) -> Option<(String, u32)> {
    let rest = name.strip_prefix(prefix)?.strip_prefix('.')?;
    let rest = rest.strip_suffix(EXTENSION)?.strip_suffix('.')?;
    let (date, seq) = rest.rsplit_once('-')?;
    if date.len() != 10 {
        return None;
    }
    Some((date.to_string(), seq.parse().ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Amount, Transaction, TransactionType};
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_save_json_and_rotate() {
        let env = TestEnv::new().await;
        let backup = env.config().backup();
        let data = vec![Transaction::new(
            Amount::ZERO,
            "2024-03-05",
            "Outros",
            "",
            TransactionType::Expense,
            true,
        )
        .with_id("a1")];

        let mut paths = Vec::new();
        for _ in 0..7 {
            paths.push(backup.save_json(IMPORT_PRE, &data).await.unwrap());
        }
        let first = paths[0].file_name().unwrap().to_string_lossy().to_string();
        let last = paths[6].file_name().unwrap().to_string_lossy().to_string();
        assert!(first.starts_with("import-pre."));
        assert!(first.ends_with("-001.json"));
        assert!(last.ends_with("-007.json"));

        let remaining = backup.list(IMPORT_PRE).await.unwrap();
        assert_eq!(remaining.len(), env.config().backup_copies() as usize);
        assert!(!paths[0].exists());
        assert!(paths[6].exists());

        let restored: Vec<Transaction> = utils::deserialize(&paths[6]).await.unwrap();
        assert_eq!(restored, data);
    }

    #[tokio::test]
    async fn test_other_prefixes_are_left_alone() {
        let env = TestEnv::new().await;
        let backup = env.config().backup();
        let other = env.config().backups().join("manual.2024-01-01-001.json");
        utils::write(&other, "[]").await.unwrap();
        backup.save_json(IMPORT_PRE, &Vec::<Transaction>::new()).await.unwrap();
        assert!(other.exists());
        assert_eq!(backup.list(IMPORT_PRE).await.unwrap().len(), 1);
    }

    #[test]
    fn test_parse_backup_name() {
        assert_eq!(
            parse_backup_name("import-pre.2025-12-14-042.json", "import-pre"),
            Some(("2025-12-14".to_string(), 42))
        );
        assert_eq!(
            parse_backup_name("import-pre.2025-12-14-001.json", "export"),
            None
        );
        assert_eq!(
            parse_backup_name("import-pre.2025-12-14-001.txt", "import-pre"),
            None
        );
        assert_eq!(parse_backup_name("import-pre.json", "import-pre"), None);
        assert_eq!(
            parse_backup_name("import-pre.2025-12-14-abc.json", "import-pre"),
            None
        );
    }
}
