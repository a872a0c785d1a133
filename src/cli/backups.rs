//! `task backups`

use crate::clock::Clock;
use crate::error::StorageError;
use crate::storage::FileStorage;
use serde::Serialize;
use std::path::PathBuf;

/// One retained snapshot of the task file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackupEntry {
    pub name: String,
    pub path: PathBuf,
    pub size: u64,
}

/// Retained backups, oldest first.
pub fn run_backups<C: Clock>(storage: &FileStorage<C>) -> Result<Vec<BackupEntry>, StorageError> {
    storage
        .backups()
        .list()?
        .into_iter()
        .map(|path| -> Result<BackupEntry, StorageError> {
            let size = std::fs::metadata(&path)
                .map_err(|e| StorageError::io(&path, e))?
                .len();
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            Ok(BackupEntry { name, path, size })
        })
        .collect()
}

/// One line per backup: name and size in bytes.
pub fn format_backups(entries: &[BackupEntry]) -> String {
    if entries.is_empty() {
        return "No backups".to_string();
    }
    entries
        .iter()
        .map(|e| format!("{}  {} bytes", e.name, e.size))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Storage;
    use tempfile::TempDir;

    #[test]
    fn fresh_store_has_no_backups() {
        let temp = TempDir::new().unwrap();
        let storage = FileStorage::new(temp.path());
        storage.initialize().unwrap();

        let entries = run_backups(&storage).unwrap();
        assert!(entries.is_empty());
        assert_eq!(format_backups(&entries), "No backups");
    }

    #[test]
    fn lists_backups_oldest_first() {
        let temp = TempDir::new().unwrap();
        let storage = FileStorage::new(temp.path());
        for _ in 0..3 {
            storage.write_tasks(&[]).unwrap();
        }

        let entries = run_backups(&storage).unwrap();
        assert_eq!(entries.len(), 3);
        assert!(entries.windows(2).all(|w| w[0].name < w[1].name));
        assert!(entries.iter().all(|e| e.name.starts_with("tasks-") && e.size > 0));
        assert_eq!(format_backups(&entries).lines().count(), 3);
    }
}
