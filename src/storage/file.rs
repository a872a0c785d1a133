//! JSON file store under a task directory.
//!
//! Layout:
//! - `tasks.json`: `{ "tasks": [...] }`
//! - `config.json`: counter and defaults
//! - `backup/tasks-<stamp>.json`: snapshots taken before each task-file overwrite

use super::Storage;
use super::backup::BackupManager;
use crate::clock::{Clock, SystemClock};
use crate::error::StorageError;
use crate::types::{Config, Task, TaskFile};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// Storage directory used when nothing overrides it.
pub const DEFAULT_STORAGE_DIR: &str = ".task";

const TASKS_FILE: &str = "tasks.json";
const CONFIG_FILE: &str = "config.json";
const BACKUP_DIR: &str = "backup";

#[cfg(unix)]
const DIR_MODE: u32 = 0o700;
#[cfg(unix)]
const FILE_MODE: u32 = 0o600;

/// File-backed [`Storage`].
///
/// Initialization is lazy and idempotent: every operation first makes sure
/// the directory tree and both data files exist, creating only what is
/// missing.
#[derive(Debug, Clone)]
pub struct FileStorage<C = SystemClock> {
    dir: PathBuf,
    tasks_file: PathBuf,
    config_file: PathBuf,
    backups: BackupManager,
    clock: C,
}

impl FileStorage<SystemClock> {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_clock(dir, SystemClock)
    }
}

impl<C: Clock> FileStorage<C> {
    /// Create a store whose backup names come from `clock`.
    pub fn with_clock(dir: impl Into<PathBuf>, clock: C) -> Self {
        let dir = dir.into();
        Self {
            tasks_file: dir.join(TASKS_FILE),
            config_file: dir.join(CONFIG_FILE),
            backups: BackupManager::new(dir.join(BACKUP_DIR)),
            dir,
            clock,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn tasks_path(&self) -> &Path {
        &self.tasks_file
    }

    pub fn config_path(&self) -> &Path {
        &self.config_file
    }

    pub fn backups(&self) -> &BackupManager {
        &self.backups
    }

    /// Create the directory tree and default files if absent.
    ///
    /// Existing files are never touched.
    pub fn initialize(&self) -> Result<(), StorageError> {
        for dir in [self.dir.as_path(), self.backups.dir()] {
            if !dir.exists() {
                fs::create_dir_all(dir).map_err(|e| StorageError::io(dir, e))?;
                restrict_dir(dir);
                debug!(dir = %dir.display(), "Created storage directory");
            }
        }

        if !self.tasks_file.exists() {
            write_json_atomic(&self.tasks_file, &TaskFile::default())?;
            debug!(file = %self.tasks_file.display(), "Created empty task file");
        }
        if !self.config_file.exists() {
            write_json_atomic(&self.config_file, &Config::default())?;
            debug!(file = %self.config_file.display(), "Created default config");
        }
        Ok(())
    }
}

impl<C: Clock> Storage for FileStorage<C> {
    fn read_tasks(&self) -> Result<Vec<Task>, StorageError> {
        self.initialize()?;
        let file: TaskFile = read_json(&self.tasks_file)?;
        Ok(file.tasks)
    }

    fn write_tasks(&self, tasks: &[Task]) -> Result<(), StorageError> {
        self.initialize()?;

        if self.tasks_file.exists() {
            self.backups.backup(&self.tasks_file, self.clock.now())?;
        }

        write_json_atomic(
            &self.tasks_file,
            &TaskFile {
                tasks: tasks.to_vec(),
            },
        )?;

        // The new content is already in place; a failed prune only leaves
        // extra snapshots behind
        match self.backups.cleanup() {
            Ok(pruned) => debug!(count = tasks.len(), pruned, "Wrote task file"),
            Err(e) => warn!(error = %e, "Failed to prune old backups"),
        }
        Ok(())
    }

    fn read_config(&self) -> Result<Config, StorageError> {
        self.initialize()?;
        read_json(&self.config_file)
    }

    fn write_config(&self, config: &Config) -> Result<(), StorageError> {
        self.initialize()?;
        write_json_atomic(&self.config_file, config)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, StorageError> {
    let content = fs::read_to_string(path).map_err(|e| StorageError::io(path, e))?;
    serde_json::from_str(&content).map_err(|e| StorageError::json(path, e))
}

/// Serialize pretty JSON into a sibling temp file, then rename it over `path`.
///
/// A crash mid-write leaves either the old file or the new one, never a
/// truncated mix.
fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
    let mut content =
        serde_json::to_string_pretty(value).map_err(|e| StorageError::json(path, e))?;
    content.push('\n');
    let dir = path.parent().unwrap_or_else(|| Path::new("."));

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| StorageError::io(dir, e))?;
    tmp.write_all(content.as_bytes())
        .map_err(|e| StorageError::io(tmp.path(), e))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| StorageError::io(tmp.path(), e))?;
    tmp.persist(path)
        .map_err(|e| StorageError::io(path, e.error))?;

    restrict_file(path);
    Ok(())
}

#[cfg(unix)]
fn restrict_dir(path: &Path) {
    set_mode(path, DIR_MODE);
}

#[cfg(unix)]
fn restrict_file(path: &Path) {
    set_mode(path, FILE_MODE);
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) {
    use std::os::unix::fs::PermissionsExt;

    if let Err(e) = fs::set_permissions(path, fs::Permissions::from_mode(mode)) {
        warn!(path = %path.display(), error = %e, "Failed to restrict permissions");
    }
}

// Owner-only modes have no portable equivalent elsewhere
#[cfg(not(unix))]
fn restrict_dir(_path: &Path) {}

#[cfg(not(unix))]
fn restrict_file(_path: &Path) {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MAX_BACKUP_COUNT;
    use crate::types::{TaskId, TaskPriority, TaskStatus};
    use tempfile::TempDir;

    fn task(id: u64, title: &str) -> Task {
        Task {
            id: TaskId::new(id).unwrap(),
            title: title.to_string(),
            description: Some("multi\nline".to_string()),
            status: TaskStatus::Open,
            priority: Some(TaskPriority::Low),
            branch: None,
            due_date: Some("2026-11-01".to_string()),
            created_at: "2026-10-19T08:00:00.000Z".to_string(),
            updated_at: "2026-10-19T08:00:00.000Z".to_string(),
            completed_at: None,
            github_issue_number: Some(12),
        }
    }

    #[test]
    fn first_read_initializes_store() {
        let temp = TempDir::new().unwrap();
        let storage = FileStorage::new(temp.path().join(".task"));

        assert!(storage.read_tasks().unwrap().is_empty());
        assert_eq!(storage.read_config().unwrap(), Config::default());
        assert!(storage.tasks_path().exists());
        assert!(storage.config_path().exists());
        assert!(storage.backups().dir().is_dir());

        let raw = fs::read_to_string(storage.tasks_path()).unwrap();
        assert_eq!(raw, "{\n  \"tasks\": []\n}\n");
    }

    #[test]
    fn initialize_does_not_clobber_existing_files() {
        let temp = TempDir::new().unwrap();
        let storage = FileStorage::new(temp.path());
        let mut config = Config::default();
        config.next_id = 40;
        storage.write_config(&config).unwrap();
        storage.write_tasks(&[task(39, "keep me")]).unwrap();

        storage.initialize().unwrap();
        storage.initialize().unwrap();

        assert_eq!(storage.read_config().unwrap().next_id, 40);
        assert_eq!(storage.read_tasks().unwrap()[0].title, "keep me");
    }

    #[test]
    fn write_then_read_round_trips() {
        let temp = TempDir::new().unwrap();
        let storage = FileStorage::new(temp.path());
        let tasks = vec![task(1, "first"), task(2, "second")];

        storage.write_tasks(&tasks).unwrap();

        assert_eq!(storage.read_tasks().unwrap(), tasks);
    }

    #[test]
    fn corrupt_task_file_is_a_hard_error() {
        let temp = TempDir::new().unwrap();
        let storage = FileStorage::new(temp.path());
        storage.initialize().unwrap();
        fs::write(storage.tasks_path(), "{ \"tasks\": [ ").unwrap();

        let err = storage.read_tasks().unwrap_err();
        assert!(matches!(err, StorageError::Json { .. }));
        // No repair was attempted
        assert_eq!(
            fs::read_to_string(storage.tasks_path()).unwrap(),
            "{ \"tasks\": [ "
        );
    }

    #[test]
    fn write_backs_up_previous_content() {
        let temp = TempDir::new().unwrap();
        let storage = FileStorage::new(temp.path());
        storage.write_tasks(&[task(1, "v1")]).unwrap();
        let before = fs::read_to_string(storage.tasks_path()).unwrap();

        storage.write_tasks(&[task(1, "v2")]).unwrap();

        let backups = storage.backups().list().unwrap();
        let newest = backups.last().unwrap();
        assert_eq!(fs::read_to_string(newest).unwrap(), before);
    }

    #[test]
    fn backups_are_bounded_to_five_most_recent() {
        let temp = TempDir::new().unwrap();
        let storage = FileStorage::new(temp.path());
        storage.initialize().unwrap();

        for i in 1..=8 {
            storage.write_tasks(&[task(1, &format!("v{}", i))]).unwrap();
        }

        let backups = storage.backups().list().unwrap();
        assert_eq!(backups.len(), MAX_BACKUP_COUNT);
        // The newest snapshot holds the content replaced by the last write
        let newest: TaskFile =
            serde_json::from_str(&fs::read_to_string(backups.last().unwrap()).unwrap()).unwrap();
        assert_eq!(newest.tasks[0].title, "v7");
        let oldest: TaskFile =
            serde_json::from_str(&fs::read_to_string(&backups[0]).unwrap()).unwrap();
        assert_eq!(oldest.tasks[0].title, "v3");
    }

    #[test]
    fn config_writes_take_no_backup() {
        let temp = TempDir::new().unwrap();
        let storage = FileStorage::new(temp.path());
        storage.initialize().unwrap();

        storage.write_config(&Config::default()).unwrap();
        storage.write_config(&Config::default()).unwrap();

        assert!(storage.backups().list().unwrap().is_empty());
    }

    #[test]
    fn no_temp_files_left_behind() {
        let temp = TempDir::new().unwrap();
        let storage = FileStorage::new(temp.path());
        storage.write_tasks(&[task(1, "x")]).unwrap();

        let mut names: Vec<String> = fs::read_dir(temp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        names.sort();
        assert_eq!(names, vec!["backup", "config.json", "tasks.json"]);
    }

    #[cfg(unix)]
    #[test]
    fn files_and_dirs_are_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let dir = temp.path().join(".task");
        let storage = FileStorage::new(&dir);
        storage.write_tasks(&[task(1, "x")]).unwrap();

        let mode = |p: &Path| fs::metadata(p).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode(&dir), 0o700);
        assert_eq!(mode(storage.backups().dir()), 0o700);
        assert_eq!(mode(storage.tasks_path()), 0o600);
        assert_eq!(mode(storage.config_path()), 0o600);
    }
}
