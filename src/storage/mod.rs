//! Persistence layer for the task collection and config record.
//!
//! The lifecycle engine only sees the [`Storage`] trait. [`FileStorage`] keeps
//! everything as pretty-printed JSON under a directory (`./.task/` by default);
//! [`MemoryStorage`] keeps it in process.

pub mod backup;
pub mod file;
pub mod memory;

pub use backup::{BackupManager, MAX_BACKUP_COUNT};
pub use file::{DEFAULT_STORAGE_DIR, FileStorage};
pub use memory::MemoryStorage;

use crate::error::StorageError;
use crate::types::{Config, Task};

/// Single-writer store for tasks and the config record.
///
/// Every call reads or replaces the whole collection; there is no partial
/// update and no cross-process locking.
pub trait Storage {
    /// All tasks in persisted order.
    fn read_tasks(&self) -> Result<Vec<Task>, StorageError>;

    /// Replace the task collection.
    fn write_tasks(&self, tasks: &[Task]) -> Result<(), StorageError>;

    fn read_config(&self) -> Result<Config, StorageError>;

    fn write_config(&self, config: &Config) -> Result<(), StorageError>;
}

impl<S: Storage + ?Sized> Storage for &S {
    fn read_tasks(&self) -> Result<Vec<Task>, StorageError> {
        (**self).read_tasks()
    }

    fn write_tasks(&self, tasks: &[Task]) -> Result<(), StorageError> {
        (**self).write_tasks(tasks)
    }

    fn read_config(&self) -> Result<Config, StorageError> {
        (**self).read_config()
    }

    fn write_config(&self, config: &Config) -> Result<(), StorageError> {
        (**self).write_config(config)
    }
}
