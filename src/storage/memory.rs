//! In-process [`Storage`] with no filesystem behind it.

use super::Storage;
use crate::error::StorageError;
use crate::types::{Config, Task};
use std::sync::Mutex;

/// Keeps tasks and config in memory. Counts task writes so callers can
/// assert that a failed operation persisted nothing.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    state: Mutex<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    tasks: Vec<Task>,
    config: Config,
    task_writes: usize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing collection and config.
    pub fn with_state(tasks: Vec<Task>, config: Config) -> Self {
        Self {
            state: Mutex::new(MemoryState {
                tasks,
                config,
                task_writes: 0,
            }),
        }
    }

    /// Number of `write_tasks` calls so far.
    pub fn task_writes(&self) -> usize {
        self.state.lock().unwrap().task_writes
    }
}

impl Storage for MemoryStorage {
    fn read_tasks(&self) -> Result<Vec<Task>, StorageError> {
        Ok(self.state.lock().unwrap().tasks.clone())
    }

    fn write_tasks(&self, tasks: &[Task]) -> Result<(), StorageError> {
        let mut state = self.state.lock().unwrap();
        state.tasks = tasks.to_vec();
        state.task_writes += 1;
        Ok(())
    }

    fn read_config(&self) -> Result<Config, StorageError> {
        Ok(self.state.lock().unwrap().config.clone())
    }

    fn write_config(&self, config: &Config) -> Result<(), StorageError> {
        self.state.lock().unwrap().config = config.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty_with_default_config() {
        let storage = MemoryStorage::new();
        assert!(storage.read_tasks().unwrap().is_empty());
        assert_eq!(storage.read_config().unwrap(), Config::default());
        assert_eq!(storage.task_writes(), 0);
    }

    #[test]
    fn config_writes_are_visible() {
        let storage = MemoryStorage::new();
        let mut config = Config::default();
        config.next_id = 9;
        storage.write_config(&config).unwrap();
        assert_eq!(storage.read_config().unwrap().next_id, 9);
        assert_eq!(storage.task_writes(), 0);
    }
}
