//! Rotating snapshots of `tasks.json`.
//!
//! Each overwrite of the task file is preceded by a copy into
//! `backup/tasks-<stamp>.json`. Stamps are fixed-width digit strings, so file
//! name order is chronological order and pruning simply keeps the
//! lexicographically greatest names.

use crate::error::StorageError;
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Number of snapshots retained after pruning.
pub const MAX_BACKUP_COUNT: usize = 5;

const BACKUP_PREFIX: &str = "tasks-";
const BACKUP_SUFFIX: &str = ".json";

/// Millisecond stamp, e.g. `20261019081530123`.
const STAMP_FORMAT: &str = "%Y%m%d%H%M%S%3f";
const STAMP_LEN: usize = 17;
/// Second-resolution stamps written by earlier versions.
const LEGACY_STAMP_LEN: usize = 14;

/// Creates and prunes task-file snapshots in one directory.
#[derive(Debug, Clone)]
pub struct BackupManager {
    dir: PathBuf,
    max_count: usize,
}

impl BackupManager {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            max_count: MAX_BACKUP_COUNT,
        }
    }

    /// Override how many snapshots survive pruning.
    pub fn with_max_count(mut self, max_count: usize) -> Self {
        self.max_count = max_count;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Copy `source` into a new snapshot and return its path.
    ///
    /// The name is derived from `now`, bumped past the newest existing
    /// snapshot when needed so an earlier snapshot is never overwritten.
    pub fn backup(&self, source: &Path, now: DateTime<Utc>) -> Result<PathBuf, StorageError> {
        let names = self.backup_names()?;
        let stamp = next_stamp(now, names.last().map(String::as_str));
        let dest = self
            .dir
            .join(format!("{}{}{}", BACKUP_PREFIX, stamp, BACKUP_SUFFIX));

        fs::copy(source, &dest).map_err(|e| StorageError::io(&dest, e))?;
        debug!(backup = %dest.display(), "Backed up task file");
        Ok(dest)
    }

    /// Delete the oldest snapshots beyond the retention limit.
    ///
    /// Returns the number of files removed.
    pub fn cleanup(&self) -> Result<usize, StorageError> {
        let names = self.backup_names()?;
        if names.len() <= self.max_count {
            return Ok(0);
        }

        let excess = names.len() - self.max_count;
        for name in &names[..excess] {
            let path = self.dir.join(name);
            fs::remove_file(&path).map_err(|e| StorageError::io(&path, e))?;
            debug!(backup = %path.display(), "Pruned old backup");
        }
        Ok(excess)
    }

    /// Retained snapshots, oldest first.
    pub fn list(&self) -> Result<Vec<PathBuf>, StorageError> {
        Ok(self
            .backup_names()?
            .into_iter()
            .map(|name| self.dir.join(name))
            .collect())
    }

    /// File names matching `tasks-*.json`, sorted ascending.
    fn backup_names(&self) -> Result<Vec<String>, StorageError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir).map_err(|e| StorageError::io(&self.dir, e))? {
            let entry = entry.map_err(|e| StorageError::io(&self.dir, e))?;
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if name.starts_with(BACKUP_PREFIX) && name.ends_with(BACKUP_SUFFIX) {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }
}

/// Pick a stamp for `now` that sorts strictly after `newest` (a file name).
fn next_stamp(now: DateTime<Utc>, newest: Option<&str>) -> String {
    let candidate = now.format(STAMP_FORMAT).to_string();
    let Some(newest_stamp) = newest.and_then(stamp_of) else {
        return candidate;
    };

    if candidate.as_str() > newest_stamp {
        return candidate;
    }

    match newest_stamp.len() {
        // Any millisecond stamp within the legacy second sorts after it
        LEGACY_STAMP_LEN => format!("{}000", newest_stamp),
        STAMP_LEN => match newest_stamp.parse::<u64>() {
            Ok(n) => format!("{:0width$}", n + 1, width = STAMP_LEN),
            Err(_) => candidate,
        },
        _ => candidate,
    }
}

/// The digit stamp inside a backup file name, if it has one.
fn stamp_of(name: &str) -> Option<&str> {
    let stamp = name.strip_prefix(BACKUP_PREFIX)?.strip_suffix(BACKUP_SUFFIX)?;
    (!stamp.is_empty() && stamp.bytes().all(|b| b.is_ascii_digit())).then_some(stamp)
}
