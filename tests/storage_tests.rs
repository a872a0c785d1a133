//! Integration tests for the JSON file store and its backup rotation.

use chrono::{DateTime, TimeZone, Utc};
use devtask::clock::Clock;
use devtask::storage::{FileStorage, MAX_BACKUP_COUNT, Storage};
use devtask::types::{Task, TaskFile, TaskId, TaskPriority, TaskStatus};
use std::fs;
use tempfile::TempDir;

/// Always reports the same instant, so every backup stamp collides.
struct FrozenClock(DateTime<Utc>);

impl Clock for FrozenClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

fn task(id: u64, title: &str) -> Task {
    Task {
        id: TaskId::new(id).unwrap(),
        title: title.to_string(),
        description: None,
        status: TaskStatus::Open,
        priority: Some(TaskPriority::Medium),
        branch: None,
        due_date: None,
        created_at: "2026-10-19T08:00:00.000Z".to_string(),
        updated_at: "2026-10-19T08:00:00.000Z".to_string(),
        completed_at: None,
        github_issue_number: None,
    }
}

fn backup_titles(storage: &FileStorage<impl Clock>) -> Vec<String> {
    storage
        .backups()
        .list()
        .unwrap()
        .iter()
        .map(|path| {
            let file: TaskFile = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
            file.tasks
                .first()
                .map(|t| t.title.clone())
                .unwrap_or_default()
        })
        .collect()
}

#[test]
fn round_trip_preserves_every_field() {
    let temp = TempDir::new().unwrap();
    let storage = FileStorage::new(temp.path().join(".task"));
    let mut full = task(1, "Everything set");
    full.description = Some("desc".to_string());
    full.status = TaskStatus::Completed;
    full.priority = Some(TaskPriority::High);
    full.branch = Some("feature/task-1-everything-set".to_string());
    full.due_date = Some("2026-12-24".to_string());
    full.completed_at = Some("2026-10-19T09:00:00.000Z".to_string());
    full.github_issue_number = Some(77);
    let tasks = vec![full, task(2, "Bare")];

    storage.write_tasks(&tasks).unwrap();

    assert_eq!(storage.read_tasks().unwrap(), tasks);
}

#[test]
fn backups_keep_the_five_most_recent() {
    let temp = TempDir::new().unwrap();
    let storage = FileStorage::new(temp.path().join(".task"));
    storage.write_tasks(&[task(1, "v0")]).unwrap();

    for i in 1..=9 {
        storage.write_tasks(&[task(1, &format!("v{}", i))]).unwrap();
    }

    assert_eq!(
        backup_titles(&storage),
        vec!["v4", "v5", "v6", "v7", "v8"]
    );
    assert_eq!(storage.backups().list().unwrap().len(), MAX_BACKUP_COUNT);
}

#[test]
fn same_instant_writes_never_overwrite_a_backup() {
    let temp = TempDir::new().unwrap();
    let clock = FrozenClock(Utc.with_ymd_and_hms(2026, 10, 19, 8, 0, 0).unwrap());
    let storage = FileStorage::with_clock(temp.path().join(".task"), clock);
    storage.write_tasks(&[task(1, "a")]).unwrap();

    storage.write_tasks(&[task(1, "b")]).unwrap();
    storage.write_tasks(&[task(1, "c")]).unwrap();

    // Initial empty file, then "a", then "b"
    assert_eq!(backup_titles(&storage), vec!["", "a", "b"]);
}

#[test]
fn legacy_backup_names_are_pruned_first() {
    let temp = TempDir::new().unwrap();
    let storage = FileStorage::new(temp.path().join(".task"));
    storage.initialize().unwrap();
    let legacy = storage.backups().dir().join("tasks-20200101000000.json");
    fs::write(&legacy, "{\"tasks\":[]}").unwrap();

    for i in 0..MAX_BACKUP_COUNT {
        storage.write_tasks(&[task(1, &format!("v{}", i))]).unwrap();
    }

    assert!(!legacy.exists());
    assert_eq!(storage.backups().list().unwrap().len(), MAX_BACKUP_COUNT);
}

#[test]
fn config_survives_task_writes() {
    let temp = TempDir::new().unwrap();
    let storage = FileStorage::new(temp.path().join(".task"));
    let mut config = storage.read_config().unwrap();
    config.next_id = 12;
    config.default_branch_prefix = "fix/".to_string();
    storage.write_config(&config).unwrap();

    storage.write_tasks(&[task(11, "x")]).unwrap();

    assert_eq!(storage.read_config().unwrap(), config);
}

#[test]
fn failed_prune_does_not_fail_the_write() {
    let temp = TempDir::new().unwrap();
    let storage = FileStorage::new(temp.path().join(".task"));
    storage.initialize().unwrap();
    // Oldest "backup" is a directory, so removing it fails
    let stuck = storage.backups().dir().join("tasks-20000101000000000.json");
    fs::create_dir_all(&stuck).unwrap();

    for i in 0..=MAX_BACKUP_COUNT {
        storage.write_tasks(&[task(1, &format!("v{}", i))]).unwrap();
    }

    let tasks = storage.read_tasks().unwrap();
    assert_eq!(tasks[0].title, format!("v{}", MAX_BACKUP_COUNT));
    assert!(stuck.is_dir());
    assert!(storage.backups().list().unwrap().len() > MAX_BACKUP_COUNT);
}
