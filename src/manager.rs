//! Task lifecycle engine.
//!
//! ```text
//! open ──start──▶ in_progress ──complete──▶ completed ──archive──▶ archived
//!   └───────────────────────archive─────────────────────────────────▲
//! ```
//!
//! Deletion is allowed from `open` and `in_progress` only; `archived` is
//! terminal. Every mutation loads the whole collection, changes one entry in
//! memory and persists the whole collection. Preconditions are checked after
//! the load and before any write, so a rejected operation leaves the store
//! untouched.

use crate::clock::{Clock, SystemClock, to_iso};
use crate::error::{TaskError, TaskResult, ValidationError};
use crate::git::{BranchOps, generate_branch_name};
use crate::storage::Storage;
use crate::types::{
    CreateTaskInput, SortField, Task, TaskFilter, TaskId, TaskStatus, UpdateTaskInput,
};
use std::cmp::Ordering;
use tracing::{debug, info};

/// Coordinates state transitions, persistence and branch creation.
pub struct TaskManager<S, G, C = SystemClock> {
    storage: S,
    git: G,
    clock: C,
}

impl<S: Storage, G: BranchOps> TaskManager<S, G, SystemClock> {
    pub fn new(storage: S, git: G) -> Self {
        Self::with_clock(storage, git, SystemClock)
    }
}

impl<S: Storage, G: BranchOps, C: Clock> TaskManager<S, G, C> {
    pub fn with_clock(storage: S, git: G, clock: C) -> Self {
        Self {
            storage,
            git,
            clock,
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn now(&self) -> String {
        to_iso(self.clock.now())
    }

    /// Create an `open` task with the next id.
    ///
    /// The counter is persisted before the task file, so an interrupted
    /// create can skip an id but never hand the same id out twice.
    pub fn create_task(&self, input: CreateTaskInput) -> TaskResult<Task> {
        let mut config = self.storage.read_config()?;
        let mut tasks = self.storage.read_tasks()?;

        let id = next_free_id(config.next_id, &tasks)?;
        let following = id.next().ok_or_else(id_space_exhausted)?;
        let now = self.now();
        let task = Task {
            id,
            title: input.title,
            description: input.description,
            status: TaskStatus::Open,
            priority: input.priority,
            branch: None,
            due_date: input.due_date,
            created_at: now.clone(),
            updated_at: now,
            completed_at: None,
            github_issue_number: None,
        };

        config.next_id = following.get();
        self.storage.write_config(&config)?;
        tasks.push(task.clone());
        self.storage.write_tasks(&tasks)?;

        info!(id = %task.id, status = %task.status, title = %task.title, "Created task");
        Ok(task)
    }

    /// Tasks passing `filter`, ordered by its sort field (id by default).
    pub fn list_tasks(&self, filter: &TaskFilter) -> TaskResult<Vec<Task>> {
        let mut tasks: Vec<Task> = self
            .storage
            .read_tasks()?
            .into_iter()
            .filter(|t| filter.matches(t))
            .collect();

        sort_tasks(&mut tasks, filter.sort_by.unwrap_or_default());
        Ok(tasks)
    }

    pub fn get_task(&self, id: TaskId) -> TaskResult<Task> {
        self.storage
            .read_tasks()?
            .into_iter()
            .find(|t| t.id == id)
            .ok_or_else(|| TaskError::not_found(id))
    }

    /// Overwrite the provided fields and refresh `updatedAt`.
    pub fn update_task(&self, id: TaskId, input: UpdateTaskInput) -> TaskResult<Task> {
        let now = self.now();
        let task = self.mutate(id, |task| {
            if let Some(title) = input.title {
                task.title = title;
            }
            if let Some(description) = input.description {
                task.description = Some(description);
            }
            if let Some(priority) = input.priority {
                task.priority = Some(priority);
            }
            if let Some(due_date) = input.due_date {
                task.due_date = Some(due_date);
            }
            task.updated_at = now;
            Ok(())
        })?;

        info!(id = %task.id, "Updated task");
        Ok(task)
    }

    /// Move an `open` task to `in_progress`.
    ///
    /// Inside a git work tree the task branch is created and checked out
    /// first; if that fails the task and the store are left unchanged.
    /// Outside a work tree the branch step is skipped.
    pub fn start_task(&self, id: TaskId) -> TaskResult<Task> {
        let mut tasks = self.storage.read_tasks()?;
        let index = find_index(&tasks, id)?;

        let current = &tasks[index];
        if !current.status.can_start() {
            return Err(ValidationError::invalid_transition(current.status, "start").into());
        }

        let branch = if self.git.is_inside_repository() {
            let config = self.storage.read_config()?;
            let name = generate_branch_name(current, Some(&config.default_branch_prefix));
            debug!(id = %id, branch = %name, "Creating task branch");
            self.git.create_and_switch_branch(&name)?;
            Some(name)
        } else {
            debug!(id = %id, "Not inside a git repository, skipping branch");
            None
        };

        let task = &mut tasks[index];
        task.status = TaskStatus::InProgress;
        if branch.is_some() {
            task.branch = branch;
        }
        task.updated_at = self.now();
        let task = task.clone();

        self.storage.write_tasks(&tasks)?;
        info!(id = %task.id, status = %task.status, branch = ?task.branch, "Started task");
        Ok(task)
    }

    /// Move an `in_progress` task to `completed`.
    pub fn complete_task(&self, id: TaskId) -> TaskResult<Task> {
        let now = self.now();
        let task = self.mutate(id, |task| {
            if !task.status.can_complete() {
                return Err(ValidationError::invalid_transition(task.status, "complete").into());
            }
            task.status = TaskStatus::Completed;
            task.completed_at = Some(now.clone());
            task.updated_at = now;
            Ok(())
        })?;

        info!(id = %task.id, status = %task.status, "Completed task");
        Ok(task)
    }

    /// Move an `open` or `completed` task to `archived`.
    pub fn archive_task(&self, id: TaskId) -> TaskResult<Task> {
        let now = self.now();
        let task = self.mutate(id, |task| {
            if !task.status.can_archive() {
                return Err(ValidationError::invalid_transition(task.status, "archive").into());
            }
            task.status = TaskStatus::Archived;
            task.updated_at = now;
            Ok(())
        })?;

        info!(id = %task.id, status = %task.status, "Archived task");
        Ok(task)
    }

    /// Remove an `open` or `in_progress` task. Returns the removed task.
    pub fn delete_task(&self, id: TaskId) -> TaskResult<Task> {
        let mut tasks = self.storage.read_tasks()?;
        let index = find_index(&tasks, id)?;

        let status = tasks[index].status;
        if !status.can_delete() {
            return Err(ValidationError::invalid_transition(status, "delete").into());
        }

        let removed = tasks.remove(index);
        self.storage.write_tasks(&tasks)?;
        info!(id = %removed.id, status = %removed.status, "Deleted task");
        Ok(removed)
    }

    /// Load, apply `change` to one task, persist. Nothing is written when
    /// `change` fails.
    fn mutate<F>(&self, id: TaskId, change: F) -> TaskResult<Task>
    where
        F: FnOnce(&mut Task) -> TaskResult<()>,
    {
        let mut tasks = self.storage.read_tasks()?;
        let index = find_index(&tasks, id)?;

        let mut updated = tasks[index].clone();
        change(&mut updated)?;
        tasks[index] = updated.clone();

        self.storage.write_tasks(&tasks)?;
        Ok(updated)
    }
}

fn find_index(tasks: &[Task], id: TaskId) -> TaskResult<usize> {
    tasks
        .iter()
        .position(|t| t.id == id)
        .ok_or_else(|| TaskError::not_found(id))
}

/// The counter value, unless an existing task already holds it or a later id.
fn next_free_id(next_id: u64, tasks: &[Task]) -> TaskResult<TaskId> {
    let mut value = next_id.max(1);
    for task in tasks {
        let after = task.id.next().ok_or_else(id_space_exhausted)?;
        value = value.max(after.get());
    }
    TaskId::new(value).ok_or_else(id_space_exhausted)
}

fn id_space_exhausted() -> TaskError {
    ValidationError::new("id", "id space exhausted").into()
}

/// Stable sort by the given field.
pub fn sort_tasks(tasks: &mut [Task], field: SortField) {
    match field {
        SortField::Id => tasks.sort_by_key(|t| t.id),
        SortField::Priority => {
            tasks.sort_by_key(|t| t.priority.map_or(u8::MAX, |p| p.rank()));
        }
        SortField::DueDate => tasks.sort_by(compare_due_dates),
        SortField::CreatedAt => tasks.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
    }
}

/// Dated tasks first in date order; dateless tasks keep their relative order.
fn compare_due_dates(a: &Task, b: &Task) -> Ordering {
    match (&a.due_date, &b.due_date) {
        (Some(x), Some(y)) => x.cmp(y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
