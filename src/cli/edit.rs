//! `task edit`

use crate::clock::Clock;
use crate::error::{TaskResult, ValidationError};
use crate::git::BranchOps;
use crate::manager::TaskManager;
use crate::storage::Storage;
use crate::types::{Task, TaskId, UpdateTaskInput};
use crate::validate;
use clap::Args;

/// Arguments for the edit command.
#[derive(Args, Debug)]
pub struct EditArgs {
    /// Task id
    pub id: String,

    /// New title
    #[arg(long)]
    pub title: Option<String>,

    /// New description
    #[arg(short, long)]
    pub description: Option<String>,

    /// New priority: high, medium or low
    #[arg(short, long)]
    pub priority: Option<String>,

    /// New due date (YYYY-MM-DD)
    #[arg(long)]
    pub due: Option<String>,
}

impl EditArgs {
    /// Validated id and update. At least one field must be given.
    pub fn to_update(&self) -> Result<(TaskId, UpdateTaskInput), ValidationError> {
        let id = validate::validate_task_id(&self.id)?;

        if let Some(ref title) = self.title {
            validate::validate_title(title)?;
        }
        if let Some(ref due) = self.due {
            validate::validate_due_date(due)?;
        }
        let input = UpdateTaskInput {
            title: self.title.clone(),
            description: self.description.clone(),
            priority: self
                .priority
                .as_deref()
                .map(validate::validate_priority)
                .transpose()?,
            due_date: self.due.clone(),
        };

        if input.is_empty() {
            return Err(ValidationError::new(
                "update",
                "nothing to update: pass --title, --description, --priority or --due",
            ));
        }
        Ok((id, input))
    }
}

pub fn run_edit<S: Storage, G: BranchOps, C: Clock>(
    manager: &TaskManager<S, G, C>,
    args: &EditArgs,
) -> TaskResult<Task> {
    let (id, input) = args.to_update()?;
    manager.update_task(id, input)
}
