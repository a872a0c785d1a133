//! `task add`

use crate::clock::Clock;
use crate::error::{TaskResult, ValidationError};
use crate::git::BranchOps;
use crate::manager::TaskManager;
use crate::storage::Storage;
use crate::types::{CreateTaskInput, Task};
use crate::validate;
use clap::Args;

/// Arguments for the add command.
#[derive(Args, Debug)]
pub struct AddArgs {
    /// Task title (1-200 characters)
    pub title: String,

    /// Free-form description
    #[arg(short, long)]
    pub description: Option<String>,

    /// Priority: high, medium or low
    #[arg(short, long)]
    pub priority: Option<String>,

    /// Due date (YYYY-MM-DD)
    #[arg(long)]
    pub due: Option<String>,
}

impl AddArgs {
    /// Validate every field and build the engine input.
    pub fn to_input(&self) -> Result<CreateTaskInput, ValidationError> {
        validate::validate_title(&self.title)?;

        let mut input = CreateTaskInput::new(self.title.clone());
        input.description = self.description.clone();
        input.priority = self
            .priority
            .as_deref()
            .map(validate::validate_priority)
            .transpose()?;
        if let Some(ref due) = self.due {
            validate::validate_due_date(due)?;
            input.due_date = Some(due.clone());
        }
        Ok(input)
    }
}

pub fn run_add<S: Storage, G: BranchOps, C: Clock>(
    manager: &TaskManager<S, G, C>,
    args: &AddArgs,
) -> TaskResult<Task> {
    let input = args.to_input()?;
    manager.create_task(input)
}
