//! Structured error types for task operations.

use crate::types::TaskId;
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Error kind for programmatic error handling (exit codes, JSON output).
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Bad input shape or illegal state transition.
    Validation,
    /// Referenced task does not exist.
    NotFound,
    /// Branch derivation or creation failed.
    GitIntegration,
    /// Filesystem or JSON failure in the store.
    Storage,
}

impl ErrorKind {
    /// Process exit status the CLI reports for this kind.
    pub fn exit_code(&self) -> i32 {
        match self {
            ErrorKind::Validation => 1,
            ErrorKind::NotFound => 2,
            ErrorKind::GitIntegration => 3,
            ErrorKind::Storage => 4,
        }
    }
}

/// Input or transition rejected, with the offending field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    /// A lifecycle operation was attempted from a status that does not allow it.
    pub fn invalid_transition(status: impl std::fmt::Display, operation: &str) -> Self {
        Self::new(
            "status",
            format!("cannot {} a task that is {}", operation, status),
        )
    }
}

/// Failure reported by the version-control collaborator.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct GitError {
    pub message: String,
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl GitError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// Failure reading or writing the on-disk store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl StorageError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StorageError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        StorageError::Json {
            path: path.into(),
            source,
        }
    }
}

/// Every failure the lifecycle engine can surface.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("task #{id} not found")]
    NotFound { id: TaskId },

    #[error(transparent)]
    Git(#[from] GitError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl TaskError {
    pub fn not_found(id: TaskId) -> Self {
        TaskError::NotFound { id }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            TaskError::Validation(_) => ErrorKind::Validation,
            TaskError::NotFound { .. } => ErrorKind::NotFound,
            TaskError::Git(_) => ErrorKind::GitIntegration,
            TaskError::Storage(_) => ErrorKind::Storage,
        }
    }

    pub fn exit_code(&self) -> i32 {
        self.kind().exit_code()
    }

    /// Offending field, for validation errors.
    pub fn field(&self) -> Option<&str> {
        match self {
            TaskError::Validation(e) => Some(&e.field),
            _ => None,
        }
    }
}

/// Result type for task operations.
pub type TaskResult<T> = std::result::Result<T, TaskError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn kinds_map_to_distinct_exit_codes() {
        let id = TaskId::new(3).unwrap();
        let validation: TaskError = ValidationError::new("title", "too long").into();
        let not_found = TaskError::not_found(id);
        let git: TaskError = GitError::new("checkout failed").into();
        let storage: TaskError = StorageError::io(
            "tasks.json",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        )
        .into();

        assert_eq!(validation.kind(), ErrorKind::Validation);
        assert_eq!(not_found.kind(), ErrorKind::NotFound);
        assert_eq!(git.kind(), ErrorKind::GitIntegration);
        assert_eq!(storage.kind(), ErrorKind::Storage);

        assert_eq!(validation.exit_code(), 1);
        assert_eq!(not_found.exit_code(), 2);
        assert_eq!(git.exit_code(), 3);
        assert_eq!(storage.exit_code(), 4);
    }

    #[test]
    fn validation_error_exposes_field() {
        let err: TaskError = ValidationError::invalid_transition("archived", "start").into();
        assert_eq!(err.field(), Some("status"));
        assert_eq!(err.to_string(), "cannot start a task that is archived");
        assert_eq!(TaskError::not_found(TaskId::new(1).unwrap()).field(), None);
    }

    #[test]
    fn not_found_message_names_the_id() {
        let err = TaskError::not_found(TaskId::new(42).unwrap());
        assert_eq!(err.to_string(), "task #42 not found");
    }

    #[test]
    fn git_error_keeps_nested_cause() {
        let cause = std::io::Error::new(std::io::ErrorKind::NotFound, "git not installed");
        let err = GitError::with_source("failed to create branch", cause);
        assert_eq!(err.to_string(), "failed to create branch");
        assert_eq!(err.source().unwrap().to_string(), "git not installed");
    }

    #[test]
    fn error_kind_serializes_screaming_snake() {
        let json = serde_json::to_string(&ErrorKind::GitIntegration).unwrap();
        assert_eq!(json, "\"GIT_INTEGRATION\"");
    }
}
