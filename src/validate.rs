//! Input validation for user-supplied task fields.
//!
//! Every check is pure. Validators that accept free text return the parsed,
//! typed value so callers never handle an unchecked string twice.

use crate::error::ValidationError;
use crate::types::{SortField, TaskId, TaskPriority, TaskStatus};
use chrono::NaiveDate;
use regex_lite::Regex;
use std::sync::LazyLock;

/// Maximum title length in characters.
pub const MAX_TITLE_LENGTH: usize = 200;

static DUE_DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("static pattern"));

/// Check that a title is between 1 and 200 characters.
pub fn validate_title(title: &str) -> Result<(), ValidationError> {
    if title.is_empty() {
        return Err(ValidationError::new("title", "title must not be empty"));
    }
    let length = title.chars().count();
    if length > MAX_TITLE_LENGTH {
        return Err(ValidationError::new(
            "title",
            format!(
                "title must be at most {} characters (got {})",
                MAX_TITLE_LENGTH, length
            ),
        ));
    }
    Ok(())
}

/// Check that a due date is `YYYY-MM-DD` and names a real calendar day.
pub fn validate_due_date(date: &str) -> Result<NaiveDate, ValidationError> {
    if !DUE_DATE_PATTERN.is_match(date) {
        return Err(ValidationError::new(
            "dueDate",
            "due date must use the YYYY-MM-DD format (e.g. 2026-12-31)",
        ));
    }
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| ValidationError::new("dueDate", format!("invalid due date: {}", date)))
}

/// Parse a canonical positive-integer task id.
///
/// The integer must re-serialize to exactly the input, which rejects leading
/// zeros, signs, whitespace and decimals.
pub fn validate_task_id(id: &str) -> Result<TaskId, ValidationError> {
    id.parse::<u64>()
        .ok()
        .filter(|n| n.to_string() == id)
        .and_then(TaskId::new)
        .ok_or_else(|| {
            ValidationError::new("id", "task id must be a positive integer (e.g. 1, 2, 3)")
        })
}

pub fn validate_priority(priority: &str) -> Result<TaskPriority, ValidationError> {
    match priority {
        "high" => Ok(TaskPriority::High),
        "medium" => Ok(TaskPriority::Medium),
        "low" => Ok(TaskPriority::Low),
        _ => Err(ValidationError::new(
            "priority",
            "priority must be one of high / medium / low",
        )),
    }
}

pub fn validate_status(status: &str) -> Result<TaskStatus, ValidationError> {
    TaskStatus::ALL
        .into_iter()
        .find(|s| s.as_str() == status)
        .ok_or_else(|| {
            ValidationError::new(
                "status",
                "status must be one of open / in_progress / completed / archived",
            )
        })
}

pub fn validate_sort_field(field: &str) -> Result<SortField, ValidationError> {
    match field {
        "id" => Ok(SortField::Id),
        "priority" => Ok(SortField::Priority),
        "dueDate" => Ok(SortField::DueDate),
        "createdAt" => Ok(SortField::CreatedAt),
        _ => Err(ValidationError::new(
            "sortBy",
            "sort field must be one of id / priority / dueDate / createdAt",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_bounds() {
        assert!(validate_title("a").is_ok());
        assert!(validate_title(&"x".repeat(200)).is_ok());

        let empty = validate_title("").unwrap_err();
        assert_eq!(empty.field, "title");
        assert!(empty.message.contains("empty"));

        let long = validate_title(&"x".repeat(201)).unwrap_err();
        assert!(long.message.contains("201"), "message: {}", long.message);
    }

    #[test]
    fn title_length_counts_characters_not_bytes() {
        // 200 three-byte characters are still 200 characters
        assert!(validate_title(&"タ".repeat(200)).is_ok());
        assert!(validate_title(&"タ".repeat(201)).is_err());
    }

    #[test]
    fn due_date_requires_pattern_and_real_date() {
        assert_eq!(
            validate_due_date("2026-12-31").unwrap(),
            NaiveDate::from_ymd_opt(2026, 12, 31).unwrap()
        );
        assert!(validate_due_date("2028-02-29").is_ok());

        for bad in ["2026/12/31", "26-12-31", "2026-1-31", "2026-12-31T00:00", ""] {
            let err = validate_due_date(bad).unwrap_err();
            assert_eq!(err.field, "dueDate");
            assert!(err.message.contains("YYYY-MM-DD"), "{}", bad);
        }

        // Matches the pattern but is not a calendar date
        for bad in ["2026-13-01", "2026-02-30", "2027-02-29", "2026-00-10"] {
            let err = validate_due_date(bad).unwrap_err();
            assert!(err.message.contains("invalid due date"), "{}", bad);
        }
    }

    #[test]
    fn task_id_must_be_canonical() {
        assert_eq!(validate_task_id("1").unwrap().get(), 1);
        assert_eq!(validate_task_id("1234").unwrap().get(), 1234);

        for bad in ["0", "01", "-1", "+1", "1.0", "1e3", "abc", "", " 1", "1 "] {
            let err = validate_task_id(bad).unwrap_err();
            assert_eq!(err.field, "id", "{:?}", bad);
        }
    }

    #[test]
    fn priority_is_case_sensitive() {
        assert_eq!(validate_priority("high").unwrap(), TaskPriority::High);
        assert_eq!(validate_priority("medium").unwrap(), TaskPriority::Medium);
        assert_eq!(validate_priority("low").unwrap(), TaskPriority::Low);
        assert!(validate_priority("HIGH").is_err());
        assert!(validate_priority("urgent").is_err());
    }

    #[test]
    fn status_literals() {
        assert_eq!(validate_status("in_progress").unwrap(), TaskStatus::InProgress);
        assert_eq!(validate_status("archived").unwrap(), TaskStatus::Archived);
        assert!(validate_status("in-progress").is_err());
        assert!(validate_status("Open").is_err());
    }

    #[test]
    fn sort_fields() {
        assert_eq!(validate_sort_field("dueDate").unwrap(), SortField::DueDate);
        assert_eq!(validate_sort_field("createdAt").unwrap(), SortField::CreatedAt);
        assert!(validate_sort_field("due_date").is_err());
        assert!(validate_sort_field("title").is_err());
    }

    #[test]
    fn from_str_delegates_to_validators() {
        assert_eq!("low".parse::<TaskPriority>().unwrap(), TaskPriority::Low);
        assert_eq!("open".parse::<TaskStatus>().unwrap(), TaskStatus::Open);
        assert_eq!("5".parse::<TaskId>().unwrap().get(), 5);
        assert!("05".parse::<TaskId>().is_err());
    }
}
