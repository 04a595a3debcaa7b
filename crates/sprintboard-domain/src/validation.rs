//! Declarative input checks for everything a user can type into a form.
//!
//! Each draft validates itself and reports field-level messages, so a form
//! can show them inline. Commands re-run the same checks before mutating.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sprintboard_core::SprintboardError;
use std::collections::BTreeMap;
use std::fmt;

use crate::collaborator::Role;
use crate::task::Priority;

pub const MAX_TITLE_LEN: usize = 100;
pub const MAX_STORY_POINTS: u32 = 100;

/// Field name → message, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: BTreeMap<String, String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .fields
            .iter()
            .map(|(field, message)| format!("{}: {}", field, message))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

impl From<ValidationErrors> for SprintboardError {
    fn from(errors: ValidationErrors) -> Self {
        SprintboardError::Validation(errors.to_string())
    }
}

pub(crate) fn check_title(errors: &mut ValidationErrors, field: &str, title: &str) {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        errors.add(field, "is required");
    } else if trimmed.chars().count() > MAX_TITLE_LEN {
        errors.add(field, format!("must be at most {} characters", MAX_TITLE_LEN));
    }
}

pub(crate) fn check_points(errors: &mut ValidationErrors, points: u32) {
    if points > MAX_STORY_POINTS {
        errors.add(
            "storyPoints",
            format!("must be between 0 and {}", MAX_STORY_POINTS),
        );
    }
}

/// Check a column title on its own; columns have no draft beyond the title.
pub fn validate_column_title(title: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    check_title(&mut errors, "title", title);
    errors.into_result()
}

/// Loose `local@domain.tld` shape check.
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain
            .rsplit_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub end_goal: String,
}

impl ProjectDraft {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_title(&mut errors, "title", &self.title);
        errors.into_result()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SprintDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl SprintDraft {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_title(&mut errors, "title", &self.title);
        check_date_range(&mut errors, self.start_date, self.end_date);
        errors.into_result()
    }
}

pub fn check_date_range(errors: &mut ValidationErrors, start: NaiveDate, end: NaiveDate) {
    if start >= end {
        errors.add("endDate", "must be after the start date");
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub assignee: Option<String>,
    #[serde(default)]
    pub story_points: u32,
}

impl TaskDraft {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_title(&mut errors, "title", &self.title);
        check_points(&mut errors, self.story_points);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BacklogItemDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub story_points: u32,
}

impl BacklogItemDraft {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_title(&mut errors, "title", &self.title);
        check_points(&mut errors, self.story_points);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvitationDraft {
    pub email: String,
    #[serde(default)]
    pub role: Role,
}

impl InvitationDraft {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.email.trim().is_empty() {
            errors.add("email", "is required");
        } else if !is_valid_email(&self.email) {
            errors.add("email", "is not a valid email address");
        }
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_project_title_required() {
        let errors = ProjectDraft {
            title: "   ".into(),
            ..Default::default()
        }
        .validate()
        .unwrap_err();
        assert_eq!(errors.get("title"), Some("is required"));
    }

    #[test]
    fn test_title_length_limit() {
        let draft = ProjectDraft {
            title: "x".repeat(MAX_TITLE_LEN + 1),
            ..Default::default()
        };
        assert!(draft.validate().is_err());
    }

    #[test]
    fn test_sprint_dates_must_be_ordered() {
        let mut draft = SprintDraft {
            title: "Sprint 1".into(),
            description: String::new(),
            start_date: date(2024, 1, 14),
            end_date: date(2024, 1, 1),
        };
        let errors = draft.validate().unwrap_err();
        assert!(errors.get("endDate").is_some());

        draft.end_date = draft.start_date;
        assert!(draft.validate().is_err());

        draft.end_date = date(2024, 1, 28);
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn test_task_collects_all_field_errors() {
        let errors = TaskDraft {
            title: String::new(),
            story_points: MAX_STORY_POINTS + 1,
            ..Default::default()
        }
        .validate()
        .unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors.to_string().contains("storyPoints"));
    }

    #[test]
    fn test_email_shape() {
        assert!(is_valid_email("ana@example.com"));
        assert!(is_valid_email(" ana.b@sub.example.org "));
        assert!(!is_valid_email("ana"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("ana@example"));
        assert!(!is_valid_email("ana@@example.com"));
        assert!(!is_valid_email("a na@example.com"));
    }

    #[test]
    fn test_validation_errors_convert() {
        let err: SprintboardError = InvitationDraft::default().validate().unwrap_err().into();
        assert!(matches!(err, SprintboardError::Validation(msg) if msg == "email: is required"));
    }
}
