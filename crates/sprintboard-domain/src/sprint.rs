use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::project::ProjectId;
use crate::validation::SprintDraft;

pub type SprintId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SprintStatus {
    Active,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sprint {
    pub id: SprintId,
    pub project_id: ProjectId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Sprint {
    pub fn new(project_id: ProjectId, draft: SprintDraft) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            project_id,
            title: draft.title.trim().to_string(),
            description: draft.description,
            start_date: draft.start_date,
            end_date: draft.end_date,
            is_completed: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn status(&self) -> SprintStatus {
        if self.is_completed {
            SprintStatus::Completed
        } else {
            SprintStatus::Active
        }
    }

    /// Mark the sprint completed. There is no way back.
    ///
    /// Returns false when the sprint was already completed.
    pub fn complete(&mut self) -> bool {
        if self.is_completed {
            return false;
        }
        self.is_completed = true;
        self.updated_at = Utc::now();
        true
    }

    /// Number of calendar days covered, both ends included.
    pub fn duration_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }

    /// Update sprint with partial changes
    pub fn update(&mut self, updates: SprintUpdate) {
        if let Some(title) = updates.title {
            self.title = title.trim().to_string();
        }
        if let Some(description) = updates.description {
            self.description = description;
        }
        if let Some(start_date) = updates.start_date {
            self.start_date = start_date;
        }
        if let Some(end_date) = updates.end_date {
            self.end_date = end_date;
        }
        self.updated_at = Utc::now();
    }
}

/// Partial update struct for Sprint
#[derive(Debug, Clone, Default)]
pub struct SprintUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sprint() -> Sprint {
        Sprint::new(
            Uuid::new_v4(),
            SprintDraft {
                title: "Sprint 1".into(),
                description: String::new(),
                start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                end_date: NaiveDate::from_ymd_opt(2024, 1, 14).unwrap(),
            },
        )
    }

    #[test]
    fn test_complete_is_one_way_and_idempotent() {
        let mut sprint = sprint();
        assert_eq!(sprint.status(), SprintStatus::Active);

        assert!(sprint.complete());
        assert!(!sprint.complete());
        assert!(sprint.is_completed);
        assert_eq!(sprint.status(), SprintStatus::Completed);
    }

    #[test]
    fn test_duration_is_inclusive() {
        let sprint = sprint();
        assert_eq!(sprint.duration_days(), 14);
    }
}
