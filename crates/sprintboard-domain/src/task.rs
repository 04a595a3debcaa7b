use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::column::ColumnId;
use crate::field_update::FieldUpdate;
use crate::sprint::SprintId;
use crate::validation::TaskDraft;

pub type TaskId = Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(format!("unknown priority '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub sprint_id: SprintId,
    pub column_id: ColumnId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub assignee: Option<String>,
    #[serde(default)]
    pub story_points: u32,
    #[serde(default)]
    pub position: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub completion_date: Option<DateTime<Utc>>,
}

impl Task {
    pub fn new(sprint_id: SprintId, column_id: ColumnId, draft: TaskDraft, position: i32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            sprint_id,
            column_id,
            title: draft.title.trim().to_string(),
            description: draft.description,
            priority: draft.priority,
            assignee: draft.assignee.filter(|a| !a.trim().is_empty()),
            story_points: draft.story_points,
            position,
            created_at: now,
            updated_at: now,
            completion_date: None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.completion_date.is_some()
    }

    pub fn move_to_column(&mut self, column_id: ColumnId, position: i32) {
        self.column_id = column_id;
        self.position = position;
        self.updated_at = Utc::now();
    }

    pub fn mark_completed(&mut self, at: DateTime<Utc>) {
        if self.completion_date.is_none() {
            self.completion_date = Some(at);
            self.updated_at = Utc::now();
        }
    }

    pub fn reopen(&mut self) {
        if self.completion_date.take().is_some() {
            self.updated_at = Utc::now();
        }
    }

    /// Update task with partial changes
    pub fn update(&mut self, updates: TaskUpdate) {
        if let Some(title) = updates.title {
            self.title = title.trim().to_string();
        }
        if let Some(description) = updates.description {
            self.description = description;
        }
        if let Some(priority) = updates.priority {
            self.priority = priority;
        }
        updates.assignee.apply_to(&mut self.assignee);
        if let Some(points) = updates.story_points {
            self.story_points = points;
        }
        self.updated_at = Utc::now();
    }
}

/// Partial update struct for Task
#[derive(Debug, Clone, Default)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub assignee: FieldUpdate<String>,
    pub story_points: Option<u32>,
}
