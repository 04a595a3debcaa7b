use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::column::ColumnId;
use crate::project::ProjectId;
use crate::sprint::SprintId;
use crate::task::{Priority, Task};
use crate::validation::{BacklogItemDraft, TaskDraft};

pub type BacklogItemId = Uuid;

/// Unscheduled work that belongs to a project but no sprint yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BacklogItem {
    pub id: BacklogItemId,
    pub project_id: ProjectId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub story_points: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BacklogItem {
    pub fn new(project_id: ProjectId, draft: BacklogItemDraft) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            project_id,
            title: draft.title.trim().to_string(),
            description: draft.description,
            priority: draft.priority,
            story_points: draft.story_points,
            created_at: now,
            updated_at: now,
        }
    }

    /// Build the task that replaces this item once it is scheduled.
    pub fn to_task(&self, sprint_id: SprintId, column_id: ColumnId, position: i32) -> Task {
        Task::new(
            sprint_id,
            column_id,
            TaskDraft {
                title: self.title.clone(),
                description: self.description.clone(),
                priority: self.priority,
                assignee: None,
                story_points: self.story_points,
            },
            position,
        )
    }

    /// Build the backlog item that replaces a task pulled out of its sprint.
    pub fn from_task(project_id: ProjectId, task: &Task) -> Self {
        Self::new(
            project_id,
            BacklogItemDraft {
                title: task.title.clone(),
                description: task.description.clone(),
                priority: task.priority,
                story_points: task.story_points,
            },
        )
    }

    pub fn update(&mut self, updates: BacklogItemUpdate) {
        if let Some(title) = updates.title {
            self.title = title.trim().to_string();
        }
        if let Some(description) = updates.description {
            self.description = description;
        }
        if let Some(priority) = updates.priority {
            self.priority = priority;
        }
        if let Some(points) = updates.story_points {
            self.story_points = points;
        }
        self.updated_at = Utc::now();
    }
}

/// Partial update struct for BacklogItem
#[derive(Debug, Clone, Default)]
pub struct BacklogItemUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub story_points: Option<u32>,
}
