use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::validation::ProjectDraft;

pub type ProjectId = Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub owner_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub end_goal: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    pub fn new(draft: ProjectDraft, owner_id: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_id,
            title: draft.title.trim().to_string(),
            description: draft.description,
            end_goal: draft.end_goal,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn update(&mut self, updates: ProjectUpdate) {
        if let Some(title) = updates.title {
            self.title = title.trim().to_string();
        }
        if let Some(description) = updates.description {
            self.description = description;
        }
        if let Some(end_goal) = updates.end_goal {
            self.end_goal = end_goal;
        }
        self.updated_at = Utc::now();
    }
}

/// Partial update struct for Project
#[derive(Debug, Clone, Default)]
pub struct ProjectUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub end_goal: Option<String>,
}

impl ProjectUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.end_goal.is_none()
    }
}
