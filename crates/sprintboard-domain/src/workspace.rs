//! The normalized in-memory store.
//!
//! `Workspace` owns every entity the current session can see, one ordered
//! collection per kind. Relationships are foreign-key fields only: tasks
//! point at their column and sprint, columns at their sprint, sprints at
//! their project. Board layouts are derived on read (see `query`).

use crate::commands::{Command, CommandContext};
use crate::{BacklogItem, Collaborator, Column, Project, Sprint, Task};
use serde::{Deserialize, Serialize};
use sprintboard_core::SprintboardResult;
use uuid::Uuid;

/// Point-in-time state of everything the session holds.
///
/// All fields default so partial payloads load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    #[serde(default)]
    pub projects: Vec<Project>,

    #[serde(default)]
    pub sprints: Vec<Sprint>,

    #[serde(default)]
    pub columns: Vec<Column>,

    #[serde(default)]
    pub tasks: Vec<Task>,

    #[serde(default)]
    pub backlog_items: Vec<BacklogItem>,

    #[serde(default)]
    pub collaborators: Vec<Collaborator>,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
            && self.sprints.is_empty()
            && self.columns.is_empty()
            && self.tasks.is_empty()
            && self.backlog_items.is_empty()
            && self.collaborators.is_empty()
    }

    pub fn context(&mut self) -> CommandContext<'_> {
        CommandContext {
            projects: &mut self.projects,
            sprints: &mut self.sprints,
            columns: &mut self.columns,
            tasks: &mut self.tasks,
            backlog_items: &mut self.backlog_items,
            collaborators: &mut self.collaborators,
        }
    }

    /// Run a command directly against this workspace.
    pub fn apply(&mut self, command: &dyn Command) -> SprintboardResult<()> {
        command.execute(&mut self.context())
    }

    pub fn project(&self, id: Uuid) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn sprint(&self, id: Uuid) -> Option<&Sprint> {
        self.sprints.iter().find(|s| s.id == id)
    }

    pub fn column(&self, id: Uuid) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == id)
    }

    pub fn task(&self, id: Uuid) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn backlog_item(&self, id: Uuid) -> Option<&BacklogItem> {
        self.backlog_items.iter().find(|b| b.id == id)
    }

    pub fn collaborator(&self, id: Uuid) -> Option<&Collaborator> {
        self.collaborators.iter().find(|c| c.id == id)
    }

    pub fn sprints_of(&self, project_id: Uuid) -> Vec<&Sprint> {
        self.sprints
            .iter()
            .filter(|s| s.project_id == project_id)
            .collect()
    }

    pub fn backlog_of(&self, project_id: Uuid) -> Vec<&BacklogItem> {
        self.backlog_items
            .iter()
            .filter(|b| b.project_id == project_id)
            .collect()
    }

    pub fn tasks_of(&self, sprint_id: Uuid) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|t| t.sprint_id == sprint_id)
            .collect()
    }

    pub fn collaborators_of(&self, project_id: Uuid) -> Vec<&Collaborator> {
        self.collaborators
            .iter()
            .filter(|c| c.project_id == project_id)
            .collect()
    }
}
