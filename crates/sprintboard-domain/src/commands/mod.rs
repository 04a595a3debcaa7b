use sprintboard_core::{SprintboardError, SprintboardResult};
use uuid::Uuid;

use crate::{BacklogItem, Collaborator, Column, Project, Sprint, Task};

pub mod backlog_commands;
pub mod collaborator_commands;
pub mod column_commands;
pub mod project_commands;
pub mod sprint_commands;
pub mod task_commands;

pub use backlog_commands::*;
pub use collaborator_commands::*;
pub use column_commands::*;
pub use project_commands::*;
pub use sprint_commands::*;
pub use task_commands::*;

/// Trait for domain commands that mutate state
///
/// A command only touches the collections it is handed; it never talks to
/// the data store. Returning an error means nothing was changed.
pub trait Command: Send + Sync {
    /// Execute this command, mutating the domain state
    fn execute(&self, context: &mut CommandContext) -> SprintboardResult<()>;

    /// Human-readable description of what this command does
    fn description(&self) -> String;
}

/// Context passed to commands for mutation
/// Contains references to every collection of the workspace
pub struct CommandContext<'a> {
    pub projects: &'a mut Vec<Project>,
    pub sprints: &'a mut Vec<Sprint>,
    pub columns: &'a mut Vec<Column>,
    pub tasks: &'a mut Vec<Task>,
    pub backlog_items: &'a mut Vec<BacklogItem>,
    pub collaborators: &'a mut Vec<Collaborator>,
}

impl CommandContext<'_> {
    pub(crate) fn sprint(&self, id: Uuid) -> SprintboardResult<&Sprint> {
        self.sprints
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| SprintboardError::NotFound(format!("Sprint {}", id)))
    }

    pub(crate) fn column(&self, id: Uuid) -> SprintboardResult<&Column> {
        self.columns
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| SprintboardError::NotFound(format!("Column {}", id)))
    }

    pub(crate) fn require_project(&self, id: Uuid) -> SprintboardResult<()> {
        if self.projects.iter().any(|p| p.id == id) {
            Ok(())
        } else {
            Err(SprintboardError::NotFound(format!("Project {}", id)))
        }
    }
}
