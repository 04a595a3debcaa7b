use super::{Command, CommandContext};
use crate::validation::{check_title, ProjectDraft, ValidationErrors};
use crate::{Project, ProjectUpdate};
use sprintboard_core::SprintboardResult;
use std::collections::HashSet;
use uuid::Uuid;

/// Create a new project owned by `owner_id`
pub struct CreateProject {
    pub draft: ProjectDraft,
    pub owner_id: String,
}

impl Command for CreateProject {
    fn execute(&self, context: &mut CommandContext) -> SprintboardResult<()> {
        self.draft.validate()?;
        let project = Project::new(self.draft.clone(), self.owner_id.clone());
        context.projects.push(project);
        Ok(())
    }

    fn description(&self) -> String {
        format!("Create project: '{}'", self.draft.title.trim())
    }
}

/// Update project properties (title, description, end goal)
///
/// Unknown project ids are ignored.
pub struct UpdateProject {
    pub project_id: Uuid,
    pub updates: ProjectUpdate,
}

impl Command for UpdateProject {
    fn execute(&self, context: &mut CommandContext) -> SprintboardResult<()> {
        if let Some(title) = &self.updates.title {
            let mut errors = ValidationErrors::new();
            check_title(&mut errors, "title", title);
            errors.into_result()?;
        }
        if let Some(project) = context.projects.iter_mut().find(|p| p.id == self.project_id) {
            project.update(self.updates.clone());
        }
        Ok(())
    }

    fn description(&self) -> String {
        "Update project".to_string()
    }
}

/// Delete a project together with everything hanging off it
pub struct DeleteProject {
    pub project_id: Uuid,
}

impl Command for DeleteProject {
    fn execute(&self, context: &mut CommandContext) -> SprintboardResult<()> {
        // Sprint ids must be captured before the sprints themselves go.
        let sprint_ids: HashSet<Uuid> = context
            .sprints
            .iter()
            .filter(|s| s.project_id == self.project_id)
            .map(|s| s.id)
            .collect();

        context.tasks.retain(|t| !sprint_ids.contains(&t.sprint_id));
        context.columns.retain(|c| !sprint_ids.contains(&c.sprint_id));
        context.sprints.retain(|s| s.project_id != self.project_id);
        context
            .backlog_items
            .retain(|b| b.project_id != self.project_id);
        context
            .collaborators
            .retain(|c| c.project_id != self.project_id);
        context.projects.retain(|p| p.id != self.project_id);

        tracing::debug!(
            "Deleted project {} with {} sprints",
            self.project_id,
            sprint_ids.len()
        );
        Ok(())
    }

    fn description(&self) -> String {
        format!("Delete project {}", self.project_id)
    }
}
