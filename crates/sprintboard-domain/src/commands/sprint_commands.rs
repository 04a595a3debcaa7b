use super::{Command, CommandContext};
use crate::column::DEFAULT_COLUMNS;
use crate::validation::{check_date_range, check_title, SprintDraft, ValidationErrors};
use crate::{Column, Sprint, SprintUpdate};
use sprintboard_core::SprintboardResult;
use uuid::Uuid;

/// Create a new sprint, optionally with the default board columns
pub struct CreateSprint {
    pub project_id: Uuid,
    pub draft: SprintDraft,
    pub seed_default_columns: bool,
}

impl Command for CreateSprint {
    fn execute(&self, context: &mut CommandContext) -> SprintboardResult<()> {
        self.draft.validate()?;
        context.require_project(self.project_id)?;

        let sprint = Sprint::new(self.project_id, self.draft.clone());
        if self.seed_default_columns {
            for (position, title) in DEFAULT_COLUMNS.iter().enumerate() {
                context
                    .columns
                    .push(Column::new(sprint.id, title.to_string(), position as i32));
            }
        }
        context.sprints.push(sprint);
        Ok(())
    }

    fn description(&self) -> String {
        format!("Create sprint: '{}'", self.draft.title.trim())
    }
}

/// Update sprint properties (title, description, dates)
///
/// The merged dates must still satisfy start < end.
pub struct UpdateSprint {
    pub sprint_id: Uuid,
    pub updates: SprintUpdate,
}

impl Command for UpdateSprint {
    fn execute(&self, context: &mut CommandContext) -> SprintboardResult<()> {
        let Some(sprint) = context.sprints.iter_mut().find(|s| s.id == self.sprint_id) else {
            return Ok(());
        };

        let mut errors = ValidationErrors::new();
        if let Some(title) = &self.updates.title {
            check_title(&mut errors, "title", title);
        }
        check_date_range(
            &mut errors,
            self.updates.start_date.unwrap_or(sprint.start_date),
            self.updates.end_date.unwrap_or(sprint.end_date),
        );
        errors.into_result()?;

        sprint.update(self.updates.clone());
        Ok(())
    }

    fn description(&self) -> String {
        "Update sprint".to_string()
    }
}

/// Complete a sprint. Completing twice is harmless.
pub struct CompleteSprint {
    pub sprint_id: Uuid,
}

impl Command for CompleteSprint {
    fn execute(&self, context: &mut CommandContext) -> SprintboardResult<()> {
        let sprint = context
            .sprints
            .iter_mut()
            .find(|s| s.id == self.sprint_id)
            .ok_or_else(|| {
                sprintboard_core::SprintboardError::NotFound(format!("Sprint {}", self.sprint_id))
            })?;
        if !sprint.complete() {
            tracing::debug!("Sprint {} was already completed", self.sprint_id);
        }
        Ok(())
    }

    fn description(&self) -> String {
        format!("Complete sprint {}", self.sprint_id)
    }
}

/// Delete a sprint along with its columns and tasks
pub struct DeleteSprint {
    pub sprint_id: Uuid,
}

impl Command for DeleteSprint {
    fn execute(&self, context: &mut CommandContext) -> SprintboardResult<()> {
        context.tasks.retain(|t| t.sprint_id != self.sprint_id);
        context.columns.retain(|c| c.sprint_id != self.sprint_id);
        context.sprints.retain(|s| s.id != self.sprint_id);
        Ok(())
    }

    fn description(&self) -> String {
        format!("Delete sprint {}", self.sprint_id)
    }
}
