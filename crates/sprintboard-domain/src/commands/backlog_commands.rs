use super::{Command, CommandContext};
use crate::task_lifecycle::{next_position_in_column, todo_column};
use crate::validation::{check_points, check_title, BacklogItemDraft, ValidationErrors};
use crate::{BacklogItem, BacklogItemUpdate};
use sprintboard_core::{SprintboardError, SprintboardResult};
use uuid::Uuid;

/// Add an item to a project's backlog
pub struct CreateBacklogItem {
    pub project_id: Uuid,
    pub draft: BacklogItemDraft,
}

impl Command for CreateBacklogItem {
    fn execute(&self, context: &mut CommandContext) -> SprintboardResult<()> {
        self.draft.validate()?;
        context.require_project(self.project_id)?;
        context
            .backlog_items
            .push(BacklogItem::new(self.project_id, self.draft.clone()));
        Ok(())
    }

    fn description(&self) -> String {
        format!("Create backlog item: '{}'", self.draft.title.trim())
    }
}

/// Update backlog item properties
pub struct UpdateBacklogItem {
    pub item_id: Uuid,
    pub updates: BacklogItemUpdate,
}

impl Command for UpdateBacklogItem {
    fn execute(&self, context: &mut CommandContext) -> SprintboardResult<()> {
        let mut errors = ValidationErrors::new();
        if let Some(title) = &self.updates.title {
            check_title(&mut errors, "title", title);
        }
        if let Some(points) = self.updates.story_points {
            check_points(&mut errors, points);
        }
        errors.into_result()?;

        if let Some(item) = context
            .backlog_items
            .iter_mut()
            .find(|b| b.id == self.item_id)
        {
            item.update(self.updates.clone());
        }
        Ok(())
    }

    fn description(&self) -> String {
        "Update backlog item".to_string()
    }
}

/// Delete a backlog item
pub struct DeleteBacklogItem {
    pub item_id: Uuid,
}

impl Command for DeleteBacklogItem {
    fn execute(&self, context: &mut CommandContext) -> SprintboardResult<()> {
        context.backlog_items.retain(|b| b.id != self.item_id);
        Ok(())
    }

    fn description(&self) -> String {
        format!("Delete backlog item {}", self.item_id)
    }
}

/// Schedule a backlog item: it becomes a task in the sprint's "TO DO" column
///
/// When the sprint has no "TO DO" column the backlog is left untouched and
/// the command fails.
pub struct MoveBacklogItemToSprint {
    pub item_id: Uuid,
    pub sprint_id: Uuid,
}

impl Command for MoveBacklogItemToSprint {
    fn execute(&self, context: &mut CommandContext) -> SprintboardResult<()> {
        let pos = context
            .backlog_items
            .iter()
            .position(|b| b.id == self.item_id)
            .ok_or_else(|| SprintboardError::NotFound(format!("Backlog item {}", self.item_id)))?;

        let sprint = context.sprint(self.sprint_id)?;
        if sprint.project_id != context.backlog_items[pos].project_id {
            return Err(SprintboardError::Validation(format!(
                "Sprint '{}' belongs to another project",
                sprint.title
            )));
        }

        let column_id = todo_column(self.sprint_id, context.columns.as_slice())
            .map(|c| c.id)
            .ok_or_else(|| {
                SprintboardError::NotFound(format!(
                    "No TO DO column in sprint '{}'",
                    sprint.title
                ))
            })?;

        let position = next_position_in_column(context.tasks.as_slice(), column_id);
        let task = context.backlog_items[pos].to_task(self.sprint_id, column_id, position);
        context.tasks.push(task);
        context.backlog_items.remove(pos);
        Ok(())
    }

    fn description(&self) -> String {
        format!(
            "Move backlog item {} to sprint {}",
            self.item_id, self.sprint_id
        )
    }
}
