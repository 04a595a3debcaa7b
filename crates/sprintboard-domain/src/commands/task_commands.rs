use super::{Command, CommandContext};
use crate::task_lifecycle::{
    compact_column_positions, completion_change, next_position_in_column, todo_column,
    CompletionChange,
};
use crate::validation::{check_points, check_title, TaskDraft, ValidationErrors};
use crate::{BacklogItem, Task, TaskUpdate};
use chrono::Utc;
use sprintboard_core::{SprintboardError, SprintboardResult};
use uuid::Uuid;

/// Create a task on a sprint board
///
/// Without an explicit column the task lands in the sprint's "TO DO" column.
pub struct CreateTask {
    pub sprint_id: Uuid,
    pub column_id: Option<Uuid>,
    pub draft: TaskDraft,
}

impl Command for CreateTask {
    fn execute(&self, context: &mut CommandContext) -> SprintboardResult<()> {
        self.draft.validate()?;
        context.sprint(self.sprint_id)?;

        let column = match self.column_id {
            Some(column_id) => context.column(column_id)?,
            None => todo_column(self.sprint_id, context.columns.as_slice()).ok_or_else(|| {
                SprintboardError::NotFound(format!(
                    "TO DO column for sprint {}",
                    self.sprint_id
                ))
            })?,
        };
        if column.sprint_id != self.sprint_id {
            return Err(SprintboardError::Validation(format!(
                "Column '{}' belongs to another sprint",
                column.title
            )));
        }
        let (column_id, is_done) = (column.id, column.is_done());

        let position = next_position_in_column(context.tasks.as_slice(), column_id);
        let mut task = Task::new(self.sprint_id, column_id, self.draft.clone(), position);
        if is_done {
            task.mark_completed(Utc::now());
        }
        context.tasks.push(task);
        Ok(())
    }

    fn description(&self) -> String {
        format!("Create task: '{}'", self.draft.title.trim())
    }
}

/// Update task properties (title, description, priority, assignee, points)
pub struct UpdateTask {
    pub task_id: Uuid,
    pub updates: TaskUpdate,
}

impl Command for UpdateTask {
    fn execute(&self, context: &mut CommandContext) -> SprintboardResult<()> {
        let mut errors = ValidationErrors::new();
        if let Some(title) = &self.updates.title {
            check_title(&mut errors, "title", title);
        }
        if let Some(points) = self.updates.story_points {
            check_points(&mut errors, points);
        }
        errors.into_result()?;

        if let Some(task) = context.tasks.iter_mut().find(|t| t.id == self.task_id) {
            task.update(self.updates.clone());
        }
        Ok(())
    }

    fn description(&self) -> String {
        "Update task".to_string()
    }
}

/// Delete a task
pub struct DeleteTask {
    pub task_id: Uuid,
}

impl Command for DeleteTask {
    fn execute(&self, context: &mut CommandContext) -> SprintboardResult<()> {
        if let Some(pos) = context.tasks.iter().position(|t| t.id == self.task_id) {
            let task = context.tasks.remove(pos);
            compact_column_positions(context.tasks.as_mut_slice(), task.column_id);
        }
        Ok(())
    }

    fn description(&self) -> String {
        format!("Delete task {}", self.task_id)
    }
}

/// Move a task from one column to another on the same sprint board
///
/// The task is appended to the destination column. Moving onto the column
/// the task already sits in changes nothing.
pub struct MoveTask {
    pub task_id: Uuid,
    pub source_column_id: Uuid,
    pub destination_column_id: Uuid,
}

impl Command for MoveTask {
    fn execute(&self, context: &mut CommandContext) -> SprintboardResult<()> {
        if self.source_column_id == self.destination_column_id {
            return Ok(());
        }

        let task = context
            .tasks
            .iter()
            .find(|t| t.id == self.task_id)
            .ok_or_else(|| SprintboardError::NotFound(format!("Task {}", self.task_id)))?;
        if task.column_id != self.source_column_id {
            return Err(SprintboardError::Validation(format!(
                "Task {} is not in column {}",
                self.task_id, self.source_column_id
            )));
        }
        let sprint_id = task.sprint_id;

        let source = context.column(self.source_column_id)?.clone();
        let destination = context.column(self.destination_column_id)?.clone();
        if destination.sprint_id != sprint_id {
            return Err(SprintboardError::Validation(format!(
                "Column '{}' belongs to another sprint",
                destination.title
            )));
        }

        let position = next_position_in_column(context.tasks.as_slice(), destination.id);
        let change = completion_change(&source, &destination);
        if let Some(task) = context.tasks.iter_mut().find(|t| t.id == self.task_id) {
            task.move_to_column(destination.id, position);
            match change {
                CompletionChange::Complete => task.mark_completed(Utc::now()),
                CompletionChange::Reopen => task.reopen(),
                CompletionChange::Unchanged => {}
            }
        }
        compact_column_positions(context.tasks.as_mut_slice(), source.id);
        Ok(())
    }

    fn description(&self) -> String {
        format!(
            "Move task {} to column {}",
            self.task_id, self.destination_column_id
        )
    }
}

/// Pull a task out of its sprint and back into the project backlog
pub struct MoveTaskToBacklog {
    pub task_id: Uuid,
}

impl Command for MoveTaskToBacklog {
    fn execute(&self, context: &mut CommandContext) -> SprintboardResult<()> {
        let pos = context
            .tasks
            .iter()
            .position(|t| t.id == self.task_id)
            .ok_or_else(|| SprintboardError::NotFound(format!("Task {}", self.task_id)))?;
        let project_id = context.sprint(context.tasks[pos].sprint_id)?.project_id;

        let task = context.tasks.remove(pos);
        compact_column_positions(context.tasks.as_mut_slice(), task.column_id);
        context
            .backlog_items
            .push(BacklogItem::from_task(project_id, &task));
        Ok(())
    }

    fn description(&self) -> String {
        format!("Move task {} to backlog", self.task_id)
    }
}
