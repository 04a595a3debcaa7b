use super::{Command, CommandContext};
use crate::column::{is_default_title, titles_match};
use crate::task_lifecycle::next_column_position;
use crate::validation::validate_column_title;
use crate::Column;
use sprintboard_core::{SprintboardError, SprintboardResult};
use uuid::Uuid;

fn ensure_unique_title(
    context: &CommandContext,
    sprint_id: Uuid,
    title: &str,
    except: Option<Uuid>,
) -> SprintboardResult<()> {
    let taken = context
        .columns
        .iter()
        .any(|c| c.sprint_id == sprint_id && Some(c.id) != except && titles_match(&c.title, title));
    if taken {
        return Err(SprintboardError::Duplicate(format!(
            "Column '{}' already exists in this sprint",
            title.trim()
        )));
    }
    Ok(())
}

/// Create a new column at the end of a sprint board
pub struct CreateColumn {
    pub sprint_id: Uuid,
    pub title: String,
}

impl Command for CreateColumn {
    fn execute(&self, context: &mut CommandContext) -> SprintboardResult<()> {
        validate_column_title(&self.title)?;
        context.sprint(self.sprint_id)?;
        ensure_unique_title(context, self.sprint_id, &self.title, None)?;

        let position = next_column_position(self.sprint_id, context.columns.as_slice());
        let column = Column::new(self.sprint_id, self.title.clone(), position);
        context.columns.push(column);
        Ok(())
    }

    fn description(&self) -> String {
        format!("Create column: '{}'", self.title.trim())
    }
}

/// Rename a column. The default columns keep their titles.
pub struct RenameColumn {
    pub column_id: Uuid,
    pub title: String,
}

impl Command for RenameColumn {
    fn execute(&self, context: &mut CommandContext) -> SprintboardResult<()> {
        validate_column_title(&self.title)?;
        let column = context.column(self.column_id)?;
        if column.is_default() {
            return Err(SprintboardError::Validation(format!(
                "Column '{}' is a default column and cannot be renamed",
                column.title
            )));
        }
        if is_default_title(&self.title) {
            return Err(SprintboardError::Validation(format!(
                "'{}' is reserved for default columns",
                self.title.trim()
            )));
        }
        let sprint_id = column.sprint_id;
        ensure_unique_title(context, sprint_id, &self.title, Some(self.column_id))?;

        if let Some(column) = context.columns.iter_mut().find(|c| c.id == self.column_id) {
            column.rename(self.title.clone());
        }
        Ok(())
    }

    fn description(&self) -> String {
        format!("Rename column {} to '{}'", self.column_id, self.title.trim())
    }
}

/// Delete an empty, non-default column
pub struct DeleteColumn {
    pub column_id: Uuid,
}

impl Command for DeleteColumn {
    fn execute(&self, context: &mut CommandContext) -> SprintboardResult<()> {
        let Some(column) = context.columns.iter().find(|c| c.id == self.column_id) else {
            return Ok(());
        };
        if column.is_default() {
            return Err(SprintboardError::Validation(format!(
                "Column '{}' is a default column and cannot be deleted",
                column.title
            )));
        }
        let task_count = context
            .tasks
            .iter()
            .filter(|t| t.column_id == self.column_id)
            .count();
        if task_count > 0 {
            return Err(SprintboardError::Validation(format!(
                "Column '{}' still holds {} task(s); move them first",
                column.title, task_count
            )));
        }

        context.columns.retain(|c| c.id != self.column_id);
        Ok(())
    }

    fn description(&self) -> String {
        format!("Delete column {}", self.column_id)
    }
}
