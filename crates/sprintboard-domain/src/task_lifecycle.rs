//! Task placement rules.
//!
//! Pure functions relating tasks, the columns of a sprint board, and the
//! completion stamp. Commands and board views both go through these.

use crate::column::{titles_match, Column, ColumnId, DONE_COLUMN, TODO_COLUMN};
use crate::sprint::SprintId;
use crate::task::Task;

/// What happens to a task's completion stamp when it changes column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionChange {
    Complete,
    Reopen,
    Unchanged,
}

/// A sprint's columns sorted by position.
pub fn sorted_sprint_columns(sprint_id: SprintId, columns: &[Column]) -> Vec<&Column> {
    let mut cols: Vec<_> = columns.iter().filter(|c| c.sprint_id == sprint_id).collect();
    cols.sort_by_key(|c| c.position);
    cols
}

/// Find a sprint column by title.
pub fn find_column_by_title<'a>(
    sprint_id: SprintId,
    title: &str,
    columns: &'a [Column],
) -> Option<&'a Column> {
    columns
        .iter()
        .find(|c| c.sprint_id == sprint_id && titles_match(&c.title, title))
}

pub fn todo_column(sprint_id: SprintId, columns: &[Column]) -> Option<&Column> {
    find_column_by_title(sprint_id, TODO_COLUMN, columns)
}

pub fn done_column(sprint_id: SprintId, columns: &[Column]) -> Option<&Column> {
    find_column_by_title(sprint_id, DONE_COLUMN, columns)
}

/// Position for a task appended to the end of a column.
pub fn next_position_in_column(tasks: &[Task], column_id: ColumnId) -> i32 {
    tasks
        .iter()
        .filter(|t| t.column_id == column_id)
        .map(|t| t.position + 1)
        .max()
        .unwrap_or(0)
}

pub fn next_column_position(sprint_id: SprintId, columns: &[Column]) -> i32 {
    columns
        .iter()
        .filter(|c| c.sprint_id == sprint_id)
        .map(|c| c.position + 1)
        .max()
        .unwrap_or(0)
}

/// Tasks of a column in board order.
pub fn tasks_in_column(column_id: ColumnId, tasks: &[Task]) -> Vec<&Task> {
    let mut in_column: Vec<_> = tasks.iter().filter(|t| t.column_id == column_id).collect();
    in_column.sort_by_key(|t| t.position);
    in_column
}

/// Resequence task positions in a column to 0, 1, 2, ... keeping their order.
pub fn compact_column_positions(tasks: &mut [Task], column_id: ColumnId) {
    let mut indices: Vec<usize> = tasks
        .iter()
        .enumerate()
        .filter(|(_, t)| t.column_id == column_id)
        .map(|(i, _)| i)
        .collect();

    indices.sort_by_key(|&i| tasks[i].position);

    for (new_pos, &idx) in indices.iter().enumerate() {
        tasks[idx].position = new_pos as i32;
    }
}

/// Entering "DONE" completes a task, leaving it reopens the task.
pub fn completion_change(source: &Column, destination: &Column) -> CompletionChange {
    match (source.is_done(), destination.is_done()) {
        (false, true) => CompletionChange::Complete,
        (true, false) => CompletionChange::Reopen,
        _ => CompletionChange::Unchanged,
    }
}
