//! Sprint board views.
//!
//! Columns never store their tasks; a board is assembled by grouping the
//! sprint's tasks by `column_id`.

use serde::Serialize;
use uuid::Uuid;

use crate::task_lifecycle::{done_column, sorted_sprint_columns, tasks_in_column};
use crate::{Column, Task, Workspace};

/// One lane of a sprint board with its tasks in order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardColumn<'a> {
    pub column: &'a Column,
    pub tasks: Vec<&'a Task>,
}

/// Columns of a sprint, ordered by position, each with its tasks.
pub fn board(workspace: &Workspace, sprint_id: Uuid) -> Vec<BoardColumn<'_>> {
    sorted_sprint_columns(sprint_id, &workspace.columns)
        .into_iter()
        .map(|column| BoardColumn {
            column,
            tasks: tasks_in_column(column.id, &workspace.tasks),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SprintProgress {
    pub total_tasks: usize,
    pub done_tasks: usize,
    pub total_points: u32,
    pub done_points: u32,
    /// Every task of the sprint sits in its "DONE" column.
    pub ready_to_complete: bool,
}

impl SprintProgress {
    pub fn percent_done(&self) -> u32 {
        if self.total_points == 0 {
            return if self.total_tasks > 0 && self.done_tasks == self.total_tasks {
                100
            } else {
                0
            };
        }
        self.done_points * 100 / self.total_points
    }
}

pub fn sprint_progress(workspace: &Workspace, sprint_id: Uuid) -> SprintProgress {
    let done_id = done_column(sprint_id, &workspace.columns).map(|c| c.id);
    let mut progress = SprintProgress::default();

    for task in workspace.tasks_of(sprint_id) {
        progress.total_tasks += 1;
        progress.total_points += task.story_points;
        if Some(task.column_id) == done_id {
            progress.done_tasks += 1;
            progress.done_points += task.story_points;
        }
    }
    progress.ready_to_complete = progress.done_tasks == progress.total_tasks;
    progress
}
