use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::sprint::SprintId;

pub type ColumnId = Uuid;

pub const TODO_COLUMN: &str = "TO DO";
pub const IN_PROGRESS_COLUMN: &str = "IN PROGRESS";
pub const DONE_COLUMN: &str = "DONE";

/// Columns every sprint board starts with, in board order.
pub const DEFAULT_COLUMNS: [&str; 3] = [TODO_COLUMN, IN_PROGRESS_COLUMN, DONE_COLUMN];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub id: ColumnId,
    pub sprint_id: SprintId,
    pub title: String,
    pub position: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Column {
    pub fn new(sprint_id: SprintId, title: String, position: i32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            sprint_id,
            title: title.trim().to_string(),
            position,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_default(&self) -> bool {
        is_default_title(&self.title)
    }

    pub fn is_todo(&self) -> bool {
        titles_match(&self.title, TODO_COLUMN)
    }

    pub fn is_done(&self) -> bool {
        titles_match(&self.title, DONE_COLUMN)
    }

    pub fn rename(&mut self, title: String) {
        self.title = title.trim().to_string();
        self.updated_at = Utc::now();
    }

    pub fn update_position(&mut self, position: i32) {
        self.position = position;
        self.updated_at = Utc::now();
    }
}

/// Column titles compare trimmed and case-insensitively.
pub fn titles_match(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

pub fn is_default_title(title: &str) -> bool {
    DEFAULT_COLUMNS.iter().any(|d| titles_match(title, d))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_titles() {
        let sprint_id = Uuid::new_v4();
        assert!(Column::new(sprint_id, "TO DO".into(), 0).is_todo());
        assert!(Column::new(sprint_id, " done ".into(), 2).is_done());
        assert!(Column::new(sprint_id, "In Progress".into(), 1).is_default());
        assert!(!Column::new(sprint_id, "Review".into(), 3).is_default());
    }
}
