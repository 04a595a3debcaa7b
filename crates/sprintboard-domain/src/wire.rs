//! Boundary mapping between domain entities and data-store rows.
//!
//! Rows use the store's snake_case column names, nullable text columns and
//! plain strings for enums. Everything crossing the boundary goes through
//! `WireRecord::to_wire` / `WireRecord::to_domain`; nothing else in the
//! workspace knows about row shapes.

use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sprintboard_core::{SprintboardError, SprintboardResult};
use std::fmt;
use uuid::Uuid;

use crate::{
    BacklogItem, Collaborator, Column, InvitationStatus, Priority, Project, Role, Sprint, Task,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Projects,
    Sprints,
    Columns,
    Tasks,
    BacklogItems,
    Collaborators,
}

impl Table {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Projects => "projects",
            Self::Sprints => "sprints",
            Self::Columns => "columns",
            Self::Tasks => "tasks",
            Self::BacklogItems => "backlog_items",
            Self::Collaborators => "collaborators",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub trait WireRecord: Sized {
    const TABLE: Table;
    type Row: Serialize + DeserializeOwned;

    fn id(&self) -> Uuid;
    fn to_row(&self) -> Self::Row;
    fn from_row(row: Self::Row) -> SprintboardResult<Self>;

    fn to_wire(&self) -> SprintboardResult<Value> {
        Ok(serde_json::to_value(self.to_row())?)
    }

    fn to_domain(value: Value) -> SprintboardResult<Self> {
        let row: Self::Row = serde_json::from_value(value).map_err(|e| {
            SprintboardError::Serialization(format!("bad {} row: {}", Self::TABLE, e))
        })?;
        Self::from_row(row)
    }
}

fn parse_enum<T: std::str::FromStr<Err = String>>(table: Table, raw: &str) -> SprintboardResult<T> {
    raw.parse()
        .map_err(|e: String| SprintboardError::Serialization(format!("bad {} row: {}", table, e)))
}

fn parse_points(table: Table, raw: i64) -> SprintboardResult<u32> {
    u32::try_from(raw).map_err(|_| {
        SprintboardError::Serialization(format!("bad {} row: story_points {}", table, raw))
    })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectRow {
    pub id: Uuid,
    pub owner_id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub end_goal: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WireRecord for Project {
    const TABLE: Table = Table::Projects;
    type Row = ProjectRow;

    fn id(&self) -> Uuid {
        self.id
    }

    fn to_row(&self) -> ProjectRow {
        ProjectRow {
            id: self.id,
            owner_id: self.owner_id.clone(),
            title: self.title.clone(),
            description: Some(self.description.clone()),
            end_goal: Some(self.end_goal.clone()),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    fn from_row(row: ProjectRow) -> SprintboardResult<Self> {
        Ok(Self {
            id: row.id,
            owner_id: row.owner_id,
            title: row.title,
            description: row.description.unwrap_or_default(),
            end_goal: row.end_goal.unwrap_or_default(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SprintRow {
    pub id: Uuid,
    pub project_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WireRecord for Sprint {
    const TABLE: Table = Table::Sprints;
    type Row = SprintRow;

    fn id(&self) -> Uuid {
        self.id
    }

    fn to_row(&self) -> SprintRow {
        SprintRow {
            id: self.id,
            project_id: self.project_id,
            title: self.title.clone(),
            description: Some(self.description.clone()),
            start_date: self.start_date,
            end_date: self.end_date,
            is_completed: self.is_completed,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    fn from_row(row: SprintRow) -> SprintboardResult<Self> {
        Ok(Self {
            id: row.id,
            project_id: row.project_id,
            title: row.title,
            description: row.description.unwrap_or_default(),
            start_date: row.start_date,
            end_date: row.end_date,
            is_completed: row.is_completed,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnRow {
    pub id: Uuid,
    pub sprint_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub position: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WireRecord for Column {
    const TABLE: Table = Table::Columns;
    type Row = ColumnRow;

    fn id(&self) -> Uuid {
        self.id
    }

    fn to_row(&self) -> ColumnRow {
        ColumnRow {
            id: self.id,
            sprint_id: self.sprint_id,
            title: self.title.clone(),
            position: self.position,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    fn from_row(row: ColumnRow) -> SprintboardResult<Self> {
        Ok(Self {
            id: row.id,
            sprint_id: row.sprint_id,
            title: row.title,
            position: row.position,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRow {
    pub id: Uuid,
    pub sprint_id: Uuid,
    pub column_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub priority: String,
    #[serde(default)]
    pub assignee: Option<String>,
    #[serde(default)]
    pub story_points: i64,
    #[serde(default)]
    pub position: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub completion_date: Option<DateTime<Utc>>,
}

impl WireRecord for Task {
    const TABLE: Table = Table::Tasks;
    type Row = TaskRow;

    fn id(&self) -> Uuid {
        self.id
    }

    fn to_row(&self) -> TaskRow {
        TaskRow {
            id: self.id,
            sprint_id: self.sprint_id,
            column_id: self.column_id,
            title: self.title.clone(),
            description: Some(self.description.clone()),
            priority: self.priority.as_str().to_string(),
            assignee: self.assignee.clone(),
            story_points: i64::from(self.story_points),
            position: self.position,
            created_at: self.created_at,
            updated_at: self.updated_at,
            completion_date: self.completion_date,
        }
    }

    fn from_row(row: TaskRow) -> SprintboardResult<Self> {
        Ok(Self {
            id: row.id,
            sprint_id: row.sprint_id,
            column_id: row.column_id,
            title: row.title,
            description: row.description.unwrap_or_default(),
            priority: parse_enum::<Priority>(Table::Tasks, &row.priority)?,
            assignee: row.assignee.filter(|a| !a.is_empty()),
            story_points: parse_points(Table::Tasks, row.story_points)?,
            position: row.position,
            created_at: row.created_at,
            updated_at: row.updated_at,
            completion_date: row.completion_date,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacklogItemRow {
    pub id: Uuid,
    pub project_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub priority: String,
    #[serde(default)]
    pub story_points: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WireRecord for BacklogItem {
    const TABLE: Table = Table::BacklogItems;
    type Row = BacklogItemRow;

    fn id(&self) -> Uuid {
        self.id
    }

    fn to_row(&self) -> BacklogItemRow {
        BacklogItemRow {
            id: self.id,
            project_id: self.project_id,
            title: self.title.clone(),
            description: Some(self.description.clone()),
            priority: self.priority.as_str().to_string(),
            story_points: i64::from(self.story_points),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    fn from_row(row: BacklogItemRow) -> SprintboardResult<Self> {
        Ok(Self {
            id: row.id,
            project_id: row.project_id,
            title: row.title,
            description: row.description.unwrap_or_default(),
            priority: parse_enum::<Priority>(Table::BacklogItems, &row.priority)?,
            story_points: parse_points(Table::BacklogItems, row.story_points)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollaboratorRow {
    pub id: Uuid,
    pub project_id: Uuid,
    pub email: String,
    #[serde(default)]
    pub user_id: Option<String>,
    pub role: String,
    pub status: String,
    pub invited_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WireRecord for Collaborator {
    const TABLE: Table = Table::Collaborators;
    type Row = CollaboratorRow;

    fn id(&self) -> Uuid {
        self.id
    }

    fn to_row(&self) -> CollaboratorRow {
        CollaboratorRow {
            id: self.id,
            project_id: self.project_id,
            email: self.email.clone(),
            user_id: self.user_id.clone(),
            role: self.role.as_str().to_string(),
            status: self.status.as_str().to_string(),
            invited_by: self.invited_by.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    fn from_row(row: CollaboratorRow) -> SprintboardResult<Self> {
        let status = match row.status.as_str() {
            "pending" => InvitationStatus::Pending,
            "accepted" => InvitationStatus::Accepted,
            "declined" => InvitationStatus::Declined,
            "rejected" => InvitationStatus::Rejected,
            other => {
                return Err(SprintboardError::Serialization(format!(
                    "bad {} row: unknown status '{}'",
                    Table::Collaborators,
                    other
                )))
            }
        };
        Ok(Self {
            id: row.id,
            project_id: row.project_id,
            email: row.email,
            user_id: row.user_id,
            role: parse_enum::<Role>(Table::Collaborators, &row.role)?,
            status,
            invited_by: row.invited_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Decode every row of a table, failing on the first bad one.
pub fn decode_rows<T: WireRecord>(rows: Vec<Value>) -> SprintboardResult<Vec<T>> {
    rows.into_iter().map(T::to_domain).collect()
}
