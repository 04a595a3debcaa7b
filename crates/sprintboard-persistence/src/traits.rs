use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sprintboard_core::{SprintboardError, SprintboardResult};
use sprintboard_domain::collaborator::normalize_email;
use sprintboard_domain::Table;
use std::path::PathBuf;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Error descriptor returned by a data store: a message and nothing else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{message}")]
pub struct RemoteError {
    pub message: String,
}

impl RemoteError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<RemoteError> for SprintboardError {
    fn from(err: RemoteError) -> Self {
        SprintboardError::remote(err.message)
    }
}

pub type RemoteResult<T> = Result<T, RemoteError>;

/// The signed-in user as reported by the data store's session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: String,
    pub email: String,
}

impl UserIdentity {
    /// Identity for stores that key users by email.
    pub fn from_email(email: &str) -> Self {
        let email = normalize_email(email);
        Self {
            id: email.clone(),
            email,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Eq(String, Value),
    Neq(String, Value),
    In(String, Vec<Value>),
}

impl Condition {
    fn matches(&self, row: &Value) -> bool {
        let field = |name: &str| row.get(name).unwrap_or(&Value::Null);
        match self {
            Self::Eq(name, value) => field(name) == value,
            Self::Neq(name, value) => field(name) != value,
            Self::In(name, values) => values.contains(field(name)),
        }
    }
}

/// Conjunction of column conditions. The empty filter matches every row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowFilter {
    pub conditions: Vec<Condition>,
}

impl RowFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.conditions
            .push(Condition::Eq(column.to_string(), value.into()));
        self
    }

    pub fn neq(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.conditions
            .push(Condition::Neq(column.to_string(), value.into()));
        self
    }

    pub fn is_in<V: Into<Value>>(mut self, column: &str, values: impl IntoIterator<Item = V>) -> Self {
        self.conditions.push(Condition::In(
            column.to_string(),
            values.into_iter().map(Into::into).collect(),
        ));
        self
    }

    pub fn matches(&self, row: &Value) -> bool {
        self.conditions.iter().all(|c| c.matches(row))
    }
}

/// Where a change notification came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeSource {
    /// A watched file was rewritten
    File(PathBuf),
    /// A row of this table was written through the store
    Table(Table),
}

/// Event indicating the data behind a store changed
#[derive(Debug, Clone)]
pub struct ChangeEvent {
    pub source: ChangeSource,
    /// When the change was detected
    pub detected_at: DateTime<Utc>,
}

impl ChangeEvent {
    pub fn now(source: ChangeSource) -> Self {
        Self {
            source,
            detected_at: Utc::now(),
        }
    }
}

/// Row-oriented data store holding the record of truth.
///
/// Rows are JSON objects in wire shape with a string `id`. Writes resolve
/// to the persisted row or a [`RemoteError`]; the caller decides what a
/// failure means for local state.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// The identity of the current session, `None` when signed out.
    async fn current_user(&self) -> RemoteResult<Option<UserIdentity>>;

    async fn select(&self, table: Table, filter: &RowFilter) -> RemoteResult<Vec<Value>>;

    /// Insert or replace the row with the same `id`.
    async fn upsert(&self, table: Table, row: Value) -> RemoteResult<Value>;

    async fn delete(&self, table: Table, id: Uuid) -> RemoteResult<()>;

    /// Push notifications, for stores that can deliver them.
    fn subscribe(&self) -> Option<broadcast::Receiver<ChangeEvent>>;
}

/// Trait for detecting changes to the storage file
#[async_trait]
pub trait ChangeDetector: Send + Sync {
    /// Start watching the file for changes
    async fn start_watching(&self, path: PathBuf) -> SprintboardResult<()>;

    /// Stop watching the file
    async fn stop_watching(&self) -> SprintboardResult<()>;

    /// Returns a broadcast receiver that yields `ChangeEvent` when the file changes
    fn subscribe(&self) -> broadcast::Receiver<ChangeEvent>;

    fn is_watching(&self) -> bool;
}

/// Read the `id` of a wire row.
pub(crate) fn row_id(row: &Value) -> RemoteResult<Uuid> {
    row.get("id")
        .and_then(Value::as_str)
        .and_then(|raw| Uuid::parse_str(raw).ok())
        .ok_or_else(|| RemoteError::new("row is missing a valid id"))
}
