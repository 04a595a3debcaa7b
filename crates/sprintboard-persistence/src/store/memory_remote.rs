use crate::traits::{
    row_id, ChangeEvent, ChangeSource, RemoteResult, RemoteStore, RowFilter, UserIdentity,
};
use async_trait::async_trait;
use serde_json::Value;
use sprintboard_domain::Table;
use std::collections::BTreeMap;
use tokio::sync::{broadcast, Mutex};
use uuid::Uuid;

/// Rows of every table, keyed by table.
pub type Tables = BTreeMap<Table, Vec<Value>>;

/// Insert or replace by id, keeping insertion order.
pub(crate) fn upsert_row(tables: &mut Tables, table: Table, row: Value) -> RemoteResult<Value> {
    let id = row_id(&row)?;
    let rows = tables.entry(table).or_default();
    match rows.iter_mut().find(|r| row_id(r).ok() == Some(id)) {
        Some(existing) => *existing = row.clone(),
        None => rows.push(row.clone()),
    }
    Ok(row)
}

pub(crate) fn delete_row(tables: &mut Tables, table: Table, id: Uuid) {
    if let Some(rows) = tables.get_mut(&table) {
        rows.retain(|r| row_id(r).ok() != Some(id));
    }
}

pub(crate) fn select_rows(tables: &Tables, table: Table, filter: &RowFilter) -> Vec<Value> {
    tables
        .get(&table)
        .map(|rows| rows.iter().filter(|r| filter.matches(r)).cloned().collect())
        .unwrap_or_default()
}

/// Data store kept entirely in memory. Every write is pushed to subscribers.
pub struct MemoryRemote {
    tables: Mutex<Tables>,
    session: Mutex<Option<UserIdentity>>,
    tx: broadcast::Sender<ChangeEvent>,
}

impl MemoryRemote {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(64);
        Self {
            tables: Mutex::new(Tables::new()),
            session: Mutex::new(None),
            tx,
        }
    }

    /// A store with `email` already signed in.
    pub fn signed_in(email: &str) -> Self {
        Self {
            session: Mutex::new(Some(UserIdentity::from_email(email))),
            ..Self::new()
        }
    }

    pub async fn sign_in(&self, user: UserIdentity) {
        *self.session.lock().await = Some(user);
    }

    pub async fn sign_out(&self) {
        *self.session.lock().await = None;
    }

    /// Number of rows currently held in `table`.
    pub async fn row_count(&self, table: Table) -> usize {
        self.tables
            .lock()
            .await
            .get(&table)
            .map_or(0, Vec::len)
    }

    fn notify(&self, table: Table) {
        let _ = self.tx.send(ChangeEvent::now(ChangeSource::Table(table)));
    }
}

impl Default for MemoryRemote {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RemoteStore for MemoryRemote {
    async fn current_user(&self) -> RemoteResult<Option<UserIdentity>> {
        Ok(self.session.lock().await.clone())
    }

    async fn select(&self, table: Table, filter: &RowFilter) -> RemoteResult<Vec<Value>> {
        Ok(select_rows(&*self.tables.lock().await, table, filter))
    }

    async fn upsert(&self, table: Table, row: Value) -> RemoteResult<Value> {
        let stored = upsert_row(&mut *self.tables.lock().await, table, row)?;
        self.notify(table);
        Ok(stored)
    }

    async fn delete(&self, table: Table, id: Uuid) -> RemoteResult<()> {
        delete_row(&mut *self.tables.lock().await, table, id);
        self.notify(table);
        Ok(())
    }

    fn subscribe(&self) -> Option<broadcast::Receiver<ChangeEvent>> {
        Some(self.tx.subscribe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_upsert_replaces_by_id() {
        let remote = MemoryRemote::new();
        let id = Uuid::new_v4();

        remote
            .upsert(Table::Projects, json!({ "id": id, "title": "Old" }))
            .await
            .unwrap();
        remote
            .upsert(Table::Projects, json!({ "id": id, "title": "New" }))
            .await
            .unwrap();

        let rows = remote
            .select(Table::Projects, &RowFilter::all())
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["title"], "New");
    }

    #[tokio::test]
    async fn test_row_without_id_is_rejected() {
        let remote = MemoryRemote::new();
        let err = remote
            .upsert(Table::Tasks, json!({ "title": "orphan" }))
            .await
            .unwrap_err();
        assert!(err.message.contains("id"));
        assert_eq!(remote.row_count(Table::Tasks).await, 0);
    }

    #[tokio::test]
    async fn test_delete_and_notify() {
        let remote = MemoryRemote::new();
        let mut rx = remote.subscribe().unwrap();
        let id = Uuid::new_v4();

        remote
            .upsert(Table::Sprints, json!({ "id": id }))
            .await
            .unwrap();
        remote.delete(Table::Sprints, id).await.unwrap();

        assert_eq!(remote.row_count(Table::Sprints).await, 0);
        let event = rx.recv().await.unwrap();
        assert_eq!(event.source, ChangeSource::Table(Table::Sprints));
    }

    #[tokio::test]
    async fn test_session() {
        let remote = MemoryRemote::new();
        assert!(remote.current_user().await.unwrap().is_none());

        remote.sign_in(UserIdentity::from_email("ana@example.com")).await;
        assert_eq!(
            remote.current_user().await.unwrap().unwrap().email,
            "ana@example.com"
        );

        remote.sign_out().await;
        assert!(remote.current_user().await.unwrap().is_none());
    }
}
