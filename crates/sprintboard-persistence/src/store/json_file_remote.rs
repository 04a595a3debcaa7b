use crate::store::atomic_writer::AtomicWriter;
use crate::store::memory_remote::{delete_row, select_rows, upsert_row, Tables};
use crate::traits::{
    ChangeDetector, ChangeEvent, RemoteError, RemoteResult, RemoteStore, RowFilter, UserIdentity,
};
use crate::watch::FileWatcher;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sprintboard_core::{RemoteConfig, SprintboardError, SprintboardResult};
use sprintboard_domain::Table;
use std::path::{Path, PathBuf};
use tokio::sync::{broadcast, Mutex};
use uuid::Uuid;

const FORMAT_VERSION: u32 = 1;

/// Metadata written alongside the tables on every save
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreMetadata {
    /// ID of the instance that performed the save
    pub instance_id: Uuid,
    pub saved_at: DateTime<Utc>,
}

/// On-disk layout of the file store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonEnvelope {
    pub version: u32,
    pub metadata: StoreMetadata,
    /// When set, every client must present this key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_key: Option<String>,
    #[serde(default)]
    pub tables: Tables,
}

impl JsonEnvelope {
    fn empty(instance_id: Uuid, access_key: Option<String>) -> Self {
        Self {
            version: FORMAT_VERSION,
            metadata: StoreMetadata {
                instance_id,
                saved_at: Utc::now(),
            },
            access_key,
            tables: Tables::new(),
        }
    }
}

/// Data store persisted as one JSON file.
///
/// Every write reloads the file, applies the change and writes it back
/// atomically, so several processes can share a store (last writer wins).
pub struct JsonFileRemote {
    path: PathBuf,
    instance_id: Uuid,
    api_key: Option<String>,
    user: Option<UserIdentity>,
    write_lock: Mutex<()>,
    watcher: FileWatcher,
}

impl JsonFileRemote {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            instance_id: Uuid::new_v4(),
            api_key: None,
            user: None,
            write_lock: Mutex::new(()),
            watcher: FileWatcher::new(),
        }
    }

    pub fn from_config(config: &RemoteConfig) -> Self {
        Self::new(&config.endpoint).with_api_key(config.api_key.clone())
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    /// Sign `email` in for this connection.
    pub fn with_user(mut self, email: Option<&str>) -> Self {
        self.user = email
            .filter(|e| !e.trim().is_empty())
            .map(UserIdentity::from_email);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Start pushing change events when the file is rewritten, creating it if needed.
    pub async fn watch(&self) -> SprintboardResult<()> {
        {
            let _guard = self.write_lock.lock().await;
            if AtomicWriter::read_if_exists(&self.path).await?.is_none() {
                self.save(JsonEnvelope::empty(self.instance_id, self.api_key.clone()))
                    .await?;
            }
        }
        self.watcher.start_watching(self.path.clone()).await
    }

    pub async fn unwatch(&self) -> SprintboardResult<()> {
        self.watcher.stop_watching().await
    }

    async fn load(&self) -> SprintboardResult<JsonEnvelope> {
        let Some(bytes) = AtomicWriter::read_if_exists(&self.path).await? else {
            return Ok(JsonEnvelope::empty(self.instance_id, self.api_key.clone()));
        };
        let envelope: JsonEnvelope = serde_json::from_slice(&bytes)?;
        if envelope.version != FORMAT_VERSION {
            return Err(SprintboardError::Serialization(format!(
                "Unsupported format version: {}",
                envelope.version
            )));
        }
        if envelope.access_key.is_some() && envelope.access_key != self.api_key {
            return Err(SprintboardError::Unauthenticated(
                "invalid API key for this store".into(),
            ));
        }
        Ok(envelope)
    }

    async fn save(&self, mut envelope: JsonEnvelope) -> SprintboardResult<()> {
        envelope.metadata = StoreMetadata {
            instance_id: self.instance_id,
            saved_at: Utc::now(),
        };
        let bytes = serde_json::to_vec_pretty(&envelope)?;
        AtomicWriter::write_atomic(&self.path, &bytes).await?;
        tracing::debug!("Saved {} bytes to {}", bytes.len(), self.path.display());
        Ok(())
    }

    async fn modify<T: Send>(
        &self,
        change: impl FnOnce(&mut Tables) -> RemoteResult<T> + Send,
    ) -> RemoteResult<T> {
        let _guard = self.write_lock.lock().await;
        let mut envelope = self.load().await.map_err(to_remote)?;
        let out = change(&mut envelope.tables)?;
        self.save(envelope).await.map_err(to_remote)?;
        Ok(out)
    }
}

fn to_remote(err: SprintboardError) -> RemoteError {
    match err {
        SprintboardError::Remote { message } => RemoteError::new(message),
        other => RemoteError::new(other.to_string()),
    }
}

#[async_trait]
impl RemoteStore for JsonFileRemote {
    async fn current_user(&self) -> RemoteResult<Option<UserIdentity>> {
        // A bad key means no session, same as a signed-out user
        match self.load().await {
            Ok(_) => Ok(self.user.clone()),
            Err(SprintboardError::Unauthenticated(reason)) => {
                tracing::warn!("{}: {}", self.path.display(), reason);
                Ok(None)
            }
            Err(e) => Err(to_remote(e)),
        }
    }

    async fn select(&self, table: Table, filter: &RowFilter) -> RemoteResult<Vec<Value>> {
        let envelope = self.load().await.map_err(to_remote)?;
        Ok(select_rows(&envelope.tables, table, filter))
    }

    async fn upsert(&self, table: Table, row: Value) -> RemoteResult<Value> {
        self.modify(|tables| upsert_row(tables, table, row)).await
    }

    async fn delete(&self, table: Table, id: Uuid) -> RemoteResult<()> {
        self.modify(|tables| {
            delete_row(tables, table, id);
            Ok(())
        })
        .await
    }

    fn subscribe(&self) -> Option<broadcast::Receiver<ChangeEvent>> {
        Some(self.watcher.subscribe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_rows_survive_reopen() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("store.json");
        let id = Uuid::new_v4();

        let store = JsonFileRemote::new(&file_path);
        store
            .upsert(Table::Projects, json!({ "id": id, "owner_id": "ana" }))
            .await
            .unwrap();

        let reopened = JsonFileRemote::new(&file_path);
        let rows = reopened
            .select(Table::Projects, &RowFilter::all().eq("owner_id", "ana"))
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_ne!(store.instance_id, reopened.instance_id);
    }

    #[tokio::test]
    async fn test_envelope_layout() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("store.json");
        let store = JsonFileRemote::new(&file_path).with_api_key(Some("k1".into()));
        store
            .upsert(Table::BacklogItems, json!({ "id": Uuid::new_v4() }))
            .await
            .unwrap();

        let raw: Value =
            serde_json::from_slice(&std::fs::read(&file_path).unwrap()).unwrap();
        assert_eq!(raw["version"], 1);
        assert_eq!(raw["access_key"], "k1");
        assert_eq!(raw["tables"]["backlog_items"].as_array().unwrap().len(), 1);
        assert!(raw["metadata"]["instance_id"].is_string());
    }

    #[tokio::test]
    async fn test_wrong_key_is_refused() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("store.json");
        JsonFileRemote::new(&file_path)
            .with_api_key(Some("secret".into()))
            .upsert(Table::Projects, json!({ "id": Uuid::new_v4() }))
            .await
            .unwrap();

        let intruder = JsonFileRemote::new(&file_path)
            .with_api_key(Some("guess".into()))
            .with_user(Some("eve@example.com"));
        assert!(intruder.current_user().await.unwrap().is_none());
        assert!(intruder
            .select(Table::Projects, &RowFilter::all())
            .await
            .is_err());

        let keyless = JsonFileRemote::new(&file_path);
        assert!(keyless
            .upsert(Table::Projects, json!({ "id": Uuid::new_v4() }))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_unsupported_version() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("store.json");
        std::fs::write(
            &file_path,
            r#"{"version":9,"metadata":{"instance_id":"00000000-0000-0000-0000-000000000000","saved_at":"2024-01-01T00:00:00Z"}}"#,
        )
        .unwrap();

        let err = JsonFileRemote::new(&file_path)
            .select(Table::Projects, &RowFilter::all())
            .await
            .unwrap_err();
        assert!(err.message.contains("Unsupported format version"));
    }

    #[tokio::test]
    async fn test_user_comes_from_connection() {
        let dir = tempdir().unwrap();
        let store = JsonFileRemote::new(dir.path().join("store.json"));
        assert!(store.current_user().await.unwrap().is_none());

        let store = store.with_user(Some("Ana@Example.com"));
        let user = store.current_user().await.unwrap().unwrap();
        assert_eq!(user.email, "ana@example.com");
    }
}
