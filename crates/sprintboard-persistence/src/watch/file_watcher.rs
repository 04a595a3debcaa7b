use crate::traits::{ChangeDetector, ChangeEvent, ChangeSource};
use notify::{EventKind, RecursiveMode, Watcher};
use sprintboard_core::{SprintboardError, SprintboardResult};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::sync::Mutex;

/// File system watcher for the JSON file store.
///
/// Watches the parent directory, since atomic saves replace the file by
/// rename rather than writing into it. The `notify` watcher lives inside a
/// tokio task so it is dropped when the task is aborted.
pub struct FileWatcher {
    tx: broadcast::Sender<ChangeEvent>,
    task_handle: Arc<Mutex<Option<tokio::task::JoinHandle<()>>>>,
    watching: Arc<AtomicBool>,
}

impl FileWatcher {
    /// The broadcast channel has a buffer size of 10
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(10);
        Self {
            tx,
            task_handle: Arc::new(Mutex::new(None)),
            watching: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl Default for FileWatcher {
    fn default() -> Self {
        Self::new()
    }
}

fn touches_file(kind: &EventKind) -> bool {
    matches!(kind, EventKind::Create(_) | EventKind::Modify(_))
}

#[async_trait::async_trait]
impl ChangeDetector for FileWatcher {
    async fn start_watching(&self, path: PathBuf) -> SprintboardResult<()> {
        self.stop_watching().await?;

        // Canonicalize to absolute path so it matches OS event paths
        let watch_path = tokio::fs::canonicalize(&path).await?;
        let parent = watch_path
            .parent()
            .map(PathBuf::from)
            .ok_or_else(|| {
                SprintboardError::Internal(format!("{} has no parent", watch_path.display()))
            })?;

        let tx = self.tx.clone();
        let watching = self.watching.clone();
        watching.store(true, Ordering::SeqCst);

        let handle = tokio::spawn(async move {
            let event_path = watch_path.clone();
            let created = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
                match res {
                    Ok(event) => {
                        if touches_file(&event.kind) && event.paths.iter().any(|p| p == &event_path)
                        {
                            let _ = tx.send(ChangeEvent::now(ChangeSource::File(event_path.clone())));
                        }
                    }
                    Err(e) => tracing::warn!("File watcher error: {}", e),
                }
            });

            match created {
                Ok(mut watcher) => {
                    if let Err(e) = watcher.watch(&parent, RecursiveMode::NonRecursive) {
                        tracing::error!("Failed to watch directory: {}", e);
                    } else {
                        tracing::info!("Started watching {}", watch_path.display());
                        // Keep watcher alive
                        std::future::pending::<()>().await;
                    }
                }
                Err(e) => tracing::error!("Failed to create watcher: {}", e),
            }
            watching.store(false, Ordering::SeqCst);
        });

        *self.task_handle.lock().await = Some(handle);
        Ok(())
    }

    async fn stop_watching(&self) -> SprintboardResult<()> {
        if let Some(handle) = self.task_handle.lock().await.take() {
            handle.abort();
            tracing::info!("Stopped file watching");
        }
        self.watching.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.tx.subscribe()
    }

    fn is_watching(&self) -> bool {
        self.watching.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::AtomicWriter;
    use tempfile::tempdir;
    use tokio::time::{sleep, Duration};

    #[tokio::test]
    async fn test_file_watcher_detects_atomic_saves() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("store.json");
        tokio::fs::write(&file_path, b"{}").await.unwrap();

        let watcher = FileWatcher::new();
        let mut rx = watcher.subscribe();
        watcher.start_watching(file_path.clone()).await.unwrap();
        assert!(watcher.is_watching());

        // Give watcher time to start
        sleep(Duration::from_millis(100)).await;
        AtomicWriter::write_atomic(&file_path, b"{\"x\":1}")
            .await
            .unwrap();

        let result = tokio::time::timeout(Duration::from_secs(2), rx.recv()).await;
        watcher.stop_watching().await.unwrap();
        assert!(!watcher.is_watching());

        // Event delivery timing is platform-dependent
        if let Ok(Ok(event)) = result {
            let canonical = tokio::fs::canonicalize(&file_path).await.unwrap();
            assert_eq!(event.source, ChangeSource::File(canonical));
        }
    }

    #[tokio::test]
    async fn test_missing_file_is_an_error() {
        let dir = tempdir().unwrap();
        let watcher = FileWatcher::new();
        assert!(watcher
            .start_watching(dir.path().join("absent.json"))
            .await
            .is_err());
        assert!(!watcher.is_watching());
    }
}
