use sprintboard_core::{AppConfig, SprintboardResult};
use sprintboard_persistence::{JsonFileRemote, SyncEngine};
use std::sync::Arc;

/// Everything a handler needs: the connected engine plus the store it talks to.
pub struct CliContext {
    pub engine: SyncEngine,
    pub remote: Arc<JsonFileRemote>,
    pub config: AppConfig,
}

impl CliContext {
    pub async fn connect(config: AppConfig) -> SprintboardResult<Self> {
        let remote_config = config.remote();
        tracing::debug!("Opening store at {}", remote_config.endpoint);
        let remote = Arc::new(
            JsonFileRemote::from_config(&remote_config).with_user(config.user.as_deref()),
        );
        let engine = SyncEngine::connect(remote.clone()).await?;
        Ok(Self {
            engine,
            remote,
            config,
        })
    }
}
