use crate::traits::{RemoteStore, RowFilter};
use sprintboard_core::SprintboardResult;
use sprintboard_domain::collaborator::normalize_email;
use sprintboard_domain::wire::decode_rows;
use sprintboard_domain::{Collaborator, InvitationStatus, Table};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Pending invitations addressed to one email.
pub async fn fetch_pending_invitations(
    remote: &dyn RemoteStore,
    email: &str,
) -> SprintboardResult<Vec<Collaborator>> {
    let filter = RowFilter::all()
        .eq("email", normalize_email(email))
        .eq("status", InvitationStatus::Pending.as_str());
    let rows = remote.select(Table::Collaborators, &filter).await?;
    decode_rows(rows)
}

/// The one background task that watches an inbox of invitations.
///
/// Fetches on a fixed interval and whenever the store pushes a change,
/// and broadcasts the list only when it differs from the last one sent.
/// The task ends on [`InvitationPoller::stop`] or when the poller is dropped.
pub struct InvitationPoller {
    tx: broadcast::Sender<Vec<Collaborator>>,
    // Subscribed before the task starts, so the first fetch is never missed
    first_rx: Mutex<Option<broadcast::Receiver<Vec<Collaborator>>>>,
    handle: JoinHandle<()>,
}

impl InvitationPoller {
    pub fn spawn(remote: Arc<dyn RemoteStore>, email: String, interval: Duration) -> Self {
        let (tx, first_rx) = broadcast::channel(16);
        let handle = tokio::spawn(poll_loop(remote, email, interval, tx.clone()));
        tracing::debug!("Invitation poller started ({:?})", interval);
        Self {
            tx,
            first_rx: Mutex::new(Some(first_rx)),
            handle,
        }
    }

    /// The first caller also receives the result of the initial fetch.
    pub fn subscribe(&self) -> broadcast::Receiver<Vec<Collaborator>> {
        let first = match self.first_rx.lock() {
            Ok(mut slot) => slot.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        first.unwrap_or_else(|| self.tx.subscribe())
    }

    pub fn stop(&self) {
        self.handle.abort();
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for InvitationPoller {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn poll_loop(
    remote: Arc<dyn RemoteStore>,
    email: String,
    interval: Duration,
    tx: broadcast::Sender<Vec<Collaborator>>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut push = remote.subscribe();
    let mut last: Option<Vec<Collaborator>> = None;

    loop {
        let push_closed = match push.as_mut() {
            Some(rx) => tokio::select! {
                _ = ticker.tick() => false,
                event = rx.recv() => matches!(event, Err(broadcast::error::RecvError::Closed)),
            },
            None => {
                ticker.tick().await;
                false
            }
        };
        if push_closed {
            tracing::debug!("Push channel closed, polling only");
            push = None;
            continue;
        }

        match fetch_pending_invitations(remote.as_ref(), &email).await {
            Ok(invitations) => {
                if last.as_ref() != Some(&invitations) {
                    tracing::debug!("{} pending invitation(s) for {}", invitations.len(), email);
                    let _ = tx.send(invitations.clone());
                    last = Some(invitations);
                }
            }
            Err(e) => tracing::warn!("Invitation poll failed: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryRemote;
    use sprintboard_domain::{InvitationDraft, Role, WireRecord};
    use tokio::time::timeout;
    use uuid::Uuid;

    fn invitation(email: &str) -> Collaborator {
        Collaborator::invite(
            Uuid::new_v4(),
            InvitationDraft {
                email: email.to_string(),
                role: Role::Editor,
            },
            "owner@example.com".to_string(),
        )
    }

    async fn next_non_empty(
        rx: &mut broadcast::Receiver<Vec<Collaborator>>,
    ) -> Vec<Collaborator> {
        loop {
            let list = rx.recv().await.unwrap();
            if !list.is_empty() {
                return list;
            }
        }
    }

    #[tokio::test]
    async fn test_fetch_only_pending_for_email() {
        let remote = MemoryRemote::new();
        let mine = invitation("ana@example.com");
        let mut accepted = invitation("ana@example.com");
        accepted.accept("ana@example.com".into());
        let theirs = invitation("bo@example.com");
        for c in [&mine, &accepted, &theirs] {
            remote
                .upsert(Table::Collaborators, c.to_wire().unwrap())
                .await
                .unwrap();
        }

        let found = fetch_pending_invitations(&remote, " ANA@example.com").await.unwrap();
        assert_eq!(found, vec![mine]);
    }

    #[tokio::test]
    async fn test_push_event_triggers_fetch() {
        let remote = Arc::new(MemoryRemote::new());
        let poller = InvitationPoller::spawn(
            remote.clone(),
            "ana@example.com".into(),
            Duration::from_secs(3600),
        );
        let mut rx = poller.subscribe();

        // Let the first tick run before the write
        tokio::task::yield_now().await;
        let invite = invitation("ana@example.com");
        remote
            .upsert(Table::Collaborators, invite.to_wire().unwrap())
            .await
            .unwrap();

        let list = timeout(Duration::from_secs(2), next_non_empty(&mut rx))
            .await
            .unwrap();
        assert_eq!(list[0].id, invite.id);
        poller.stop();
    }

    #[tokio::test]
    async fn test_interval_picks_up_changes_without_push() {
        struct Silent(MemoryRemote);

        #[async_trait::async_trait]
        impl RemoteStore for Silent {
            async fn current_user(
                &self,
            ) -> crate::traits::RemoteResult<Option<crate::traits::UserIdentity>> {
                self.0.current_user().await
            }
            async fn select(
                &self,
                table: Table,
                filter: &RowFilter,
            ) -> crate::traits::RemoteResult<Vec<serde_json::Value>> {
                self.0.select(table, filter).await
            }
            async fn upsert(
                &self,
                table: Table,
                row: serde_json::Value,
            ) -> crate::traits::RemoteResult<serde_json::Value> {
                self.0.upsert(table, row).await
            }
            async fn delete(&self, table: Table, id: Uuid) -> crate::traits::RemoteResult<()> {
                self.0.delete(table, id).await
            }
            fn subscribe(&self) -> Option<broadcast::Receiver<crate::traits::ChangeEvent>> {
                None
            }
        }

        let remote = Arc::new(Silent(MemoryRemote::new()));
        let poller = InvitationPoller::spawn(
            remote.clone(),
            "ana@example.com".into(),
            Duration::from_millis(20),
        );
        let mut rx = poller.subscribe();

        remote
            .upsert(
                Table::Collaborators,
                invitation("ana@example.com").to_wire().unwrap(),
            )
            .await
            .unwrap();

        let list = timeout(Duration::from_secs(2), next_non_empty(&mut rx))
            .await
            .unwrap();
        assert_eq!(list.len(), 1);
    }

    #[tokio::test]
    async fn test_stop_ends_task() {
        let remote = Arc::new(MemoryRemote::new());
        let poller =
            InvitationPoller::spawn(remote, "ana@example.com".into(), Duration::from_secs(30));
        assert!(poller.is_running());

        poller.stop();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!poller.is_running());
    }
}
