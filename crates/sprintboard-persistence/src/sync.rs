//! Commit-after-confirmation synchronization.
//!
//! The engine owns the session's [`Workspace`]. A mutation runs its command
//! against a copy, writes the resulting [`ChangeSet`] to the data store, and
//! only swaps the copy in once every write was accepted. A rejected write
//! leaves local state as it was; if earlier writes of the same change set had
//! already landed, the workspace is re-fetched so it matches the store again.

use crate::traits::{RemoteStore, RowFilter, UserIdentity};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sprintboard_core::{SprintboardError, SprintboardResult};
use sprintboard_domain::burndown::{burndown, BurndownPoint};
use sprintboard_domain::commands::*;
use sprintboard_domain::query::{self, SprintProgress};
use sprintboard_domain::task_lifecycle::sorted_sprint_columns;
use sprintboard_domain::wire::decode_rows;
use sprintboard_domain::{
    BacklogItem, BacklogItemDraft, BacklogItemUpdate, ChangeSet, Collaborator, Column,
    InvitationDraft, InvitationStatus, Project, ProjectDraft, ProjectOperations, ProjectUpdate,
    Role, RowChange, Sprint, SprintDraft, SprintUpdate, Table, Task, TaskDraft, TaskFilter,
    TaskUpdate, WireRecord, Workspace,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Settled mutations kept in the log; older ones are dropped first.
pub const MAX_MUTATIONS: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MutationStatus {
    Pending,
    Committed,
    Failed,
}

/// One dispatched command and what became of it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Mutation {
    pub id: u64,
    pub description: String,
    pub status: MutationStatus,
    pub entity_ids: Vec<Uuid>,
    pub error: Option<String>,
    pub started_at: DateTime<Utc>,
}

/// Outcome notifications for whoever renders them.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    Committed {
        mutation_id: u64,
        description: String,
    },
    Failed {
        mutation_id: u64,
        description: String,
        message: String,
    },
    Refreshed,
}

pub struct SyncEngine {
    remote: Arc<dyn RemoteStore>,
    user: UserIdentity,
    workspace: Workspace,
    mutations: Vec<Mutation>,
    next_mutation_id: u64,
    entity_status: HashMap<Uuid, MutationStatus>,
    events: broadcast::Sender<SyncEvent>,
}

impl SyncEngine {
    /// Open a session against `remote` and load everything the user can see.
    pub async fn connect(remote: Arc<dyn RemoteStore>) -> SprintboardResult<Self> {
        let user = session_user(remote.as_ref()).await?;
        let (events, _) = broadcast::channel(64);
        let mut engine = Self {
            remote,
            user,
            workspace: Workspace::new(),
            mutations: Vec::new(),
            next_mutation_id: 1,
            entity_status: HashMap::new(),
            events,
        };
        engine.refresh().await?;
        Ok(engine)
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn user(&self) -> &UserIdentity {
        &self.user
    }

    pub fn remote(&self) -> Arc<dyn RemoteStore> {
        self.remote.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.events.subscribe()
    }

    pub fn mutations(&self) -> &[Mutation] {
        &self.mutations
    }

    /// Status of the latest logged mutation that touched `entity_id`.
    pub fn status_of(&self, entity_id: Uuid) -> Option<MutationStatus> {
        self.entity_status.get(&entity_id).copied()
    }

    async fn fetch<T: WireRecord>(
        &self,
        table: Table,
        filter: RowFilter,
    ) -> SprintboardResult<Vec<T>> {
        let rows = self.remote.select(table, &filter).await?;
        decode_rows(rows)
    }

    /// Replace the workspace with what the store holds for the current user:
    /// owned projects, projects shared through an accepted invitation, and
    /// the user's own invitations.
    pub async fn refresh(&mut self) -> SprintboardResult<()> {
        let user = session_user(self.remote.as_ref()).await?;

        let mut projects: Vec<Project> = self
            .fetch(Table::Projects, RowFilter::all().eq("owner_id", user.id.as_str()))
            .await?;
        let mine: Vec<Collaborator> = self
            .fetch(
                Table::Collaborators,
                RowFilter::all().eq("email", user.email.as_str()),
            )
            .await?;
        let shared_ids = ids(mine
            .iter()
            .filter(|c| c.status == InvitationStatus::Accepted)
            .map(|c| c.project_id));
        if !shared_ids.is_empty() {
            let shared: Vec<Project> = self
                .fetch(
                    Table::Projects,
                    RowFilter::all()
                        .is_in("id", shared_ids)
                        .neq("owner_id", user.id.as_str()),
                )
                .await?;
            projects.extend(shared);
        }

        let project_ids = ids(projects.iter().map(|p| p.id));
        let sprints: Vec<Sprint> = self
            .fetch(
                Table::Sprints,
                RowFilter::all().is_in("project_id", project_ids.clone()),
            )
            .await?;
        let sprint_ids = ids(sprints.iter().map(|s| s.id));
        let columns = self
            .fetch(
                Table::Columns,
                RowFilter::all().is_in("sprint_id", sprint_ids.clone()),
            )
            .await?;
        let tasks = self
            .fetch(Table::Tasks, RowFilter::all().is_in("sprint_id", sprint_ids))
            .await?;
        let backlog_items = self
            .fetch(
                Table::BacklogItems,
                RowFilter::all().is_in("project_id", project_ids.clone()),
            )
            .await?;
        let mut collaborators: Vec<Collaborator> = self
            .fetch(
                Table::Collaborators,
                RowFilter::all().is_in("project_id", project_ids),
            )
            .await?;
        for invitation in mine {
            if !collaborators.iter().any(|c| c.id == invitation.id) {
                collaborators.push(invitation);
            }
        }

        self.workspace = Workspace {
            projects,
            sprints,
            columns,
            tasks,
            backlog_items,
            collaborators,
        };
        self.user = user;
        tracing::debug!(
            "Refreshed workspace: {} project(s), {} task(s)",
            self.workspace.projects.len(),
            self.workspace.tasks.len()
        );
        let _ = self.events.send(SyncEvent::Refreshed);
        Ok(())
    }

    /// Run `command` and commit its outcome once the store has accepted it.
    ///
    /// Local validation failures return before anything is written and are
    /// not recorded as mutations.
    pub async fn dispatch(&mut self, command: &dyn Command) -> SprintboardResult<ChangeSet> {
        let description = command.description();
        let mut draft = self.workspace.clone();
        draft.apply(command)?;

        let changes = ChangeSet::between(&self.workspace, &draft)?;
        if changes.is_empty() {
            tracing::debug!("{}: nothing to write", description);
            return Ok(changes);
        }

        let mutation_id = self.begin(&description, &changes);
        let mut written = 0;
        for change in &changes.changes {
            let result = match change {
                RowChange::Upsert { table, row, .. } => {
                    self.remote.upsert(*table, row.clone()).await.map(|_| ())
                }
                RowChange::Delete { table, id } => self.remote.delete(*table, *id).await,
            };
            if let Err(err) = result {
                tracing::warn!(
                    "{} rejected at {} {}: {}",
                    description,
                    change.table(),
                    change.id(),
                    err
                );
                self.settle(mutation_id, Some(err.message.clone()));
                if written > 0 {
                    if let Err(e) = self.refresh().await {
                        tracing::warn!("Re-fetch after partial write failed: {}", e);
                    }
                }
                return Err(err.into());
            }
            written += 1;
        }

        self.workspace = draft;
        self.settle(mutation_id, None);
        tracing::info!("{} ({} row change(s))", description, changes.len());
        Ok(changes)
    }

    fn begin(&mut self, description: &str, changes: &ChangeSet) -> u64 {
        let id = self.next_mutation_id;
        self.next_mutation_id += 1;
        let entity_ids = changes.entity_ids();
        for entity_id in &entity_ids {
            self.entity_status.insert(*entity_id, MutationStatus::Pending);
        }
        self.mutations.push(Mutation {
            id,
            description: description.to_string(),
            status: MutationStatus::Pending,
            entity_ids,
            error: None,
            started_at: Utc::now(),
        });
        self.prune_mutations();
        id
    }

    /// Drop the oldest settled mutations beyond [`MAX_MUTATIONS`], forgetting
    /// entity statuses no remaining mutation refers to.
    fn prune_mutations(&mut self) {
        while self.mutations.len() > MAX_MUTATIONS {
            let Some(pos) = self
                .mutations
                .iter()
                .position(|m| m.status != MutationStatus::Pending)
            else {
                break;
            };
            let dropped = self.mutations.remove(pos);
            for entity_id in dropped.entity_ids {
                if !self
                    .mutations
                    .iter()
                    .any(|m| m.entity_ids.contains(&entity_id))
                {
                    self.entity_status.remove(&entity_id);
                }
            }
        }
    }

    fn settle(&mut self, mutation_id: u64, error: Option<String>) {
        let Some(mutation) = self.mutations.iter_mut().find(|m| m.id == mutation_id) else {
            return;
        };
        let status = if error.is_some() {
            MutationStatus::Failed
        } else {
            MutationStatus::Committed
        };
        mutation.status = status;
        mutation.error = error.clone();
        for entity_id in &mutation.entity_ids {
            self.entity_status.insert(*entity_id, status);
        }

        let description = mutation.description.clone();
        let event = match error {
            Some(message) => SyncEvent::Failed {
                mutation_id,
                description,
                message,
            },
            None => SyncEvent::Committed {
                mutation_id,
                description,
            },
        };
        let _ = self.events.send(event);
    }

    fn require<T: Clone>(found: Option<&T>, what: &str, id: Uuid) -> SprintboardResult<T> {
        found
            .cloned()
            .ok_or_else(|| SprintboardError::NotFound(format!("{} {}", what, id)))
    }
}

async fn session_user(remote: &dyn RemoteStore) -> SprintboardResult<UserIdentity> {
    remote
        .current_user()
        .await?
        .ok_or_else(|| SprintboardError::Unauthenticated("no active session".into()))
}

fn ids(values: impl Iterator<Item = Uuid>) -> Vec<String> {
    values.map(|id| id.to_string()).collect()
}

/// The entity a create command just appended.
fn appended<T: Clone>(items: &[T], what: &str) -> SprintboardResult<T> {
    items
        .last()
        .cloned()
        .ok_or_else(|| SprintboardError::Internal(format!("{} was not created", what)))
}

#[async_trait]
impl ProjectOperations for SyncEngine {
    async fn create_project(&mut self, draft: ProjectDraft) -> SprintboardResult<Project> {
        let owner_id = self.user.id.clone();
        self.dispatch(&CreateProject { draft, owner_id }).await?;
        appended(&self.workspace.projects, "Project")
    }

    fn list_projects(&self) -> SprintboardResult<Vec<Project>> {
        Ok(
            query::visible_projects(&self.workspace, &self.user.id, &self.user.email)
                .into_iter()
                .cloned()
                .collect(),
        )
    }

    fn get_project(&self, id: Uuid) -> SprintboardResult<Option<Project>> {
        Ok(self.workspace.project(id).cloned())
    }

    async fn update_project(
        &mut self,
        id: Uuid,
        updates: ProjectUpdate,
    ) -> SprintboardResult<Option<Project>> {
        if self.workspace.project(id).is_none() {
            return Ok(None);
        }
        self.dispatch(&UpdateProject {
            project_id: id,
            updates,
        })
        .await?;
        Ok(self.workspace.project(id).cloned())
    }

    async fn delete_project(&mut self, id: Uuid) -> SprintboardResult<()> {
        self.dispatch(&DeleteProject { project_id: id }).await?;
        Ok(())
    }

    async fn create_sprint(
        &mut self,
        project_id: Uuid,
        draft: SprintDraft,
    ) -> SprintboardResult<Sprint> {
        self.dispatch(&CreateSprint {
            project_id,
            draft,
            seed_default_columns: true,
        })
        .await?;
        appended(&self.workspace.sprints, "Sprint")
    }

    fn list_sprints(&self, project_id: Uuid) -> SprintboardResult<Vec<Sprint>> {
        Ok(self
            .workspace
            .sprints_of(project_id)
            .into_iter()
            .cloned()
            .collect())
    }

    fn get_sprint(&self, id: Uuid) -> SprintboardResult<Option<Sprint>> {
        Ok(self.workspace.sprint(id).cloned())
    }

    async fn update_sprint(
        &mut self,
        id: Uuid,
        updates: SprintUpdate,
    ) -> SprintboardResult<Sprint> {
        Self::require(self.workspace.sprint(id), "Sprint", id)?;
        self.dispatch(&UpdateSprint {
            sprint_id: id,
            updates,
        })
        .await?;
        Self::require(self.workspace.sprint(id), "Sprint", id)
    }

    async fn complete_sprint(&mut self, id: Uuid) -> SprintboardResult<Sprint> {
        self.dispatch(&CompleteSprint { sprint_id: id }).await?;
        Self::require(self.workspace.sprint(id), "Sprint", id)
    }

    async fn delete_sprint(&mut self, id: Uuid) -> SprintboardResult<()> {
        self.dispatch(&DeleteSprint { sprint_id: id }).await?;
        Ok(())
    }

    fn sprint_progress(&self, id: Uuid) -> SprintboardResult<SprintProgress> {
        Self::require(self.workspace.sprint(id), "Sprint", id)?;
        Ok(query::sprint_progress(&self.workspace, id))
    }

    fn sprint_burndown(
        &self,
        id: Uuid,
        today: NaiveDate,
    ) -> SprintboardResult<Vec<BurndownPoint>> {
        let sprint = Self::require(self.workspace.sprint(id), "Sprint", id)?;
        Ok(burndown(&sprint, &self.workspace.tasks, today))
    }

    async fn create_column(
        &mut self,
        sprint_id: Uuid,
        title: String,
    ) -> SprintboardResult<Column> {
        self.dispatch(&CreateColumn { sprint_id, title }).await?;
        appended(&self.workspace.columns, "Column")
    }

    fn list_columns(&self, sprint_id: Uuid) -> SprintboardResult<Vec<Column>> {
        Ok(sorted_sprint_columns(sprint_id, &self.workspace.columns)
            .into_iter()
            .cloned()
            .collect())
    }

    async fn rename_column(&mut self, id: Uuid, title: String) -> SprintboardResult<Column> {
        self.dispatch(&RenameColumn {
            column_id: id,
            title,
        })
        .await?;
        Self::require(self.workspace.column(id), "Column", id)
    }

    async fn delete_column(&mut self, id: Uuid) -> SprintboardResult<()> {
        self.dispatch(&DeleteColumn { column_id: id }).await?;
        Ok(())
    }

    async fn create_task(
        &mut self,
        sprint_id: Uuid,
        column_id: Option<Uuid>,
        draft: TaskDraft,
    ) -> SprintboardResult<Task> {
        self.dispatch(&CreateTask {
            sprint_id,
            column_id,
            draft,
        })
        .await?;
        appended(&self.workspace.tasks, "Task")
    }

    fn list_tasks(&self, filter: TaskFilter) -> SprintboardResult<Vec<Task>> {
        let mut tasks: Vec<Task> = self
            .workspace
            .tasks
            .iter()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect();
        tasks.sort_by_key(|t| t.position);
        Ok(tasks)
    }

    fn get_task(&self, id: Uuid) -> SprintboardResult<Option<Task>> {
        Ok(self.workspace.task(id).cloned())
    }

    async fn update_task(&mut self, id: Uuid, updates: TaskUpdate) -> SprintboardResult<Task> {
        Self::require(self.workspace.task(id), "Task", id)?;
        self.dispatch(&UpdateTask {
            task_id: id,
            updates,
        })
        .await?;
        Self::require(self.workspace.task(id), "Task", id)
    }

    async fn delete_task(&mut self, id: Uuid) -> SprintboardResult<()> {
        self.dispatch(&DeleteTask { task_id: id }).await?;
        Ok(())
    }

    async fn move_task(
        &mut self,
        id: Uuid,
        source_column_id: Uuid,
        destination_column_id: Uuid,
    ) -> SprintboardResult<Task> {
        self.dispatch(&MoveTask {
            task_id: id,
            source_column_id,
            destination_column_id,
        })
        .await?;
        Self::require(self.workspace.task(id), "Task", id)
    }

    async fn move_task_to_backlog(&mut self, id: Uuid) -> SprintboardResult<BacklogItem> {
        self.dispatch(&MoveTaskToBacklog { task_id: id }).await?;
        appended(&self.workspace.backlog_items, "Backlog item")
    }

    async fn create_backlog_item(
        &mut self,
        project_id: Uuid,
        draft: BacklogItemDraft,
    ) -> SprintboardResult<BacklogItem> {
        self.dispatch(&CreateBacklogItem { project_id, draft })
            .await?;
        appended(&self.workspace.backlog_items, "Backlog item")
    }

    fn list_backlog(&self, project_id: Uuid) -> SprintboardResult<Vec<BacklogItem>> {
        Ok(self
            .workspace
            .backlog_of(project_id)
            .into_iter()
            .cloned()
            .collect())
    }

    async fn update_backlog_item(
        &mut self,
        id: Uuid,
        updates: BacklogItemUpdate,
    ) -> SprintboardResult<BacklogItem> {
        Self::require(self.workspace.backlog_item(id), "Backlog item", id)?;
        self.dispatch(&UpdateBacklogItem {
            item_id: id,
            updates,
        })
        .await?;
        Self::require(self.workspace.backlog_item(id), "Backlog item", id)
    }

    async fn delete_backlog_item(&mut self, id: Uuid) -> SprintboardResult<()> {
        self.dispatch(&DeleteBacklogItem { item_id: id }).await?;
        Ok(())
    }

    async fn move_backlog_item_to_sprint(
        &mut self,
        id: Uuid,
        sprint_id: Uuid,
    ) -> SprintboardResult<Task> {
        self.dispatch(&MoveBacklogItemToSprint {
            item_id: id,
            sprint_id,
        })
        .await?;
        appended(&self.workspace.tasks, "Task")
    }

    async fn invite_collaborator(
        &mut self,
        project_id: Uuid,
        draft: InvitationDraft,
    ) -> SprintboardResult<Collaborator> {
        let invited_by = self.user.email.clone();
        self.dispatch(&InviteCollaborator {
            project_id,
            draft,
            invited_by,
        })
        .await?;
        appended(&self.workspace.collaborators, "Invitation")
    }

    fn list_collaborators(&self, project_id: Uuid) -> SprintboardResult<Vec<Collaborator>> {
        Ok(self
            .workspace
            .collaborators_of(project_id)
            .into_iter()
            .cloned()
            .collect())
    }

    fn pending_invitations(&self) -> SprintboardResult<Vec<Collaborator>> {
        Ok(query::pending_invitations(&self.workspace, &self.user.email)
            .into_iter()
            .cloned()
            .collect())
    }

    async fn respond_to_invitation(
        &mut self,
        id: Uuid,
        accept: bool,
    ) -> SprintboardResult<Collaborator> {
        self.dispatch(&RespondToInvitation {
            collaborator_id: id,
            accept,
            user_id: self.user.id.clone(),
            email: self.user.email.clone(),
        })
        .await?;
        if accept {
            // Pull in the project that just became visible
            self.refresh().await?;
        }
        Self::require(self.workspace.collaborator(id), "Invitation", id)
    }

    async fn revoke_collaborator(&mut self, id: Uuid) -> SprintboardResult<Collaborator> {
        self.dispatch(&RevokeCollaborator {
            collaborator_id: id,
        })
        .await?;
        Self::require(self.workspace.collaborator(id), "Collaborator", id)
    }

    async fn update_collaborator_role(
        &mut self,
        id: Uuid,
        role: Role,
    ) -> SprintboardResult<Collaborator> {
        self.dispatch(&UpdateCollaboratorRole {
            collaborator_id: id,
            role,
        })
        .await?;
        Self::require(self.workspace.collaborator(id), "Collaborator", id)
    }
}
