use crate::burndown::BurndownPoint;
use crate::query::SprintProgress;
use crate::validation::{
    BacklogItemDraft, InvitationDraft, ProjectDraft, SprintDraft, TaskDraft,
};
use crate::{
    BacklogItem, BacklogItemUpdate, Collaborator, Column, Project, ProjectUpdate, Role, Sprint,
    SprintUpdate, Task, TaskUpdate,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use sprintboard_core::SprintboardResult;
use uuid::Uuid;

/// Filter options for listing tasks
#[derive(Debug, Default, Clone)]
pub struct TaskFilter {
    pub sprint_id: Option<Uuid>,
    pub column_id: Option<Uuid>,
    pub assignee: Option<String>,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        self.sprint_id.map_or(true, |id| task.sprint_id == id)
            && self.column_id.map_or(true, |id| task.column_id == id)
            && self
                .assignee
                .as_deref()
                .map_or(true, |a| task.assignee.as_deref() == Some(a))
    }
}

/// Every operation a front end can ask of the project state container.
///
/// Mutations resolve once the data store has confirmed them.
#[async_trait]
pub trait ProjectOperations {
    // Project operations
    async fn create_project(&mut self, draft: ProjectDraft) -> SprintboardResult<Project>;
    fn list_projects(&self) -> SprintboardResult<Vec<Project>>;
    fn get_project(&self, id: Uuid) -> SprintboardResult<Option<Project>>;
    /// Unknown ids resolve to `None` without touching anything.
    async fn update_project(
        &mut self,
        id: Uuid,
        updates: ProjectUpdate,
    ) -> SprintboardResult<Option<Project>>;
    async fn delete_project(&mut self, id: Uuid) -> SprintboardResult<()>;

    // Sprint operations
    async fn create_sprint(
        &mut self,
        project_id: Uuid,
        draft: SprintDraft,
    ) -> SprintboardResult<Sprint>;
    fn list_sprints(&self, project_id: Uuid) -> SprintboardResult<Vec<Sprint>>;
    fn get_sprint(&self, id: Uuid) -> SprintboardResult<Option<Sprint>>;
    async fn update_sprint(&mut self, id: Uuid, updates: SprintUpdate)
        -> SprintboardResult<Sprint>;
    async fn complete_sprint(&mut self, id: Uuid) -> SprintboardResult<Sprint>;
    async fn delete_sprint(&mut self, id: Uuid) -> SprintboardResult<()>;
    fn sprint_progress(&self, id: Uuid) -> SprintboardResult<SprintProgress>;
    fn sprint_burndown(&self, id: Uuid, today: NaiveDate)
        -> SprintboardResult<Vec<BurndownPoint>>;

    // Column operations
    async fn create_column(&mut self, sprint_id: Uuid, title: String)
        -> SprintboardResult<Column>;
    fn list_columns(&self, sprint_id: Uuid) -> SprintboardResult<Vec<Column>>;
    async fn rename_column(&mut self, id: Uuid, title: String) -> SprintboardResult<Column>;
    async fn delete_column(&mut self, id: Uuid) -> SprintboardResult<()>;

    // Task operations
    async fn create_task(
        &mut self,
        sprint_id: Uuid,
        column_id: Option<Uuid>,
        draft: TaskDraft,
    ) -> SprintboardResult<Task>;
    fn list_tasks(&self, filter: TaskFilter) -> SprintboardResult<Vec<Task>>;
    fn get_task(&self, id: Uuid) -> SprintboardResult<Option<Task>>;
    async fn update_task(&mut self, id: Uuid, updates: TaskUpdate) -> SprintboardResult<Task>;
    async fn delete_task(&mut self, id: Uuid) -> SprintboardResult<()>;
    async fn move_task(
        &mut self,
        id: Uuid,
        source_column_id: Uuid,
        destination_column_id: Uuid,
    ) -> SprintboardResult<Task>;
    async fn move_task_to_backlog(&mut self, id: Uuid) -> SprintboardResult<BacklogItem>;

    // Backlog operations
    async fn create_backlog_item(
        &mut self,
        project_id: Uuid,
        draft: BacklogItemDraft,
    ) -> SprintboardResult<BacklogItem>;
    fn list_backlog(&self, project_id: Uuid) -> SprintboardResult<Vec<BacklogItem>>;
    async fn update_backlog_item(
        &mut self,
        id: Uuid,
        updates: BacklogItemUpdate,
    ) -> SprintboardResult<BacklogItem>;
    async fn delete_backlog_item(&mut self, id: Uuid) -> SprintboardResult<()>;
    async fn move_backlog_item_to_sprint(
        &mut self,
        id: Uuid,
        sprint_id: Uuid,
    ) -> SprintboardResult<Task>;

    // Collaborator operations
    async fn invite_collaborator(
        &mut self,
        project_id: Uuid,
        draft: InvitationDraft,
    ) -> SprintboardResult<Collaborator>;
    fn list_collaborators(&self, project_id: Uuid) -> SprintboardResult<Vec<Collaborator>>;
    fn pending_invitations(&self) -> SprintboardResult<Vec<Collaborator>>;
    async fn respond_to_invitation(
        &mut self,
        id: Uuid,
        accept: bool,
    ) -> SprintboardResult<Collaborator>;
    async fn revoke_collaborator(&mut self, id: Uuid) -> SprintboardResult<Collaborator>;
    async fn update_collaborator_role(
        &mut self,
        id: Uuid,
        role: Role,
    ) -> SprintboardResult<Collaborator>;
}
