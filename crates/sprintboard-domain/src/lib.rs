pub mod backlog;
pub mod burndown;
pub mod changes;
pub mod collaborator;
pub mod column;
pub mod commands;
pub mod field_update;
pub mod operations;
pub mod project;
pub mod query;
pub mod sprint;
pub mod task;
pub mod task_lifecycle;
pub mod validation;
pub mod wire;
pub mod workspace;

pub use backlog::{BacklogItem, BacklogItemId, BacklogItemUpdate};
pub use burndown::{burndown, BurndownPoint};
pub use changes::{ChangeSet, RowChange};
pub use collaborator::{Collaborator, CollaboratorId, InvitationStatus, Role};
pub use column::{Column, ColumnId, DEFAULT_COLUMNS, DONE_COLUMN, IN_PROGRESS_COLUMN, TODO_COLUMN};
pub use field_update::FieldUpdate;
pub use operations::{ProjectOperations, TaskFilter};
pub use project::{Project, ProjectId, ProjectUpdate};
pub use sprint::{Sprint, SprintId, SprintStatus, SprintUpdate};
pub use task::{Priority, Task, TaskId, TaskUpdate};
pub use validation::{
    BacklogItemDraft, InvitationDraft, ProjectDraft, SprintDraft, TaskDraft, ValidationErrors,
};
pub use wire::{Table, WireRecord};
pub use workspace::Workspace;
