use crate::cli::BacklogAction;
use crate::context::CliContext;
use crate::output;
use sprintboard_domain::{BacklogItemDraft, BacklogItemUpdate, ProjectOperations};

pub async fn handle(ctx: &mut CliContext, action: BacklogAction) -> anyhow::Result<()> {
    let engine = &mut ctx.engine;
    match action {
        BacklogAction::Create {
            project_id,
            title,
            description,
            priority,
            points,
        } => {
            let draft = BacklogItemDraft {
                title,
                description,
                priority,
                story_points: points,
            };
            let item = engine.create_backlog_item(project_id, draft).await?;
            output::output_success(&item);
        }
        BacklogAction::List { project_id } => {
            output::output_list(engine.list_backlog(project_id)?);
        }
        BacklogAction::Update {
            id,
            title,
            description,
            priority,
            points,
        } => {
            let updates = BacklogItemUpdate {
                title,
                description,
                priority,
                story_points: points,
            };
            let item = engine.update_backlog_item(id, updates).await?;
            output::output_success(&item);
        }
        BacklogAction::Delete { id } => {
            engine.delete_backlog_item(id).await?;
            output::output_success(serde_json::json!({"deleted": id.to_string()}));
        }
        BacklogAction::ToSprint { id, sprint_id } => {
            let task = engine.move_backlog_item_to_sprint(id, sprint_id).await?;
            output::output_success(&task);
        }
    }
    Ok(())
}
