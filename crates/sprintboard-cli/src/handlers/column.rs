use crate::cli::ColumnAction;
use crate::context::CliContext;
use crate::output;
use sprintboard_domain::ProjectOperations;

pub async fn handle(ctx: &mut CliContext, action: ColumnAction) -> anyhow::Result<()> {
    let engine = &mut ctx.engine;
    match action {
        ColumnAction::Create { sprint_id, title } => {
            let column = engine.create_column(sprint_id, title).await?;
            output::output_success(&column);
        }
        ColumnAction::List { sprint_id } => {
            output::output_list(engine.list_columns(sprint_id)?);
        }
        ColumnAction::Rename { id, title } => {
            let column = engine.rename_column(id, title).await?;
            output::output_success(&column);
        }
        ColumnAction::Delete { id } => {
            engine.delete_column(id).await?;
            output::output_success(serde_json::json!({"deleted": id.to_string()}));
        }
    }
    Ok(())
}
