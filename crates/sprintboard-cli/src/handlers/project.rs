use crate::cli::ProjectAction;
use crate::context::CliContext;
use crate::output;
use sprintboard_domain::{ProjectDraft, ProjectOperations, ProjectUpdate};

pub async fn handle(ctx: &mut CliContext, action: ProjectAction) -> anyhow::Result<()> {
    let engine = &mut ctx.engine;
    match action {
        ProjectAction::Create {
            title,
            description,
            end_goal,
        } => {
            let project = engine
                .create_project(ProjectDraft {
                    title,
                    description,
                    end_goal,
                })
                .await?;
            output::output_success(&project);
        }
        ProjectAction::List => {
            output::output_list(engine.list_projects()?);
        }
        ProjectAction::Get { id } => match engine.get_project(id)? {
            Some(project) => output::output_success(&project),
            None => return output::output_error(&format!("Project not found: {}", id)),
        },
        ProjectAction::Update {
            id,
            title,
            description,
            end_goal,
        } => {
            let updates = ProjectUpdate {
                title,
                description,
                end_goal,
            };
            match engine.update_project(id, updates).await? {
                Some(project) => output::output_success(&project),
                None => return output::output_error(&format!("Project not found: {}", id)),
            }
        }
        ProjectAction::Delete { id } => {
            engine.delete_project(id).await?;
            output::output_success(serde_json::json!({"deleted": id.to_string()}));
        }
    }
    Ok(())
}
