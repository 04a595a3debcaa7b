use crate::cli::{SprintAction, SprintUpdateArgs};
use crate::context::CliContext;
use crate::output;
use sprintboard_domain::query::board;
use sprintboard_domain::{ProjectOperations, SprintDraft, SprintUpdate};

pub async fn handle(ctx: &mut CliContext, action: SprintAction) -> anyhow::Result<()> {
    let engine = &mut ctx.engine;
    match action {
        SprintAction::Create {
            project_id,
            title,
            description,
            start,
            end,
        } => {
            let draft = SprintDraft {
                title,
                description,
                start_date: start,
                end_date: end,
            };
            let sprint = engine.create_sprint(project_id, draft).await?;
            output::output_success(&sprint);
        }
        SprintAction::List { project_id } => {
            output::output_list(engine.list_sprints(project_id)?);
        }
        SprintAction::Get { id } => match engine.get_sprint(id)? {
            Some(sprint) => output::output_success(&sprint),
            None => return output::output_error(&format!("Sprint not found: {}", id)),
        },
        SprintAction::Update(SprintUpdateArgs {
            id,
            title,
            description,
            start,
            end,
        }) => {
            let updates = SprintUpdate {
                title,
                description,
                start_date: start,
                end_date: end,
            };
            let sprint = engine.update_sprint(id, updates).await?;
            output::output_success(&sprint);
        }
        SprintAction::Complete { id } => {
            let progress = engine.sprint_progress(id)?;
            if !progress.ready_to_complete {
                tracing::warn!(
                    "Completing sprint {} with {} of {} task(s) done",
                    id,
                    progress.done_tasks,
                    progress.total_tasks
                );
            }
            let sprint = engine.complete_sprint(id).await?;
            output::output_success(&sprint);
        }
        SprintAction::Delete { id } => {
            engine.delete_sprint(id).await?;
            output::output_success(serde_json::json!({"deleted": id.to_string()}));
        }
        SprintAction::Board { id } => {
            if engine.get_sprint(id)?.is_none() {
                return output::output_error(&format!("Sprint not found: {}", id));
            }
            output::output_list(board(engine.workspace(), id));
        }
        SprintAction::Progress { id } => {
            let progress = engine.sprint_progress(id)?;
            output::output_success(serde_json::json!({
                "totalTasks": progress.total_tasks,
                "doneTasks": progress.done_tasks,
                "totalPoints": progress.total_points,
                "donePoints": progress.done_points,
                "percentDone": progress.percent_done(),
                "readyToComplete": progress.ready_to_complete,
            }));
        }
        SprintAction::Burndown { id, today } => {
            let today = today.unwrap_or_else(|| chrono::Local::now().date_naive());
            output::output_list(engine.sprint_burndown(id, today)?);
        }
    }
    Ok(())
}
