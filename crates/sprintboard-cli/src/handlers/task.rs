use crate::cli::{TaskAction, TaskCreateArgs, TaskUpdateArgs};
use crate::context::CliContext;
use crate::output;
use sprintboard_domain::{FieldUpdate, ProjectOperations, TaskDraft, TaskFilter, TaskUpdate};

pub async fn handle(ctx: &mut CliContext, action: TaskAction) -> anyhow::Result<()> {
    let engine = &mut ctx.engine;
    match action {
        TaskAction::Create(TaskCreateArgs {
            sprint_id,
            column_id,
            title,
            description,
            priority,
            assignee,
            points,
        }) => {
            let draft = TaskDraft {
                title,
                description,
                priority,
                assignee,
                story_points: points,
            };
            let task = engine.create_task(sprint_id, column_id, draft).await?;
            output::output_success(&task);
        }
        TaskAction::List {
            sprint_id,
            column_id,
            assignee,
        } => {
            let filter = TaskFilter {
                sprint_id,
                column_id,
                assignee,
            };
            output::output_list(engine.list_tasks(filter)?);
        }
        TaskAction::Get { id } => match engine.get_task(id)? {
            Some(task) => output::output_success(&task),
            None => return output::output_error(&format!("Task not found: {}", id)),
        },
        TaskAction::Update(args) => {
            let id = args.id;
            let task = engine.update_task(id, build_task_update(args)).await?;
            output::output_success(&task);
        }
        TaskAction::Move { id, from, to } => {
            let task = engine.move_task(id, from, to).await?;
            output::output_success(&task);
        }
        TaskAction::ToBacklog { id } => {
            let item = engine.move_task_to_backlog(id).await?;
            output::output_success(&item);
        }
        TaskAction::Delete { id } => {
            engine.delete_task(id).await?;
            output::output_success(serde_json::json!({"deleted": id.to_string()}));
        }
    }
    Ok(())
}

fn build_task_update(args: TaskUpdateArgs) -> TaskUpdate {
    let assignee = match (args.clear_assignee, args.assignee) {
        (true, _) => FieldUpdate::Clear,
        (false, Some(email)) => FieldUpdate::Set(email),
        (false, None) => FieldUpdate::NoChange,
    };
    TaskUpdate {
        title: args.title,
        description: args.description,
        priority: args.priority,
        assignee,
        story_points: args.points,
    }
}
