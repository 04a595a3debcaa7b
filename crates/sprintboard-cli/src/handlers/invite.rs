use crate::cli::InviteAction;
use crate::context::CliContext;
use crate::output;
use sprintboard_domain::{InvitationDraft, ProjectOperations};
use sprintboard_persistence::InvitationPoller;

pub async fn handle(ctx: &mut CliContext, action: InviteAction) -> anyhow::Result<()> {
    match action {
        InviteAction::Send {
            project_id,
            email,
            role,
        } => {
            let invitation = ctx
                .engine
                .invite_collaborator(project_id, InvitationDraft { email, role })
                .await?;
            output::output_success(&invitation);
        }
        InviteAction::List { project_id } => {
            output::output_list(ctx.engine.list_collaborators(project_id)?);
        }
        InviteAction::Pending => {
            output::output_list(ctx.engine.pending_invitations()?);
        }
        InviteAction::Accept { id } => {
            let invitation = ctx.engine.respond_to_invitation(id, true).await?;
            output::output_success(&invitation);
        }
        InviteAction::Decline { id } => {
            let invitation = ctx.engine.respond_to_invitation(id, false).await?;
            output::output_success(&invitation);
        }
        InviteAction::Revoke { id } => {
            let collaborator = ctx.engine.revoke_collaborator(id).await?;
            output::output_success(&collaborator);
        }
        InviteAction::SetRole { id, role } => {
            let collaborator = ctx.engine.update_collaborator_role(id, role).await?;
            output::output_success(&collaborator);
        }
        InviteAction::Watch { count } => watch(ctx, count).await?,
    }
    Ok(())
}

/// Stream pending invitations as one JSON line per change until `count`
/// updates were printed or the process is interrupted.
async fn watch(ctx: &CliContext, count: Option<usize>) -> anyhow::Result<()> {
    ctx.remote.watch().await?;
    let poller = InvitationPoller::spawn(
        ctx.remote.clone(),
        ctx.engine.user().email.clone(),
        ctx.config.effective_poll_interval(),
    );
    let mut updates = poller.subscribe();

    let mut printed = 0;
    while count.map_or(true, |limit| printed < limit) {
        tokio::select! {
            update = updates.recv() => match update {
                Ok(invitations) => {
                    output::output_list(invitations);
                    printed += 1;
                }
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!("Skipped {} invitation update(s)", skipped);
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    poller.stop();
    ctx.remote.unwatch().await?;
    Ok(())
}
