use super::{Command, CommandContext};
use crate::validation::InvitationDraft;
use crate::{Collaborator, Role};
use sprintboard_core::{SprintboardError, SprintboardResult};
use uuid::Uuid;

fn collaborator_mut<'c>(
    context: &'c mut CommandContext,
    id: Uuid,
) -> SprintboardResult<&'c mut Collaborator> {
    context
        .collaborators
        .iter_mut()
        .find(|c| c.id == id)
        .ok_or_else(|| SprintboardError::NotFound(format!("Invitation {}", id)))
}

/// Invite someone to a project by email
pub struct InviteCollaborator {
    pub project_id: Uuid,
    pub draft: InvitationDraft,
    pub invited_by: String,
}

impl Command for InviteCollaborator {
    fn execute(&self, context: &mut CommandContext) -> SprintboardResult<()> {
        self.draft.validate()?;
        context.require_project(self.project_id)?;

        let already = context.collaborators.iter().any(|c| {
            c.project_id == self.project_id
                && c.status.is_live()
                && c.matches_email(&self.draft.email)
        });
        if already {
            return Err(SprintboardError::Duplicate(format!(
                "{} is already invited to this project",
                self.draft.email.trim()
            )));
        }

        context.collaborators.push(Collaborator::invite(
            self.project_id,
            self.draft.clone(),
            self.invited_by.clone(),
        ));
        Ok(())
    }

    fn description(&self) -> String {
        format!("Invite {}", self.draft.email.trim())
    }
}

/// Accept or decline a pending invitation on behalf of its addressee
pub struct RespondToInvitation {
    pub collaborator_id: Uuid,
    pub accept: bool,
    pub user_id: String,
    pub email: String,
}

impl Command for RespondToInvitation {
    fn execute(&self, context: &mut CommandContext) -> SprintboardResult<()> {
        let invitation = collaborator_mut(context, self.collaborator_id)?;
        if !invitation.matches_email(&self.email) {
            return Err(SprintboardError::Validation(
                "Invitation is addressed to someone else".to_string(),
            ));
        }
        if !invitation.is_pending() {
            return Err(SprintboardError::Validation(format!(
                "Invitation is already {}",
                invitation.status.as_str()
            )));
        }

        if self.accept {
            invitation.accept(self.user_id.clone());
        } else {
            invitation.decline();
        }
        Ok(())
    }

    fn description(&self) -> String {
        let verb = if self.accept { "Accept" } else { "Decline" };
        format!("{} invitation {}", verb, self.collaborator_id)
    }
}

/// Withdraw a collaborator's access (or a pending invitation)
pub struct RevokeCollaborator {
    pub collaborator_id: Uuid,
}

impl Command for RevokeCollaborator {
    fn execute(&self, context: &mut CommandContext) -> SprintboardResult<()> {
        let collaborator = collaborator_mut(context, self.collaborator_id)?;
        if collaborator.status.is_live() {
            collaborator.revoke();
        }
        Ok(())
    }

    fn description(&self) -> String {
        format!("Revoke collaborator {}", self.collaborator_id)
    }
}

/// Change a collaborator's role
pub struct UpdateCollaboratorRole {
    pub collaborator_id: Uuid,
    pub role: Role,
}

impl Command for UpdateCollaboratorRole {
    fn execute(&self, context: &mut CommandContext) -> SprintboardResult<()> {
        let collaborator = collaborator_mut(context, self.collaborator_id)?;
        if collaborator.role != self.role {
            collaborator.set_role(self.role);
        }
        Ok(())
    }

    fn description(&self) -> String {
        format!(
            "Set role of collaborator {} to {}",
            self.collaborator_id, self.role
        )
    }
}
