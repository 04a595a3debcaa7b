//! Which projects and invitations a user can see.

use uuid::Uuid;

use crate::collaborator::{normalize_email, InvitationStatus};
use crate::{Collaborator, Project, Workspace};

/// Projects the user created.
pub fn owned_projects<'a>(workspace: &'a Workspace, owner_id: &str) -> Vec<&'a Project> {
    workspace
        .projects
        .iter()
        .filter(|p| p.owner_id == owner_id)
        .collect()
}

/// Projects the user joined through an accepted invitation.
pub fn shared_projects<'a>(workspace: &'a Workspace, email: &str) -> Vec<&'a Project> {
    let email = normalize_email(email);
    let project_ids: Vec<Uuid> = workspace
        .collaborators
        .iter()
        .filter(|c| c.status == InvitationStatus::Accepted && c.email == email)
        .map(|c| c.project_id)
        .collect();
    workspace
        .projects
        .iter()
        .filter(|p| project_ids.contains(&p.id))
        .collect()
}

/// Owned projects followed by shared ones, without repeats.
pub fn visible_projects<'a>(
    workspace: &'a Workspace,
    user_id: &str,
    email: &str,
) -> Vec<&'a Project> {
    let mut projects = owned_projects(workspace, user_id);
    for project in shared_projects(workspace, email) {
        if !projects.iter().any(|p| p.id == project.id) {
            projects.push(project);
        }
    }
    projects
}

/// Invitations still waiting on the addressee.
pub fn pending_invitations<'a>(workspace: &'a Workspace, email: &str) -> Vec<&'a Collaborator> {
    workspace
        .collaborators
        .iter()
        .filter(|c| c.is_pending() && c.matches_email(email))
        .collect()
}
