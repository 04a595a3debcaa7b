use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::project::ProjectId;
use crate::validation::InvitationDraft;

pub type CollaboratorId = Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Viewer,
    Editor,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Viewer => "viewer",
            Self::Editor => "editor",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "viewer" => Ok(Self::Viewer),
            "editor" => Ok(Self::Editor),
            "admin" => Ok(Self::Admin),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvitationStatus {
    #[default]
    Pending,
    Accepted,
    /// The invitee turned the invitation down.
    Declined,
    /// The project side withdrew access.
    Rejected,
}

impl InvitationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Declined => "declined",
            Self::Rejected => "rejected",
        }
    }

    /// Pending and accepted records hold a seat on the project.
    pub fn is_live(self) -> bool {
        matches!(self, Self::Pending | Self::Accepted)
    }
}

/// Delegated access to a project. While `status` is pending the record is an invitation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collaborator {
    pub id: CollaboratorId,
    pub project_id: ProjectId,
    pub email: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub status: InvitationStatus,
    pub invited_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Collaborator {
    pub fn invite(project_id: ProjectId, draft: InvitationDraft, invited_by: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            project_id,
            email: normalize_email(&draft.email),
            user_id: None,
            role: draft.role,
            status: InvitationStatus::Pending,
            invited_by,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == InvitationStatus::Pending
    }

    pub fn matches_email(&self, email: &str) -> bool {
        self.email == normalize_email(email)
    }

    pub fn accept(&mut self, user_id: String) {
        self.status = InvitationStatus::Accepted;
        self.user_id = Some(user_id);
        self.updated_at = Utc::now();
    }

    pub fn decline(&mut self) {
        self.status = InvitationStatus::Declined;
        self.updated_at = Utc::now();
    }

    pub fn revoke(&mut self) {
        self.status = InvitationStatus::Rejected;
        self.updated_at = Utc::now();
    }

    pub fn set_role(&mut self, role: Role) {
        self.role = role;
        self.updated_at = Utc::now();
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
