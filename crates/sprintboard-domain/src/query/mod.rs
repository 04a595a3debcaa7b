//! Read-side views over a `Workspace`.

pub mod board;
pub mod projects;

pub use board::{board, sprint_progress, BoardColumn, SprintProgress};
pub use projects::{owned_projects, pending_invitations, shared_projects, visible_projects};
