pub mod file_watcher;
pub mod invitation_poller;

pub use file_watcher::FileWatcher;
pub use invitation_poller::{fetch_pending_invitations, InvitationPoller};
