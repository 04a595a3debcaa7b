pub mod store;
pub mod sync;
pub mod traits;
pub mod watch;

pub use store::*;
pub use sync::{Mutation, MutationStatus, SyncEngine, SyncEvent};
pub use traits::*;
pub use watch::*;
