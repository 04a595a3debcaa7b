pub mod config;
pub mod error;
pub mod result;

pub use config::{AppConfig, RemoteConfig};
pub use error::SprintboardError;
pub use result::SprintboardResult;
