use crate::error::SprintboardError;

pub type SprintboardResult<T> = Result<T, SprintboardError>;
