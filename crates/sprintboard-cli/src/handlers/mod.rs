pub mod backlog;
pub mod column;
pub mod invite;
pub mod project;
pub mod sprint;
pub mod task;
