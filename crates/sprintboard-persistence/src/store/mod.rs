pub mod atomic_writer;
pub mod json_file_remote;
pub mod memory_remote;

pub use atomic_writer::AtomicWriter;
pub use json_file_remote::{JsonEnvelope, JsonFileRemote, StoreMetadata};
pub use memory_remote::{MemoryRemote, Tables};
