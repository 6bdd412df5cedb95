mod backend;
mod persistence;

pub use backend::{Backend, FileBackend, MemoryBackend, PersistenceFault};
pub use persistence::{Key, Persistence};
pub(crate) use persistence::source_message;
