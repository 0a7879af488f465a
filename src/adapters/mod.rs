// Adapters layer: concrete implementations of domain ports.

pub mod storage;

pub use storage::{FileTokenStore, MemoryTokenStore};
