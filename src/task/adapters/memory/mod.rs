//! In-memory adapters for weekly task persistence.

mod task;

pub use task::InMemoryTaskRepository;
