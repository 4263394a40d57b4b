//! In-memory adapters for tests and embedded use.

mod mirror;
mod source;
mod store;

pub use mirror::InMemoryTaskMirror;
pub use source::StaticSheetSource;
pub use store::InMemoryTaskStore;
