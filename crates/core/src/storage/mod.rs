//! Storage layer for Quill

mod memory;
mod sequence;
mod traits;

pub use memory::MemoryStorage;
pub use sequence::IdSequence;
pub use traits::{PostRepository, Storage, UserRepository};
