//! Quill Core Library
//!
//! In-memory blog store: accounts, sessions, author-only post editing,
//! credential hashing and configuration.

pub mod blog;
pub mod config;
pub mod credentials;
pub mod error;
pub mod invariants;
pub mod models;
pub mod permissions;
pub mod storage;

pub use blog::{BlogStore, Login};
pub use config::{BlogConfig, ConfigError, SecurityConfig, SeedConfig, SeedPost, SeedUser};
pub use credentials::CredentialHasher;
pub use error::{Error, Result};
pub use models::*;
pub use permissions::*;
pub use storage::{IdSequence, MemoryStorage, PostRepository, Storage, UserRepository};
