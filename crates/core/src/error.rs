//! Error types for Quill Core

use thiserror::Error;

use crate::config::ConfigError;
use crate::models::PostId;

#[derive(Error, Debug)]
pub enum Error {
    #[error("User with username {0} already exists")]
    UsernameTaken(String),

    /// Unknown username and wrong password are deliberately the same error.
    #[error("Username and/or password is incorrect")]
    InvalidCredentials,

    #[error("You must be logged in to do that")]
    NotAuthenticated,

    #[error("You do not have permission to modify post {0}")]
    Forbidden(PostId),

    #[error("Post with an ID of {0} does not exist")]
    NotFound(PostId),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Credential error: {0}")]
    Credential(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, Error>;
