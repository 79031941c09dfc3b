//! Blog configuration schema and loader
//!
//! A TOML file tunes credential hashing cost and lists the users and
//! posts a fresh store is seeded with. Every section is optional; a
//! missing file yields the built-in demo configuration.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Top-level configuration loaded from TOML
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogConfig {
    /// Credential hashing cost
    #[serde(default)]
    pub security: SecurityConfig,
    /// Entities created when the store is built
    #[serde(default)]
    pub seed: SeedConfig,
}

/// Argon2id cost parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Memory cost in KiB
    #[serde(default = "default_memory_kib")]
    pub memory_kib: u32,
    /// Number of passes
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    /// Degree of parallelism
    #[serde(default = "default_parallelism")]
    pub parallelism: u32,
}

fn default_memory_kib() -> u32 {
    19 * 1024
}

fn default_iterations() -> u32 {
    2
}

fn default_parallelism() -> u32 {
    1
}

impl SecurityConfig {
    /// Lowest cost Argon2 accepts. Only suitable for tests.
    pub fn minimal() -> Self {
        Self {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        }
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            memory_kib: default_memory_kib(),
            iterations: default_iterations(),
            parallelism: default_parallelism(),
        }
    }
}

/// Seed data section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedConfig {
    #[serde(default)]
    pub users: Vec<SeedUser>,
    #[serde(default)]
    pub posts: Vec<SeedPost>,
}

impl SeedConfig {
    pub fn empty() -> Self {
        Self {
            users: Vec::new(),
            posts: Vec::new(),
        }
    }
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            users: vec![SeedUser {
                username: "eitanr".to_string(),
                password: "abc123".to_string(),
            }],
            posts: vec![SeedPost {
                author: "eitanr".to_string(),
                title: "Pre-Loaded".to_string(),
                body: "This post was preloaded".to_string(),
            }],
        }
    }
}

/// A user created at startup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedUser {
    pub username: String,
    pub password: String,
}

/// A post created at startup, attributed to a seed user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedPost {
    /// Username of a seed user
    pub author: String,
    pub title: String,
    pub body: String,
}

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Invalid security parameters: {0}")]
    InvalidSecurity(String),
    #[error("Seed user '{0}' is listed more than once")]
    DuplicateSeedUser(String),
    #[error("Seed post '{title}' names unknown author '{author}'")]
    UnknownSeedAuthor { title: String, author: String },
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),
}

impl BlogConfig {
    /// Parse and validate configuration from TOML content
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: BlogConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load configuration from a file, falling back to defaults if it is absent
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        match Self::load(path) {
            Err(ConfigError::NotFound(_)) => {
                tracing::debug!(path = %path.display(), "No config file, using defaults");
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Check seed data for duplicate users and dangling authors
    ///
    /// Seeding reports a post whose author is missing as
    /// `UnknownSeedAuthor` as well, so unvalidated configs fail the same way.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut usernames = HashSet::new();
        for user in &self.seed.users {
            if !usernames.insert(user.username.as_str()) {
                return Err(ConfigError::DuplicateSeedUser(user.username.clone()));
            }
        }

        if let Some(post) = self
            .seed
            .posts
            .iter()
            .find(|p| !usernames.contains(p.author.as_str()))
        {
            return Err(ConfigError::UnknownSeedAuthor {
                title: post.title.clone(),
                author: post.author.clone(),
            });
        }

        Ok(())
    }
}
