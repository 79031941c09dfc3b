//! Post model

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::UserId;
use crate::error::Error;

/// Sequential post identifier, never reused after deletion
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PostId(pub u64);

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PostId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        trimmed
            .parse::<u64>()
            .map(PostId)
            .map_err(|_| Error::InvalidInput(format!("'{}' is not a valid post ID", trimmed)))
    }
}

/// A blog post owned by its author
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub body: String,
    pub author: UserId,
    pub created_at: DateTime<Utc>,
    pub edited_at: Option<DateTime<Utc>>,
}

impl Post {
    pub fn new(id: PostId, title: String, body: String, author: UserId) -> Self {
        Self {
            id,
            title,
            body,
            author,
            created_at: Utc::now(),
            edited_at: None,
        }
    }

    /// Apply the provided fields; `id` and `author` never change.
    pub fn apply(&mut self, update: PostUpdate) {
        if update.is_empty() {
            return;
        }
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(body) = update.body {
            self.body = body;
        }
        self.edited_at = Some(Utc::now());
    }
}

/// Partial update request naming only the mutable post fields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostUpdate {
    pub title: Option<String>,
    pub body: Option<String>,
}

impl PostUpdate {
    pub fn title(title: impl Into<String>) -> Self {
        Self::default().with_title(title)
    }

    pub fn body(body: impl Into<String>) -> Self {
        Self::default().with_body(body)
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.body.is_none()
    }
}

/// Post joined with its author's name for display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDisplay {
    pub id: PostId,
    pub title: String,
    pub author: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub is_edited: bool,
}

impl PostDisplay {
    pub fn format_date(&self) -> String {
        self.created_at.format("%Y-%m-%d").to_string()
    }
}

impl fmt::Display for PostDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} - {}", self.id, title_case(&self.title))?;
        writeln!(f, "By: {}", self.author)?;
        write!(f, "{}", self.body)
    }
}

/// Upper-case the first letter of every run of letters, lower-case the rest
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_word = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}
