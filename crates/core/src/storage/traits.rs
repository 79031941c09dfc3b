//! Storage repository traits
//!
//! These traits define the storage interface the blog service runs on,
//! allowing for different implementations (in-memory, mock, a future
//! persistent backend).

use crate::error::Result;
use crate::models::{Post, PostId, User, UserId};

/// User repository operations
pub trait UserRepository {
    /// Insert a user; fails with `UsernameTaken` on a duplicate username
    fn create_user(&mut self, user: User) -> Result<()>;

    /// Find user by ID
    fn find_user_by_id(&self, id: UserId) -> Result<Option<User>>;

    /// Find user by exact, case-sensitive username
    fn find_user_by_username(&self, username: &str) -> Result<Option<User>>;

    /// All users in creation order
    fn list_users(&self) -> Result<Vec<User>>;

    /// Update user's last login time
    fn update_last_login(&mut self, user_id: UserId) -> Result<()>;
}

/// Post repository operations
pub trait PostRepository {
    /// Append a post
    fn create_post(&mut self, post: Post) -> Result<()>;

    /// Find post by ID
    fn find_post_by_id(&self, id: PostId) -> Result<Option<Post>>;

    /// All posts in creation order
    fn list_posts(&self) -> Result<Vec<Post>>;

    /// Replace a stored post with the same ID
    fn update_post(&mut self, post: &Post) -> Result<()>;

    /// Remove a post
    fn delete_post(&mut self, post_id: PostId) -> Result<()>;

    /// Number of stored posts
    fn count_posts(&self) -> Result<u64>;
}

/// Combined storage interface
pub trait Storage: UserRepository + PostRepository {}

// Blanket implementation: any type implementing all traits implements Storage
impl<T> Storage for T where T: UserRepository + PostRepository {}
