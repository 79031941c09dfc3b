//! In-memory storage backend
//!
//! Nothing survives the process. Users are keyed by username; posts keep
//! insertion order, which is also listing order.

use std::collections::HashMap;

use tracing::instrument;

use super::traits::{PostRepository, UserRepository};
use crate::error::{Error, Result};
use crate::models::{Post, PostId, User, UserId};

#[derive(Debug, Default)]
pub struct MemoryStorage {
    users: HashMap<String, User>,
    posts: Vec<Post>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn post_index(&self, post_id: PostId) -> Option<usize> {
        self.posts.iter().position(|p| p.id == post_id)
    }
}

impl UserRepository for MemoryStorage {
    #[instrument(skip(self, user), fields(username = %user.username))]
    fn create_user(&mut self, user: User) -> Result<()> {
        if self.users.contains_key(&user.username) {
            return Err(Error::UsernameTaken(user.username));
        }
        self.users.insert(user.username.clone(), user);
        Ok(())
    }

    fn find_user_by_id(&self, id: UserId) -> Result<Option<User>> {
        Ok(self.users.values().find(|u| u.id == id).cloned())
    }

    fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self.users.get(username).cloned())
    }

    fn list_users(&self) -> Result<Vec<User>> {
        let mut users: Vec<User> = self.users.values().cloned().collect();
        users.sort_by_key(|u| u.id);
        Ok(users)
    }

    fn update_last_login(&mut self, user_id: UserId) -> Result<()> {
        if let Some(user) = self.users.values_mut().find(|u| u.id == user_id) {
            user.last_login = Some(chrono::Utc::now());
        }
        Ok(())
    }
}

impl PostRepository for MemoryStorage {
    #[instrument(skip(self, post), fields(post_id = %post.id))]
    fn create_post(&mut self, post: Post) -> Result<()> {
        self.posts.push(post);
        Ok(())
    }

    fn find_post_by_id(&self, id: PostId) -> Result<Option<Post>> {
        Ok(self.posts.iter().find(|p| p.id == id).cloned())
    }

    fn list_posts(&self) -> Result<Vec<Post>> {
        Ok(self.posts.clone())
    }

    fn update_post(&mut self, post: &Post) -> Result<()> {
        let index = self.post_index(post.id).ok_or(Error::NotFound(post.id))?;
        self.posts[index] = post.clone();
        Ok(())
    }

    fn delete_post(&mut self, post_id: PostId) -> Result<()> {
        let index = self.post_index(post_id).ok_or(Error::NotFound(post_id))?;
        // Vec::remove keeps the remaining posts in creation order
        self.posts.remove(index);
        Ok(())
    }

    fn count_posts(&self) -> Result<u64> {
        Ok(self.posts.len() as u64)
    }
}
