//! Permission system for post operations

use crate::error::{Error, Result};
use crate::models::{PostId, UserId};

/// Actions that can be performed on posts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostAction {
    View,
    Create,
    Edit,
    Delete,
}

/// Authorship-based permission rules
pub struct PermissionMatrix;

impl PermissionMatrix {
    /// Whether an action needs a logged-in actor
    pub fn requires_session(action: PostAction) -> bool {
        !matches!(action, PostAction::View)
    }

    /// Check if a logged-in actor may perform an action on a post by `author`
    pub fn can_perform(actor: UserId, author: UserId, action: PostAction) -> bool {
        match action {
            PostAction::View | PostAction::Create => true,
            // Only the author may mutate a post
            PostAction::Edit | PostAction::Delete => actor == author,
        }
    }

    /// Authorize an action on an existing post
    ///
    /// Callers must confirm the post exists first, so a missing post is
    /// reported as missing whatever the session state.
    pub fn authorize(
        actor: Option<UserId>,
        post_id: PostId,
        author: UserId,
        action: PostAction,
    ) -> Result<()> {
        let actor = match actor {
            Some(actor) => actor,
            None if Self::requires_session(action) => return Err(Error::NotAuthenticated),
            None => return Ok(()),
        };

        if Self::can_perform(actor, author, action) {
            Ok(())
        } else {
            Err(Error::Forbidden(post_id))
        }
    }
}
