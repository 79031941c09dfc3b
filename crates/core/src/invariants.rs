//! Developer guardrails and invariants
//!
//! Debug assertions for detecting impossible store states during
//! development. These checks are compiled out in release builds.

use std::collections::HashSet;

use crate::models::{Post, Session, User};

/// Validate the user and post collections against each other
///
/// `users` and `posts` are expected in creation order.
pub fn assert_store_invariants(users: &[User], posts: &[Post]) {
    assert_users_invariants(users);
    assert_posts_invariants(posts);

    let user_ids: HashSet<_> = users.iter().map(|u| u.id).collect();
    for post in posts {
        debug_assert!(
            user_ids.contains(&post.author),
            "Post {} has author {} which is not a known user",
            post.id,
            post.author
        );
    }
}

/// Usernames are unique and IDs strictly increase in creation order
pub fn assert_users_invariants(users: &[User]) {
    let mut names = HashSet::new();
    for user in users {
        debug_assert!(
            names.insert(user.username.as_str()),
            "Username {} appears more than once",
            user.username
        );
    }

    for pair in users.windows(2) {
        debug_assert!(
            pair[0].id < pair[1].id,
            "User IDs out of order: {} then {}",
            pair[0].id,
            pair[1].id
        );
    }
}

/// Post IDs strictly increase in listing order
pub fn assert_posts_invariants(posts: &[Post]) {
    for pair in posts.windows(2) {
        debug_assert!(
            pair[0].id < pair[1].id,
            "Post IDs out of order: {} then {}",
            pair[0].id,
            pair[1].id
        );
    }
}

/// Validate that an active session belongs to a known user
pub fn assert_session_invariants(session: &Session, users: &[User]) {
    debug_assert!(
        users.iter().any(|u| u.id == session.user_id),
        "Session {} refers to unknown user {}",
        session.id,
        session.user_id
    );
}
