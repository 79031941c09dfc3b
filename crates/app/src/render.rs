//! Text rendering for posts and users

use quill_core::{PostDisplay, User};

const DIVIDER: &str = "==============================";

/// A single post in the fixed console template
pub fn render_post(post: &PostDisplay) -> String {
    let mut out = format!("{}\n{}", DIVIDER, post);
    if post.is_edited {
        out.push_str("\n(edited)");
    }
    out.push_str(&format!("\nPosted {}", post.format_date()));
    out
}

/// Every post in order, or a placeholder when there are none
pub fn render_post_list(posts: &[PostDisplay]) -> String {
    if posts.is_empty() {
        return "There are no posts for this blog :(".to_string();
    }
    posts.iter().map(render_post).collect::<Vec<_>>().join("\n")
}

pub fn render_user(user: &User) -> String {
    user.to_string()
}
