//! Data models for Quill

mod post;
mod session;
mod user;

pub use post::*;
pub use session::*;
pub use user::*;
