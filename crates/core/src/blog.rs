//! Blog service: accounts, sessions and the post lifecycle
//!
//! `BlogStore` owns the storage backend, the ID sequences and the single
//! active-session slot. Authorized operations take the caller's session
//! explicitly; a session that is not the active one is treated as absent.

use tracing::instrument;

use crate::config::{BlogConfig, ConfigError};
use crate::credentials::CredentialHasher;
use crate::error::{Error, Result};
use crate::invariants;
use crate::models::{Post, PostDisplay, PostId, PostUpdate, Session, User, UserId};
use crate::permissions::{PermissionMatrix, PostAction};
use crate::storage::{IdSequence, MemoryStorage, PostRepository, Storage, UserRepository};

/// Result of a successful login
#[derive(Debug, Clone)]
pub struct Login {
    pub user: User,
    pub session: Session,
}

/// In-process blog store
#[derive(Debug)]
pub struct BlogStore<S: Storage = MemoryStorage> {
    storage: S,
    hasher: CredentialHasher,
    user_ids: IdSequence,
    post_ids: IdSequence,
    active_session: Option<Session>,
}

impl BlogStore<MemoryStorage> {
    /// Build a store from configuration, creating the seed users and posts
    #[instrument(skip(config), fields(seed_users = config.seed.users.len(), seed_posts = config.seed.posts.len()))]
    pub fn from_config(config: &BlogConfig) -> Result<Self> {
        config.validate()?;
        let hasher = CredentialHasher::from_config(&config.security)?;
        let mut store = Self::with_storage(MemoryStorage::new(), hasher)?;

        for seed in &config.seed.users {
            store.sign_up(&seed.username, &seed.password)?;
        }

        for seed in &config.seed.posts {
            let author = store
                .storage
                .find_user_by_username(&seed.author)?
                .ok_or_else(|| ConfigError::UnknownSeedAuthor {
                    title: seed.title.clone(),
                    author: seed.author.clone(),
                })?;
            store.insert_post(seed.title.clone(), seed.body.clone(), author.id)?;
        }

        let posts = store.storage.count_posts()?;
        tracing::info!(posts, "Blog store ready");
        Ok(store)
    }
}

impl<S: Storage> BlogStore<S> {
    /// Wrap an existing backend, continuing its ID sequences
    pub fn with_storage(storage: S, hasher: CredentialHasher) -> Result<Self> {
        let last_user = storage.list_users()?.iter().map(|u| u.id.0).max().unwrap_or(0);
        let last_post = storage.list_posts()?.iter().map(|p| p.id.0).max().unwrap_or(0);

        Ok(Self {
            storage,
            hasher,
            user_ids: IdSequence::starting_after(last_user),
            post_ids: IdSequence::starting_after(last_post),
            active_session: None,
        })
    }

    /// Create an account. Does not log the new user in.
    #[instrument(skip(self, password))]
    pub fn sign_up(&mut self, username: &str, password: &str) -> Result<User> {
        if self.storage.find_user_by_username(username)?.is_some() {
            return Err(Error::UsernameTaken(username.to_string()));
        }

        let password_hash = self.hasher.hash(password)?;
        let user = User::new(UserId(self.user_ids.next_id()), username.to_string(), password_hash);
        self.storage.create_user(user.clone())?;
        self.check_invariants();

        tracing::info!(user_id = %user.id, "User has been created");
        Ok(user)
    }

    /// Authenticate and make the user the active session
    ///
    /// Logging in while another session is active replaces it; the old
    /// token stops authorizing anything.
    #[instrument(skip(self, password))]
    pub fn log_in(&mut self, username: &str, password: &str) -> Result<Login> {
        // Unknown usernames still pay for one verification
        let verified = match self.storage.find_user_by_username(username)? {
            Some(user) => self.hasher.verify(password, &user.password_hash).then_some(user),
            None => {
                self.hasher.verify_missing(password);
                None
            }
        };
        let Some(user) = verified else {
            tracing::debug!("Login rejected");
            return Err(Error::InvalidCredentials);
        };

        self.storage.update_last_login(user.id)?;
        let user = self.storage.find_user_by_id(user.id)?.unwrap_or(user);
        let session = Session::new(user.id);

        if let Some(previous) = self.active_session.replace(session.clone()) {
            tracing::info!(previous_user = %previous.user_id, "Replaced active session");
        }
        self.check_invariants();

        tracing::info!(user_id = %user.id, session_id = %session.id, "User has been logged in");
        Ok(Login { user, session })
    }

    /// Clear the active session, if any
    pub fn log_out(&mut self) {
        match self.active_session.take() {
            Some(session) => tracing::info!(user_id = %session.user_id, "User has logged out"),
            None => tracing::debug!("Log out with no active session"),
        }
    }

    /// The active session, if a user is logged in
    pub fn current_session(&self) -> Option<&Session> {
        self.active_session.as_ref()
    }

    /// The logged-in user, if any
    pub fn current_user(&self) -> Result<Option<User>> {
        match &self.active_session {
            Some(session) => self.storage.find_user_by_id(session.user_id),
            None => Ok(None),
        }
    }

    /// Whether an account already uses this exact username
    pub fn is_username_taken(&self, username: &str) -> Result<bool> {
        Ok(self.storage.find_user_by_username(username)?.is_some())
    }

    /// Look up a user by ID
    pub fn find_user(&self, user_id: UserId) -> Result<Option<User>> {
        self.storage.find_user_by_id(user_id)
    }

    /// Create a post authored by the session's user
    #[instrument(skip(self, session, body), fields(session_id = ?session.map(|s| s.id)))]
    pub fn create_post(&mut self, session: Option<&Session>, title: &str, body: &str) -> Result<Post> {
        let author = self.actor(session).ok_or(Error::NotAuthenticated)?;
        self.insert_post(title.to_string(), body.to_string(), author)
    }

    /// All posts in creation order
    pub fn list_posts(&self) -> Result<Vec<Post>> {
        self.storage.list_posts()
    }

    /// Look up a post by ID
    pub fn get_post(&self, post_id: PostId) -> Result<Post> {
        self.storage
            .find_post_by_id(post_id)?
            .ok_or(Error::NotFound(post_id))
    }

    /// Look up a post from raw caller text
    pub fn get_post_by_str(&self, raw: &str) -> Result<Post> {
        self.get_post(raw.parse()?)
    }

    /// Apply a partial update to a post. Only its author may do this.
    ///
    /// Existence is checked before the session, so a missing post is
    /// `NotFound` even for anonymous callers.
    #[instrument(skip(self, session, update), fields(session_id = ?session.map(|s| s.id)))]
    pub fn update_post(
        &mut self,
        post_id: PostId,
        session: Option<&Session>,
        update: PostUpdate,
    ) -> Result<Post> {
        let mut post = self.get_post(post_id)?;
        PermissionMatrix::authorize(self.actor(session), post.id, post.author, PostAction::Edit)?;

        post.apply(update);
        self.storage.update_post(&post)?;
        self.check_invariants();

        tracing::info!("Post has been updated");
        Ok(post)
    }

    /// Delete a post. Same precedence and rules as `update_post`.
    #[instrument(skip(self, session), fields(session_id = ?session.map(|s| s.id)))]
    pub fn delete_post(&mut self, post_id: PostId, session: Option<&Session>) -> Result<()> {
        let post = self.get_post(post_id)?;
        PermissionMatrix::authorize(self.actor(session), post.id, post.author, PostAction::Delete)?;

        self.storage.delete_post(post_id)?;
        self.check_invariants();

        tracing::info!("Post has been deleted");
        Ok(())
    }

    /// Join a post with its author's name
    pub fn post_display(&self, post: &Post) -> Result<PostDisplay> {
        let author = match self.storage.find_user_by_id(post.author)? {
            Some(user) => user.username,
            None => {
                tracing::warn!(post_id = %post.id, author = %post.author, "Post author missing");
                "unknown".to_string()
            }
        };

        Ok(PostDisplay {
            id: post.id,
            title: post.title.clone(),
            author,
            body: post.body.clone(),
            created_at: post.created_at,
            is_edited: post.edited_at.is_some(),
        })
    }

    /// All posts ready for display, in creation order
    pub fn list_post_displays(&self) -> Result<Vec<PostDisplay>> {
        self.list_posts()?
            .iter()
            .map(|p| self.post_display(p))
            .collect()
    }

    /// Resolve a caller's session to a user; stale sessions resolve to none
    fn actor(&self, session: Option<&Session>) -> Option<UserId> {
        match (session, &self.active_session) {
            (Some(given), Some(active)) if given.id == active.id => Some(active.user_id),
            (Some(given), _) => {
                tracing::debug!(session_id = %given.id, "Ignoring stale session");
                None
            }
            (None, _) => None,
        }
    }

    fn insert_post(&mut self, title: String, body: String, author: UserId) -> Result<Post> {
        let post = Post::new(PostId(self.post_ids.next_id()), title, body, author);
        self.storage.create_post(post.clone())?;
        self.check_invariants();

        tracing::info!(post_id = %post.id, author = %author, "Post has been created");
        Ok(post)
    }

    fn check_invariants(&self) {
        if !cfg!(debug_assertions) {
            return;
        }
        if let (Ok(users), Ok(posts)) = (self.storage.list_users(), self.storage.list_posts()) {
            invariants::assert_store_invariants(&users, &posts);
            if let Some(session) = &self.active_session {
                invariants::assert_session_invariants(session, &users);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SecurityConfig, SeedConfig};

    fn seeded_store() -> BlogStore {
        let config = BlogConfig {
            security: SecurityConfig::minimal(),
            seed: SeedConfig::default(),
        };
        BlogStore::from_config(&config).unwrap()
    }

    fn empty_store() -> BlogStore {
        let config = BlogConfig {
            security: SecurityConfig::minimal(),
            seed: SeedConfig::empty(),
        };
        BlogStore::from_config(&config).unwrap()
    }

    #[test]
    fn test_sign_up_assigns_increasing_ids() {
        let mut store = empty_store();
        let a = store.sign_up("alice", "pw1").unwrap();
        let b = store.sign_up("bob", "pw2").unwrap();
        assert!(b.id > a.id);
        assert_eq!(a.to_string(), "alice");
        assert_ne!(a.password_hash, "pw1");
    }

    #[test]
    fn test_sign_up_duplicate_username() {
        let mut store = seeded_store();
        assert!(matches!(
            store.sign_up("eitanr", "other"),
            Err(Error::UsernameTaken(name)) if name == "eitanr"
        ));
        // Case-sensitive match only
        assert!(store.sign_up("Eitanr", "other").is_ok());
    }

    #[test]
    fn test_failed_sign_up_does_not_consume_id() {
        let mut store = empty_store();
        let a = store.sign_up("alice", "pw").unwrap();
        store.sign_up("alice", "pw").unwrap_err();
        let b = store.sign_up("bob", "pw").unwrap();
        assert_eq!(b.id.0, a.id.0 + 1);
    }

    #[test]
    fn test_sign_up_does_not_log_in() {
        let mut store = empty_store();
        store.sign_up("alice", "pw").unwrap();
        assert!(store.current_session().is_none());
    }

    #[test]
    fn test_log_in_sets_session() {
        let mut store = seeded_store();
        let login = store.log_in("eitanr", "abc123").unwrap();
        assert_eq!(login.user.username, "eitanr");
        assert!(login.user.last_login.is_some());
        assert_eq!(store.current_session(), Some(&login.session));
        assert_eq!(store.current_user().unwrap().unwrap().id, login.user.id);
    }

    #[test]
    fn test_log_in_errors_are_indistinguishable() {
        let mut store = seeded_store();
        let wrong_password = store.log_in("eitanr", "wrong").unwrap_err();
        let unknown_user = store.log_in("nobody", "x").unwrap_err();
        assert!(matches!(wrong_password, Error::InvalidCredentials));
        assert!(matches!(unknown_user, Error::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
        assert!(store.current_session().is_none());
    }

    #[test]
    fn test_log_out_is_idempotent() {
        let mut store = seeded_store();
        store.log_out();
        store.log_in("eitanr", "abc123").unwrap();
        store.log_out();
        assert!(store.current_session().is_none());
        store.log_out();
        assert!(store.current_user().unwrap().is_none());
    }

    #[test]
    fn test_unknown_user_login_runs_verifier() {
        let mut store = seeded_store();

        let before = store.hasher.verifications();
        store.log_in("nobody", "x").unwrap_err();
        let unknown_cost = store.hasher.verifications() - before;

        let before = store.hasher.verifications();
        store.log_in("eitanr", "wrong").unwrap_err();
        let wrong_password_cost = store.hasher.verifications() - before;

        assert_eq!(unknown_cost, 1);
        assert_eq!(unknown_cost, wrong_password_cost);
    }

    #[test]
    fn test_failed_relogin_keeps_session() {
        let mut store = seeded_store();
        let session = store.log_in("eitanr", "abc123").unwrap().session;
        store.log_in("eitanr", "wrong").unwrap_err();
        assert_eq!(store.current_session(), Some(&session));
    }

    #[test]
    fn test_is_username_taken() {
        let store = seeded_store();
        assert!(store.is_username_taken("eitanr").unwrap());
        assert!(!store.is_username_taken("EITANR").unwrap());
        assert!(!store.is_username_taken("nobody").unwrap());
    }

    #[test]
    fn test_stale_session_cannot_update_or_delete() {
        let mut store = seeded_store();
        let stale = store.log_in("eitanr", "abc123").unwrap().session;
        let current = store.log_in("eitanr", "abc123").unwrap().session;
        assert_ne!(stale.id, current.id);

        assert!(matches!(
            store.update_post(PostId(1), Some(&stale), PostUpdate::title("X")),
            Err(Error::NotAuthenticated)
        ));
        assert!(matches!(
            store.delete_post(PostId(1), Some(&stale)),
            Err(Error::NotAuthenticated)
        ));

        store.log_out();
        assert!(matches!(
            store.update_post(PostId(1), Some(&current), PostUpdate::body("Y")),
            Err(Error::NotAuthenticated)
        ));
        assert!(matches!(
            store.delete_post(PostId(1), Some(&current)),
            Err(Error::NotAuthenticated)
        ));

        let post = store.get_post(PostId(1)).unwrap();
        assert_eq!(post.title, "Pre-Loaded");
        assert_eq!(post.body, "This post was preloaded");
    }

    #[test]
    fn test_relogin_replaces_session() {
        let mut store = seeded_store();
        store.sign_up("bob", "pw").unwrap();
        let first = store.log_in("eitanr", "abc123").unwrap().session;
        let second = store.log_in("bob", "pw").unwrap().session;

        assert_eq!(store.current_session(), Some(&second));
        assert!(matches!(
            store.create_post(Some(&first), "t", "b"),
            Err(Error::NotAuthenticated)
        ));
        let post = store.create_post(Some(&second), "t", "b").unwrap();
        assert_eq!(store.find_user(post.author).unwrap().unwrap().username, "bob");
    }

    #[test]
    fn test_create_post_requires_session() {
        let mut store = seeded_store();
        assert!(matches!(
            store.create_post(None, "Hello", "World"),
            Err(Error::NotAuthenticated)
        ));

        let session = store.log_in("eitanr", "abc123").unwrap().session;
        store.log_out();
        assert!(matches!(
            store.create_post(Some(&session), "Hello", "World"),
            Err(Error::NotAuthenticated)
        ));
    }

    #[test]
    fn test_list_posts_empty() {
        let store = empty_store();
        assert!(store.list_posts().unwrap().is_empty());
        assert!(store.list_post_displays().unwrap().is_empty());
    }

    #[test]
    fn test_get_post() {
        let store = seeded_store();
        let post = store.get_post(PostId(1)).unwrap();
        assert_eq!(post.title, "Pre-Loaded");
        assert!(matches!(store.get_post(PostId(2)), Err(Error::NotFound(PostId(2)))));
    }

    #[test]
    fn test_get_post_by_str() {
        let store = seeded_store();
        assert_eq!(store.get_post_by_str(" 1 ").unwrap().id, PostId(1));
        assert!(matches!(store.get_post_by_str("one"), Err(Error::InvalidInput(_))));
        assert!(matches!(store.get_post_by_str("999"), Err(Error::NotFound(PostId(999)))));
    }

    #[test]
    fn test_update_by_author_is_partial() {
        let mut store = seeded_store();
        let session = store.log_in("eitanr", "abc123").unwrap().session;

        let post = store
            .update_post(PostId(1), Some(&session), PostUpdate::title("X"))
            .unwrap();
        assert_eq!(post.title, "X");
        assert_eq!(post.body, "This post was preloaded");
        assert_eq!(post.id, PostId(1));
        assert!(post.edited_at.is_some());

        let stored = store.get_post(PostId(1)).unwrap();
        assert_eq!(stored.title, "X");
        assert_eq!(stored.body, "This post was preloaded");

        let post = store
            .update_post(PostId(1), Some(&session), PostUpdate::body("new body"))
            .unwrap();
        assert_eq!(post.title, "X");
        assert_eq!(post.body, "new body");
    }

    #[test]
    fn test_update_by_non_author_is_forbidden() {
        let mut store = seeded_store();
        store.sign_up("bob", "pw").unwrap();
        let session = store.log_in("bob", "pw").unwrap().session;

        assert!(matches!(
            store.update_post(PostId(1), Some(&session), PostUpdate::title("hijack")),
            Err(Error::Forbidden(PostId(1)))
        ));
        assert_eq!(store.get_post(PostId(1)).unwrap().title, "Pre-Loaded");
    }

    #[test]
    fn test_update_without_session() {
        let mut store = seeded_store();
        assert!(matches!(
            store.update_post(PostId(1), None, PostUpdate::title("X")),
            Err(Error::NotAuthenticated)
        ));
    }

    #[test]
    fn test_missing_post_reported_before_auth() {
        let mut store = seeded_store();
        assert!(matches!(
            store.update_post(PostId(999), None, PostUpdate::title("X")),
            Err(Error::NotFound(PostId(999)))
        ));
        assert!(matches!(
            store.delete_post(PostId(999), None),
            Err(Error::NotFound(PostId(999)))
        ));

        store.sign_up("bob", "pw").unwrap();
        let session = store.log_in("bob", "pw").unwrap().session;
        assert!(matches!(
            store.delete_post(PostId(999), Some(&session)),
            Err(Error::NotFound(PostId(999)))
        ));
    }

    #[test]
    fn test_delete_post() {
        let mut store = seeded_store();
        let session = store.log_in("eitanr", "abc123").unwrap().session;
        let created = store.create_post(Some(&session), "Hello", "World").unwrap();

        store.delete_post(PostId(1), Some(&session)).unwrap();
        let ids: Vec<PostId> = store.list_posts().unwrap().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![created.id]);
        assert!(matches!(store.get_post(PostId(1)), Err(Error::NotFound(PostId(1)))));
        assert!(matches!(
            store.delete_post(PostId(1), Some(&session)),
            Err(Error::NotFound(PostId(1)))
        ));
    }

    #[test]
    fn test_delete_authorization() {
        let mut store = seeded_store();
        assert!(matches!(store.delete_post(PostId(1), None), Err(Error::NotAuthenticated)));

        store.sign_up("bob", "pw").unwrap();
        let session = store.log_in("bob", "pw").unwrap().session;
        assert!(matches!(
            store.delete_post(PostId(1), Some(&session)),
            Err(Error::Forbidden(PostId(1)))
        ));
        assert_eq!(store.list_posts().unwrap().len(), 1);
    }

    #[test]
    fn test_deleted_ids_are_not_reused() {
        let mut store = seeded_store();
        let session = store.log_in("eitanr", "abc123").unwrap().session;
        let a = store.create_post(Some(&session), "a", "a").unwrap();
        store.delete_post(a.id, Some(&session)).unwrap();
        let b = store.create_post(Some(&session), "b", "b").unwrap();
        assert!(b.id > a.id);
    }

    #[test]
    fn test_end_to_end_seeded_flow() {
        let mut store = seeded_store();

        let posts = store.list_posts().unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].title, "Pre-Loaded");
        assert_eq!(posts[0].body, "This post was preloaded");
        let preloaded_id = posts[0].id;

        let session = store.log_in("eitanr", "abc123").unwrap().session;
        let created = store.create_post(Some(&session), "Hello", "World").unwrap();

        let posts = store.list_posts().unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].id, preloaded_id);
        assert_eq!(posts[1].id, created.id);
        assert_eq!(created.id.0, preloaded_id.0 + 1);
        assert_eq!(posts[1].author, session.user_id);
    }

    #[test]
    fn test_post_display_joins_author() {
        let store = seeded_store();
        let displays = store.list_post_displays().unwrap();
        assert_eq!(displays.len(), 1);
        assert_eq!(displays[0].author, "eitanr");
        assert!(!displays[0].is_edited);
        assert_eq!(
            displays[0].to_string(),
            "1 - Pre-Loaded\nBy: eitanr\nThis post was preloaded"
        );
    }

    #[test]
    fn test_independent_stores_do_not_share_ids() {
        let mut a = empty_store();
        let mut b = empty_store();
        assert_eq!(a.sign_up("x", "pw").unwrap().id, UserId(1));
        assert_eq!(b.sign_up("y", "pw").unwrap().id, UserId(1));
    }

    #[test]
    fn test_with_storage_continues_sequences() {
        let mut storage = MemoryStorage::new();
        crate::storage::UserRepository::create_user(
            &mut storage,
            User::new(UserId(5), "existing".into(), String::new()),
        )
        .unwrap();

        let hasher = CredentialHasher::from_config(&SecurityConfig::minimal()).unwrap();
        let mut store = BlogStore::with_storage(storage, hasher).unwrap();
        assert_eq!(store.sign_up("fresh", "pw").unwrap().id, UserId(6));
    }

    #[test]
    fn test_from_config_rejects_invalid_seed() {
        let mut config = BlogConfig {
            security: SecurityConfig::minimal(),
            seed: SeedConfig::default(),
        };
        config.seed.posts[0].author = "ghost".into();
        assert!(matches!(
            BlogStore::from_config(&config),
            Err(Error::Config(ConfigError::UnknownSeedAuthor { .. }))
        ));
    }
}
