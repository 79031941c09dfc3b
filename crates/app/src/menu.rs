//! Menu definitions for the console loop

/// Something the user can ask the blog to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    SignUp,
    LogIn,
    LogOut,
    CreatePost,
    ListPosts,
    ViewPost,
    EditPost,
    DeletePost,
    Quit,
}

impl Action {
    pub fn label(&self) -> &'static str {
        match self {
            Action::SignUp => "Sign Up",
            Action::LogIn => "Log In",
            Action::LogOut => "Log Out",
            Action::CreatePost => "Create New Post",
            Action::ListPosts => "View All Posts",
            Action::ViewPost => "View Single Post",
            Action::EditPost => "Edit A Post",
            Action::DeletePost => "Delete A Post",
            Action::Quit => "Quit",
        }
    }
}

/// Numbered list of actions offered in one session state
#[derive(Debug, Clone, Copy)]
pub struct Menu {
    actions: &'static [Action],
}

impl Menu {
    /// Menu shown while logged out
    pub fn guest() -> Self {
        Self {
            actions: &[
                Action::SignUp,
                Action::LogIn,
                Action::ListPosts,
                Action::ViewPost,
                Action::Quit,
            ],
        }
    }

    /// Menu shown while logged in
    pub fn member() -> Self {
        Self {
            actions: &[
                Action::LogOut,
                Action::CreatePost,
                Action::ListPosts,
                Action::ViewPost,
                Action::EditPost,
                Action::DeletePost,
                Action::Quit,
            ],
        }
    }

    pub fn for_state(logged_in: bool) -> Self {
        if logged_in {
            Self::member()
        } else {
            Self::guest()
        }
    }

    /// One line per action, numbered from 1
    pub fn render(&self) -> String {
        self.actions
            .iter()
            .enumerate()
            .map(|(i, a)| format!("{}. {}", i + 1, a.label()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Map raw input to an action; `None` for anything off the menu
    pub fn choose(&self, raw: &str) -> Option<Action> {
        let index: usize = raw.trim().parse().ok()?;
        index.checked_sub(1).and_then(|i| self.actions.get(i)).copied()
    }

    /// Prompt used after an invalid choice, e.g. "Please choose 1, 2, or 3"
    pub fn valid_choices(&self) -> String {
        let numbers: Vec<String> = (1..=self.actions.len()).map(|n| n.to_string()).collect();
        match numbers.split_last() {
            Some((last, rest)) if !rest.is_empty() => format!("{}, or {}", rest.join(", "), last),
            Some((last, _)) => last.clone(),
            None => String::new(),
        }
    }
}
