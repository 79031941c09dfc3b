//! Interactive console front end
//!
//! Reads menu choices and field values line by line, calls one store
//! operation per choice and prints the outcome. Store errors are shown
//! to the user and the loop carries on; only I/O failures end it early.

use std::io::{self, BufRead, Write};

use quill_core::{BlogStore, Error, PermissionMatrix, PostAction, PostId, PostUpdate, Session};

use crate::menu::{Action, Menu};
use crate::render::{render_post, render_post_list, render_user};

pub struct Console<R, W> {
    input: R,
    output: W,
    session: Option<Session>,
}

/// Whether the loop should keep going after an action
enum Flow {
    Continue,
    Quit,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            session: None,
        }
    }

    /// Run until the user quits or input ends
    pub fn run(&mut self, store: &mut BlogStore) -> io::Result<()> {
        loop {
            let menu = Menu::for_state(self.session.is_some());
            writeln!(self.output, "{}", menu.render())?;

            let Some(mut raw) = self.prompt("Which option would you like to do? ")? else {
                return Ok(());
            };
            let action = loop {
                if let Some(action) = menu.choose(&raw) {
                    break action;
                }
                let retry = format!("Invalid option. Please choose {}: ", menu.valid_choices());
                match self.prompt(&retry)? {
                    Some(next) => raw = next,
                    None => return Ok(()),
                }
            };

            tracing::debug!(?action, "Menu action chosen");
            match self.dispatch(store, action)? {
                Flow::Continue => writeln!(self.output)?,
                Flow::Quit => {
                    writeln!(self.output, "Thanks for checking out the blog.")?;
                    return Ok(());
                }
            }
        }
    }

    fn dispatch(&mut self, store: &mut BlogStore, action: Action) -> io::Result<Flow> {
        match action {
            Action::SignUp => self.sign_up(store)?,
            Action::LogIn => self.log_in(store)?,
            Action::LogOut => {
                store.log_out();
                self.session = None;
                writeln!(self.output, "You have successfully logged out.")?;
            }
            Action::CreatePost => self.create_post(store)?,
            Action::ListPosts => match store.list_post_displays() {
                Ok(posts) => writeln!(self.output, "{}", render_post_list(&posts))?,
                Err(e) => self.report(&e)?,
            },
            Action::ViewPost => self.view_post(store)?,
            Action::EditPost => self.edit_post(store)?,
            Action::DeletePost => self.delete_post(store)?,
            Action::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    fn sign_up(&mut self, store: &mut BlogStore) -> io::Result<()> {
        let Some(username) = self.prompt_required("Please enter a username: ", "Username")? else {
            return Ok(());
        };
        match store.is_username_taken(&username) {
            Ok(false) => {}
            Ok(true) => return self.report(&Error::UsernameTaken(username)),
            Err(e) => return self.report(&e),
        }
        let Some(password) = self.prompt_required("Please enter a password: ", "Password")? else {
            return Ok(());
        };

        match store.sign_up(&username, &password) {
            Ok(user) => writeln!(self.output, "{} has been created!", render_user(&user)),
            Err(e) => self.report(&e),
        }
    }

    fn log_in(&mut self, store: &mut BlogStore) -> io::Result<()> {
        let Some(username) = self.prompt("What is your username? ")? else {
            return Ok(());
        };
        let Some(password) = self.prompt("What is your password? ")? else {
            return Ok(());
        };

        match store.log_in(&username, &password) {
            Ok(login) => {
                self.session = Some(login.session);
                writeln!(self.output, "{} has been logged in.", render_user(&login.user))
            }
            Err(e) => self.report(&e),
        }
    }

    fn create_post(&mut self, store: &mut BlogStore) -> io::Result<()> {
        let Some(title) = self.prompt_required("Enter the title of your post: ", "Title")? else {
            return Ok(());
        };
        let Some(body) = self.prompt("Enter the body of your post: ")? else {
            return Ok(());
        };

        match store
            .create_post(self.session.as_ref(), &title, &body)
            .and_then(|post| store.post_display(&post))
        {
            Ok(display) => {
                writeln!(self.output, "{} has been created.", display.title)?;
                writeln!(self.output, "{}", render_post(&display))
            }
            Err(e) => self.report(&e),
        }
    }

    fn view_post(&mut self, store: &mut BlogStore) -> io::Result<()> {
        let Some(raw) = self.prompt("What is the ID of the post you would like to view? ")? else {
            return Ok(());
        };

        match store
            .get_post_by_str(&raw)
            .and_then(|post| store.post_display(&post))
        {
            Ok(display) => writeln!(self.output, "{}", render_post(&display)),
            Err(e) => self.report(&e),
        }
    }

    fn edit_post(&mut self, store: &mut BlogStore) -> io::Result<()> {
        let Some(raw) = self.prompt("What is the ID of the post you would like to edit? ")? else {
            return Ok(());
        };

        // Check ownership before asking for new content
        let post = match store.get_post_by_str(&raw).and_then(|post| {
            PermissionMatrix::authorize(
                self.session.as_ref().map(|s| s.user_id),
                post.id,
                post.author,
                PostAction::Edit,
            )
            .map(|()| post)
        }) {
            Ok(post) => post,
            Err(e) => return self.report(&e),
        };

        let Some(title) = self.prompt("Enter a new title (leave blank to keep current): ")? else {
            return Ok(());
        };
        let Some(body) = self.prompt("Enter a new body (leave blank to keep current): ")? else {
            return Ok(());
        };

        let mut update = PostUpdate::default();
        if !title.trim().is_empty() {
            update = update.with_title(title);
        }
        if !body.trim().is_empty() {
            update = update.with_body(body);
        }
        if update.is_empty() {
            return writeln!(self.output, "Nothing to change.");
        }

        match store
            .update_post(post.id, self.session.as_ref(), update)
            .and_then(|post| store.post_display(&post))
        {
            Ok(display) => {
                writeln!(self.output, "Post {} has been updated.", display.id)?;
                writeln!(self.output, "{}", render_post(&display))
            }
            Err(e) => self.report(&e),
        }
    }

    fn delete_post(&mut self, store: &mut BlogStore) -> io::Result<()> {
        let Some(raw) = self.prompt("What is the ID of the post you would like to delete? ")? else {
            return Ok(());
        };

        let result = raw
            .parse::<PostId>()
            .and_then(|post_id| store.delete_post(post_id, self.session.as_ref()).map(|()| post_id));
        match result {
            Ok(post_id) => writeln!(self.output, "Post {} has been deleted.", post_id),
            Err(e) => self.report(&e),
        }
    }

    fn report(&mut self, error: &Error) -> io::Result<()> {
        tracing::debug!(error = %error, "Operation failed");
        writeln!(self.output, "{}", error)
    }

    /// Print a prompt and read one line; `None` once input is exhausted
    fn prompt(&mut self, text: &str) -> io::Result<Option<String>> {
        write!(self.output, "{}", text)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.output)?;
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    /// Like `prompt`, but re-asks until the answer is not blank
    fn prompt_required(&mut self, text: &str, field: &str) -> io::Result<Option<String>> {
        loop {
            match self.prompt(text)? {
                Some(value) if value.trim().is_empty() => {
                    writeln!(self.output, "{} cannot be blank.", field)?;
                }
                other => return Ok(other),
            }
        }
    }
}
