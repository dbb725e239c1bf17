//! Client execution logic: account commands and the interactive room loop.
//!
//! There is no reconnection: when the relay goes away the session ends and the
//! error is returned to the caller.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use collabix_shared::time::SystemClock;
use tokio::sync::mpsc;

use super::{
    domain::require_user,
    formatter::MessageFormatter,
    prompt::{redisplay_prompt, spawn_prompt},
    terminal_editor::TerminalEditor,
};
use crate::{
    domain::{NoMediaDevices, NullPeerConnector, RoomId},
    error::ClientError,
    infrastructure::{dto::http::User, http::ApiClient, user_store::UserStore},
    session::{self, RoomSession, SessionConfig, SessionDeps, SessionObserver, View},
};

/// Endpoints and local paths used by every subcommand
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub relay_url: String,
    pub api_url: String,
    pub user_file: PathBuf,
}

impl ClientConfig {
    fn user_store(&self) -> UserStore {
        UserStore::new(&self.user_file)
    }
}

pub async fn login(
    config: &ClientConfig,
    username: &str,
    password: &str,
) -> Result<User, ClientError> {
    let user = ApiClient::new(&config.api_url)?
        .login(username, password)
        .await?;
    config.user_store().save(&user)?;
    Ok(user)
}

pub async fn register(
    config: &ClientConfig,
    username: &str,
    email: &str,
    password: &str,
) -> Result<User, ClientError> {
    let user = ApiClient::new(&config.api_url)?
        .register(username, email, password)
        .await?;
    config.user_store().save(&user)?;
    Ok(user)
}

/// Forget the stored user. Returns `false` when nobody was signed in.
pub fn logout(config: &ClientConfig) -> Result<bool, ClientError> {
    config.user_store().clear()
}

pub async fn download(
    config: &ClientConfig,
    room_id: &RoomId,
    dest_dir: &Path,
) -> Result<PathBuf, ClientError> {
    ApiClient::new(&config.api_url)?
        .download_project(room_id, dest_dir)
        .await
}

/// Join `room_id` as the stored user and run the prompt until the session ends.
pub async fn join_room(config: &ClientConfig, room_id: RoomId) -> Result<(), ClientError> {
    let user = require_user(config.user_store().load()?)?;

    let deps = SessionDeps {
        editor: Box::new(TerminalEditor::new()),
        media: Arc::new(NoMediaDevices),
        connector: Box::new(NullPeerConnector),
        clock: Arc::new(SystemClock),
    };
    let session_config = SessionConfig::new(&config.relay_url, room_id, &user.username);
    let connected = session::connect(session_config, deps).await?;

    print!(
        "{}",
        MessageFormatter::format_banner(connected.session().room_id().as_str(), &user.username)
    );

    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let _prompt = spawn_prompt(user.username.clone(), command_tx);

    let mut observer = TerminalObserver::new(user.username);
    connected.run(command_rx, &mut observer).await
}

/// Prints whatever changed since the last update.
#[derive(Debug, Default)]
pub struct TerminalObserver {
    username: String,
    seen_messages: usize,
    printed_messages: usize,
    printed_console: usize,
    open_file: Option<String>,
}

impl TerminalObserver {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            ..Default::default()
        }
    }

    /// Everything to print for this update; empty when nothing changed.
    fn render_update(&mut self, session: &mut RoomSession) -> String {
        let mut output = String::new();

        for notice in session.drain_notices() {
            output.push_str(&MessageFormatter::format_notice(&notice));
        }

        let open_file = session.open_file().map(str::to_string);
        if open_file != self.open_file {
            if let Some(name) = &open_file {
                output.push_str(&format!("\nOpened {} (/cat to show)\n", name));
            }
            self.open_file = open_file;
        }

        let messages = session.chat().messages();
        if session.chat().is_visible() {
            for message in &messages[self.printed_messages..] {
                output.push_str(&MessageFormatter::format_chat_message(message));
            }
            self.printed_messages = messages.len();
        } else {
            for message in &messages[self.seen_messages..] {
                output.push_str(&MessageFormatter::format_unread_hint(message));
            }
        }
        self.seen_messages = messages.len();

        let console = session.console().lines();
        if console.len() < self.printed_console {
            self.printed_console = 0;
        }
        for line in &console[self.printed_console..] {
            output.push_str(&MessageFormatter::format_console_line(line));
        }
        self.printed_console = console.len();

        output
    }

    fn render_view(&self, view: View, session: &RoomSession) -> String {
        match view {
            View::Tree => MessageFormatter::format_tree(&session.file_tree(), session.open_file()),
            View::OpenFile => match session.open_file() {
                Some(name) => MessageFormatter::format_file(
                    name,
                    &session.editor().content(),
                    session.editor().cursor().map(|position| position.line),
                    &session.presence().remote_cursors(),
                ),
                None => "\n(no file open)\n".to_string(),
            },
            View::Participants => MessageFormatter::format_participants(
                session.clients(),
                session.username(),
                session.local_id(),
                session.host_id(),
            ),
            View::Chat => MessageFormatter::format_chat(session.chat().messages()),
            View::Activity => MessageFormatter::format_activity(session.activity().entries()),
            View::Console => MessageFormatter::format_console(
                session.console().lines(),
                session.console().is_running(),
            ),
            View::Preview => format!("\n{}\n", session.preview()),
        }
    }
}

impl SessionObserver for TerminalObserver {
    fn on_update(&mut self, session: &mut RoomSession) {
        let output = self.render_update(session);
        if !output.is_empty() {
            print!("{}", output);
            redisplay_prompt(&self.username);
        }
    }

    fn show(&mut self, view: View, session: &RoomSession) {
        print!("{}", self.render_view(view, session));
        redisplay_prompt(&self.username);
    }

    fn show_preview(&mut self, document: &str) {
        print!("\n{}\n", document);
        redisplay_prompt(&self.username);
    }
}
