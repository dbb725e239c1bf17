//! Text rendering for the terminal front-end.

use crate::domain::{
    ActivityEntry, ChatMessage, ClientInfo, ConsoleLine, FileKind, FileTree, RemoteCursor,
    SocketId,
};
use crate::session::{Notice, NoticeLevel};

const RULE: &str = "============================================================";

/// Message formatter for client display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Header printed once the relay accepted the connection
    pub fn format_banner(room_id: &str, username: &str) -> String {
        format!(
            "\n{}\nRoom {}\nYou are '{}'. Type /help for commands, plain text to chat.\n{}\n",
            RULE, room_id, username, RULE
        )
    }

    /// Format the participant list
    ///
    /// # Arguments
    ///
    /// * `clients` - Remote participants in join order
    /// * `username` - The local user's name (always listed first, marked "me")
    /// * `local_id` - The local socket id
    /// * `host_id` - Current host, if known
    pub fn format_participants(
        clients: &[ClientInfo],
        username: &str,
        local_id: &SocketId,
        host_id: Option<&SocketId>,
    ) -> String {
        let host_suffix = |id: &SocketId| if host_id == Some(id) { " [host]" } else { "" };

        let mut output = String::new();
        output.push_str(&format!("\n{}\nParticipants:\n", RULE));
        output.push_str(&format!("{} (me){}\n", username, host_suffix(local_id)));
        for client in clients {
            output.push_str(&format!(
                "{} ({}){}\n",
                client.username,
                client.socket_id,
                host_suffix(&client.socket_id)
            ));
        }
        output.push_str(RULE);
        output.push('\n');
        output
    }

    /// Indented tree, folders marked with a trailing `/`, the open file with `*`.
    pub fn format_tree(tree: &FileTree, open_file: Option<&str>) -> String {
        if tree.is_empty() {
            return "\n(no files)\n".to_string();
        }

        let mut output = String::from("\n");
        for (depth, node) in tree.walk() {
            let indent = "  ".repeat(depth);
            let marker = if open_file == Some(node.id.as_str()) { "* " } else { "  " };
            let suffix = match node.kind {
                FileKind::Folder => "/",
                FileKind::File => "",
            };
            output.push_str(&format!("{}{}{}{}\n", marker, indent, node.name, suffix));
        }
        output
    }

    /// Numbered listing of the open file with the local cursor (`>`) and remote markers.
    pub fn format_file(
        file_name: &str,
        content: &str,
        cursor_line: Option<u32>,
        remote: &[(&SocketId, &RemoteCursor)],
    ) -> String {
        let mut output = format!("\n--- {} ---\n", file_name);
        for (index, line) in content.split('\n').enumerate() {
            let number = u32::try_from(index + 1).unwrap_or(u32::MAX);
            let cursor = if cursor_line == Some(number) { '>' } else { ' ' };
            let markers: Vec<&str> = remote
                .iter()
                .filter(|(_, marker)| marker.line == number)
                .map(|(_, marker)| marker.username.as_str())
                .collect();
            output.push_str(&format!("{}{:>4} | {}", cursor, number, line));
            if !markers.is_empty() {
                output.push_str(&format!("    <- {}", markers.join(", ")));
            }
            output.push('\n');
        }
        output
    }

    pub fn format_chat_message(message: &ChatMessage) -> String {
        format!("@{}: {}\n", message.username, message.message)
    }

    pub fn format_chat(messages: &[ChatMessage]) -> String {
        if messages.is_empty() {
            return "\n(no messages)\n".to_string();
        }
        let mut output = String::from("\n");
        for message in messages {
            output.push_str(&Self::format_chat_message(message));
        }
        output
    }

    /// One-line hint that a message arrived while the chat was not focused
    pub fn format_unread_hint(message: &ChatMessage) -> String {
        format!("\n(new message from {}, /chat to read)\n", message.username)
    }

    pub fn format_notice(notice: &Notice) -> String {
        let prefix = match notice.level {
            NoticeLevel::Info => "*",
            NoticeLevel::Warning => "!",
            NoticeLevel::Error => "x",
        };
        format!("\n{} {}\n", prefix, notice.message)
    }

    /// Activity feed, newest first
    pub fn format_activity<'a>(entries: impl Iterator<Item = &'a ActivityEntry>) -> String {
        let mut output = String::from("\n");
        let mut empty = true;
        for entry in entries {
            empty = false;
            output.push_str(&format!("{}  {}\n", entry.time_of_day(), entry.message));
        }
        if empty {
            output.push_str("(no activity)\n");
        }
        output
    }

    pub fn format_console_line(line: &ConsoleLine) -> String {
        if line.is_error {
            format!("[stderr] {}\n", line.text.trim_end())
        } else {
            format!("{}\n", line.text.trim_end())
        }
    }

    pub fn format_console(lines: &[ConsoleLine], running: bool) -> String {
        let mut output = String::from("\n");
        if running {
            output.push_str("(running...)\n");
        }
        for line in lines {
            output.push_str(&Self::format_console_line(line));
        }
        if lines.is_empty() && !running {
            output.push_str("(no output)\n");
        }
        output
    }

    pub fn format_help() -> String {
        [
            "",
            "/open PATH          open a file",
            "/cat                show the open file",
            "/line N TEXT        replace line N of the open file",
            "/cursor N           move your cursor to line N",
            "/new PATH           create a file",
            "/mkdir PATH         create a folder",
            "/rm PATH            delete a file or folder",
            "/tree               show the file tree",
            "/share on|off       toggle cursor sharing",
            "/chat               read the chat (/close to leave it)",
            "/who                list participants",
            "/kick NAME          remove a participant (host only)",
            "/run                run the open file",
            "/preview            render the HTML preview",
            "/console            show run output",
            "/activity           show the activity log",
            "/mic                mute or unmute your microphone",
            "/quit               leave the room",
            "",
        ]
        .join("\n")
    }
}
