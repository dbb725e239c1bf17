//! Commands issued by a front-end to a running session.

use crate::domain::{Confirmation, FileKind};

/// Read-only views a front-end may ask to have rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Tree,
    OpenFile,
    Participants,
    Chat,
    Activity,
    Console,
    Preview,
}

/// A user action, applied by the session loop in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Open(String),
    /// Replace one line (1-based) of the open file
    EditLine { line: u32, text: String },
    MoveCursor(u32),
    CreateFile { path: String, kind: FileKind },
    DeleteFile(String),
    SetSharing(bool),
    SendChat(String),
    /// Open the chat view and put the cursor in it
    FocusChat,
    /// Close the chat view
    HideChat,
    /// Target is a socket id or a username
    Kick {
        target: String,
        confirmation: Confirmation,
    },
    Run,
    ToggleMic,
    Show(View),
    Leave,
}

impl Command {
    /// Whether the command puts the user back in the editor, taking focus away from chat.
    pub fn targets_editor(&self) -> bool {
        matches!(
            self,
            Command::Open(_) | Command::EditLine { .. } | Command::MoveCursor(_)
        )
    }
}
