//! Room chat: arrival-ordered log plus an unread flag.
//!
//! Messages are only appended when the relay broadcasts them back, so the local
//! sender never sees its own message twice.

/// A chat message as received from the relay
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub username: String,
    pub message: String,
}

/// Chat log and the focus state of the chat view.
#[derive(Debug, Default)]
pub struct ChatChannel {
    messages: Vec<ChatMessage>,
    unread: bool,
    visible: bool,
    focused: bool,
}

impl ChatChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate an outgoing message. Blank input yields `None` and nothing is sent.
    ///
    /// The message is not appended here; it shows up when the relay echoes it.
    pub fn prepare_send<'a>(&self, text: &'a str) -> Option<&'a str> {
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }

    /// Append a broadcast message and mark it unread unless the chat is in front of the user.
    pub fn on_receive(&mut self, message: ChatMessage) {
        self.messages.push(message);
        if !(self.visible && self.focused) {
            self.unread = true;
        }
    }

    /// The user opened the chat view and focused it.
    pub fn focus(&mut self) {
        self.visible = true;
        self.focused = true;
        self.unread = false;
    }

    /// The chat view lost focus but may still be on screen.
    pub fn blur(&mut self) {
        self.focused = false;
    }

    /// The chat view was closed.
    pub fn hide(&mut self) {
        self.visible = false;
        self.focused = false;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn has_unread(&self) -> bool {
        self.unread
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(username: &str, text: &str) -> ChatMessage {
        ChatMessage {
            username: username.to_string(),
            message: text.to_string(),
        }
    }

    #[test]
    fn test_prepare_send_rejects_blank_input() {
        // テスト項目: 空文字や空白のみのメッセージは送信されない
        // given (前提条件):
        let chat = ChatChannel::new();

        // when (操作) / then (期待する結果):
        assert_eq!(chat.prepare_send(""), None);
        assert_eq!(chat.prepare_send("  \t\n"), None);
        assert_eq!(chat.prepare_send(" hi "), Some(" hi "));
        assert!(chat.messages().is_empty());
    }

    #[test]
    fn test_unread_set_when_chat_not_focused_and_cleared_on_focus() {
        // テスト項目: チャットが表示かつフォーカスされていない間の受信で未読になり、フォーカスで解除される
        // given (前提条件):
        let mut chat = ChatChannel::new();
        chat.focus();
        chat.blur();

        // when (操作):
        chat.on_receive(message("bob", "hello"));

        // then (期待する結果):
        assert!(chat.has_unread());
        chat.focus();
        assert!(!chat.has_unread());
    }

    #[test]
    fn test_no_unread_while_visible_and_focused() {
        // テスト項目: チャットが表示かつフォーカス中なら受信しても未読にならない
        // given (前提条件):
        let mut chat = ChatChannel::new();
        chat.focus();

        // when (操作):
        chat.on_receive(message("bob", "hello"));

        // then (期待する結果):
        assert!(!chat.has_unread());
        assert_eq!(chat.messages().len(), 1);
    }

    #[test]
    fn test_hiding_does_not_clear_unread() {
        // テスト項目: 未読はフォーカス以外の操作では解除されない
        // given (前提条件):
        let mut chat = ChatChannel::new();
        chat.on_receive(message("bob", "one"));

        // when (操作):
        chat.blur();
        chat.hide();

        // then (期待する結果):
        assert!(chat.has_unread());
    }

    #[test]
    fn test_hidden_chat_marks_unread_even_after_focus() {
        // テスト項目: 一度フォーカスしたチャットでも閉じた後の受信は未読になる
        // given (前提条件):
        let mut chat = ChatChannel::new();
        chat.focus();

        // when (操作):
        chat.hide();
        chat.on_receive(message("bob", "hello"));

        // then (期待する結果):
        assert!(!chat.is_visible());
        assert!(!chat.is_focused());
        assert!(chat.has_unread());
    }

    #[test]
    fn test_messages_keep_arrival_order() {
        // テスト項目: メッセージは到着順に保持される
        // given (前提条件):
        let mut chat = ChatChannel::new();

        // when (操作):
        chat.on_receive(message("bob", "first"));
        chat.on_receive(message("alice", "second"));

        // then (期待する結果):
        let texts: Vec<&str> = chat.messages().iter().map(|m| m.message.as_str()).collect();
        assert_eq!(texts, vec!["first", "second"]);
    }
}
