//! Cursor presence: local line broadcasting and remote line markers.
//!
//! Each remote participant owns at most one marker in the local view. A marker is
//! replaced (never stacked) when the participant moves, and removed when they send
//! the clear sentinel or leave the room.

use std::collections::HashMap;

use super::editor::{DecorationId, EditorView, LineDecoration};
use super::value_object::SocketId;

/// Wire value meaning "remove my marker".
pub const CLEAR_LINE: i64 = -1;

/// A presence line as understood by the domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineMark {
    Clear,
    At(u32),
}

impl LineMark {
    /// Decode a wire line number. Values other than the sentinel and positive lines are invalid.
    pub fn from_wire(line_number: i64) -> Option<Self> {
        if line_number == CLEAR_LINE {
            return Some(LineMark::Clear);
        }
        u32::try_from(line_number)
            .ok()
            .filter(|line| *line >= 1)
            .map(LineMark::At)
    }

    pub fn to_wire(self) -> i64 {
        match self {
            LineMark::Clear => CLEAR_LINE,
            LineMark::At(line) => i64::from(line),
        }
    }
}

/// Marker currently shown for one remote participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteCursor {
    pub file_name: String,
    pub line: u32,
    pub username: String,
    handles: Vec<DecorationId>,
}

/// Tracks the local sharing toggle and the markers of remote participants.
#[derive(Debug)]
pub struct PresenceTracker {
    sharing: bool,
    cursors: HashMap<SocketId, RemoteCursor>,
}

impl Default for PresenceTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl PresenceTracker {
    /// Sharing starts enabled.
    pub fn new() -> Self {
        Self {
            sharing: true,
            cursors: HashMap::new(),
        }
    }

    pub fn is_sharing(&self) -> bool {
        self.sharing
    }

    /// The line to broadcast for a local cursor move, if sharing is on.
    pub fn report_local_cursor(&self, line: u32) -> Option<LineMark> {
        self.sharing.then_some(LineMark::At(line))
    }

    /// Flip the sharing toggle.
    ///
    /// Turning sharing off yields the clear sentinel; turning it on yields the current
    /// line when one is known. No change yields nothing.
    pub fn set_sharing(&mut self, enabled: bool, current_line: Option<u32>) -> Option<LineMark> {
        if self.sharing == enabled {
            return None;
        }
        self.sharing = enabled;
        if enabled {
            current_line.map(LineMark::At)
        } else {
            Some(LineMark::Clear)
        }
    }

    /// Apply a remote presence event to the local view.
    ///
    /// Events for a file other than `open_file` are ignored.
    pub fn on_remote_cursor(
        &mut self,
        editor: &mut dyn EditorView,
        open_file: Option<&str>,
        socket_id: &SocketId,
        file_name: &str,
        mark: LineMark,
        username: &str,
    ) {
        if open_file != Some(file_name) {
            return;
        }

        let previous = self
            .cursors
            .remove(socket_id)
            .map(|cursor| cursor.handles)
            .unwrap_or_default();

        match mark {
            LineMark::Clear => {
                if !previous.is_empty() {
                    editor.delta_decorations(&previous, Vec::new());
                }
            }
            LineMark::At(line) => {
                let handles = editor.delta_decorations(
                    &previous,
                    vec![LineDecoration {
                        line,
                        hover_message: format!("{} is typing here", username),
                    }],
                );
                self.cursors.insert(
                    socket_id.clone(),
                    RemoteCursor {
                        file_name: file_name.to_string(),
                        line,
                        username: username.to_string(),
                        handles,
                    },
                );
            }
        }
    }

    /// Forcibly remove the marker owned by `socket_id`.
    pub fn clear_participant(&mut self, editor: &mut dyn EditorView, socket_id: &SocketId) -> bool {
        match self.cursors.remove(socket_id) {
            Some(cursor) => {
                editor.delta_decorations(&cursor.handles, Vec::new());
                true
            }
            None => false,
        }
    }

    /// Remove every remote marker, e.g. when the open file changes.
    pub fn clear_all(&mut self, editor: &mut dyn EditorView) {
        let handles: Vec<DecorationId> = self
            .cursors
            .drain()
            .flat_map(|(_, cursor)| cursor.handles)
            .collect();
        if !handles.is_empty() {
            editor.delta_decorations(&handles, Vec::new());
        }
    }

    pub fn cursor(&self, socket_id: &SocketId) -> Option<&RemoteCursor> {
        self.cursors.get(socket_id)
    }

    /// Remote markers sorted by line.
    pub fn remote_cursors(&self) -> Vec<(&SocketId, &RemoteCursor)> {
        let mut cursors: Vec<_> = self.cursors.iter().collect();
        cursors.sort_by(|a, b| a.1.line.cmp(&b.1.line).then_with(|| a.0.cmp(b.0)));
        cursors
    }

    pub fn len(&self) -> usize {
        self.cursors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cursors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::editor::MockEditorView;

    fn alice() -> SocketId {
        SocketId::new("alice-socket")
    }

    #[test]
    fn test_line_mark_from_wire() {
        // テスト項目: -1 はクリア、正の値は行番号、それ以外は不正として扱われる
        // given (前提条件) / when (操作) / then (期待する結果):
        assert_eq!(LineMark::from_wire(-1), Some(LineMark::Clear));
        assert_eq!(LineMark::from_wire(7), Some(LineMark::At(7)));
        assert_eq!(LineMark::from_wire(0), None);
        assert_eq!(LineMark::from_wire(-5), None);
        assert_eq!(LineMark::Clear.to_wire(), -1);
    }

    #[test]
    fn test_report_local_cursor_respects_toggle() {
        // テスト項目: 共有がオフの間はローカルカーソルを送信しない
        // given (前提条件):
        let mut tracker = PresenceTracker::new();
        assert_eq!(tracker.report_local_cursor(3), Some(LineMark::At(3)));

        // when (操作):
        let emitted = tracker.set_sharing(false, Some(3));

        // then (期待する結果):
        assert_eq!(emitted, Some(LineMark::Clear));
        assert_eq!(tracker.report_local_cursor(4), None);
        assert_eq!(tracker.set_sharing(true, Some(4)), Some(LineMark::At(4)));
        assert_eq!(tracker.set_sharing(true, Some(4)), None);
    }

    #[test]
    fn test_remote_cursor_replaces_previous_decoration() {
        // テスト項目: 同じ参加者の 2 回目のカーソル移動は前の装飾を置き換える
        // given (前提条件):
        let mut editor = MockEditorView::new();
        editor
            .expect_delta_decorations()
            .withf(|old, new| old.is_empty() && new.len() == 1 && new[0].line == 2)
            .times(1)
            .returning(|_, _| vec![DecorationId(1)]);
        editor
            .expect_delta_decorations()
            .withf(|old, new| old == [DecorationId(1)].as_slice() && new[0].line == 5)
            .times(1)
            .returning(|_, _| vec![DecorationId(2)]);
        let mut tracker = PresenceTracker::new();

        // when (操作):
        tracker.on_remote_cursor(
            &mut editor,
            Some("a.js"),
            &alice(),
            "a.js",
            LineMark::At(2),
            "alice",
        );
        tracker.on_remote_cursor(
            &mut editor,
            Some("a.js"),
            &alice(),
            "a.js",
            LineMark::At(5),
            "alice",
        );

        // then (期待する結果):
        assert_eq!(tracker.len(), 1);
        let cursor = tracker.cursor(&alice()).unwrap();
        assert_eq!(cursor.line, 5);
        assert_eq!(cursor.username, "alice");
    }

    #[test]
    fn test_remote_cursor_carries_hover_message() {
        // テスト項目: 装飾にはユーザー名入りのホバーメッセージが付く
        // given (前提条件):
        let mut editor = MockEditorView::new();
        editor
            .expect_delta_decorations()
            .withf(|_, new| new[0].hover_message == "alice is typing here")
            .times(1)
            .returning(|_, _| vec![DecorationId(9)]);
        let mut tracker = PresenceTracker::new();

        // when (操作):
        tracker.on_remote_cursor(
            &mut editor,
            Some("a.js"),
            &alice(),
            "a.js",
            LineMark::At(1),
            "alice",
        );

        // then (期待する結果):
        assert!(tracker.cursor(&alice()).is_some());
    }

    #[test]
    fn test_remote_cursor_sentinel_clears_decoration() {
        // テスト項目: 行番号 -1 を受信するとその参加者の装飾が削除される
        // given (前提条件):
        let mut editor = MockEditorView::new();
        editor
            .expect_delta_decorations()
            .withf(|old, _| old.is_empty())
            .times(1)
            .returning(|_, _| vec![DecorationId(1)]);
        editor
            .expect_delta_decorations()
            .withf(|old, new| old == [DecorationId(1)].as_slice() && new.is_empty())
            .times(1)
            .returning(|_, _| vec![]);
        let mut tracker = PresenceTracker::new();
        tracker.on_remote_cursor(
            &mut editor,
            Some("a.js"),
            &alice(),
            "a.js",
            LineMark::At(2),
            "alice",
        );

        // when (操作):
        tracker.on_remote_cursor(
            &mut editor,
            Some("a.js"),
            &alice(),
            "a.js",
            LineMark::Clear,
            "alice",
        );

        // then (期待する結果):
        assert!(tracker.cursor(&alice()).is_none());
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_remote_cursor_for_other_file_is_ignored() {
        // テスト項目: 開いていないファイルのカーソルイベントは無視される
        // given (前提条件):
        let mut editor = MockEditorView::new();
        editor.expect_delta_decorations().never();
        let mut tracker = PresenceTracker::new();

        // when (操作):
        tracker.on_remote_cursor(
            &mut editor,
            Some("a.js"),
            &alice(),
            "b.js",
            LineMark::At(2),
            "alice",
        );
        tracker.on_remote_cursor(&mut editor, None, &alice(), "b.js", LineMark::At(2), "alice");

        // then (期待する結果):
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_clear_participant_without_sentinel() {
        // テスト項目: 切断時はセンチネルなしでも装飾が強制的に削除される
        // given (前提条件):
        let mut editor = MockEditorView::new();
        editor
            .expect_delta_decorations()
            .withf(|old, _| old.is_empty())
            .returning(|_, _| vec![DecorationId(3)]);
        editor
            .expect_delta_decorations()
            .withf(|old, new| old == [DecorationId(3)].as_slice() && new.is_empty())
            .times(1)
            .returning(|_, _| vec![]);
        let mut tracker = PresenceTracker::new();
        tracker.on_remote_cursor(
            &mut editor,
            Some("a.js"),
            &alice(),
            "a.js",
            LineMark::At(2),
            "alice",
        );

        // when (操作):
        let cleared = tracker.clear_participant(&mut editor, &alice());

        // then (期待する結果):
        assert!(cleared);
        assert!(tracker.is_empty());
        assert!(!tracker.clear_participant(&mut editor, &alice()));
    }
}
