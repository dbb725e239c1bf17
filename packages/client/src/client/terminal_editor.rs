//! In-memory editor buffer for the terminal front-end.

use std::collections::BTreeMap;

use crate::domain::{DecorationId, EditorView, LineDecoration, Position};

/// The buffer of the open file plus the remote line markers drawn on it.
#[derive(Debug, Default)]
pub struct TerminalEditor {
    content: String,
    cursor: Option<Position>,
    decorations: BTreeMap<DecorationId, LineDecoration>,
    next_id: u64,
}

impl TerminalEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn decorations(&self) -> impl Iterator<Item = &LineDecoration> {
        self.decorations.values()
    }
}

impl EditorView for TerminalEditor {
    fn content(&self) -> String {
        self.content.clone()
    }

    fn set_content(&mut self, content: &str) {
        self.content = content.to_string();
    }

    fn cursor(&self) -> Option<Position> {
        self.cursor
    }

    fn set_cursor(&mut self, position: Position) {
        self.cursor = Some(position);
    }

    fn delta_decorations(
        &mut self,
        old: &[DecorationId],
        new: Vec<LineDecoration>,
    ) -> Vec<DecorationId> {
        for id in old {
            self.decorations.remove(id);
        }
        new.into_iter()
            .map(|decoration| {
                self.next_id += 1;
                let id = DecorationId(self.next_id);
                self.decorations.insert(id, decoration);
                id
            })
            .collect()
    }
}
