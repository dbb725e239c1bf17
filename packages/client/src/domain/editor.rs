//! Editor seam: the local view that shows the open file.
//!
//! The session drives the view through this trait; a terminal buffer implements it
//! for the CLI and embedders plug in their own widget.

#[cfg(test)]
use mockall::automock;

/// 1-based cursor position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// Handle of a decoration created by the view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DecorationId(pub u64);

/// Whole-line highlight with a hover message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineDecoration {
    pub line: u32,
    pub hover_message: String,
}

/// Local editor view of the currently open file.
#[cfg_attr(test, automock)]
pub trait EditorView: Send {
    /// Current buffer content
    fn content(&self) -> String;

    /// Replace the whole buffer
    fn set_content(&mut self, content: &str);

    fn cursor(&self) -> Option<Position>;

    fn set_cursor(&mut self, position: Position);

    /// Remove `old` decorations and add `new` ones, returning the handles of the added ones.
    fn delta_decorations(
        &mut self,
        old: &[DecorationId],
        new: Vec<LineDecoration>,
    ) -> Vec<DecorationId>;
}

/// Number of lines in a buffer (an empty buffer has one line).
pub fn line_count(content: &str) -> u32 {
    u32::try_from(content.split('\n').count()).unwrap_or(u32::MAX)
}

/// Clamp a position into a buffer with `lines` lines.
pub fn clamp_position(position: Position, lines: u32) -> Position {
    Position {
        line: position.line.clamp(1, lines.max(1)),
        column: position.column.max(1),
    }
}

/// Replace line `line` (1-based) of `content`, padding with empty lines when it lies past the end.
pub fn replace_line(content: &str, line: u32, text: &str) -> String {
    let mut lines: Vec<&str> = content.split('\n').collect();
    let index = usize::try_from(line.max(1) - 1).unwrap_or(usize::MAX);
    if index >= lines.len() {
        lines.resize(index + 1, "");
    }
    lines[index] = text;
    lines.join("\n")
}
