//! Room entity: the participant list and the canonical file cache.
//!
//! ## 責務
//!
//! - 参加者リスト（ClientInfo）の管理（socket id で重複排除、自分自身は含めない）
//! - パス → FileRecord のマップの管理（内容は常に丸ごと置き換え）
//! - フォルダ削除時の子孫パスの連鎖削除

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::value_object::{RoomId, SocketId};

/// Path separator used by file keys.
pub const PATH_SEPARATOR: char = '/';

/// Kind of a file-tree entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    #[default]
    File,
    Folder,
}

impl FileKind {
    pub fn is_folder(self) -> bool {
        matches!(self, FileKind::Folder)
    }
}

/// A single file (or folder) record, keyed by its full path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Full path, unique key
    pub name: String,
    pub kind: FileKind,
    /// Current text content (always empty for folders)
    pub value: String,
    /// Syntax id used by the editor and the code runner
    pub language: String,
}

impl FileRecord {
    pub fn new(name: impl Into<String>, kind: FileKind, value: impl Into<String>) -> Self {
        let name = name.into();
        let language = language_for(&name).to_string();
        Self {
            name,
            kind,
            value: value.into(),
            language,
        }
    }
}

/// Path → record mapping. Ordered so that every read is deterministic.
pub type FileMap = BTreeMap<String, FileRecord>;

/// Infer the editor language id from a path's extension.
pub fn language_for(path: &str) -> &'static str {
    let extension = path
        .rsplit(PATH_SEPARATOR)
        .next()
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("html") | Some("htm") => "html",
        Some("css") => "css",
        Some("js") | Some("mjs") | Some("jsx") => "javascript",
        Some("ts") | Some("tsx") => "typescript",
        Some("py") => "python",
        Some("java") => "java",
        Some("cpp") | Some("cc") | Some("hpp") => "cpp",
        Some("c") | Some("h") => "c",
        Some("json") => "json",
        Some("md") => "markdown",
        _ => "plaintext",
    }
}

/// A connected participant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientInfo {
    pub socket_id: SocketId,
    pub username: String,
}

impl ClientInfo {
    pub fn new(socket_id: SocketId, username: impl Into<String>) -> Self {
        Self {
            socket_id,
            username: username.into(),
        }
    }
}

/// Room state held by one client session.
///
/// Created from the `joined` snapshot and dropped on teardown.
#[derive(Debug, Clone)]
pub struct Room {
    pub id: RoomId,
    local_id: SocketId,
    clients: Vec<ClientInfo>,
    files: FileMap,
}

impl Room {
    /// Build the room from the relay's initial snapshot.
    ///
    /// Duplicate socket ids keep their first occurrence; the local connection is dropped
    /// from the list.
    pub fn from_snapshot(
        id: RoomId,
        local_id: SocketId,
        clients: Vec<ClientInfo>,
        files: impl IntoIterator<Item = FileRecord>,
    ) -> Self {
        let mut room = Self {
            id,
            local_id,
            clients: Vec::new(),
            files: FileMap::new(),
        };
        for client in clients {
            room.add_client(client);
        }
        for record in files {
            room.files.insert(record.name.clone(), record);
        }
        room
    }

    pub fn local_id(&self) -> &SocketId {
        &self.local_id
    }

    /// Remote participants in join order.
    pub fn clients(&self) -> &[ClientInfo] {
        &self.clients
    }

    pub fn client(&self, socket_id: &SocketId) -> Option<&ClientInfo> {
        self.clients.iter().find(|c| &c.socket_id == socket_id)
    }

    /// Add a participant. Returns `false` for the local id or an already-known id.
    pub fn add_client(&mut self, client: ClientInfo) -> bool {
        if client.socket_id == self.local_id || self.client(&client.socket_id).is_some() {
            return false;
        }
        self.clients.push(client);
        true
    }

    pub fn remove_client(&mut self, socket_id: &SocketId) -> Option<ClientInfo> {
        let index = self.clients.iter().position(|c| &c.socket_id == socket_id)?;
        Some(self.clients.remove(index))
    }

    pub fn files(&self) -> &FileMap {
        &self.files
    }

    pub fn file(&self, name: &str) -> Option<&FileRecord> {
        self.files.get(name)
    }

    pub fn contains_file(&self, name: &str) -> bool {
        self.files.contains_key(name)
    }

    /// Insert a record unless the path is already taken.
    ///
    /// Returns `false` when the path exists: the first broadcast for a path wins.
    pub fn insert_file(&mut self, record: FileRecord) -> bool {
        if self.files.contains_key(&record.name) {
            return false;
        }
        self.files.insert(record.name.clone(), record);
        true
    }

    /// Replace the content of an existing file. Unknown paths are left alone.
    pub fn replace_content(&mut self, name: &str, content: impl Into<String>) -> bool {
        match self.files.get_mut(name) {
            Some(record) => {
                record.value = content.into();
                true
            }
            None => false,
        }
    }

    /// Remove `path` and every descendant `path/...`. Returns the removed keys.
    pub fn remove_path(&mut self, path: &str) -> Vec<String> {
        let prefix = format!("{}{}", path, PATH_SEPARATOR);
        let removed: Vec<String> = self
            .files
            .keys()
            .filter(|key| key.as_str() == path || key.starts_with(&prefix))
            .cloned()
            .collect();
        for key in &removed {
            self.files.remove(key);
        }
        removed
    }

    /// First file (not folder) in path order.
    pub fn first_file(&self) -> Option<&FileRecord> {
        self.files.values().find(|record| !record.kind.is_folder())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room_with_files(paths: &[&str]) -> Room {
        Room::from_snapshot(
            RoomId::new("room-1").unwrap(),
            SocketId::new("me"),
            vec![],
            paths
                .iter()
                .map(|path| FileRecord::new(*path, FileKind::File, "")),
        )
    }

    #[test]
    fn test_snapshot_deduplicates_clients_and_excludes_self() {
        // テスト項目: スナップショットの参加者は重複排除され、自分自身は含まれない
        // given (前提条件):
        let clients = vec![
            ClientInfo::new(SocketId::new("a"), "alice"),
            ClientInfo::new(SocketId::new("me"), "me"),
            ClientInfo::new(SocketId::new("a"), "alice-again"),
            ClientInfo::new(SocketId::new("b"), "bob"),
        ];

        // when (操作):
        let room = Room::from_snapshot(
            RoomId::new("room-1").unwrap(),
            SocketId::new("me"),
            clients,
            vec![],
        );

        // then (期待する結果):
        let names: Vec<&str> = room.clients().iter().map(|c| c.username.as_str()).collect();
        assert_eq!(names, vec!["alice", "bob"]);
    }

    #[test]
    fn test_remove_path_cascades_to_descendants() {
        // テスト項目: "src" を削除すると "src" と "src/..." が全て削除される
        // given (前提条件):
        let mut room = room_with_files(&["src", "src/app.js", "src/lib/util.js", "srcfile.txt"]);

        // when (操作):
        let removed = room.remove_path("src");

        // then (期待する結果):
        assert_eq!(removed.len(), 3);
        assert!(!room.contains_file("src"));
        assert!(!room.contains_file("src/app.js"));
        assert!(!room.contains_file("src/lib/util.js"));
        assert!(room.contains_file("srcfile.txt"));
    }

    #[test]
    fn test_remove_path_of_implicit_folder() {
        // テスト項目: レコードを持たないフォルダを削除しても子孫は削除される
        // given (前提条件):
        let mut room = room_with_files(&["docs/a.md", "docs/b.md", "readme.md"]);

        // when (操作):
        let removed = room.remove_path("docs");

        // then (期待する結果):
        assert_eq!(removed, vec!["docs/a.md".to_string(), "docs/b.md".to_string()]);
        assert_eq!(room.files().len(), 1);
    }

    #[test]
    fn test_insert_file_keeps_first_record() {
        // テスト項目: 既に存在するパスへの挿入は無視される（先着優先）
        // given (前提条件):
        let mut room = room_with_files(&[]);
        room.insert_file(FileRecord::new("a.txt", FileKind::File, "first"));

        // when (操作):
        let inserted = room.insert_file(FileRecord::new("a.txt", FileKind::File, "second"));

        // then (期待する結果):
        assert!(!inserted);
        assert_eq!(room.file("a.txt").unwrap().value, "first");
    }

    #[test]
    fn test_replace_content_ignores_unknown_file() {
        // テスト項目: 存在しないファイルの内容置換は何もしない
        // given (前提条件):
        let mut room = room_with_files(&["a.txt"]);

        // when (操作):
        let replaced = room.replace_content("missing.txt", "x");

        // then (期待する結果):
        assert!(!replaced);
        assert!(!room.contains_file("missing.txt"));
    }

    #[test]
    fn test_first_file_skips_folders() {
        // テスト項目: 最初に開くファイルはフォルダを飛ばしたパス順の先頭になる
        // given (前提条件):
        let mut room = room_with_files(&["b.js"]);
        room.insert_file(FileRecord::new("a", FileKind::Folder, ""));

        // when (操作):
        let first = room.first_file();

        // then (期待する結果):
        assert_eq!(first.unwrap().name, "b.js");
    }

    #[test]
    fn test_language_for_known_and_unknown_extensions() {
        // テスト項目: 拡張子から言語が推定され、不明な場合は plaintext になる
        // given (前提条件):

        // when (操作) / then (期待する結果):
        assert_eq!(language_for("index.html"), "html");
        assert_eq!(language_for("src/app.JS"), "javascript");
        assert_eq!(language_for("main.py"), "python");
        assert_eq!(language_for("dir.v2/Makefile"), "plaintext");
        assert_eq!(language_for("notes"), "plaintext");
    }
}
