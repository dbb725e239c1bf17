//! Conversion logic between DTOs and domain entities.

use crate::domain::{ClientInfo, FileKind, FileRecord, Signal, SocketId, language_for};
use crate::infrastructure::dto::websocket as dto;

// ========================================
// DTO → Domain Entity
// ========================================

impl From<dto::FileType> for FileKind {
    fn from(dto: dto::FileType) -> Self {
        match dto {
            dto::FileType::File => FileKind::File,
            dto::FileType::Folder => FileKind::Folder,
        }
    }
}

impl From<dto::WireClient> for ClientInfo {
    fn from(dto: dto::WireClient) -> Self {
        ClientInfo::new(SocketId::new(dto.socket_id), dto.username)
    }
}

/// A non-empty `value` wins over the legacy `content`; folders never carry text.
impl From<dto::WireFile> for FileRecord {
    fn from(dto: dto::WireFile) -> Self {
        let kind = FileKind::from(dto.kind);
        let value = if kind.is_folder() {
            String::new()
        } else {
            dto.value
                .filter(|value| !value.is_empty())
                .or(dto.content)
                .unwrap_or_default()
        };
        let language = dto
            .language
            .filter(|language| !language.is_empty())
            .unwrap_or_else(|| language_for(&dto.name).to_string());
        Self {
            name: dto.name,
            kind,
            value,
            language,
        }
    }
}

impl dto::WireFiles {
    /// Flatten either wire shape into records. Map entries without a name take their key.
    pub fn into_records(self) -> Vec<FileRecord> {
        match self {
            dto::WireFiles::Map(map) => map
                .into_iter()
                .map(|(key, mut file)| {
                    if file.name.is_empty() {
                        file.name = key;
                    }
                    FileRecord::from(file)
                })
                .collect(),
            dto::WireFiles::List(list) => list
                .into_iter()
                .filter(|file| !file.name.is_empty())
                .map(FileRecord::from)
                .collect(),
        }
    }
}

impl From<dto::DeletedPath> for String {
    fn from(dto: dto::DeletedPath) -> Self {
        match dto {
            dto::DeletedPath::Bare(path) => path,
            dto::DeletedPath::Named { file_name } => file_name,
        }
    }
}

// ========================================
// Domain Entity → DTO
// ========================================

impl From<FileKind> for dto::FileType {
    fn from(model: FileKind) -> Self {
        match model {
            FileKind::File => dto::FileType::File,
            FileKind::Folder => dto::FileType::Folder,
        }
    }
}

impl From<ClientInfo> for dto::WireClient {
    fn from(model: ClientInfo) -> Self {
        Self {
            socket_id: model.socket_id.into_string(),
            username: model.username,
        }
    }
}

impl From<Signal> for serde_json::Value {
    fn from(model: Signal) -> Self {
        model.0
    }
}
