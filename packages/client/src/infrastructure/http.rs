//! HTTP collaborators: the auth API and the project archive download.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;

use crate::{
    domain::RoomId,
    error::ClientError,
    infrastructure::dto::http::{AuthResponse, LoginRequest, RegisterRequest, User},
};

/// File name of the downloaded archive for a room.
pub fn archive_file_name(room_id: &RoomId) -> String {
    format!("Collabix-{}.zip", room_id)
}

/// Client for the Collabix REST API
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<User, ClientError> {
        let body = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        self.authenticate("/api/auth/login", &body).await
    }

    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<User, ClientError> {
        let body = RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        self.authenticate("/api/auth/register", &body).await
    }

    async fn authenticate<B: Serialize>(&self, path: &str, body: &B) -> Result<User, ClientError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.http.post(&url).json(body).send().await?;
        let status = response.status();

        let auth = match response.json::<AuthResponse>().await {
            Ok(auth) => auth,
            Err(_) if !status.is_success() => {
                return Err(ClientError::Auth(format!("server returned {}", status)));
            }
            Err(e) => return Err(e.into()),
        };

        match (auth.status, auth.user) {
            (true, Some(user)) => {
                tracing::info!("Authenticated as {}", user.username);
                Ok(user)
            }
            _ => Err(ClientError::Auth(
                auth.msg.unwrap_or_else(|| "unexpected response".to_string()),
            )),
        }
    }

    /// Fetch the room's zip archive into `dest_dir` and return the written path.
    pub async fn download_project(
        &self,
        room_id: &RoomId,
        dest_dir: &Path,
    ) -> Result<PathBuf, ClientError> {
        let url = format!("{}/api/download/{}", self.base_url, room_id);
        let response = self.http.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(ClientError::Download(format!(
                "server returned {}",
                response.status()
            )));
        }

        let bytes = response.bytes().await?;
        let path = dest_dir.join(archive_file_name(room_id));
        tokio::fs::write(&path, &bytes).await?;
        tracing::info!("Saved {} bytes to {}", bytes.len(), path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_archive_file_name() {
        // テスト項目: ダウンロードファイル名は Collabix-<roomId>.zip になる
        // given (前提条件):
        let room_id = RoomId::new("abc-123").unwrap();

        // when (操作):
        let name = archive_file_name(&room_id);

        // then (期待する結果):
        assert_eq!(name, "Collabix-abc-123.zip");
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        // テスト項目: ベース URL 末尾のスラッシュは取り除かれる
        // given (前提条件):
        let client = ApiClient::new("http://localhost:5000/").unwrap();

        // when (操作) / then (期待する結果):
        assert_eq!(client.base_url(), "http://localhost:5000");
    }
}
