//! Auth API payloads.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// The signed-in user as returned by the auth API and persisted locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// `{status, user?, msg?}`
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub status: bool,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub msg: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_successful_auth_response() {
        // テスト項目: 成功レスポンスからユーザー情報が取り出せる
        // given (前提条件):
        let text = r#"{"status":true,"user":{"_id":"64f","username":"alice","email":"a@example.com"}}"#;

        // when (操作):
        let response: AuthResponse = serde_json::from_str(text).unwrap();

        // then (期待する結果):
        assert!(response.status);
        let user = response.user.unwrap();
        assert_eq!(user.id.as_deref(), Some("64f"));
        assert_eq!(user.username, "alice");
    }

    #[test]
    fn test_parse_failed_auth_response() {
        // テスト項目: 失敗レスポンスはメッセージのみを持つ
        // given (前提条件):
        let text = r#"{"status":false,"msg":"Incorrect Username or Password"}"#;

        // when (操作):
        let response: AuthResponse = serde_json::from_str(text).unwrap();

        // then (期待する結果):
        assert!(!response.status);
        assert!(response.user.is_none());
        assert_eq!(response.msg.as_deref(), Some("Incorrect Username or Password"));
    }
}
