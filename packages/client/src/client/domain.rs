//! Domain logic for client-side operations.
//!
//! This module contains pure functions that implement front-end policy
//! without side effects, making them easy to test.

use crate::{error::ClientError, infrastructure::dto::http::User};

/// Process exit code for a fatal error.
///
/// Sessions are never retried: losing the relay or being removed ends the program.
pub fn exit_code(error: &ClientError) -> i32 {
    match error {
        ClientError::Kicked(_) => 2,
        ClientError::ConnectionError(_) => 3,
        ClientError::Auth(_) => 4,
        _ => 1,
    }
}

/// Joining a room requires a signed-in user.
pub fn require_user(user: Option<User>) -> Result<User, ClientError> {
    user.ok_or_else(|| ClientError::Auth("not logged in; run `collabix login` first".to_string()))
}
