//! Persistence of the signed-in user between runs.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::{error::ClientError, infrastructure::dto::http::User};

/// JSON file holding the current user
#[derive(Debug, Clone)]
pub struct UserStore {
    path: PathBuf,
}

impl UserStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<platform config dir>/collabix/user.json`
    pub fn default_path() -> Result<PathBuf, ClientError> {
        let project_dirs = directories::ProjectDirs::from("", "collabix", "collabix")
            .ok_or_else(|| {
                ClientError::Io(std::io::Error::new(
                    ErrorKind::NotFound,
                    "could not determine the platform config directory",
                ))
            })?;
        Ok(project_dirs.config_dir().join("user.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The stored user, or `None` when nobody is signed in.
    pub fn load(&self) -> Result<Option<User>, ClientError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&text)?))
    }

    pub fn save(&self, user: &User) -> Result<(), ClientError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(user)?)?;
        tracing::debug!("Saved user to {}", self.path.display());
        Ok(())
    }

    /// Forget the stored user. Returns `false` when nobody was signed in.
    pub fn clear(&self) -> Result<bool, ClientError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
