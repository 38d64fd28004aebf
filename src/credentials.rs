//! Read-only access to the bearer token written by the sign-in flow.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub trait TokenStore: Send + Sync {
    fn token(&self) -> Option<String>;
}

/// Token kept in a plain file, one line.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write side, used by the sign-in screen and by tests.
    pub fn store(&self, token: &str) -> Result<(), String> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create token directory: {}", e))?;
        }
        fs::write(&self.path, token).map_err(|e| format!("Failed to write token: {}", e))
    }
}

impl TokenStore for FileTokenStore {
    fn token(&self) -> Option<String> {
        let raw = fs::read_to_string(&self.path).ok()?;
        let token = raw.trim();
        if token.is_empty() {
            debug!(path = %self.path.display(), "token file is empty");
            return None;
        }
        Some(token.to_string())
    }
}

/// Default token location under the platform data directory.
pub fn default_token_path() -> PathBuf {
    if let Some(data_dir) = dirs::data_local_dir() {
        return data_dir.join("memo").join("auth_token");
    }

    PathBuf::from("cache").join("auth_token")
}

pub struct StaticToken(Option<String>);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(Some(token.into()))
    }

    pub fn empty() -> Self {
        Self(None)
    }
}

impl TokenStore for StaticToken {
    fn token(&self) -> Option<String> {
        self.0.clone()
    }
}
