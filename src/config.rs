use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::credentials::{FileTokenStore, StaticToken, TokenStore, default_token_path};
use crate::notify::DEFAULT_TOAST_DURATION;

const DEFAULT_API_URL: &str = "http://127.0.0.1:8000/api";

#[derive(Clone, Debug, PartialEq)]
pub struct ClientConfig {
    pub api_url: String,
    pub auth_token: Option<String>,
    pub token_file: PathBuf,
    pub auto_speak: bool,
    pub toast_duration: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            auth_token: None,
            token_file: default_token_path(),
            auto_speak: false,
            toast_duration: DEFAULT_TOAST_DURATION,
        }
    }
}

impl ClientConfig {
    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let api_url = non_empty("API_URL")
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .unwrap_or(defaults.api_url);
        let auth_token = non_empty("MEMO_AUTH_TOKEN").map(|token| token.trim().to_string());
        let token_file = non_empty("MEMO_TOKEN_FILE")
            .map(PathBuf::from)
            .unwrap_or(defaults.token_file);
        let auto_speak = non_empty("MEMO_AUTO_SPEAK")
            .map(|value| is_truthy(&value))
            .unwrap_or(defaults.auto_speak);
        let toast_duration = non_empty("MEMO_TOAST_MS")
            .and_then(|value| value.trim().parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.toast_duration);

        Self {
            api_url,
            auth_token,
            token_file,
            auto_speak,
            toast_duration,
        }
    }

    /// An explicit token wins over the token file.
    pub fn token_store(&self) -> Arc<dyn TokenStore> {
        match &self.auth_token {
            Some(token) => Arc::new(StaticToken::new(token.clone())),
            None => Arc::new(FileTokenStore::new(self.token_file.clone())),
        }
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
