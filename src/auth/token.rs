use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Token file name in the app data directory
const TOKEN_FILE: &str = "token.json";

/// Prefix some endpoints include on issued tokens. Stored tokens never
/// carry it; it is re-added when building the authorization header.
const BEARER_PREFIX: &str = "Bearer ";

/// Strip a literal `"Bearer "` prefix from a server-issued token string.
pub fn strip_bearer(raw: &str) -> &str {
    raw.strip_prefix(BEARER_PREFIX).unwrap_or(raw)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TokenFile {
    token: String,
}

/// File-backed storage slot for the session token.
///
/// The slot holds at most one token. Reads hit the file system every time
/// so a write from one component is visible to the next request issued by
/// another. An empty string represents "no token".
pub struct TokenStore {
    data_dir: PathBuf,
}

impl TokenStore {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    /// Read the stored token. Returns `None` when the slot is absent,
    /// unreadable, or holds the empty string.
    pub fn load(&self) -> Option<String> {
        let path = self.token_path();
        let contents = std::fs::read_to_string(&path).ok()?;
        let parsed: TokenFile = serde_json::from_str(&contents).ok()?;
        if parsed.token.is_empty() {
            None
        } else {
            Some(parsed.token)
        }
    }

    /// Write a token to the slot, replacing any previous value.
    pub fn store(&self, token: &str) -> Result<()> {
        let path = self.token_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(&TokenFile {
            token: token.to_string(),
        })?;
        std::fs::write(&path, contents).context("Failed to write token file")?;
        Ok(())
    }

    /// Clear the slot by writing the empty string.
    pub fn clear(&self) -> Result<()> {
        self.store("")
    }

    /// Whether a token write has ever happened (the slot file exists,
    /// even if cleared).
    pub fn exists(&self) -> bool {
        self.token_path().exists()
    }

    fn token_path(&self) -> PathBuf {
        self.data_dir.join(TOKEN_FILE)
    }
}
