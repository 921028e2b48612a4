//! Credential provider seam.
//!
//! The interactive OAuth flow lives outside this tool; we only consume a
//! pre-authorized bearer token, either from the environment or from a token
//! file written by whatever performed the flow.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Environment variable that overrides the token file.
pub const TOKEN_ENV_VAR: &str = "SKUSYNC_TOKEN";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("credential file not found: {0}")]
    Missing(String),
    #[error("could not read credentials: {0}")]
    Io(#[from] std::io::Error),
    #[error("credential file contains no usable token")]
    NoToken,
}

/// Supplies an authenticated session (bearer token) for the remote APIs.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn access_token(&self) -> Result<String, AuthError>;
}

/// Fixed token, e.g. from the environment. Also handy in tests.
pub struct StaticToken(pub String);

#[async_trait]
impl CredentialProvider for StaticToken {
    async fn access_token(&self) -> Result<String, AuthError> {
        Ok(self.0.clone())
    }
}

/// Reads the token from a file on every call so an externally refreshed
/// token is picked up without restarting a long run.
pub struct TokenFile {
    path: PathBuf,
}

impl TokenFile {
    pub fn at(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Default location: `~/.config/skusync/token.json`.
    pub fn default_path() -> anyhow::Result<PathBuf> {
        let xdg_dirs = xdg::BaseDirectories::with_prefix("skusync")?;
        Ok(xdg_dirs.get_config_home().join("token.json"))
    }
}

#[async_trait]
impl CredentialProvider for TokenFile {
    async fn access_token(&self) -> Result<String, AuthError> {
        let data = match tokio::fs::read_to_string(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AuthError::Missing(self.path.display().to_string()));
            }
            Err(e) => return Err(AuthError::Io(e)),
        };
        parse_token(&data).ok_or(AuthError::NoToken)
    }
}

/// Pick the provider: `SKUSYNC_TOKEN` env var wins, else the token file.
pub fn default_provider() -> anyhow::Result<Arc<dyn CredentialProvider>> {
    if let Ok(token) = std::env::var(TOKEN_ENV_VAR) {
        if !token.trim().is_empty() {
            return Ok(Arc::new(StaticToken(token.trim().to_string())));
        }
    }
    let path = TokenFile::default_path()?;
    Ok(Arc::new(TokenFile::at(&path)))
}

/// Accepts either a JSON token file (`access_token` or `token` field, the
/// shapes OAuth tooling writes) or a plain-text token.
fn parse_token(data: &str) -> Option<String> {
    let trimmed = data.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        for field in ["access_token", "token"] {
            if let Some(token) = value.get(field).and_then(|t| t.as_str()) {
                if !token.is_empty() {
                    return Some(token.to_string());
                }
            }
        }
        return None;
    }
    Some(trimmed.to_string())
}
