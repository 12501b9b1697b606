//! Client configuration loaded from a JSON file.

use std::path::Path;

use serde::Deserialize;

use crate::QtgpError;

/// Client-side settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Hostname or IP of the game server.
    pub host: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
        }
    }
}

/// Reads a `ClientConfig` from a JSON file of the shape
/// `{"host": "..."}`.
pub fn load_config(path: impl AsRef<Path>) -> Result<ClientConfig, QtgpError> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|e| {
        QtgpError::Config(format!("read {}: {e}", path.display()))
    })?;
    let config: ClientConfig = serde_json::from_str(&raw).map_err(|e| {
        QtgpError::Config(format!("parse {}: {e}", path.display()))
    })?;
    Ok(config)
}
