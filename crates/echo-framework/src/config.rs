use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::error::HostError;

/// Construction parameters of an [`EchoGame`](crate::EchoGame).
///
/// Missing keys in a TOML file fall back to [`GameConfig::default`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    /// Window title.
    pub title: String,
    /// Back-buffer width in pixels.
    pub width: u32,
    /// Back-buffer height in pixels.
    pub height: u32,
    pub fullscreen: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            title: "Echo".to_string(),
            width: 800,
            height: 480,
            fullscreen: false,
        }
    }
}

impl GameConfig {
    pub fn new(title: impl Into<String>, width: u32, height: u32, fullscreen: bool) -> Self {
        Self {
            title: title.into(),
            width,
            height,
            fullscreen,
        }
    }

    pub fn from_toml_str(src: &str) -> Result<Self> {
        toml::from_str(src).context("failed to parse game configuration")
    }

    /// Reads `path` if it exists, otherwise returns the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::debug!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let src = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml_str(&src).with_context(|| format!("in {}", path.display()))
    }

    /// Rejects a blank title and zero dimensions.
    pub fn validate(&self) -> Result<(), HostError> {
        if self.title.trim().is_empty() {
            return Err(HostError::InvalidConfig("window title must not be empty".into()));
        }
        if self.width == 0 || self.height == 0 {
            return Err(HostError::InvalidConfig(format!(
                "window size must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }
}
