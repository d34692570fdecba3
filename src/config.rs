//! Settings for Gelang
//!
//! Resolution order: built-in defaults, then an optional JSON config file,
//! then environment variables. CLI flags are applied last by the binary.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::engine::region::DEFAULT_REGION_SECS;
use crate::engine::transport::DEFAULT_CONTAINER_WIDTH_PX;
use crate::error::{GelangError, Result};
use crate::present::DEFAULT_BAR_WIDTH;

/// Default classification endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:5000/predict";

/// Environment variable overriding the endpoint
pub const ENV_PREDICT_URL: &str = "GELANG_PREDICT_URL";

/// Environment variable setting a request timeout in milliseconds
pub const ENV_TIMEOUT_MS: &str = "GELANG_TIMEOUT_MS";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Full URL of the `/predict` endpoint
    pub endpoint: String,

    /// Request timeout; `None` waits indefinitely
    pub timeout_ms: Option<u64>,

    /// Length of the region created when a clip loads
    pub default_region_secs: f64,

    /// Start playing the initial region as soon as the clip is ready
    pub autoplay_on_ready: bool,

    /// Width used to place the time cursor
    pub container_width_px: f64,

    /// Width of a 100% bar in the rendered result
    pub bar_width: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_ms: None,
            default_region_secs: DEFAULT_REGION_SECS,
            autoplay_on_ready: true,
            container_width_px: DEFAULT_CONTAINER_WIDTH_PX,
            bar_width: DEFAULT_BAR_WIDTH,
        }
    }
}

impl Settings {
    /// Defaults, overlaid with `path` (if given) and the process environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        settings.apply_env(|key| std::env::var(key).ok())?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read settings from a JSON file; missing keys keep their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| GelangError::Config {
            reason: format!("Cannot read {}: {}", path.display(), e),
        })?;
        serde_json::from_str(&content).map_err(|e| GelangError::Config {
            reason: format!("Invalid config {}: {}", path.display(), e),
        })
    }

    /// Apply environment overrides through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_PREDICT_URL) {
            self.endpoint = url;
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_MS) {
            let ms = raw.trim().parse::<u64>().map_err(|_| GelangError::Config {
                reason: format!("{} must be a number of milliseconds, got '{}'", ENV_TIMEOUT_MS, raw),
            })?;
            self.timeout_ms = Some(ms);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.endpoint.trim().is_empty() {
            return Err(GelangError::Config {
                reason: "endpoint must not be empty".to_string(),
            });
        }
        if !(self.default_region_secs.is_finite() && self.default_region_secs > 0.0) {
            return Err(GelangError::Config {
                reason: format!(
                    "default_region_secs must be positive, got {}",
                    self.default_region_secs
                ),
            });
        }
        if !(self.container_width_px.is_finite() && self.container_width_px >= 0.0) {
            return Err(GelangError::Config {
                reason: format!(
                    "container_width_px must be non-negative, got {}",
                    self.container_width_px
                ),
            });
        }
        Ok(())
    }
}
