//! Interpreter configuration
//!
//! Read from a TOML file (`arbor run --config arbor.toml`); command-line
//! flags override individual fields.
//!
//! ```toml
//! max_depth = 5000
//! tail_calls = true
//! ```

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Default limit on nested non-tail calls
pub const DEFAULT_MAX_DEPTH: usize = 100_000;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Maximum number of simultaneously active call frames
    pub max_depth: usize,
    /// Reuse the caller's frame for calls in tail position
    pub tail_calls: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_depth: DEFAULT_MAX_DEPTH,
            tail_calls: true,
        }
    }
}

impl Config {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(text).map_err(|e| Error::config_error(e.message().to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::io_error(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_depth == 0 {
            return Err(Error::config_error("max_depth must be at least 1"));
        }
        Ok(())
    }
}
