//! Shell configuration: a `[shell]` section plus the dispatcher settings.
//!
//! ```toml
//! [shell]
//! prompt = "> "
//! handler_timeout_ms = 5000
//!
//! did_you_mean_distance = 2
//!
//! [suggestions]
//! filter = "starts_with"
//! ```

use std::path::Path;
use std::time::Duration;

use cmdtree::DispatcherConfig;
use serde::Deserialize;
use tracing::warn;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    pub shell: ShellSection,
    #[serde(flatten)]
    pub dispatcher: DispatcherConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ShellSection {
    /// Printed before each line when stdin is a terminal.
    pub prompt: String,
    /// Upper bound on a single handler run.
    pub handler_timeout_ms: u64,
}

impl Default for ShellSection {
    fn default() -> Self {
        Self {
            prompt: "> ".to_string(),
            handler_timeout_ms: 5_000,
        }
    }
}

impl ShellSection {
    pub fn handler_timeout(&self) -> Duration {
        Duration::from_millis(self.handler_timeout_ms)
    }
}

impl ShellConfig {
    /// Load config from a specific path.
    /// Returns default config if file doesn't exist or is invalid.
    pub fn load_from_path(path: &Path) -> Self {
        if !path.exists() {
            warn!(path = %path.display(), "config file not found, using defaults");
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to parse shell config");
                    Self::default()
                }
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read shell config");
                Self::default()
            }
        }
    }
}
