// config.rs — quire.toml: logging, request watchdog, dialog filters.
//
// Every field has a default, so a missing file (or a file that sets only
// one thing) is fine. A file that does not parse is an error.

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use quire_fs::DialogFilters;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuireConfig {
    /// Level for the quire crates (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Give up waiting on a request after this many milliseconds. 0 waits forever.
    #[serde(default)]
    pub request_timeout_ms: u64,

    /// Filters offered by the open and save pickers.
    #[serde(default)]
    pub dialog: DialogFilters,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for QuireConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            request_timeout_ms: 0,
            dialog: DialogFilters::default(),
        }
    }
}

impl QuireConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("invalid config in {}", path.display()))
    }

    /// Load the file if it exists, otherwise use defaults.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_ms > 0).then(|| Duration::from_millis(self.request_timeout_ms))
    }

    /// The tracing directive for the quire crates.
    pub fn log_directive(&self) -> String {
        format!("quire={}", self.log_level)
    }
}
