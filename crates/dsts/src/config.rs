//! Application configuration.
//!
//! Read from `DSTS_*` environment variables, then overridden by
//! command-line flags (see `CliArgs`).

use crate::error::{AppError, AppResult};
use serde::Deserialize;

/// Environment variable prefix, e.g. `DSTS_MPD_ADDR`.
pub const ENV_PREFIX: &str = "DSTS";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AppConfig {
    /// Show the Unix timestamp and local date/time.
    #[serde(default = "default_clock")]
    pub clock: bool,
    /// Show the Tamriel calendar time.
    #[serde(default)]
    pub tamriel: bool,
    /// MPD `host:port`. `None` disables the MPD block.
    #[serde(default)]
    pub mpd_addr: Option<String>,
    /// Maximum visible characters of the MPD block.
    #[serde(default = "default_marquee_width")]
    pub marquee_width: usize,
}

fn default_clock() -> bool {
    true
}

fn default_marquee_width() -> usize {
    40
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            clock: default_clock(),
            tamriel: false,
            mpd_addr: None,
            marquee_width: default_marquee_width(),
        }
    }
}

impl AppConfig {
    /// Load from the process environment.
    pub fn from_env() -> AppResult<Self> {
        Self::from_environment(config::Environment::with_prefix(ENV_PREFIX))
    }

    /// Load from an explicit `config::Environment` source.
    pub fn from_environment(env: config::Environment) -> AppResult<Self> {
        config::Config::builder()
            .add_source(env.try_parsing(true))
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| AppError::Config(format!("Failed to load configuration: {e}")))
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.marquee_width == 0 {
            return Err(AppError::Config("marquee_width must be at least 1".to_string()));
        }
        if let Some(addr) = &self.mpd_addr {
            if addr.trim().is_empty() {
                return Err(AppError::Config("mpd_addr must not be empty".to_string()));
            }
        }
        Ok(())
    }

    /// Number of bar blocks this configuration produces.
    pub fn block_count(&self) -> usize {
        let clock = 2 * usize::from(self.clock);
        usize::from(self.mpd_addr.is_some()) + usize::from(self.tamriel) + clock
    }
}
