//! Shared configuration for panelview
//!
//! This crate is the single source of truth for the platform family the
//! embedding adapter runs on and for the cadences of its scheduled tasks
//! (creation retry, bounds flushing, native message pumping). The value is
//! computed once at startup and handed to the adapter by reference.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Creation retry cadence on Windows in milliseconds
pub const WINDOWS_CREATE_RETRY_MS: u64 = 100;

/// Creation retry cadence on every other platform in milliseconds
pub const DEFAULT_CREATE_RETRY_MS: u64 = 16;

/// Bounds coalescing flush cadence (one frame at 60Hz)
pub const DEFAULT_BOUNDS_FLUSH_MS: u64 = 16;

/// Native message pump cadence
pub const DEFAULT_PUMP_INTERVAL_MS: u64 = 16;

/// Environment variable overriding the detected platform family
pub const PLATFORM_ENV: &str = "PANELVIEW_PLATFORM";

/// Environment variable overriding the creation retry cadence
pub const CREATE_RETRY_ENV: &str = "PANELVIEW_CREATE_RETRY_MS";

/// Errors produced while loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Unknown platform family: {0}")]
    UnknownPlatform(String),

    #[error("Invalid configuration: {0}")]
    Json(#[from] serde_json::Error),
}

/// Operating system family, which decides parenting and scheduling policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformFamily {
    Windows,
    MacOs,
    Linux,
    Other,
}

impl PlatformFamily {
    /// Platform family of the running binary
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Self::Windows
        } else if cfg!(target_os = "macos") {
            Self::MacOs
        } else if cfg!(target_os = "linux") {
            Self::Linux
        } else {
            Self::Other
        }
    }

    /// WebView2 creation fails silently before the owning window is shown,
    /// so creation also waits for the ancestor window.
    pub fn needs_window_ready(self) -> bool {
        self == Self::Windows
    }

    /// GTK cannot absorb raw layout rates; bounds go through a flush slot.
    pub fn coalesces_bounds(self) -> bool {
        self == Self::Linux
    }

    /// The embedded WebView2 control does not drain its own message queue.
    pub fn needs_host_pump(self) -> bool {
        self == Self::Windows
    }

    pub fn default_create_retry_ms(self) -> u64 {
        match self {
            Self::Windows => WINDOWS_CREATE_RETRY_MS,
            _ => DEFAULT_CREATE_RETRY_MS,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Windows => "windows",
            Self::MacOs => "macos",
            Self::Linux => "linux",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for PlatformFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlatformFamily {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "windows" | "win32" => Ok(Self::Windows),
            "macos" | "mac" | "darwin" => Ok(Self::MacOs),
            "linux" | "gtk" => Ok(Self::Linux),
            "other" => Ok(Self::Other),
            other => Err(ConfigError::UnknownPlatform(other.to_string())),
        }
    }
}

/// Embedding configuration shared by the resolver, tracker, pump and lifecycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbedConfig {
    /// Platform family used for every policy decision
    pub platform: PlatformFamily,
    /// Creation retry cadence; `None` uses the platform default
    pub create_retry_ms: Option<u64>,
    /// Bounds flush cadence on coalescing platforms
    pub bounds_flush_ms: u64,
    /// Native pump cadence on platforms that need one
    pub pump_interval_ms: u64,
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self::for_platform(PlatformFamily::current())
    }
}

impl EmbedConfig {
    /// Create a config with default cadences for the given platform
    pub fn for_platform(platform: PlatformFamily) -> Self {
        Self {
            platform,
            create_retry_ms: None,
            bounds_flush_ms: DEFAULT_BOUNDS_FLUSH_MS,
            pump_interval_ms: DEFAULT_PUMP_INTERVAL_MS,
        }
    }

    /// Detected defaults, overridden by `PANELVIEW_PLATFORM` and
    /// `PANELVIEW_CREATE_RETRY_MS` when they parse
    pub fn from_env() -> Self {
        let platform = std::env::var(PLATFORM_ENV)
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or_else(PlatformFamily::current);
        let create_retry_ms = std::env::var(CREATE_RETRY_ENV)
            .ok()
            .and_then(|value| value.trim().parse::<u64>().ok())
            .filter(|ms| *ms > 0);

        Self {
            create_retry_ms,
            ..Self::for_platform(platform)
        }
    }

    /// Parse a JSON document; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn create_retry_interval(&self) -> Duration {
        let ms = self
            .create_retry_ms
            .unwrap_or_else(|| self.platform.default_create_retry_ms());
        Duration::from_millis(ms.max(1))
    }

    pub fn bounds_flush_interval(&self) -> Duration {
        Duration::from_millis(self.bounds_flush_ms.max(1))
    }

    pub fn pump_interval(&self) -> Duration {
        Duration::from_millis(self.pump_interval_ms.max(1))
    }
}
