use crate::error::ConfigError;
use serde::Deserialize;

/// The root configuration structure for the entire application.
///
/// Every section and every field has a default, so the binaries run with no
/// `config.toml` at all; the file only needs to name what it overrides.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub dashboard: DashboardSettings,
}

impl Settings {
    /// Rejects values that would misbehave at runtime rather than letting
    /// them surface as confusing behavior later.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "server.port must be non-zero".to_string(),
            ));
        }
        if self.cache.ttl_secs == 0 {
            return Err(ConfigError::ValidationError(
                "cache.ttl_secs must be at least 1".to_string(),
            ));
        }
        if self.cache.max_entries == 0 {
            return Err(ConfigError::ValidationError(
                "cache.max_entries must be at least 1".to_string(),
            ));
        }
        if self.dashboard.default_range_days == 0 {
            return Err(ConfigError::ValidationError(
                "dashboard.default_range_days must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            cache: CacheSettings::default(),
            dashboard: DashboardSettings::default(),
        }
    }
}

/// Bind address of the dashboard HTTP server.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Tuning for the in-process ledger cache that sits between the HTTP
/// handlers and the database.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    /// How long a fetched ledger stays fresh before the next request reloads
    /// it from the database.
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    #[serde(default = "default_max_entries")]
    pub max_entries: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
            max_entries: default_max_entries(),
        }
    }
}

/// Presentation defaults shared by the HTTP API and the CLI report.
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardSettings {
    /// Window length used when a request does not name a date range: the
    /// last N days up to today.
    #[serde(default = "default_range_days")]
    pub default_range_days: u32,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            default_range_days: default_range_days(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_ttl_secs() -> u64 {
    60
}

fn default_max_entries() -> u64 {
    64
}

fn default_range_days() -> u32 {
    30
}
