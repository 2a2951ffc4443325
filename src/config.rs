//! Service configuration.
//!
//! Read once at startup from `SCOUR_*` environment variables, with CLI
//! overrides applied by the binary. The core never reloads configuration at
//! runtime.

use std::time::Duration;

use serde::Deserialize;

use crate::browser::BrowserSettings;
use crate::pool::PoolConfig;

/// Top-level service configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Prefix for the versioned API routes.
    pub api_prefix: String,
    /// Bearer token gating the API routes; `None` disables authentication.
    pub api_key: Option<String>,
    /// Number of pooled browser sessions.
    pub pool_size: usize,
    /// How long a request waits for an idle session, in milliseconds.
    pub acquire_timeout_ms: u64,
    /// Upper bound on navigation readiness waiting, in milliseconds.
    pub navigation_timeout_ms: u64,
    /// How long shutdown waits for in-flight searches, in milliseconds.
    pub drain_timeout_ms: u64,
    /// Whether to run browsers headless.
    pub headless: bool,
    /// Explicit Chrome/Chromium executable; auto-detected when unset.
    pub chrome_path: Option<String>,
    /// Extra Chrome launch arguments.
    pub launch_args: Vec<String>,
    /// User agent presented to the engines; empty selects the default.
    pub user_agent: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            api_prefix: "/api".to_string(),
            api_key: None,
            pool_size: 4,
            acquire_timeout_ms: 10_000,
            navigation_timeout_ms: 10_000,
            drain_timeout_ms: 30_000,
            headless: true,
            chrome_path: None,
            launch_args: Vec::new(),
            user_agent: None,
        }
    }
}

impl Config {
    /// Defaults merged with `SCOUR_*` environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.merge_env();
        config
    }

    /// Overlays environment variables onto the current values.
    pub fn merge_env(&mut self) {
        if let Ok(val) = std::env::var("SCOUR_HOST") {
            self.host = val;
        }
        if let Ok(val) = std::env::var("SCOUR_PORT") {
            if let Ok(port) = val.parse() {
                self.port = port;
            }
        }
        if let Ok(val) = std::env::var("SCOUR_API_PREFIX") {
            self.api_prefix = val;
        }
        if let Ok(val) = std::env::var("SCOUR_API_KEY") {
            if !val.is_empty() {
                self.api_key = Some(val);
            }
        }
        if let Ok(val) = std::env::var("SCOUR_POOL_SIZE") {
            if let Ok(size) = val.parse() {
                self.pool_size = size;
            }
        }
        if let Ok(val) = std::env::var("SCOUR_ACQUIRE_TIMEOUT_MS") {
            if let Ok(ms) = val.parse() {
                self.acquire_timeout_ms = ms;
            }
        }
        if let Ok(val) = std::env::var("SCOUR_NAVIGATION_TIMEOUT_MS") {
            if let Ok(ms) = val.parse() {
                self.navigation_timeout_ms = ms;
            }
        }
        if let Ok(val) = std::env::var("SCOUR_DRAIN_TIMEOUT_MS") {
            if let Ok(ms) = val.parse() {
                self.drain_timeout_ms = ms;
            }
        }
        if let Ok(val) = std::env::var("SCOUR_HEADLESS") {
            if let Ok(headless) = val.parse() {
                self.headless = headless;
            }
        }
        if let Ok(val) = std::env::var("SCOUR_CHROME_PATH") {
            if !val.is_empty() {
                self.chrome_path = Some(val);
            }
        }
        if let Ok(val) = std::env::var("SCOUR_USER_AGENT") {
            if !val.is_empty() {
                self.user_agent = Some(val);
            }
        }
    }

    /// Navigation readiness bound as a [`Duration`].
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }

    /// Pool sizing and timing derived from this configuration.
    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig {
            size: self.pool_size,
            acquire_timeout: Duration::from_millis(self.acquire_timeout_ms),
            drain_timeout: Duration::from_millis(self.drain_timeout_ms),
        }
    }

    /// Browser launch settings derived from this configuration.
    pub fn browser_settings(&self) -> BrowserSettings {
        let mut settings = BrowserSettings {
            headless: self.headless,
            chrome_path: self.chrome_path.clone(),
            launch_args: self.launch_args.clone(),
            ..BrowserSettings::default()
        };
        if let Some(ref agent) = self.user_agent {
            settings.user_agent = agent.clone();
        }
        settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 5000);
        assert_eq!(config.api_prefix, "/api");
        assert!(config.api_key.is_none());
        assert_eq!(config.pool_size, 4);
        assert!(config.headless);
    }

    #[test]
    fn test_pool_config_derivation() {
        let config = Config {
            pool_size: 2,
            acquire_timeout_ms: 500,
            drain_timeout_ms: 1_000,
            ..Default::default()
        };
        let pool = config.pool_config();
        assert_eq!(pool.size, 2);
        assert_eq!(pool.acquire_timeout, Duration::from_millis(500));
        assert_eq!(pool.drain_timeout, Duration::from_millis(1_000));
    }

    #[test]
    fn test_browser_settings_derivation() {
        let config = Config {
            headless: false,
            chrome_path: Some("/usr/bin/chromium".to_string()),
            user_agent: Some("Custom/1.0".to_string()),
            launch_args: vec!["--lang=en-US".to_string()],
            ..Default::default()
        };
        let settings = config.browser_settings();
        assert!(!settings.headless);
        assert_eq!(settings.chrome_path.as_deref(), Some("/usr/bin/chromium"));
        assert_eq!(settings.user_agent, "Custom/1.0");
        assert_eq!(settings.launch_args, vec!["--lang=en-US".to_string()]);
    }

    #[test]
    fn test_browser_settings_default_user_agent() {
        let settings = Config::default().browser_settings();
        assert!(settings.user_agent.contains("Chrome/"));
    }

    #[test]
    fn test_navigation_timeout() {
        let config = Config {
            navigation_timeout_ms: 2_500,
            ..Default::default()
        };
        assert_eq!(config.navigation_timeout(), Duration::from_millis(2_500));
    }

    #[test]
    fn test_config_deserializes_partial_json() {
        let config: Config = serde_json::from_str(r#"{"port": 8080, "pool_size": 8}"#).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.pool_size, 8);
        assert_eq!(config.host, "0.0.0.0");
    }
}
