//! Server configuration.
//!
//! Defaults live here as constants. `PROMOVIEW_PORT` and
//! `PROMOVIEW_MAX_UPLOAD_BYTES` override them (a `.env` file is loaded by the
//! binary first), and CLI flags override both.

use crate::api::logs::log_warning;

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 3000;

/// Maximum upload size (in bytes).
///
/// 50 MB limit.
pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Capacity of the log broadcast channel.
pub const LOG_CHANNEL_CAPACITY: usize = 100;

/// SSE keep-alive interval, in seconds.
pub const SSE_KEEP_ALIVE_SECS: u64 = 15;

pub const ENV_PORT: &str = "PROMOVIEW_PORT";
pub const ENV_MAX_UPLOAD_BYTES: &str = "PROMOVIEW_MAX_UPLOAD_BYTES";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            max_upload_bytes: MAX_UPLOAD_BYTES,
        }
    }
}

impl ServerConfig {
    /// Defaults overridden by the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns. Unparseable values
    /// are ignored with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_PORT) {
            match raw.trim().parse() {
                Ok(port) => config.port = port,
                Err(_) => log_warning(format!("Ignoring {}={}", ENV_PORT, raw)),
            }
        }

        if let Some(raw) = lookup(ENV_MAX_UPLOAD_BYTES) {
            match raw.trim().parse() {
                Ok(bytes) if bytes > 0 => config.max_upload_bytes = bytes,
                _ => log_warning(format!("Ignoring {}={}", ENV_MAX_UPLOAD_BYTES, raw)),
            }
        }

        config
    }

    /// Apply a port given on the command line.
    pub fn with_port(mut self, port: Option<u16>) -> Self {
        if let Some(port) = port {
            self.port = port;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_lookup(lookup(&[]));
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn test_env_overrides() {
        let config = ServerConfig::from_lookup(lookup(&[
            (ENV_PORT, "8080"),
            (ENV_MAX_UPLOAD_BYTES, "1024"),
        ]));
        assert_eq!(config.port, 8080);
        assert_eq!(config.max_upload_bytes, 1024);
    }

    #[test]
    fn test_bad_values_ignored() {
        let config = ServerConfig::from_lookup(lookup(&[
            (ENV_PORT, "eighty"),
            (ENV_MAX_UPLOAD_BYTES, "0"),
        ]));
        assert_eq!(config, ServerConfig::default());
    }

    #[test]
    fn test_cli_port_wins() {
        let config = ServerConfig::from_lookup(lookup(&[(ENV_PORT, "8080")])).with_port(Some(9000));
        assert_eq!(config.port, 9000);
        assert_eq!(ServerConfig::default().with_port(None).port, DEFAULT_PORT);
    }
}
