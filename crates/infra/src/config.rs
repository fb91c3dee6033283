//! Process configuration, read once at startup from `IMFO_*` environment variables.

use std::net::SocketAddr;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://imfobookings-backend.vercel.app";
pub const DEFAULT_API_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_SESSION_IDLE_SECS: u64 = 30 * 60;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be {expected}, got {value:?}")]
    Invalid {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Which collaborator implementations a host wires in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollaboratorMode {
    /// The bookings REST backend.
    #[default]
    Http,
    /// Seeded in-memory collaborators (local development).
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub api_url: String,
    pub api_timeout: Duration,
    pub api_token: Option<String>,
    pub bind_addr: SocketAddr,
    pub collaborators: CollaboratorMode,
    /// Wizards untouched for this long are dropped by the host.
    pub session_idle_ttl: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_url = get("IMFO_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                var: "IMFO_API_URL",
                expected: "an http(s) URL",
                value: api_url,
            });
        }

        let api_timeout = seconds(
            get("IMFO_API_TIMEOUT_SECS"),
            "IMFO_API_TIMEOUT_SECS",
            DEFAULT_API_TIMEOUT_SECS,
        )?;
        let session_idle_ttl = seconds(
            get("IMFO_SESSION_IDLE_SECS"),
            "IMFO_SESSION_IDLE_SECS",
            DEFAULT_SESSION_IDLE_SECS,
        )?;

        let bind_raw = get("IMFO_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw
            .trim()
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::Invalid {
                var: "IMFO_BIND_ADDR",
                expected: "a socket address such as 0.0.0.0:8080",
                value: bind_raw.clone(),
            })?;

        let collaborators = match get("IMFO_COLLABORATORS").as_deref().map(str::trim) {
            None | Some("http") => CollaboratorMode::Http,
            Some("memory") => CollaboratorMode::Memory,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    var: "IMFO_COLLABORATORS",
                    expected: "\"http\" or \"memory\"",
                    value: other.to_string(),
                });
            }
        };

        Ok(Self {
            api_url,
            api_timeout,
            api_token: get("IMFO_API_TOKEN"),
            bind_addr,
            collaborators,
            session_idle_ttl,
        })
    }
}

fn seconds(raw: Option<String>, var: &'static str, default: u64) -> Result<Duration, ConfigError> {
    match raw {
        None => Ok(Duration::from_secs(default)),
        Some(raw) => match raw.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
            _ => Err(ConfigError::Invalid {
                var,
                expected: "a positive number of seconds",
                value: raw,
            }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.api_timeout, Duration::from_secs(30));
        assert_eq!(config.api_token, None);
        assert_eq!(config.bind_addr, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(config.collaborators, CollaboratorMode::Http);
        assert_eq!(config.session_idle_ttl, Duration::from_secs(1800));
    }

    #[test]
    fn explicit_values_override_defaults() {
        let config = config_from(&[
            ("IMFO_API_URL", "http://localhost:4000"),
            ("IMFO_API_TIMEOUT_SECS", "5"),
            ("IMFO_API_TOKEN", "secret"),
            ("IMFO_BIND_ADDR", "127.0.0.1:9000"),
            ("IMFO_COLLABORATORS", "memory"),
            ("IMFO_SESSION_IDLE_SECS", "90"),
        ])
        .unwrap();
        assert_eq!(config.api_url, "http://localhost:4000");
        assert_eq!(config.api_timeout, Duration::from_secs(5));
        assert_eq!(config.api_token.as_deref(), Some("secret"));
        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.collaborators, CollaboratorMode::Memory);
        assert_eq!(config.session_idle_ttl, Duration::from_secs(90));
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config = config_from(&[("IMFO_API_TOKEN", "  "), ("IMFO_API_TIMEOUT_SECS", "")]).unwrap();
        assert_eq!(config.api_token, None);
        assert_eq!(config.api_timeout, Duration::from_secs(30));
    }

    #[test]
    fn invalid_values_are_reported_by_variable() {
        for (var, value) in [
            ("IMFO_API_TIMEOUT_SECS", "0"),
            ("IMFO_API_TIMEOUT_SECS", "soon"),
            ("IMFO_SESSION_IDLE_SECS", "-1"),
            ("IMFO_BIND_ADDR", "localhost"),
            ("IMFO_COLLABORATORS", "postgres"),
            ("IMFO_API_URL", "ftp://example.com"),
        ] {
            match config_from(&[(var, value)]).unwrap_err() {
                ConfigError::Invalid { var: reported, .. } if reported == var => {}
                other => panic!("Expected Invalid for {var}, got {other:?}"),
            }
        }
    }
}
