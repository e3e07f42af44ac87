//! Application configuration loaded from environment variables.
//!
//! # Access Guard
//!
//! - `ALLOWED_IPS` (or `SOURCE_RANGE`): Comma-separated CIDR ranges allowed through
//!   the guard. A blank `ALLOWED_IPS` defers to `SOURCE_RANGE`. No ranges at all
//!   means every guarded request is denied.
//! - `TRUST_X_FORWARDED_FOR`: Resolve the client from `X-Forwarded-For` (default: false)
//! - `BEHIND_PROXY`: Enable the real-IP header below (default: false)
//! - `X_REAL_IP_HEADER`: Header carrying the client address when behind a proxy
//! - `GUARD_NAME`: Name used in logs and metric labels (default: `ip-guard`)
//!
//! # Server & Observability
//!
//! - `HOST` / `PORT`: Bind address (default: `0.0.0.0:3000`)
//! - `METRICS_PORT`: Prometheus listener port, `0` disables (default: 9090)
//! - `RUST_LOG`: Log filter (default: `info`)

use std::env;

use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::{AllowList, DEFAULT_GUARD_NAME, TrustPolicy};

/// Typed access guard options.
///
/// Field names on the wire follow the middleware's configuration keys, so a
/// host can decode this from JSON, TOML, or YAML:
///
/// ```json
/// {
///   "sourceRange": ["10.0.0.0/8", "192.168.0.0/16"],
///   "xForwardedFor": false,
///   "proxy": true,
///   "xRealIPHeader": "X-Real-IP"
/// }
/// ```
///
/// `allowedIPs` is accepted as an alias for `sourceRange`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GuardConfig {
    /// CIDR ranges (or bare addresses) allowed through the guard.
    #[serde(rename = "sourceRange", alias = "allowedIPs", default)]
    pub source_range: Vec<String>,

    /// Resolve the client address from `X-Forwarded-For`.
    #[serde(rename = "xForwardedFor", default)]
    pub x_forwarded_for: bool,

    /// Deployment sits behind a proxy that sets `x_real_ip_header`.
    #[serde(default)]
    pub proxy: bool,

    /// Header consulted first when `proxy` is enabled.
    #[serde(rename = "xRealIPHeader", default)]
    pub x_real_ip_header: Option<String>,
}

impl GuardConfig {
    /// Check that the options would build a guard.
    ///
    /// # Errors
    ///
    /// Returns the [`GuardError`](crate::error::GuardError) a guard built from
    /// these options would fail with.
    pub fn validate(&self) -> AppResult<()> {
        AllowList::parse(&self.source_range)?;
        TrustPolicy::new(
            self.x_forwarded_for,
            self.proxy,
            self.x_real_ip_header.as_deref(),
        )?;
        Ok(())
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // =========================================================================
    // Server Configuration
    // =========================================================================
    /// Server host address (default: "0.0.0.0")
    pub host: String,

    /// Server port (default: 3000)
    pub port: u16,

    // =========================================================================
    // Access Guard Configuration
    // =========================================================================
    /// Allow-list and trust policy for guarded routes
    pub guard: GuardConfig,

    /// Guard instance name for logs and metrics
    pub guard_name: String,

    // =========================================================================
    // Observability Configuration
    // =========================================================================
    /// Log level (e.g., "info", "debug", "trace")
    pub log_level: String,

    /// Port for Prometheus metrics endpoint (default: 9090, 0 = disabled)
    pub metrics_port: u16,
}

impl Config {
    /// Load configuration from environment variables with sensible defaults.
    ///
    /// # Errors
    ///
    /// Returns `AppError::ConfigError` for unparseable values and
    /// `AppError::Guard` for an allow-list or header name that cannot build a guard.
    pub fn from_env() -> AppResult<Self> {
        // Load an .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let source_range = pick_source_range(
            env::var("ALLOWED_IPS").ok(),
            env::var("SOURCE_RANGE").ok(),
        );

        let config = Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: Self::parse_env("PORT", 3000)?,

            guard: GuardConfig {
                source_range,
                x_forwarded_for: Self::parse_flag("TRUST_X_FORWARDED_FOR", false)?,
                proxy: Self::parse_flag("BEHIND_PROXY", false)?,
                x_real_ip_header: env::var("X_REAL_IP_HEADER")
                    .ok()
                    .filter(|h| !h.trim().is_empty()),
            },
            guard_name: env::var("GUARD_NAME")
                .ok()
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| DEFAULT_GUARD_NAME.to_string()),

            log_level: env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            metrics_port: Self::parse_env("METRICS_PORT", 9090)?,
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values for consistency and correctness.
    fn validate(&self) -> AppResult<()> {
        if self.guard.proxy && self.guard.x_real_ip_header.is_none() {
            return Err(AppError::ConfigError(
                "BEHIND_PROXY requires X_REAL_IP_HEADER".to_string(),
            ));
        }

        if self.guard_name.chars().any(char::is_whitespace) {
            return Err(AppError::ConfigError(format!(
                "GUARD_NAME must not contain whitespace: {:?}",
                self.guard_name
            )));
        }

        self.guard.validate()
    }

    /// Get the full server address for binding.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check if Prometheus metrics export is enabled.
    pub fn metrics_enabled(&self) -> bool {
        self.metrics_port > 0
    }

    /// Get the metrics endpoint address.
    ///
    /// Returns `None` if metrics are disabled (port = 0).
    pub fn metrics_addr(&self) -> Option<std::net::SocketAddr> {
        self.metrics_enabled()
            .then(|| std::net::SocketAddr::from(([0, 0, 0, 0], self.metrics_port)))
    }

    /// Parse an environment variable into the specified type with a default value.
    fn parse_env<T>(name: &str, default: T) -> AppResult<T>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        match env::var(name) {
            Ok(val) => val
                .parse()
                .map_err(|e| AppError::ConfigError(format!("Invalid {name}: {e}"))),
            Err(_) => Ok(default),
        }
    }

    /// Parse a boolean environment variable.
    fn parse_flag(name: &str, default: bool) -> AppResult<bool> {
        match env::var(name) {
            Ok(val) => parse_flag_value(name, &val),
            Err(_) => Ok(default),
        }
    }
}

/// Default configuration for testing and development.
///
/// The default allow-list is empty, so guarded routes deny everything.
impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            guard: GuardConfig::default(),
            guard_name: DEFAULT_GUARD_NAME.to_string(),
            log_level: "info".to_string(),
            metrics_port: 9090,
        }
    }
}

/// Split a comma-separated list, dropping blank items.
fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// `ALLOWED_IPS` wins over `SOURCE_RANGE` unless it is blank.
fn pick_source_range(allowed_ips: Option<String>, source_range: Option<String>) -> Vec<String> {
    allowed_ips
        .filter(|v| !v.trim().is_empty())
        .or(source_range)
        .map(|v| split_list(&v))
        .unwrap_or_default()
}

fn parse_flag_value(name: &str, value: &str) -> AppResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(AppError::ConfigError(format!(
            "Invalid {name}: expected a boolean, got {other:?}"
        ))),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::error::GuardError;

    #[test]
    fn test_default_config_values() {
        let config = Config::default();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.guard_name, "ip-guard");
        assert!(config.guard.source_range.is_empty());
        assert!(!config.guard.x_forwarded_for);
        assert!(!config.guard.proxy);
    }

    #[test]
    fn test_server_addr_format() {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 8080,
            ..Config::default()
        };

        assert_eq!(config.server_addr(), "127.0.0.1:8080");
    }

    #[test]
    fn test_metrics_addr_disabled() {
        let config = Config {
            metrics_port: 0,
            ..Config::default()
        };
        assert!(config.metrics_addr().is_none());
        assert_eq!(Config::default().metrics_addr().unwrap().port(), 9090);
    }

    #[test]
    fn test_validate_proxy_requires_header() {
        let config = Config {
            guard: GuardConfig {
                proxy: true,
                ..GuardConfig::default()
            },
            ..Config::default()
        };

        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("X_REAL_IP_HEADER"));
    }

    #[test]
    fn test_validate_bad_cidr() {
        let config = Config {
            guard: GuardConfig {
                source_range: vec!["10.0.0.0/8".to_string(), "10.0.0.0/99".to_string()],
                ..GuardConfig::default()
            },
            ..Config::default()
        };

        let err = config.validate().unwrap_err();
        assert!(matches!(err, AppError::Guard(GuardError::InvalidCidr { .. })));
        assert!(err.to_string().contains("10.0.0.0/99"));
    }

    #[test]
    fn test_validate_valid_config() {
        let config = Config {
            guard: GuardConfig {
                source_range: vec!["10.0.0.0/8".to_string()],
                proxy: true,
                x_real_ip_header: Some("X-Real-IP".to_string()),
                ..GuardConfig::default()
            },
            ..Config::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_split_list() {
        assert_eq!(
            split_list(" 10.0.0.0/8, ,192.168.0.0/16 ,"),
            vec!["10.0.0.0/8".to_string(), "192.168.0.0/16".to_string()]
        );
        assert!(split_list("").is_empty());
    }

    #[test]
    fn test_pick_source_range() {
        let some = |v: &str| Some(v.to_string());

        assert_eq!(
            pick_source_range(some("10.0.0.0/8"), some("192.168.0.0/16")),
            vec!["10.0.0.0/8".to_string()]
        );
        assert_eq!(
            pick_source_range(some("  "), some("192.168.0.0/16")),
            vec!["192.168.0.0/16".to_string()]
        );
        assert_eq!(
            pick_source_range(None, some("192.168.0.0/16")),
            vec!["192.168.0.0/16".to_string()]
        );
        assert!(pick_source_range(some(""), None).is_empty());
        assert!(pick_source_range(None, None).is_empty());
    }

    #[test]
    fn test_parse_flag_value() {
        assert!(parse_flag_value("X", "true").unwrap());
        assert!(parse_flag_value("X", "1").unwrap());
        assert!(parse_flag_value("X", "YES").unwrap());
        assert!(!parse_flag_value("X", "off").unwrap());
        assert!(!parse_flag_value("X", "").unwrap());
        assert!(parse_flag_value("X", "maybe").is_err());
    }

    #[test]
    fn test_guard_config_deserialize() {
        let config: GuardConfig = serde_json::from_str(
            r#"{
                "sourceRange": ["10.0.0.0/8"],
                "xForwardedFor": true,
                "proxy": true,
                "xRealIPHeader": "X-Real-IP"
            }"#,
        )
        .unwrap();

        assert_eq!(config.source_range, vec!["10.0.0.0/8".to_string()]);
        assert!(config.x_forwarded_for);
        assert!(config.proxy);
        assert_eq!(config.x_real_ip_header.as_deref(), Some("X-Real-IP"));
    }

    #[test]
    fn test_guard_config_allowed_ips_alias() {
        let config: GuardConfig =
            serde_json::from_str(r#"{"allowedIPs": ["192.168.0.0/16"]}"#).unwrap();

        assert_eq!(config.source_range, vec!["192.168.0.0/16".to_string()]);
        assert!(!config.x_forwarded_for);
        assert!(config.x_real_ip_header.is_none());
    }

    #[test]
    fn test_guard_config_rejects_unknown_fields() {
        let result = serde_json::from_str::<GuardConfig>(r#"{"sourceRanges": []}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_guard_config_validate() {
        let ok = GuardConfig {
            source_range: vec!["::1/128".to_string()],
            ..GuardConfig::default()
        };
        assert!(ok.validate().is_ok());

        let bad = GuardConfig {
            source_range: vec!["nope".to_string()],
            ..GuardConfig::default()
        };
        assert!(bad.validate().is_err());
    }
}
