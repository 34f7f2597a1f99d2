//! Service tunables loaded via OrthoConfig.
//!
//! Numeric tunables carry their defaults in the derive; only the bind
//! address is optional. CRM credentials are not read here, see
//! [`crate::crm_config`].

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::{MAX_TOKEN_TTL, PollerConfig};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Errors raised while interpreting loaded settings.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum SettingsError {
    /// The bind address is not `host:port`.
    #[error("invalid NIGHTDESK_BIND_ADDR '{value}': {message}")]
    BindAddr { value: String, message: String },
    /// A duration setting is zero where a positive value is required.
    #[error("{name} must be greater than zero")]
    ZeroDuration { name: &'static str },
    /// A duration setting exceeds its upper bound.
    #[error("{name} must not exceed {max_secs} seconds")]
    TooLong { name: &'static str, max_secs: u64 },
}

/// Process-level settings with the `NIGHTDESK_` prefix.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "NIGHTDESK")]
pub struct ServiceSettings {
    /// Socket address the HTTP server binds to.
    pub bind_addr: Option<String>,
    /// Base delay between dashboard refresh cycles.
    #[ortho_config(default = 30)]
    pub poll_interval_secs: u64,
    /// Settle delay between a write and its reconcile fetch.
    #[ortho_config(default = 1000)]
    pub reconcile_delay_ms: u64,
    /// Ceiling for backed-off poll delays.
    #[ortho_config(default = 300)]
    pub poll_max_backoff_secs: u64,
    /// Timeout applied to every CRM HTTP request.
    #[ortho_config(default = 30)]
    pub request_timeout_secs: u64,
    /// Local lifetime of a cached CRM token.
    #[ortho_config(default = 3000)]
    pub token_ttl_secs: u64,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            bind_addr: None,
            poll_interval_secs: 30,
            reconcile_delay_ms: 1_000,
            poll_max_backoff_secs: 300,
            request_timeout_secs: 30,
            token_ttl_secs: 3_000,
        }
    }
}

impl ServiceSettings {
    /// Return the bind address, falling back to `0.0.0.0:8080`.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::BindAddr`] when the value does not parse.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|error: std::net::AddrParseError| SettingsError::BindAddr {
            value: raw.to_owned(),
            message: error.to_string(),
        })
    }

    /// Timing for the refresh poller.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::ZeroDuration`] for a zero poll interval.
    pub fn poller(&self) -> Result<PollerConfig, SettingsError> {
        if self.poll_interval_secs == 0 {
            return Err(SettingsError::ZeroDuration {
                name: "NIGHTDESK_POLL_INTERVAL_SECS",
            });
        }
        Ok(PollerConfig {
            interval: Duration::from_secs(self.poll_interval_secs),
            reconcile_delay: Duration::from_millis(self.reconcile_delay_ms),
            max_backoff: Duration::from_secs(self.poll_max_backoff_secs),
        })
    }

    /// Timeout for CRM requests.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::ZeroDuration`] for a zero timeout.
    pub fn request_timeout(&self) -> Result<Duration, SettingsError> {
        match self.request_timeout_secs {
            0 => Err(SettingsError::ZeroDuration {
                name: "NIGHTDESK_REQUEST_TIMEOUT_SECS",
            }),
            secs => Ok(Duration::from_secs(secs)),
        }
    }

    /// Local token lifetime, bounded by [`MAX_TOKEN_TTL`].
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::ZeroDuration`] for a zero TTL and
    /// [`SettingsError::TooLong`] above the bound.
    pub fn token_ttl(&self) -> Result<Duration, SettingsError> {
        const NAME: &str = "NIGHTDESK_TOKEN_TTL_SECS";
        let ttl = Duration::from_secs(self.token_ttl_secs);
        if ttl.is_zero() {
            return Err(SettingsError::ZeroDuration { name: NAME });
        }
        if ttl > MAX_TOKEN_TTL {
            return Err(SettingsError::TooLong {
                name: NAME,
                max_secs: MAX_TOKEN_TTL.as_secs(),
            });
        }
        Ok(ttl)
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for service settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    use crate::domain::DEFAULT_TOKEN_TTL;

    const VARS: [&str; 6] = [
        "NIGHTDESK_BIND_ADDR",
        "NIGHTDESK_POLL_INTERVAL_SECS",
        "NIGHTDESK_RECONCILE_DELAY_MS",
        "NIGHTDESK_POLL_MAX_BACKOFF_SECS",
        "NIGHTDESK_REQUEST_TIMEOUT_SECS",
        "NIGHTDESK_TOKEN_TTL_SECS",
    ];

    fn load_from_empty_args() -> ServiceSettings {
        ServiceSettings::load_from_iter([OsString::from("nightdesk")])
            .expect("config should load")
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();

        assert_eq!(
            settings.bind_addr().expect("bind addr"),
            "0.0.0.0:8080".parse::<SocketAddr>().expect("addr")
        );
        assert_eq!(settings.poller().expect("poller"), PollerConfig::default());
        assert_eq!(
            settings.request_timeout().expect("timeout"),
            Duration::from_secs(30)
        );
        assert_eq!(settings.token_ttl().expect("ttl"), DEFAULT_TOKEN_TTL);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("NIGHTDESK_BIND_ADDR", Some("127.0.0.1:9090".to_owned())),
            ("NIGHTDESK_POLL_INTERVAL_SECS", Some("10".to_owned())),
            ("NIGHTDESK_RECONCILE_DELAY_MS", Some("250".to_owned())),
            ("NIGHTDESK_POLL_MAX_BACKOFF_SECS", Some("120".to_owned())),
            ("NIGHTDESK_REQUEST_TIMEOUT_SECS", Some("5".to_owned())),
            ("NIGHTDESK_TOKEN_TTL_SECS", Some("600".to_owned())),
        ]);

        let settings = load_from_empty_args();

        assert_eq!(
            settings.bind_addr().expect("bind addr").port(),
            9090
        );
        assert_eq!(
            settings.poller().expect("poller"),
            PollerConfig {
                interval: Duration::from_secs(10),
                reconcile_delay: Duration::from_millis(250),
                max_backoff: Duration::from_secs(120),
            }
        );
        assert_eq!(
            settings.request_timeout().expect("timeout"),
            Duration::from_secs(5)
        );
        assert_eq!(settings.token_ttl().expect("ttl"), Duration::from_secs(600));
    }

    #[rstest]
    fn malformed_bind_addr_is_reported() {
        let settings = ServiceSettings {
            bind_addr: Some("localhost".to_owned()),
            ..ServiceSettings::default()
        };

        let error = settings.bind_addr().expect_err("invalid addr");

        assert!(matches!(error, SettingsError::BindAddr { ref value, .. } if value == "localhost"));
    }

    #[rstest]
    fn zero_durations_are_rejected() {
        let settings = ServiceSettings {
            poll_interval_secs: 0,
            request_timeout_secs: 0,
            token_ttl_secs: 0,
            ..ServiceSettings::default()
        };

        assert!(settings.poller().is_err());
        assert!(settings.request_timeout().is_err());
        assert!(settings.token_ttl().is_err());
    }

    #[rstest]
    #[case(MAX_TOKEN_TTL.as_secs() + 1)]
    #[case(u64::MAX)]
    fn oversized_token_ttl_is_rejected(#[case] secs: u64) {
        let settings = ServiceSettings {
            token_ttl_secs: secs,
            ..ServiceSettings::default()
        };

        assert_eq!(
            settings.token_ttl(),
            Err(SettingsError::TooLong {
                name: "NIGHTDESK_TOKEN_TTL_SECS",
                max_secs: MAX_TOKEN_TTL.as_secs(),
            })
        );
    }

    #[rstest]
    fn token_ttl_defaults_to_shared_constant() {
        assert_eq!(
            ServiceSettings::default().token_ttl(),
            Ok(DEFAULT_TOKEN_TTL)
        );
    }
}
