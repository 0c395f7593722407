//! Client configuration
//!
//! The client is configured programmatically by the embedding application.
//! Validation happens once, at client construction, so a misconfigured
//! base URL or a zero timeout fails fast instead of surfacing as a
//! confusing transport error on the first request.

use std::time::Duration;

/// Default wall-clock budget for one request attempt
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for [`ApiClient`](crate::ApiClient)
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the portal backend, e.g. `https://portal.example.com/api`
    pub base_url: String,
    /// Wall-clock budget for one request attempt. Also bounds how long a
    /// caller waits on a shared refresh before giving up with `Timeout`.
    pub timeout: Duration,
    /// Leeway subtracted from a credential's decoded expiry when deciding
    /// whether it is expired. Zero means exact comparison: a credential is
    /// expired from the instant of its embedded deadline, not before.
    pub expiry_leeway: Duration,
}

impl ClientConfig {
    /// Configuration with default timeout and zero expiry leeway.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: DEFAULT_TIMEOUT,
            expiry_leeway: Duration::ZERO,
        }
    }

    /// Check invariants the request pipeline relies on.
    pub fn validate(&self) -> common::Result<()> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(common::Error::Config(format!(
                "base_url must start with http:// or https://, got: {}",
                self.base_url
            )));
        }

        if self.timeout.is_zero() {
            return Err(common::Error::Config(
                "timeout must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Absolute URL for an endpoint path (`/auth/login` and friends).
    pub(crate) fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_thirty_seconds_and_zero_leeway() {
        let config = ClientConfig::new("https://portal.example.com/api");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.expiry_leeway, Duration::ZERO);
    }

    #[test]
    fn valid_config_passes() {
        let config = ClientConfig::new("https://portal.example.com/api");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_base_url_without_scheme() {
        let config = ClientConfig::new("portal.example.com/api");
        let err = config.validate().unwrap_err();
        assert!(
            err.to_string().contains("base_url must start with http"),
            "error message should explain the issue, got: {err}"
        );
    }

    #[test]
    fn rejects_zero_timeout() {
        let mut config = ClientConfig::new("https://portal.example.com");
        config.timeout = Duration::ZERO;
        assert!(config.validate().is_err());
    }

    #[test]
    fn url_for_joins_without_doubled_slash() {
        let config = ClientConfig::new("https://portal.example.com/api/");
        assert_eq!(
            config.url_for("/auth/login"),
            "https://portal.example.com/api/auth/login"
        );

        let config = ClientConfig::new("https://portal.example.com/api");
        assert_eq!(
            config.url_for("/auth/login"),
            "https://portal.example.com/api/auth/login"
        );
    }
}
