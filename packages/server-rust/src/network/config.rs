//! Network configuration types for the `opserve` HTTP server.

use std::time::Duration;

/// Errors reported by [`NetworkConfig::validate`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("missing addr")]
    MissingAddr,
    #[error("missing port")]
    MissingPort,
    #[error("max body size must be greater than zero")]
    ZeroBodyLimit,
}

/// Top-level network configuration for the server.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Bind address for the server.
    pub host: String,
    /// Port to listen on. 0 means OS-assigned.
    pub port: u16,
    /// Maximum time to wait for a request to complete.
    pub request_timeout: Duration,
    /// Largest request body accepted, in bytes.
    pub max_body_bytes: usize,
}

impl NetworkConfig {
    /// Checks a configuration meant for a long-running server.
    ///
    /// Port 0 is accepted by [`RestServer::start`](super::RestServer::start)
    /// for tests, but a deployed server must name its port.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.is_empty() {
            return Err(ConfigError::MissingAddr);
        }
        if self.port == 0 {
            return Err(ConfigError::MissingPort);
        }
        if self.max_body_bytes == 0 {
            return Err(ConfigError::ZeroBodyLimit);
        }
        Ok(())
    }

    /// `host:port` string suitable for binding.
    #[must_use]
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 0,
            request_timeout: Duration::from_secs(30),
            max_body_bytes: 2 * 1024 * 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deployable() -> NetworkConfig {
        NetworkConfig {
            port: 8080,
            ..NetworkConfig::default()
        }
    }

    #[test]
    fn network_config_defaults() {
        let config = NetworkConfig::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 0);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.max_body_bytes, 2_097_152);
    }

    #[test]
    fn validate_accepts_complete_config() {
        assert_eq!(deployable().validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_missing_addr() {
        let config = NetworkConfig {
            host: String::new(),
            ..deployable()
        };
        assert_eq!(config.validate(), Err(ConfigError::MissingAddr));
        assert_eq!(ConfigError::MissingAddr.to_string(), "missing addr");
    }

    #[test]
    fn validate_rejects_missing_port() {
        let config = NetworkConfig::default();
        assert_eq!(config.validate(), Err(ConfigError::MissingPort));
    }

    #[test]
    fn validate_rejects_zero_body_limit() {
        let config = NetworkConfig {
            max_body_bytes: 0,
            ..deployable()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroBodyLimit));
    }

    #[test]
    fn addr_joins_host_and_port() {
        assert_eq!(deployable().addr(), "0.0.0.0:8080");
    }
}
