use std::fmt;

use crate::providers::consul::ConsulError;

pub const DEFAULT_ADDRESS: &str = "127.0.0.1:8500";

pub const HTTP_ADDR_ENV: &str = "CONSUL_HTTP_ADDR";
pub const HTTP_TOKEN_ENV: &str = "CONSUL_HTTP_TOKEN";
pub const LEGACY_TOKEN_ENV: &str = "CONSUL_TOKEN";
pub const HTTP_SSL_ENV: &str = "CONSUL_HTTP_SSL";
pub const DATACENTER_ENV: &str = "CONSUL_DATACENTER";

/// Connection settings shared by every request a [`ConsulClient`] makes.
///
/// [`ConsulClient`]: crate::providers::consul::ConsulClient
#[derive(Clone, PartialEq)]
pub struct ClientConfig {
    /// `host:port`, without scheme.
    pub address: String,
    pub scheme: String,
    pub token: Option<String>,
    pub datacenter: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_string(),
            scheme: "http".to_string(),
            token: None,
            datacenter: None,
        }
    }
}

impl ClientConfig {
    /// Builds a config from an address that may carry an `http://` or
    /// `https://` prefix.
    pub fn with_address(address: &str) -> Result<Self, ConsulError> {
        let mut config = Self::default();
        config.set_address(address)?;
        Ok(config)
    }

    pub fn set_address(&mut self, address: &str) -> Result<(), ConsulError> {
        let address = address.trim();

        let (scheme, host) = if let Some(rest) = address.strip_prefix("https://") {
            (Some("https"), rest)
        } else if let Some(rest) = address.strip_prefix("http://") {
            (Some("http"), rest)
        } else if address.starts_with("unix://") {
            return Err(ConsulError::InvalidAddress {
                address: address.to_string(),
                message: "unix sockets are not supported".to_string(),
            });
        } else {
            (None, address)
        };
        let host = host.trim_end_matches('/');

        if host.is_empty() {
            return Err(ConsulError::InvalidAddress {
                address: address.to_string(),
                message: "empty host".to_string(),
            });
        }

        if let Some(scheme) = scheme {
            self.scheme = scheme.to_string();
        }
        self.address = host.to_string();
        Ok(())
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.is_empty());
        self
    }

    pub fn with_datacenter(mut self, datacenter: Option<String>) -> Self {
        self.datacenter = datacenter.filter(|dc| !dc.is_empty());
        self
    }

    pub fn base_url(&self) -> String {
        format!("{}://{}", self.scheme, self.address)
    }

    pub fn from_env() -> Result<Self, ConsulError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`] with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConsulError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        let ssl = lookup(HTTP_SSL_ENV).unwrap_or_default();
        if matches!(ssl.to_ascii_lowercase().as_str(), "1" | "true" | "yes") {
            config.scheme = "https".to_string();
        }

        if let Some(address) = lookup(HTTP_ADDR_ENV).filter(|a| !a.is_empty()) {
            config.set_address(&address)?;
        }

        let token = lookup(HTTP_TOKEN_ENV)
            .filter(|t| !t.is_empty())
            .or_else(|| lookup(LEGACY_TOKEN_ENV));

        Ok(config
            .with_token(token)
            .with_datacenter(lookup(DATACENTER_ENV)))
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("address", &self.address)
            .field("scheme", &self.scheme)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("datacenter", &self.datacenter)
            .finish()
    }
}
