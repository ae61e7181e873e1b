//! API endpoint configuration.
//!
//! Describes where the transport layer posts signed calls. Credentials and
//! signing keys are deliberately not part of this struct.

use thiserror::Error;
use url::Url;

/// Host of the test environment.
pub const DEFAULT_HOST: &str = "test.trustly.com";

/// Host of the production environment.
pub const PRODUCTION_HOST: &str = "trustly.com";

/// Path of the JSON-RPC 1.1 endpoint.
pub const DEFAULT_API_PATH: &str = "/api/1";

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while building or loading an [`ApiConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable held a value that could not be parsed.
    #[error("invalid value for {name}: {value:?}")]
    InvalidEnv { name: &'static str, value: String },

    /// The configured parts do not form a valid URL.
    #[error("invalid endpoint url: {0}")]
    Url(#[from] url::ParseError),
}

/// Endpoint configuration for the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Host name of the API.
    pub host: String,

    /// TCP port.
    pub port: u16,

    /// Whether to talk HTTPS.
    pub is_https: bool,

    /// Path of the JSON-RPC endpoint on the host.
    pub api_path: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: 443,
            is_https: true,
            api_path: DEFAULT_API_PATH.to_string(),
        }
    }
}

impl ApiConfig {
    /// Creates a configuration for the given host with default settings.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Default::default()
        }
    }

    /// Configuration for the production environment.
    pub fn production() -> Self {
        Self::new(PRODUCTION_HOST)
    }

    /// Builder: set the port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Builder: toggle HTTPS.
    pub fn with_https(mut self, is_https: bool) -> Self {
        self.is_https = is_https;
        self
    }

    /// Builder: set the endpoint path.
    pub fn with_api_path(mut self, path: impl Into<String>) -> Self {
        self.api_path = path.into();
        self
    }

    /// Loads the configuration from `TRUSTLY_HOST`, `TRUSTLY_PORT` and
    /// `TRUSTLY_HTTPS`, falling back to defaults for unset variables.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup("TRUSTLY_HOST") {
            config.host = host;
        }

        if let Some(port) = lookup("TRUSTLY_PORT") {
            config.port = port.parse().map_err(|_| ConfigError::InvalidEnv {
                name: "TRUSTLY_PORT",
                value: port.clone(),
            })?;
        }

        if let Some(https) = lookup("TRUSTLY_HTTPS") {
            config.is_https = match https.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                _ => {
                    return Err(ConfigError::InvalidEnv {
                        name: "TRUSTLY_HTTPS",
                        value: https,
                    });
                }
            };
        }

        Ok(config)
    }

    /// Whether this points at the production environment.
    pub fn is_production(&self) -> bool {
        self.host == PRODUCTION_HOST
    }

    fn scheme(&self) -> &'static str {
        if self.is_https { "https" } else { "http" }
    }

    /// Full URL of the JSON-RPC endpoint.
    ///
    /// The port is left out when it is the default for the scheme.
    pub fn endpoint_url(&self) -> ConfigResult<Url> {
        let base = format!("{}://{}:{}", self.scheme(), self.host, self.port);
        let url = Url::parse(&base)?.join(&self.api_path)?;
        Ok(url)
    }
}
