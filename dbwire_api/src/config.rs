//! Connection configuration: endpoint, credentials, timeouts and the
//! optional diagnostic logger.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use url::Url;

use crate::diagnostics::{Logger, StderrLogger};
use crate::errors::ConfigError;

/// Environment variable that forces wire diagnostics to standard error.
pub const DEBUG_ENV: &str = "DBWIRE_DEBUG";

const DEFAULT_SCHEME: &str = "https";
const DEFAULT_DOMAIN: &str = "localhost";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Username and password for HTTP Basic authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// Splits a secret token on its first `:`. A token without a colon is
    /// all username with an empty password.
    pub fn from_secret(secret: &str) -> Self {
        let (username, password) = secret.split_once(':').unwrap_or((secret, ""));
        Self {
            username: username.to_string(),
            password: password.to_string(),
        }
    }
}

impl fmt::Display for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.username, self.password)
    }
}

/// Settings for a [`Connection`](crate::Connection). Immutable once the
/// connection is built.
#[derive(Clone)]
pub struct ConnectionConfig {
    pub scheme: String,
    pub domain: String,
    /// Explicit port. `None` resolves to 443 for `https` and 80 otherwise.
    pub port: Option<u16>,
    /// Secret token, split into Basic auth credentials.
    pub secret: Option<String>,
    /// Ceiling for a whole request.
    pub timeout: Duration,
    /// Ceiling for establishing the TCP/TLS connection.
    pub connect_timeout: Duration,
    pub logger: Option<Arc<dyn Logger>>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            scheme: DEFAULT_SCHEME.to_string(),
            domain: DEFAULT_DOMAIN.to_string(),
            port: None,
            secret: None,
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            logger: None,
        }
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("scheme", &self.scheme)
            .field("domain", &self.domain)
            .field("port", &self.port)
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .field("connect_timeout", &self.connect_timeout)
            .field("logger", &self.logger.is_some())
            .finish()
    }
}

impl ConnectionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads `DBWIRE_SCHEME`, `DBWIRE_DOMAIN`, `DBWIRE_PORT`, `DBWIRE_SECRET`,
    /// `DBWIRE_TIMEOUT` and `DBWIRE_CONNECT_TIMEOUT` over the defaults.
    /// Timeouts are whole seconds.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(scheme) = lookup("DBWIRE_SCHEME") {
            config.scheme = scheme;
        }
        if let Some(domain) = lookup("DBWIRE_DOMAIN") {
            config.domain = domain;
        }
        if let Some(port) = lookup("DBWIRE_PORT") {
            config.port = Some(parse_env("DBWIRE_PORT", port)?);
        }
        if let Some(secret) = lookup("DBWIRE_SECRET") {
            config.secret = Some(secret);
        }
        if let Some(secs) = lookup("DBWIRE_TIMEOUT") {
            config.timeout = Duration::from_secs(parse_env("DBWIRE_TIMEOUT", secs)?);
        }
        if let Some(secs) = lookup("DBWIRE_CONNECT_TIMEOUT") {
            config.connect_timeout =
                Duration::from_secs(parse_env("DBWIRE_CONNECT_TIMEOUT", secs)?);
        }
        Ok(config)
    }

    pub fn with_scheme(mut self, scheme: &str) -> Self {
        self.scheme = scheme.to_string();
        self
    }

    pub fn with_domain(mut self, domain: &str) -> Self {
        self.domain = domain.to_string();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_secret(mut self, secret: &str) -> Self {
        self.secret = Some(secret.to_string());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// The effective port: explicit if set, else by scheme.
    pub fn port(&self) -> u16 {
        self.port.unwrap_or(if self.scheme == "https" { 443 } else { 80 })
    }

    pub fn credentials(&self) -> Option<Credentials> {
        self.secret.as_deref().map(Credentials::from_secret)
    }

    /// `scheme://domain:port/`, the URL every resource path is joined onto.
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        let raw = format!("{}://{}:{}/", self.scheme, self.domain, self.port());
        Url::parse(&raw).map_err(|e| {
            tracing::error!("Invalid endpoint {}: {}", raw, e);
            ConfigError::InvalidEndpoint(raw)
        })
    }
}

/// Applies the debug-flag precedence rule: when the flag is set, a stderr
/// logger replaces whatever logger was configured.
pub fn resolve_logger(
    configured: Option<Arc<dyn Logger>>,
    debug_flag: bool,
) -> Option<Arc<dyn Logger>> {
    if debug_flag {
        Some(Arc::new(StderrLogger))
    } else {
        configured
    }
}

/// Whether the process environment asks for forced diagnostics. Any
/// non-empty value counts.
pub fn debug_flag_set() -> bool {
    std::env::var_os(DEBUG_ENV).is_some_and(|v| !v.is_empty())
}

fn parse_env<T: std::str::FromStr>(name: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidEnv { name, value })
}
