//! Client configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default connect timeout in milliseconds
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 3_000;
/// Default response header timeout in milliseconds
pub const DEFAULT_RESPONSE_HEADER_TIMEOUT_MS: u64 = 5_000;
/// Default total request timeout in milliseconds
pub const DEFAULT_TOTAL_TIMEOUT_MS: u64 = 30_000;

/// Env var overriding [`ClientOptions::connect_timeout_ms`]
pub const ENV_FLUENT_HTTP_CONNECT_TIMEOUT_MS: &str = "FLUENT_HTTP_CONNECT_TIMEOUT_MS";
/// Env var overriding [`ClientOptions::response_header_timeout_ms`]
pub const ENV_FLUENT_HTTP_RESPONSE_HEADER_TIMEOUT_MS: &str =
    "FLUENT_HTTP_RESPONSE_HEADER_TIMEOUT_MS";
/// Env var overriding [`ClientOptions::total_timeout_ms`]
pub const ENV_FLUENT_HTTP_TOTAL_TIMEOUT_MS: &str = "FLUENT_HTTP_TOTAL_TIMEOUT_MS";
/// Env var overriding [`ClientOptions::proxy`]
pub const ENV_FLUENT_HTTP_PROXY: &str = "FLUENT_HTTP_PROXY";

/// Transport configuration.
///
/// Every field has a default, so a partial table in a config file is enough:
///
/// ```toml
/// [http]
/// total_timeout_ms = 10000
/// proxy = "socks5://127.0.0.1:9050"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientOptions {
    /// Bound on establishing the connection
    pub connect_timeout_ms: u64,
    /// Bound on waiting for the response headers
    pub response_header_timeout_ms: u64,
    /// Bound on the whole request/response cycle, body included
    pub total_timeout_ms: u64,
    /// Proxy URL; `None` or an empty string connects directly
    pub proxy: Option<String>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            response_header_timeout_ms: DEFAULT_RESPONSE_HEADER_TIMEOUT_MS,
            total_timeout_ms: DEFAULT_TOTAL_TIMEOUT_MS,
            proxy: None,
        }
    }
}

impl ClientOptions {
    /// Options from explicit millisecond values and a proxy string
    pub fn new(
        connect_timeout_ms: u64,
        response_header_timeout_ms: u64,
        total_timeout_ms: u64,
        proxy: &str,
    ) -> Self {
        Self {
            connect_timeout_ms,
            response_header_timeout_ms,
            total_timeout_ms,
            proxy: (!proxy.is_empty()).then(|| proxy.to_string()),
        }
    }

    /// Config from env
    pub fn from_env(mut self) -> Self {
        use std::env;

        if let Ok(value) = env::var(ENV_FLUENT_HTTP_CONNECT_TIMEOUT_MS) {
            if let Ok(ms) = value.parse() {
                self.connect_timeout_ms = ms;
            }
        }

        if let Ok(value) = env::var(ENV_FLUENT_HTTP_RESPONSE_HEADER_TIMEOUT_MS) {
            if let Ok(ms) = value.parse() {
                self.response_header_timeout_ms = ms;
            }
        }

        if let Ok(value) = env::var(ENV_FLUENT_HTTP_TOTAL_TIMEOUT_MS) {
            if let Ok(ms) = value.parse() {
                self.total_timeout_ms = ms;
            }
        }

        if let Ok(proxy) = env::var(ENV_FLUENT_HTTP_PROXY) {
            self.proxy = (!proxy.is_empty()).then_some(proxy);
        }

        self
    }

    /// The three deadlines as durations
    pub fn timeouts(&self) -> Timeouts {
        Timeouts {
            connect: Duration::from_millis(self.connect_timeout_ms),
            response_header: Duration::from_millis(self.response_header_timeout_ms),
            total: Duration::from_millis(self.total_timeout_ms),
        }
    }
}

/// Connect, response header and total deadlines of a client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// Connect timeout
    pub connect: Duration,
    /// Response header timeout
    pub response_header: Duration,
    /// Total timeout
    pub total: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        ClientOptions::default().timeouts()
    }
}
