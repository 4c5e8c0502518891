use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{Ipv4Addr, SocketAddr};

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub callback: CallbackConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub password: PasswordConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,
    /// Largest accepted event body
    #[serde(default = "default_max_event_bytes")]
    pub max_event_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            max_event_bytes: default_max_event_bytes(),
        }
    }
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from((Ipv4Addr::UNSPECIFIED, 8080))
}

fn default_max_event_bytes() -> usize {
    256 * 1024
}

/// Response URL delivery settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CallbackConfig {
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for CallbackConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: default_connect_timeout_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_connect_timeout_ms() -> u64 {
    10_000
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

fn default_user_agent() -> String {
    concat!("cfntoolkit/", env!("CARGO_PKG_VERSION")).to_string()
}

/// Which collaborator implementations to use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendProvider {
    #[default]
    Memory,
    Aws,
}

impl fmt::Display for BackendProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendProvider::Memory => f.write_str("memory"),
            BackendProvider::Aws => f.write_str("aws"),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BackendConfig {
    #[serde(default)]
    pub provider: BackendProvider,
    /// Region override; the SDK's default chain is used when absent
    pub region: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PasswordConfig {
    /// Entropy in bits used when an event does not specify one
    #[serde(default = "default_entropy")]
    pub default_entropy: u32,
    /// Largest `Size` a `Custom::SecureRandom` event may request
    #[serde(default = "default_max_random_bytes")]
    pub max_random_bytes: usize,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            default_entropy: default_entropy(),
            max_random_bytes: default_max_random_bytes(),
        }
    }
}

fn default_entropy() -> u32 {
    48
}

fn default_max_random_bytes() -> usize {
    64 * 1024
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelemetryConfig {
    /// `tracing_subscriber::EnvFilter` directive; `RUST_LOG` takes precedence
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter(),
        }
    }
}

fn default_log_filter() -> String {
    "info".to_string()
}
