use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Process-wide configuration, loaded once at startup from `SVIP_*`
/// environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Path to the store master JSON file read once at startup.
    pub store_master_path: PathBuf,
    pub inspector_timeout_secs: u64,
    pub inspector_user_agent: String,
    /// Lower bound (inclusive) of the simulated processing delay.
    pub inspector_delay_min_ms: u64,
    /// Upper bound (exclusive) of the simulated processing delay.
    /// Equal to `inspector_delay_min_ms` disables the delay entirely.
    pub inspector_delay_max_ms: u64,
}
