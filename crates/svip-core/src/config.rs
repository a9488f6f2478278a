use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if any value fails to parse.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files — useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if any value fails to parse.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual environment
/// so it can be tested with a pure `HashMap` lookup — no `set_var`/`remove_var` needed.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let env = parse_environment(&or_default("SVIP_ENV", "development"));

    let bind_addr = parse_addr("SVIP_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("SVIP_LOG_LEVEL", "info");
    let store_master_path = PathBuf::from(or_default(
        "SVIP_STORE_MASTER_PATH",
        "./config/storeMaster.json",
    ));

    let inspector_timeout_secs = parse_u64("SVIP_INSPECTOR_TIMEOUT_SECS", "30")?;
    let inspector_user_agent = or_default(
        "SVIP_INSPECTOR_USER_AGENT",
        "svip/0.1 (store-visit-processing)",
    );
    let inspector_delay_min_ms = parse_u64("SVIP_INSPECTOR_DELAY_MIN_MS", "100")?;
    let inspector_delay_max_ms = parse_u64("SVIP_INSPECTOR_DELAY_MAX_MS", "400")?;

    if inspector_delay_max_ms < inspector_delay_min_ms {
        return Err(ConfigError::InvalidEnvVar {
            var: "SVIP_INSPECTOR_DELAY_MAX_MS".to_string(),
            reason: format!(
                "must be >= SVIP_INSPECTOR_DELAY_MIN_MS ({inspector_delay_min_ms})"
            ),
        });
    }

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        store_master_path,
        inspector_timeout_secs,
        inspector_user_agent,
        inspector_delay_min_ms,
        inspector_delay_max_ms,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}
