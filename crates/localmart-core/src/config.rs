use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Parsing is decoupled from the process environment so tests can feed a
/// plain `HashMap` instead of mutating env vars.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
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

    let database_url = require("DATABASE_URL")?;
    let api_key_hash_salt = lookup("LOCALMART_API_KEY_HASH_SALT").ok();

    let env = parse_environment(&or_default("LOCALMART_ENV", "development"))?;

    let bind_addr = parse("LOCALMART_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("LOCALMART_LOG_LEVEL", "info");
    let seed_path = PathBuf::from(or_default("LOCALMART_SEED_PATH", "./config/seed.yaml"));

    let db_max_connections = parse_u32("LOCALMART_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("LOCALMART_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("LOCALMART_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let catalog_debounce_ms = parse_u64("LOCALMART_CATALOG_DEBOUNCE_MS", "400")?;
    let unscoped_catalog_limit = parse_u32("LOCALMART_UNSCOPED_CATALOG_LIMIT", "40")?;
    if unscoped_catalog_limit == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "LOCALMART_UNSCOPED_CATALOG_LIMIT".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        seed_path,
        api_key_hash_salt,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        catalog_debounce_ms,
        unscoped_catalog_limit: i64::from(unscoped_catalog_limit),
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "LOCALMART_ENV".to_string(),
            reason: format!("expected development, test, or production; got '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
