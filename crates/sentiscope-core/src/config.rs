use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a variable holds an invalid value, or if the
/// neural backend is enabled in production without a classifier URL.
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
/// Returns `ConfigError` if a variable holds an invalid value.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can drive it from a
/// `HashMap` without `set_var`/`remove_var`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_flag = |var: &str, default: bool| -> Result<bool, ConfigError> {
        match lookup(var) {
            Ok(raw) => parse_bool(&raw).ok_or_else(|| {
                invalid(var, format!("expected true/false, got '{raw}'"))
            }),
            Err(_) => Ok(default),
        }
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let env = parse_environment(&or_default("SENTISCOPE_ENV", "development"))?;
    let bind_addr = parse_addr("SENTISCOPE_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("SENTISCOPE_LOG_LEVEL", "info");

    let enable_vader = parse_flag("SENTISCOPE_ENABLE_VADER", true)?;
    let enable_neural = parse_flag("SENTISCOPE_ENABLE_NEURAL", true)?;
    let enable_domain = parse_flag("SENTISCOPE_ENABLE_DOMAIN", true)?;

    let classifier_url = optional("SENTISCOPE_CLASSIFIER_URL");
    if env == Environment::Production && enable_neural && classifier_url.is_none() {
        return Err(ConfigError::MissingEnvVar(
            "SENTISCOPE_CLASSIFIER_URL".to_string(),
        ));
    }
    let classifier_timeout_secs = parse_u64("SENTISCOPE_CLASSIFIER_TIMEOUT_SECS", "30")?;
    if classifier_timeout_secs == 0 {
        return Err(invalid(
            "SENTISCOPE_CLASSIFIER_TIMEOUT_SECS",
            "must be greater than zero".to_string(),
        ));
    }
    let classifier_user_agent = or_default(
        "SENTISCOPE_CLASSIFIER_USER_AGENT",
        "sentiscope/0.1 (sentiment-aggregation)",
    );
    let domain_lexicon_path = optional("SENTISCOPE_DOMAIN_LEXICON_PATH").map(PathBuf::from);

    let fail_fast = parse_flag("SENTISCOPE_FAIL_FAST", false)?;
    let rate_limit_per_minute = parse_usize("SENTISCOPE_RATE_LIMIT_PER_MINUTE", "120")?;
    if rate_limit_per_minute == 0 {
        return Err(invalid(
            "SENTISCOPE_RATE_LIMIT_PER_MINUTE",
            "must be greater than zero".to_string(),
        ));
    }

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        enable_vader,
        enable_neural,
        enable_domain,
        classifier_url,
        classifier_timeout_secs,
        classifier_user_agent,
        domain_lexicon_path,
        fail_fast,
        rate_limit_per_minute,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "production" => Ok(Environment::Production),
        "test" => Ok(Environment::Test),
        other => Err(ConfigError::InvalidEnvVar {
            var: "SENTISCOPE_ENV".to_string(),
            reason: format!("expected development, test, or production; got '{other}'"),
        }),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
