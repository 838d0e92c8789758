//! Application configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::AppError;
use crate::state::security_config::{
    SecurityConfig, DEFAULT_HARD_EXPIRY, DEFAULT_SOFT_EXPIRY,
};

const MIN_SECRET_LEN: usize = 32;
const DEFAULT_REGISTRY_FILE: &str = "token_registry.json";

#[derive(Debug, Clone)]
pub struct AppConfig {
    // Server configuration
    pub host: String,
    pub port: u16,

    // Token configuration
    pub jwt_secret: String,
    pub soft_expiry: Duration,
    pub hard_expiry: Duration,

    /// Where the token registry is saved at shutdown and read at startup
    pub registry_file: PathBuf,

    /// Development credential directory (optional)
    pub credentials_file: Option<PathBuf>,
}

impl AppConfig {
    /// Load and validate all configuration from environment variables
    pub fn from_env() -> Result<Self, AppError> {
        let host = env::var("BACKEND_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port_str = env::var("BACKEND_PORT").unwrap_or_else(|_| "3001".to_string());
        let port = port_str.parse::<u16>().map_err(|_| {
            AppError::config(format!(
                "BACKEND_PORT must be a valid port number, got '{port_str}'"
            ))
        })?;

        // BACKEND_JWT_SECRET: required, non-empty, minimum length
        let jwt_secret = match env::var("BACKEND_JWT_SECRET") {
            Ok(secret) if secret.len() >= MIN_SECRET_LEN => secret,
            Ok(_) => {
                return Err(AppError::config(format!(
                    "BACKEND_JWT_SECRET is too short. It should be at least {MIN_SECRET_LEN} characters."
                )))
            }
            Err(_) => return Err(AppError::config("BACKEND_JWT_SECRET must be set.")),
        };

        let soft_expiry = secs_from_env("TOKEN_SOFT_EXPIRY_SECS", DEFAULT_SOFT_EXPIRY)?;
        let hard_expiry = secs_from_env("TOKEN_HARD_EXPIRY_SECS", DEFAULT_HARD_EXPIRY)?;
        if hard_expiry <= soft_expiry {
            return Err(AppError::config(
                "TOKEN_HARD_EXPIRY_SECS must be greater than TOKEN_SOFT_EXPIRY_SECS",
            ));
        }

        let registry_file = env::var("TOKEN_REGISTRY_FILE")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_REGISTRY_FILE));

        let credentials_file = env::var("BACKEND_CREDENTIALS_FILE")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        Ok(AppConfig {
            host,
            port,
            jwt_secret,
            soft_expiry,
            hard_expiry,
            registry_file,
            credentials_file,
        })
    }

    pub fn security(&self) -> SecurityConfig {
        SecurityConfig::new(self.jwt_secret.as_bytes())
            .with_soft_expiry(self.soft_expiry)
            .with_hard_expiry(self.hard_expiry)
    }
}

fn secs_from_env(name: &str, default: Duration) -> Result<Duration, AppError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .ok_or_else(|| {
                AppError::config(format!("{name} must be a positive number of seconds, got '{raw}'"))
            }),
        Err(_) => Ok(default),
    }
}
