//! Environment configuration
//!
//! Values come from the process environment, optionally seeded from a
//! `.env` file by the binaries.

use crate::conversational::{RouterConfig, DEFAULT_THANKS_MAX_CHARS};
use crate::error::AssistantError;
use crate::Result;
use std::env;

const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: Option<String>,
    pub router: RouterConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            database_url: None,
            router: RouterConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; blank values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match get("PORT").or_else(|| get("API_PORT")) {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| {
                AssistantError::ConfigError(format!("Invalid PORT '{}': {}", raw, e))
            })?,
            None => DEFAULT_PORT,
        };

        let database_url = get("DATABASE_URL").or_else(|| get("POSTGRES_URL"));

        let thanks_max_chars = match get("THANKS_MAX_CHARS") {
            Some(raw) => raw.trim().parse::<usize>().map_err(|e| {
                AssistantError::ConfigError(format!("Invalid THANKS_MAX_CHARS '{}': {}", raw, e))
            })?,
            None => DEFAULT_THANKS_MAX_CHARS,
        };

        Ok(Self {
            port,
            database_url,
            router: RouterConfig { thanks_max_chars },
        })
    }
}
