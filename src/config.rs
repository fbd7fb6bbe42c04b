//! Application configuration loaded from environment variables.
//!
//! A `.env` file in the working directory is honoured for local runs.

use std::env;
use std::time::Duration;

use crate::models::entry::{EntryData, LegacyEntryData, StoredEntry};

/// Default Drivvo login endpoint.
pub const DEFAULT_LOGIN_URL: &str = "https://api.drivvo.com/autenticacao/login";

/// Default Drivvo API base URL.
pub const DEFAULT_API_URL: &str = "https://api.drivvo.com";

/// Default poll interval (30 minutes).
pub const DEFAULT_SCAN_INTERVAL_SECS: u64 = 30 * 60;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Drivvo account and vehicles to poll
    pub entry: EntryData,
    /// Login endpoint
    pub login_url: String,
    /// API base URL (no trailing slash)
    pub api_url: String,
    /// Delay between poll cycles per vehicle
    pub scan_interval: Duration,
    /// Server port
    pub port: u16,
}

impl Config {
    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            entry: EntryData {
                email: "test@example.com".to_string(),
                password: "test_password".to_string(),
                vehicles: vec!["1".to_string()],
            },
            login_url: "http://127.0.0.1:9/autenticacao/login".to_string(),
            api_url: "http://127.0.0.1:9".to_string(),
            scan_interval: Duration::from_secs(DEFAULT_SCAN_INTERVAL_SECS),
            port: 8080,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Vehicles come from `DRIVVO_VEHICLES` (comma separated). The legacy
    /// single-vehicle `DRIVVO_VEHICLE_ID` is still accepted and migrated.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let email = env::var("DRIVVO_EMAIL").map_err(|_| ConfigError::Missing("DRIVVO_EMAIL"))?;
        let password = env::var("DRIVVO_PASSWORD")
            .map_err(|_| ConfigError::Missing("DRIVVO_PASSWORD"))?;

        let stored = match env::var("DRIVVO_VEHICLES") {
            Ok(list) => StoredEntry::Current(EntryData {
                email,
                password,
                vehicles: parse_vehicle_list(&list),
            }),
            Err(_) => StoredEntry::Legacy(LegacyEntryData {
                email,
                password,
                id_vehicle: env::var("DRIVVO_VEHICLE_ID")
                    .map(|v| v.trim().to_string())
                    .map_err(|_| ConfigError::Missing("DRIVVO_VEHICLES"))?,
            }),
        };
        let entry = stored.migrate();

        if entry.vehicles.is_empty() {
            return Err(ConfigError::Invalid(
                "DRIVVO_VEHICLES",
                "no vehicle ids given".to_string(),
            ));
        }

        let scan_interval_secs = match env::var("SCAN_INTERVAL_SECS") {
            Ok(raw) => raw
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| ConfigError::Invalid("SCAN_INTERVAL_SECS", raw))?,
            Err(_) => DEFAULT_SCAN_INTERVAL_SECS,
        };

        Ok(Self {
            entry,
            login_url: env::var("DRIVVO_LOGIN_URL")
                .unwrap_or_else(|_| DEFAULT_LOGIN_URL.to_string()),
            api_url: env::var("DRIVVO_API_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            scan_interval: Duration::from_secs(scan_interval_secs),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
        })
    }
}

/// Split a comma separated vehicle list, dropping blanks.
fn parse_vehicle_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}
