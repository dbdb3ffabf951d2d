use crate::errors::{AppError, Result};
use std::path::PathBuf;

pub const DEFAULT_DB_PATH: &str = "digital_identity.db";
pub const DEFAULT_VALIDITY_DAYS: i64 = 365 * 5;
pub const MAX_VALIDITY_DAYS: i64 = 365 * 100;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_path: PathBuf,
    /// How long a newly created identity stays valid.
    pub identity_validity_days: i64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DB_PATH),
            identity_validity_days: DEFAULT_VALIDITY_DAYS,
        }
    }
}

impl AppConfig {
    /// Reads `IDENTITY_DB_PATH` and `IDENTITY_VALIDITY_DAYS`. Call
    /// `dotenv::dotenv()` first to pick up a `.env` file.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let database_path = lookup("IDENTITY_DB_PATH")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH));

        let identity_validity_days = match lookup("IDENTITY_VALIDITY_DAYS") {
            Some(raw) => {
                let days = raw.trim().parse::<i64>().map_err(|e| {
                    AppError::ConfigError(format!("IDENTITY_VALIDITY_DAYS must be an integer, got '{}': {}", raw, e))
                })?;
                if !(1..=MAX_VALIDITY_DAYS).contains(&days) {
                    return Err(AppError::ConfigError(format!(
                        "IDENTITY_VALIDITY_DAYS must be between 1 and {}, got {}",
                        MAX_VALIDITY_DAYS, days
                    )));
                }
                days
            }
            None => DEFAULT_VALIDITY_DAYS,
        };

        Ok(Self {
            database_path,
            identity_validity_days,
        })
    }

    pub fn with_database_path(mut self, path: Option<PathBuf>) -> Self {
        if let Some(path) = path {
            self.database_path = path;
        }
        self
    }

    pub fn identity_validity(&self) -> Result<chrono::Duration> {
        chrono::Duration::try_days(self.identity_validity_days).ok_or_else(|| {
            AppError::ConfigError(format!("Identity validity of {} days is out of range", self.identity_validity_days))
        })
    }
}
