use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use chrono::{FixedOffset, NaiveDateTime, Utc};
use dotenvy::dotenv;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,

    // Rate limiting
    pub rate_protected_per_min: u32,

    pub api_prefix: String,

    /// Company local civil time; all attendance dates and times use it
    pub company_offset: FixedOffset,
    pub schedule_cache_ttl: Duration,
    pub enforce_leave_quotas: bool,

    pub log_dir: String,
    pub log_level: String,
}

fn required(key: &str) -> Result<String> {
    env::var(key).with_context(|| format!("{} must be set", key))
}

fn optional<T: FromStr>(key: &str, default: T) -> Result<T> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| anyhow!("{} has an invalid value: {}", key, raw)),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let offset_minutes: i32 = optional("COMPANY_UTC_OFFSET_MINUTES", 0)?;
        let company_offset = FixedOffset::east_opt(offset_minutes * 60)
            .ok_or_else(|| anyhow!("COMPANY_UTC_OFFSET_MINUTES out of range: {}", offset_minutes))?;

        Ok(Self {
            server_addr: required("SERVER_ADDR")?,
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,

            rate_protected_per_min: optional("RATE_PROTECTED_PER_MIN", 1000)?,

            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),

            company_offset,
            schedule_cache_ttl: Duration::from_secs(optional("SCHEDULE_CACHE_TTL_SECS", 60)?),
            enforce_leave_quotas: optional("ENFORCE_LEAVE_QUOTAS", false)?,

            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Current wall-clock time in the company's local time.
    pub fn company_now(&self) -> NaiveDateTime {
        Utc::now().with_timezone(&self.company_offset).naive_local()
    }
}
