use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use itertools::Itertools;

use crate::core::models::phase::{PhaseName, Schedule};
use crate::core::services::team::Rules;
use crate::error::Error;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub bind_addr: String,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub admin_password: Option<String>,
    pub judges: Vec<String>,
    pub content_base_url: Option<String>,
    pub content_cache_ttl: Duration,
    pub phase_cache_ttl: Duration,
    pub vote_debounce: Duration,
    pub team_rules: Rules,
    pub schedule: Schedule,
}

impl Config {
    /// Reads the process environment after `.env` has been loaded.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| dotenv::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());
        let required = |key: &str| var(key).ok_or_else(|| Error::ConfigError(key.into(), "not set".into()));

        let mut opens = HashMap::new();
        for phase in PhaseName::ALL {
            let key = format!("SCHEDULE_{}", phase.as_str().to_uppercase());
            if let Some(raw) = var(&key) {
                let at = DateTime::parse_from_rfc3339(&raw).map_err(|e| Error::ConfigError(key.clone(), e.to_string()))?;
                opens.insert(phase, at.with_timezone(&Utc));
            }
        }

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            database_max_connections: parse_or(&var, "DATABASE_MAX_CONNECTIONS", 5)?,
            bind_addr: var("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:8000".into()),
            jwt_secret: required("JWT_SECRET")?,
            token_ttl_hours: parse_or(&var, "TOKEN_TTL_HOURS", 720)?,
            admin_password: var("ADMIN_PASSWORD"),
            judges: var("JUDGES").map(|raw| judge_list(&raw)).unwrap_or_default(),
            content_base_url: var("CONTENT_BASE_URL"),
            content_cache_ttl: Duration::from_secs(parse_or(&var, "CONTENT_CACHE_TTL_SECS", 60)?),
            phase_cache_ttl: Duration::from_secs(parse_or(&var, "PHASE_CACHE_TTL_SECS", 30)?),
            vote_debounce: Duration::from_millis(parse_or(&var, "VOTE_DEBOUNCE_MS", 500)?),
            team_rules: Rules {
                max_members: parse_or(&var, "TEAM_MAX_MEMBERS", 5)?,
                eligible_ideas: parse_or(&var, "TEAM_ELIGIBLE_IDEAS", 8)?,
            },
            schedule: Schedule::new(opens),
        })
    }
}

fn parse_or<V, T>(var: &V, key: &str, default: T) -> Result<T, Error>
where
    V: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    match var(key) {
        Some(raw) => raw.parse().map_err(|e: T::Err| Error::ConfigError(key.into(), e.to_string())),
        None => Ok(default),
    }
}

fn judge_list(raw: &str) -> Vec<String> {
    raw.split(',').map(|name| name.trim().to_lowercase()).filter(|name| !name.is_empty()).unique().collect()
}
