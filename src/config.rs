use std::env;

use anyhow::Context;
use serde::Deserialize;

/// Upper bound for `JWT_TTL_MINUTES` (one year).
pub const MAX_TTL_MINUTES: i64 = 60 * 24 * 365;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SummarizerConfig {
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
    pub max_concurrency: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt: JwtConfig,
    pub summarizer: SummarizerConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://users.db?mode=rwc".into());
        let jwt = JwtConfig {
            secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            ttl_minutes: clamp_ttl_minutes(parsed_or("JWT_TTL_MINUTES", 60)),
        };
        let summarizer = SummarizerConfig {
            base_url: env::var("OLLAMA_URL").unwrap_or_else(|_| "http://localhost:11434".into()),
            model: env::var("OLLAMA_MODEL").unwrap_or_else(|_| "llama3".into()),
            timeout_secs: parsed_or("SUMMARY_TIMEOUT_SECS", 120),
            max_concurrency: parsed_or::<usize>("SUMMARY_MAX_CONCURRENCY", 4).max(1),
        };
        Ok(Self {
            database_url,
            host: env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: parsed_or("APP_PORT", 8004),
            jwt,
            summarizer,
        })
    }
}

pub fn clamp_ttl_minutes(minutes: i64) -> i64 {
    minutes.clamp(1, MAX_TTL_MINUTES)
}

fn parsed_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}
