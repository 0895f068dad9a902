use std::sync::Arc;

use sqlx::SqlitePool;

use crate::auth::{jwt::JwtKeys, password};
use crate::config::AppConfig;
use crate::db;
use crate::summarizer::{OllamaClient, Summarizer};

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<AppConfig>,
    pub keys: JwtKeys,
    pub dummy_digest: Arc<str>,
    pub summarizer: Arc<dyn Summarizer>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;
        let db = db::connect(&config.database_url).await?;
        let summarizer = Arc::new(OllamaClient::new(&config.summarizer)?) as Arc<dyn Summarizer>;
        Self::from_parts(db, Arc::new(config), summarizer)
    }

    pub fn from_parts(
        db: SqlitePool,
        config: Arc<AppConfig>,
        summarizer: Arc<dyn Summarizer>,
    ) -> anyhow::Result<Self> {
        let keys = JwtKeys::from_config(&config.jwt);
        let dummy_digest = password::hash("login-timing-placeholder")?.into();
        Ok(Self {
            db,
            config,
            keys,
            dummy_digest,
            summarizer,
        })
    }
}
