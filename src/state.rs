use std::sync::Arc;

use sqlx::PgPool;

use crate::{
    config::AppConfig,
    db,
    users::{AccountService, PgUserStore, UserStore},
};

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<AppConfig>,
    pub accounts: AccountService,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let db = db::connect(&config).await?;
        Ok(Self::from_parts(db, config))
    }

    pub fn from_parts(db: PgPool, config: Arc<AppConfig>) -> Self {
        let store = Arc::new(PgUserStore::new(db.clone())) as Arc<dyn UserStore>;
        let accounts = AccountService::from_config(store, &config.jwt);
        Self {
            db,
            config,
            accounts,
        }
    }
}
