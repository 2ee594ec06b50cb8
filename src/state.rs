use std::sync::Arc;

use tracing::warn;

use crate::config::AppConfig;
use crate::db;
use crate::users::{
    memory::MemoryUserStore,
    repo::{PgUserStore, UserStore},
    services::UserService,
    validator::ConstraintValidator,
};

#[derive(Clone)]
pub struct AppState {
    pub users: UserService,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;

        let store: Arc<dyn UserStore> = match &config.db {
            Some(db_cfg) => {
                let pool = db::connect(db_cfg).await?;
                if db_cfg.run_migrations {
                    db::migrate(&pool).await;
                }
                Arc::new(PgUserStore::new(pool))
            }
            None => {
                warn!("DATABASE_URL not set; using in-memory user store");
                Arc::new(MemoryUserStore::new())
            }
        };

        Ok(Self::with_store(store, config))
    }

    pub fn with_store(store: Arc<dyn UserStore>, config: AppConfig) -> Self {
        Self {
            users: UserService::new(store, Arc::new(ConstraintValidator)),
            config: Arc::new(config),
        }
    }

    #[cfg(test)]
    pub fn in_memory() -> Self {
        Self::with_store(Arc::new(MemoryUserStore::new()), AppConfig::in_memory())
    }
}
