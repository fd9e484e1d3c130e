use std::sync::Arc;

use crate::auth::JwtKeys;
use crate::config::AppConfig;
use crate::db::MongoStore;
#[cfg(test)]
use crate::db::MemoryStore;
use crate::transactions::repo::TransactionRepo;
use crate::users::repo::UserRepo;

/// Shared, read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub keys: JwtKeys,
    pub users: Arc<dyn UserRepo>,
    pub transactions: Arc<dyn TransactionRepo>,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let keys = JwtKeys::new(&config.jwt)?;
        let store = Arc::new(MongoStore::connect(&config.mongo).await?);
        Ok(Self::from_parts(
            Arc::new(config),
            keys,
            store.clone(),
            store,
        ))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        keys: JwtKeys,
        users: Arc<dyn UserRepo>,
        transactions: Arc<dyn TransactionRepo>,
    ) -> Self {
        Self {
            config,
            keys,
            users,
            transactions,
        }
    }

    /// State over an empty [`MemoryStore`].
    #[cfg(test)]
    pub fn fake() -> Self {
        use crate::config::{JwtConfig, MongoConfig};

        let config = AppConfig {
            mongo: MongoConfig {
                uri: "mongodb://localhost:27017".into(),
                database: "fintrack-test".into(),
            },
            jwt: JwtConfig {
                secret: "test-secret".into(),
                ttl_minutes: 60,
            },
            cors_allowed_origin: None,
        };
        let keys = JwtKeys::new(&config.jwt).expect("test secret is set");
        let store = Arc::new(MemoryStore::new());
        Self::from_parts(Arc::new(config), keys, store.clone(), store)
    }
}
