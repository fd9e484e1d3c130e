use anyhow::Context;
use mongodb::{bson::doc, Client, Collection, Database};
use thiserror::Error;
#[cfg(test)]
use tokio::sync::RwLock;
use tracing::info;

use crate::config::MongoConfig;
use crate::transactions::repo_types::TransactionDocument;
use crate::users::repo_types::UserDocument;

pub const USERS_COLLECTION: &str = "Users";
pub const TRANSACTIONS_COLLECTION: &str = "Transactions";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("mongodb: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("bson encoding: {0}")]
    Encode(#[from] mongodb::bson::ser::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Document store backed by MongoDB. Documents are keyed by `_id`, which is
/// the same string the API exposes as `id`.
#[derive(Clone)]
pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    pub async fn connect(config: &MongoConfig) -> anyhow::Result<Self> {
        let client = Client::with_uri_str(&config.uri)
            .await
            .context("parse mongodb connection string")?;
        let db = client.database(&config.database);
        db.run_command(doc! { "ping": 1 }, None)
            .await
            .context("connect to database")?;
        info!(database = %config.database, "connected to mongodb");
        Ok(Self { db })
    }

    pub(crate) fn users(&self) -> Collection<UserDocument> {
        self.db.collection(USERS_COLLECTION)
    }

    pub(crate) fn transactions(&self) -> Collection<TransactionDocument> {
        self.db.collection(TRANSACTIONS_COLLECTION)
    }
}

/// In-memory document store for tests. Keeps insertion order so listings are
/// stable.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub(crate) users: RwLock<Vec<UserDocument>>,
    pub(crate) transactions: RwLock<Vec<TransactionDocument>>,
}

#[cfg(test)]
impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}
