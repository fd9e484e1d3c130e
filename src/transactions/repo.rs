use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, to_document},
    options::{FindOneAndUpdateOptions, ReturnDocument},
};

#[cfg(test)]
use crate::db::MemoryStore;
use crate::db::{MongoStore, StoreResult};
use crate::transactions::repo_types::{TransactionChanges, TransactionDocument};

/// Access to the `Transactions` collection.
#[async_trait]
pub trait TransactionRepo: Send + Sync {
    async fn list(&self) -> StoreResult<Vec<TransactionDocument>>;
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<TransactionDocument>>;
    async fn insert(&self, tx: &TransactionDocument) -> StoreResult<()>;
    async fn update(
        &self,
        id: &str,
        changes: TransactionChanges,
    ) -> StoreResult<Option<TransactionDocument>>;
    async fn delete(&self, id: &str) -> StoreResult<Option<TransactionDocument>>;
}

#[async_trait]
impl TransactionRepo for MongoStore {
    async fn list(&self) -> StoreResult<Vec<TransactionDocument>> {
        let cursor = self.transactions().find(doc! {}, None).await?;
        Ok(cursor.try_collect::<Vec<_>>().await?)
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<TransactionDocument>> {
        Ok(self.transactions().find_one(doc! { "_id": id }, None).await?)
    }

    async fn insert(&self, tx: &TransactionDocument) -> StoreResult<()> {
        self.transactions().insert_one(tx, None).await?;
        Ok(())
    }

    async fn update(
        &self,
        id: &str,
        changes: TransactionChanges,
    ) -> StoreResult<Option<TransactionDocument>> {
        if changes.is_empty() {
            return self.find_by_id(id).await;
        }
        let set = to_document(&changes)?;
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();
        Ok(self
            .transactions()
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": set }, options)
            .await?)
    }

    async fn delete(&self, id: &str) -> StoreResult<Option<TransactionDocument>> {
        Ok(self
            .transactions()
            .find_one_and_delete(doc! { "_id": id }, None)
            .await?)
    }
}

#[cfg(test)]
#[async_trait]
impl TransactionRepo for MemoryStore {
    async fn list(&self) -> StoreResult<Vec<TransactionDocument>> {
        Ok(self.transactions.read().await.clone())
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<TransactionDocument>> {
        let txs = self.transactions.read().await;
        Ok(txs.iter().find(|t| t.id == id).cloned())
    }

    async fn insert(&self, tx: &TransactionDocument) -> StoreResult<()> {
        self.transactions.write().await.push(tx.clone());
        Ok(())
    }

    async fn update(
        &self,
        id: &str,
        changes: TransactionChanges,
    ) -> StoreResult<Option<TransactionDocument>> {
        let mut txs = self.transactions.write().await;
        let Some(tx) = txs.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };
        changes.apply(tx);
        Ok(Some(tx.clone()))
    }

    async fn delete(&self, id: &str) -> StoreResult<Option<TransactionDocument>> {
        let mut txs = self.transactions.write().await;
        Ok(txs
            .iter()
            .position(|t| t.id == id)
            .map(|idx| txs.remove(idx)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transactions::repo_types::TransactionType;
    use rust_decimal::Decimal;
    use time::macros::datetime;

    fn rent(id: &str) -> TransactionDocument {
        TransactionDocument {
            id: id.into(),
            kind: TransactionType::Rent,
            date: datetime!(2024-01-01 0:00 UTC),
            amount: Decimal::new(1200, 0),
        }
    }

    #[tokio::test]
    async fn memory_store_keeps_insertion_order() {
        let store = MemoryStore::new();
        for id in ["a", "b", "c"] {
            store.insert(&rent(id)).await.unwrap();
        }
        let ids: Vec<String> = store.list().await.unwrap().into_iter().map(|t| t.id).collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[tokio::test]
    async fn memory_store_update_applies_zero_amount() {
        let store = MemoryStore::new();
        store.insert(&rent("a")).await.unwrap();

        let updated = store
            .update(
                "a",
                TransactionChanges {
                    amount: Some(Decimal::ZERO),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.amount, Decimal::ZERO);
        assert_eq!(updated.kind, TransactionType::Rent);
        assert_eq!(updated.date, datetime!(2024-01-01 0:00 UTC));
    }

    #[tokio::test]
    async fn memory_store_delete_missing_is_none() {
        let store = MemoryStore::new();
        assert!(store.delete("nope").await.unwrap().is_none());
    }

    #[test]
    fn document_encodes_id_type_and_date_for_mongo() {
        let encoded = to_document(&rent("a")).unwrap();
        assert_eq!(encoded.get_str("_id").unwrap(), "a");
        assert_eq!(encoded.get_str("type").unwrap(), "Rent");
        assert_eq!(encoded.get_str("date").unwrap(), "2024-01-01T00:00:00Z");
        assert_eq!(encoded.get_str("amount").unwrap(), "1200");
    }

    #[test]
    fn stored_amount_survives_a_bson_roundtrip() {
        let mut tx = rent("a");
        tx.amount = "12345678901234567.89".parse().unwrap();
        let encoded = to_document(&tx).unwrap();
        assert_eq!(encoded.get_str("amount").unwrap(), "12345678901234567.89");

        let decoded: TransactionDocument = mongodb::bson::from_document(encoded).unwrap();
        assert_eq!(decoded, tx);
    }

    #[test]
    fn changes_encode_only_supplied_fields() {
        let set = to_document(&TransactionChanges {
            kind: Some(TransactionType::Entertainment),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.get_str("type").unwrap(), "Entertainment");

        let set = to_document(&TransactionChanges {
            amount: Some(Decimal::ZERO),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(set.get_str("amount").unwrap(), "0");
    }
}
