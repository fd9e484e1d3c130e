use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, to_document},
    options::{FindOneAndUpdateOptions, ReturnDocument},
};

#[cfg(test)]
use crate::db::MemoryStore;
use crate::db::{MongoStore, StoreResult};
use crate::users::repo_types::{UserChanges, UserDocument};

/// Access to the `Users` collection.
#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn list(&self) -> StoreResult<Vec<UserDocument>>;
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<UserDocument>>;
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<UserDocument>>;
    async fn insert(&self, user: &UserDocument) -> StoreResult<()>;
    /// Applies `changes` and returns the document as stored afterwards, or
    /// `None` when no user has this id.
    async fn update(&self, id: &str, changes: UserChanges) -> StoreResult<Option<UserDocument>>;
    /// Removes the user and returns what was removed.
    async fn delete(&self, id: &str) -> StoreResult<Option<UserDocument>>;
}

#[async_trait]
impl UserRepo for MongoStore {
    async fn list(&self) -> StoreResult<Vec<UserDocument>> {
        let cursor = self.users().find(doc! {}, None).await?;
        Ok(cursor.try_collect::<Vec<_>>().await?)
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<UserDocument>> {
        Ok(self.users().find_one(doc! { "_id": id }, None).await?)
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<UserDocument>> {
        Ok(self.users().find_one(doc! { "email": email }, None).await?)
    }

    async fn insert(&self, user: &UserDocument) -> StoreResult<()> {
        self.users().insert_one(user, None).await?;
        Ok(())
    }

    async fn update(&self, id: &str, changes: UserChanges) -> StoreResult<Option<UserDocument>> {
        if changes.is_empty() {
            return self.find_by_id(id).await;
        }
        let set = to_document(&changes)?;
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();
        Ok(self
            .users()
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": set }, options)
            .await?)
    }

    async fn delete(&self, id: &str) -> StoreResult<Option<UserDocument>> {
        Ok(self
            .users()
            .find_one_and_delete(doc! { "_id": id }, None)
            .await?)
    }
}

#[cfg(test)]
#[async_trait]
impl UserRepo for MemoryStore {
    async fn list(&self) -> StoreResult<Vec<UserDocument>> {
        Ok(self.users.read().await.clone())
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<UserDocument>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<UserDocument>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn insert(&self, user: &UserDocument) -> StoreResult<()> {
        self.users.write().await.push(user.clone());
        Ok(())
    }

    async fn update(&self, id: &str, changes: UserChanges) -> StoreResult<Option<UserDocument>> {
        let mut users = self.users.write().await;
        let Some(user) = users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        changes.apply(user);
        Ok(Some(user.clone()))
    }

    async fn delete(&self, id: &str) -> StoreResult<Option<UserDocument>> {
        let mut users = self.users.write().await;
        Ok(users
            .iter()
            .position(|u| u.id == id)
            .map(|idx| users.remove(idx)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str, email: &str) -> UserDocument {
        UserDocument {
            id: id.into(),
            name: "Alice".into(),
            email: email.into(),
            password_hash: "hash".into(),
        }
    }

    #[tokio::test]
    async fn memory_store_finds_by_id_and_email() {
        let store = MemoryStore::new();
        store.insert(&user("1", "a@x.com")).await.unwrap();
        store.insert(&user("2", "b@x.com")).await.unwrap();

        assert_eq!(store.find_by_id("2").await.unwrap().unwrap().email, "b@x.com");
        assert_eq!(store.find_by_email("a@x.com").await.unwrap().unwrap().id, "1");
        assert!(store.find_by_id("3").await.unwrap().is_none());
        assert_eq!(store.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn memory_store_update_only_touches_supplied_fields() {
        let store = MemoryStore::new();
        store.insert(&user("1", "a@x.com")).await.unwrap();

        let updated = store
            .update(
                "1",
                UserChanges {
                    name: Some("Alicia".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.name, "Alicia");
        assert_eq!(updated.email, "a@x.com");
        assert_eq!(updated.password_hash, "hash");

        let missing = store.update("nope", UserChanges::default()).await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn memory_store_delete_returns_removed_document() {
        let store = MemoryStore::new();
        store.insert(&user("1", "a@x.com")).await.unwrap();

        let removed = store.delete("1").await.unwrap().unwrap();
        assert_eq!(removed.id, "1");
        assert!(store.delete("1").await.unwrap().is_none());
        assert!(store.list().await.unwrap().is_empty());
    }

    #[test]
    fn changes_serialize_only_supplied_fields() {
        let set = to_document(&UserChanges {
            email: Some("new@x.com".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.get_str("email").unwrap(), "new@x.com");
    }
}
