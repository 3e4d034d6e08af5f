use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::manager::DatabaseError;
use super::models::{Item, ItemDraft, ItemFilter, Owner, User, UserRecord};
use super::store::{ItemStore, UserStore};

#[derive(Default)]
struct Tables {
    items: BTreeMap<i64, StoredItem>,
    users: BTreeMap<i64, UserRecord>,
    next_item_id: i64,
    next_user_id: i64,
}

struct StoredItem {
    owner: Option<i64>,
    draft: ItemDraft,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Tables {
    fn materialize(&self, id: i64, stored: &StoredItem) -> Item {
        let owner = stored.owner.and_then(|user_id| {
            self.users.get(&user_id).map(|u| Owner {
                id: u.id,
                username: u.username.clone(),
            })
        });
        let draft = stored.draft.clone();

        Item {
            id,
            owner,
            name: draft.name,
            price: draft.price,
            description: draft.description,
            thumbnail: draft.thumbnail,
            category: draft.category,
            is_featured: draft.is_featured,
            brand: draft.brand,
            stock: draft.stock,
            size: draft.size,
            created_at: stored.created_at,
            updated_at: stored.updated_at,
        }
    }
}

/// In-process store for running without Postgres and for tests.
/// Ids start at 1 and are never reused.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ItemStore for MemoryStore {
    async fn get(&self, id: i64) -> Result<Option<Item>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.items.get(&id).map(|stored| tables.materialize(id, stored)))
    }

    async fn list(&self, filter: ItemFilter) -> Result<Vec<Item>, DatabaseError> {
        let tables = self.tables.read().await;
        let items = tables
            .items
            .iter()
            .filter(|(_, stored)| match filter {
                ItemFilter::All => true,
                ItemFilter::Owner(user_id) => stored.owner == Some(user_id),
            })
            .map(|(id, stored)| tables.materialize(*id, stored))
            .collect();
        Ok(items)
    }

    async fn create(&self, owner: Option<i64>, draft: ItemDraft) -> Result<Item, DatabaseError> {
        let mut tables = self.tables.write().await;
        if let Some(user_id) = owner {
            if !tables.users.contains_key(&user_id) {
                return Err(DatabaseError::NotFound(format!("user {} does not exist", user_id)));
            }
        }

        tables.next_item_id += 1;
        let id = tables.next_item_id;
        let now = Utc::now();
        let stored = StoredItem {
            owner,
            draft,
            created_at: now,
            updated_at: now,
        };
        let item = tables.materialize(id, &stored);
        tables.items.insert(id, stored);
        Ok(item)
    }

    async fn update(&self, id: i64, draft: ItemDraft) -> Result<Option<Item>, DatabaseError> {
        let mut tables = self.tables.write().await;
        let Some(stored) = tables.items.get_mut(&id) else {
            return Ok(None);
        };
        stored.draft = draft;
        stored.updated_at = Utc::now().max(stored.created_at);

        let tables = &*tables;
        Ok(tables.items.get(&id).map(|stored| tables.materialize(id, stored)))
    }

    async fn delete(&self, id: i64) -> Result<bool, DatabaseError> {
        Ok(self.tables.write().await.items.remove(&id).is_some())
    }

    async fn count(&self) -> Result<i64, DatabaseError> {
        Ok(self.tables.read().await.items.len() as i64)
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.username == username) {
            return Err(DatabaseError::Conflict(format!("username '{}' is taken", username)));
        }

        tables.next_user_id += 1;
        let record = UserRecord {
            id: tables.next_user_id,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            last_login: None,
            date_joined: Utc::now(),
        };
        tables.users.insert(record.id, record.clone());
        Ok(record.into())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.username == username).cloned())
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.users.get(&id).cloned().map(User::from))
    }

    async fn record_login(&self, id: i64, at: DateTime<Utc>) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        match tables.users.get_mut(&id) {
            Some(user) => {
                user.last_login = Some(at);
                Ok(())
            }
            None => Err(DatabaseError::NotFound(format!("user {} does not exist", id))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(name: &str) -> ItemDraft {
        ItemDraft {
            name: name.to_string(),
            price: 1000,
            description: "x".to_string(),
            thumbnail: "http://x".to_string(),
            category: "Ball".to_string(),
            is_featured: false,
            brand: None,
            stock: 0,
            size: None,
        }
    }

    #[tokio::test]
    async fn owner_filter_returns_only_owned_items() {
        let store = MemoryStore::new();
        let alice = store.create_user("alice", "hash").await.unwrap();
        let bob = store.create_user("bob", "hash").await.unwrap();

        let a1 = store.create(Some(alice.id), draft("a1")).await.unwrap();
        store.create(Some(bob.id), draft("b1")).await.unwrap();
        let a2 = store.create(Some(alice.id), draft("a2")).await.unwrap();
        store.create(None, draft("unowned")).await.unwrap();

        let mine = store.list(ItemFilter::Owner(alice.id)).await.unwrap();
        let ids: Vec<i64> = mine.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![a1.id, a2.id]);
        assert!(mine.iter().all(|i| i.owner.as_ref().map(|o| o.username.as_str()) == Some("alice")));
        assert_eq!(store.list(ItemFilter::All).await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn update_keeps_identity_and_creation_time() {
        let store = MemoryStore::new();
        let created = store.create(None, draft("old")).await.unwrap();

        let updated = store.update(created.id, draft("new")).await.unwrap().unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.name, "new");
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);

        assert!(store.update(999, draft("missing")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_removes_and_ids_are_not_reused() {
        let store = MemoryStore::new();
        let first = store.create(None, draft("one")).await.unwrap();

        assert!(store.delete(first.id).await.unwrap());
        assert!(!store.delete(first.id).await.unwrap());
        assert!(store.get(first.id).await.unwrap().is_none());

        let second = store.create(None, draft("two")).await.unwrap();
        assert!(second.id > first.id);
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn owner_must_exist() {
        let store = MemoryStore::new();
        let err = store.create(Some(42), draft("ghost")).await.unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound(_)));
    }

    #[tokio::test]
    async fn usernames_are_unique() {
        let store = MemoryStore::new();
        store.create_user("alice", "hash").await.unwrap();
        let err = store.create_user("alice", "other").await.unwrap_err();
        assert!(matches!(err, DatabaseError::Conflict(_)));
    }
}
