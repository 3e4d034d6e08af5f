use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::manager::DatabaseError;
use super::models::{Item, ItemDraft, ItemFilter, User, UserRecord};

/// Durable collection of product records.
#[async_trait]
pub trait ItemStore: Send + Sync {
    async fn get(&self, id: i64) -> Result<Option<Item>, DatabaseError>;

    /// Records matching `filter`, ordered by id.
    async fn list(&self, filter: ItemFilter) -> Result<Vec<Item>, DatabaseError>;

    async fn create(&self, owner: Option<i64>, draft: ItemDraft) -> Result<Item, DatabaseError>;

    /// Replaces the editable fields and refreshes `updated_at`. `None` when the id is absent.
    async fn update(&self, id: i64, draft: ItemDraft) -> Result<Option<Item>, DatabaseError>;

    /// `false` when the id is absent.
    async fn delete(&self, id: i64) -> Result<bool, DatabaseError>;

    async fn count(&self) -> Result<i64, DatabaseError>;

    async fn ping(&self) -> Result<(), DatabaseError>;
}

/// Account storage backing the identity provider.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `DatabaseError::Conflict` when the username is taken.
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, DatabaseError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, DatabaseError>;

    async fn get_user(&self, id: i64) -> Result<Option<User>, DatabaseError>;

    async fn record_login(&self, id: i64, at: DateTime<Utc>) -> Result<(), DatabaseError>;
}
