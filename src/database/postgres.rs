use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::debug;

use super::manager::{DatabaseError, DatabaseManager};
use super::models::item::ItemRow;
use super::models::{Item, ItemDraft, ItemFilter, User, UserRecord};
use super::store::{ItemStore, UserStore};

const SELECT_ITEMS: &str = r#"
    SELECT
        i.id, i.user_id, u.username AS owner_username,
        i.name, i.price, i.description, i.thumbnail, i.category,
        i.is_featured, i.brand, i.stock, i.size,
        i.created_at, i.updated_at
    FROM football_items i
    LEFT JOIN users u ON u.id = i.user_id
"#;

/// Postgres-backed item and user store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_item(&self, id: i64) -> Result<Option<Item>, DatabaseError> {
        let sql = format!("{} WHERE i.id = $1", SELECT_ITEMS);
        let row: Option<ItemRow> = sqlx::query_as(&sql).bind(id).fetch_optional(&self.pool).await?;
        Ok(row.map(Item::from))
    }
}

#[async_trait]
impl ItemStore for PgStore {
    async fn get(&self, id: i64) -> Result<Option<Item>, DatabaseError> {
        self.fetch_item(id).await
    }

    async fn list(&self, filter: ItemFilter) -> Result<Vec<Item>, DatabaseError> {
        let rows: Vec<ItemRow> = match filter {
            ItemFilter::All => {
                let sql = format!("{} ORDER BY i.id", SELECT_ITEMS);
                sqlx::query_as(&sql).fetch_all(&self.pool).await?
            }
            ItemFilter::Owner(user_id) => {
                let sql = format!("{} WHERE i.user_id = $1 ORDER BY i.id", SELECT_ITEMS);
                sqlx::query_as(&sql).bind(user_id).fetch_all(&self.pool).await?
            }
        };
        debug!("Fetched {} items for {:?}", rows.len(), filter);
        Ok(rows.into_iter().map(Item::from).collect())
    }

    async fn create(&self, owner: Option<i64>, draft: ItemDraft) -> Result<Item, DatabaseError> {
        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO football_items
                (user_id, name, price, description, thumbnail, category, is_featured, brand, stock, size)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id
            "#,
        )
        .bind(owner)
        .bind(&draft.name)
        .bind(draft.price)
        .bind(&draft.description)
        .bind(&draft.thumbnail)
        .bind(&draft.category)
        .bind(draft.is_featured)
        .bind(&draft.brand)
        .bind(draft.stock)
        .bind(&draft.size)
        .fetch_one(&self.pool)
        .await?;

        self.fetch_item(id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("item {} vanished after insert", id)))
    }

    async fn update(&self, id: i64, draft: ItemDraft) -> Result<Option<Item>, DatabaseError> {
        let result = sqlx::query(
            r#"
            UPDATE football_items SET
                name = $2, price = $3, description = $4, thumbnail = $5, category = $6,
                is_featured = $7, brand = $8, stock = $9, size = $10, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&draft.name)
        .bind(draft.price)
        .bind(&draft.description)
        .bind(&draft.thumbnail)
        .bind(&draft.category)
        .bind(draft.is_featured)
        .bind(&draft.brand)
        .bind(draft.stock)
        .bind(&draft.size)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.fetch_item(id).await
    }

    async fn delete(&self, id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM football_items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> Result<i64, DatabaseError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM football_items")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, DatabaseError> {
        let created = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password_hash)
            VALUES ($1, $2)
            RETURNING id, username, last_login, date_joined
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await;

        match created {
            Ok(user) => Ok(user),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(DatabaseError::Conflict(format!("username '{}' is taken", username)))
            }
            Err(other) => Err(other.into()),
        }
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, DatabaseError> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT id, username, password_hash, last_login, date_joined FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>("SELECT id, username, last_login, date_joined FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn record_login(&self, id: i64, at: DateTime<Utc>) -> Result<(), DatabaseError> {
        sqlx::query("UPDATE users SET last_login = $2 WHERE id = $1")
            .bind(id)
            .bind(at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
